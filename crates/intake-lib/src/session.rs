use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use intake_spec::{
    ControlEvent, FieldErrors, FormValues, IntakeSchema, IntakeStep, Language, RenderContext,
    RenderNode, StepValidationError, extract_step_values, field_errors, message, render_components,
    validate_step,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::api::{DraftResponse, IntakeApi, SaveDraftPayload, SubmitPayload};
use crate::view::PageView;

/// Result of a navigation handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// Another persistence call is in flight; nothing happened.
    Busy,
    /// The schema has no steps.
    NoSteps,
    Invalid { errors: Vec<StepValidationError> },
    /// Moved forward. `saved` is false when the draft save failed.
    Advanced { saved: bool },
    Retreated,
    Submitted,
    /// Draft save or submission failed; the session is unchanged apart from the banner.
    Failed,
    NotOnLastStep,
}

/// Clears the busy flag on every exit path, including a dropped future.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Read-only view of a session's busy flag for hosts that disable buttons.
#[derive(Debug, Clone)]
pub struct BusyHandle(Arc<AtomicBool>);

impl BusyHandle {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Multi-step intake state machine. Owns the answer map; edits go through
/// [`IntakeSession::on_value_change`] only.
pub struct IntakeSession<A> {
    api: A,
    schema: IntakeSchema,
    language: Language,
    values: FormValues,
    active_step_index: usize,
    step_errors: Vec<StepValidationError>,
    persist_error: Option<String>,
    submission_success: Option<String>,
    busy: Arc<AtomicBool>,
    revision: u64,
}

impl<A: IntakeApi> IntakeSession<A> {
    pub fn new(
        api: A,
        schema: IntakeSchema,
        language: Language,
        draft: Option<&DraftResponse>,
    ) -> Self {
        Self {
            api,
            schema,
            language,
            values: draft.map(DraftResponse::initial_values).unwrap_or_default(),
            active_step_index: 0,
            step_errors: Vec::new(),
            persist_error: None,
            submission_success: None,
            busy: Arc::new(AtomicBool::new(false)),
            revision: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn schema(&self) -> &IntakeSchema {
        &self.schema
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn active_step_index(&self) -> usize {
        self.active_step_index
    }

    pub fn active_step(&self) -> Option<&IntakeStep> {
        let last = self.schema.steps.len().checked_sub(1)?;
        self.schema.steps.get(self.active_step_index.min(last))
    }

    pub fn is_last_step(&self) -> bool {
        self.active_step_index + 1 >= self.schema.steps.len()
    }

    pub fn step_errors(&self) -> &[StepValidationError] {
        &self.step_errors
    }

    pub fn field_errors(&self) -> FieldErrors {
        field_errors(&self.step_errors)
    }

    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn submission_success(&self) -> Option<&str> {
        self.submission_success.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn busy_handle(&self) -> BusyHandle {
        BusyHandle(Arc::clone(&self.busy))
    }

    /// Number of accepted state transitions, for hosts that redraw on change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces one answer. Unchanged values are ignored; otherwise the key's
    /// error and both banners are cleared. Returns whether anything changed.
    pub fn on_value_change(&mut self, key: &str, value: Value) -> bool {
        if self.values.get(key) == Some(&value) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        self.step_errors.retain(|error| error.field != key);
        self.clear_banners();
        self.revision += 1;
        true
    }

    pub fn apply(&mut self, event: &ControlEvent) -> bool {
        match event.resolve(&self.values) {
            Some((key, value)) => self.on_value_change(&key, value),
            None => false,
        }
    }

    /// Re-seeds the answers from a new draft, keeping the current step.
    pub fn reset_draft(&mut self, draft: Option<&DraftResponse>) {
        self.values = draft.map(DraftResponse::initial_values).unwrap_or_default();
        self.step_errors.clear();
        self.clear_banners();
        self.revision += 1;
    }

    pub fn back(&mut self) -> NavigationOutcome {
        if self.is_busy() {
            return NavigationOutcome::Busy;
        }
        if self.schema.steps.is_empty() {
            return NavigationOutcome::NoSteps;
        }
        self.active_step_index = self.active_step_index.saturating_sub(1);
        self.step_errors.clear();
        self.clear_banners();
        self.revision += 1;
        debug!(step = self.active_step_index, "intake step retreated");
        NavigationOutcome::Retreated
    }

    /// Validates and saves the current step, then moves forward. On the last step
    /// this submits instead.
    pub async fn advance(&mut self) -> NavigationOutcome {
        if self.is_busy() {
            return NavigationOutcome::Busy;
        }
        if self.schema.steps.is_empty() {
            return NavigationOutcome::NoSteps;
        }
        if self.is_last_step() {
            return self.submit().await;
        }

        let (step_id, payload) = match self.validated_step_payload() {
            Ok(prepared) => prepared,
            Err(errors) => return NavigationOutcome::Invalid { errors },
        };

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return NavigationOutcome::Busy;
        };
        self.begin_persistence();

        let request = SaveDraftPayload {
            step_id: step_id.clone(),
            values: payload,
        };
        let result = self.api.save_draft(&request).await;
        let saved = match result {
            Ok(_) => true,
            Err(err) => {
                error!(step_id = %step_id, error = %err, "failed to save intake draft");
                self.persist_error = Some(err.user_message(self.language));
                false
            }
        };

        let last = self.schema.steps.len() - 1;
        self.active_step_index = (self.active_step_index + 1).min(last);
        self.revision += 1;
        debug!(step = self.active_step_index, saved, "intake step advanced");
        NavigationOutcome::Advanced { saved }
    }

    /// Validates and saves the last step, then submits every answer.
    pub async fn submit(&mut self) -> NavigationOutcome {
        if self.is_busy() {
            return NavigationOutcome::Busy;
        }
        if self.schema.steps.is_empty() {
            return NavigationOutcome::NoSteps;
        }
        if !self.is_last_step() {
            return NavigationOutcome::NotOnLastStep;
        }

        let (step_id, payload) = match self.validated_step_payload() {
            Ok(prepared) => prepared,
            Err(errors) => return NavigationOutcome::Invalid { errors },
        };

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return NavigationOutcome::Busy;
        };
        self.begin_persistence();

        let request = SaveDraftPayload {
            step_id: step_id.clone(),
            values: payload,
        };
        if let Err(err) = self.api.save_draft(&request).await {
            error!(step_id = %step_id, error = %err, "failed to save intake draft before submit");
            return self.fail_submission();
        }

        let submitted = SubmitPayload {
            values: self.values.clone(),
        };
        let result = self.api.submit(&submitted).await;
        match result {
            Ok(status) if status.ok() => {
                self.active_step_index = 0;
                self.values.clear();
                self.submission_success = Some(message(self.language, "intake.banner.submitted"));
                self.revision += 1;
                debug!("intake submitted");
                NavigationOutcome::Submitted
            }
            Ok(status) => {
                error!(status = status.status, "intake submit rejected");
                self.fail_submission()
            }
            Err(err) => {
                error!(error = %err, "failed to submit intake");
                self.fail_submission()
            }
        }
    }

    pub fn render_active_step(&self) -> Vec<RenderNode> {
        let Some(step) = self.active_step() else {
            return Vec::new();
        };
        let errors = self.field_errors();
        let ctx = RenderContext::new(&self.values, &errors, self.language);
        render_components(&step.components, &ctx)
    }

    pub fn page(&self) -> PageView {
        PageView::build(self)
    }

    /// Validates the active step. On failure the errors are stored and returned.
    fn validated_step_payload(&mut self) -> Result<(String, FormValues), Vec<StepValidationError>> {
        let Some(step) = self.active_step() else {
            return Err(Vec::new());
        };
        let errors = validate_step(step, &self.values, self.language);
        if !errors.is_empty() {
            debug!(count = errors.len(), step_id = %step.step_id, "intake step invalid");
            self.step_errors = errors.clone();
            self.revision += 1;
            return Err(errors);
        }
        Ok((step.step_id.clone(), extract_step_values(step, &self.values)))
    }

    fn begin_persistence(&mut self) {
        self.step_errors.clear();
        self.clear_banners();
    }

    fn fail_submission(&mut self) -> NavigationOutcome {
        self.persist_error = Some(message(self.language, "intake.banner.submit_failed"));
        self.revision += 1;
        NavigationOutcome::Failed
    }

    fn clear_banners(&mut self) {
        self.persist_error = None;
        self.submission_success = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SubmitStatus;
    use crate::error::IntakeError;
    use async_trait::async_trait;
    use intake_spec::parse_intake_schema;
    use serde_json::json;

    struct NoopApi;

    #[async_trait]
    impl IntakeApi for NoopApi {
        async fn fetch_schema(&self) -> Result<Value, IntakeError> {
            Ok(Value::Null)
        }
        async fn fetch_draft(&self) -> Result<DraftResponse, IntakeError> {
            Ok(DraftResponse::default())
        }
        async fn save_draft(&self, _: &SaveDraftPayload) -> Result<DraftResponse, IntakeError> {
            Ok(DraftResponse::default())
        }
        async fn submit(&self, _: &SubmitPayload) -> Result<SubmitStatus, IntakeError> {
            Ok(SubmitStatus { status: 200 })
        }
    }

    fn session() -> IntakeSession<NoopApi> {
        let schema = parse_intake_schema(&json!({
            "steps": [
                { "stepId": "one", "components": [{ "type": "input", "name": "a" }] },
                { "stepId": "two" }
            ]
        }));
        IntakeSession::new(NoopApi, schema, Language::En, None)
    }

    #[tokio::test]
    async fn busy_flag_blocks_navigation() {
        let mut session = session();
        session.busy.store(true, Ordering::Release);
        assert_eq!(session.advance().await, NavigationOutcome::Busy);
        assert_eq!(session.submit().await, NavigationOutcome::Busy);
        assert_eq!(session.back(), NavigationOutcome::Busy);
        assert_eq!(session.active_step_index(), 0);
    }

    #[test]
    fn guard_releases_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::acquire(&flag).expect("free");
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
    }
}
