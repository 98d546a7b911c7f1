use intake_spec::{Language, RenderNode, StepValidationError, message, message_with, resolve_text};
use schemars::JsonSchema;
use serde::Serialize;

use crate::api::IntakeApi;
use crate::session::IntakeSession;

/// Everything a host needs to draw the active page of an intake session.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PageView {
    pub title: String,
    pub language: Language,
    /// Present only when the workflow has steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    pub steps: Vec<StepLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<ErrorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_banner: Option<Banner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_banner: Option<Banner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back: Option<Button>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<Button>,
    /// Warning shown instead of a step when the workflow is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_workflow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StepLink {
    pub step_id: String,
    pub title: String,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ErrorSummary {
    pub title: String,
    pub errors: Vec<StepValidationError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Banner {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StepView {
    pub step_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<RenderNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
}

impl PageView {
    pub(crate) fn build<A: IntakeApi>(session: &IntakeSession<A>) -> Self {
        let language = session.language();
        let schema = session.schema();
        let busy = session.is_busy();

        let title = if schema.title.is_empty() {
            message(language, "intake.page.default_title")
        } else {
            schema.title.clone()
        };

        let Some(active) = session.active_step() else {
            return Self {
                title,
                language,
                progress: None,
                steps: Vec::new(),
                error_summary: None,
                persist_banner: None,
                success_banner: None,
                step: None,
                back: None,
                primary: None,
                empty_workflow: Some(message(language, "intake.page.no_steps")),
            };
        };

        let total = schema.steps.len();
        let index = session.active_step_index().min(total - 1);
        let step_title = |step: &intake_spec::IntakeStep| {
            let title = resolve_text(step.title.as_ref(), language);
            if title.is_empty() {
                step.step_id.clone()
            } else {
                title
            }
        };

        let steps = schema
            .steps
            .iter()
            .enumerate()
            .map(|(position, step)| StepLink {
                step_id: step.step_id.clone(),
                title: step_title(step),
                current: position == index,
            })
            .collect();

        let nodes = session.render_active_step();
        let empty_notice = active
            .components
            .is_empty()
            .then(|| message(language, "intake.page.no_components"));
        let description = resolve_text(active.description.as_ref(), language);

        let on_last = index + 1 >= total;
        let primary_key = match (on_last, busy) {
            (false, false) => "intake.page.continue",
            (false, true) => "intake.page.saving",
            (true, false) => "intake.page.submit",
            (true, true) => "intake.page.submitting",
        };

        Self {
            title,
            language,
            progress: Some(message_with(
                language,
                "intake.page.progress",
                &[
                    ("current", &(index + 1).to_string()),
                    ("total", &total.to_string()),
                ],
            )),
            steps,
            error_summary: (!session.step_errors().is_empty()).then(|| ErrorSummary {
                title: message(language, "intake.page.error_summary"),
                errors: session.step_errors().to_vec(),
            }),
            persist_banner: session.persist_error().map(|text| Banner {
                title: message(language, "intake.page.persist_title"),
                message: text.to_string(),
            }),
            success_banner: session.submission_success().map(|text| Banner {
                title: message(language, "intake.page.success_title"),
                message: text.to_string(),
            }),
            step: Some(StepView {
                step_id: active.step_id.clone(),
                title: step_title(active),
                description: (!description.is_empty()).then_some(description),
                nodes,
                empty_notice,
            }),
            back: (index > 0).then(|| Button {
                label: message(language, "intake.page.back"),
                disabled: busy,
            }),
            primary: Some(Button {
                label: message(language, primary_key),
                disabled: busy,
            }),
            empty_workflow: None,
        }
    }
}
