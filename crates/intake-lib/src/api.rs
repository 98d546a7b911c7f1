use std::sync::Arc;

use async_trait::async_trait;
use intake_spec::{FormValues, seed_values};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IntakeError;

/// Draft payload returned by the draft endpoints. Every field is optional because
/// backends have shipped several shapes over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Timestamp as the backend sent it (ISO string or epoch number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<Value>,
}

impl DraftResponse {
    /// Decodes a draft body. `null` means no draft was saved yet.
    pub fn from_json(raw: Value) -> Result<Self, serde_json::Error> {
        match raw {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    /// Answers to seed a session with: `stepData`, then `values`, then `data`.
    pub fn initial_values(&self) -> FormValues {
        seed_values([
            self.step_data.as_ref(),
            self.values.as_ref(),
            self.data.as_ref(),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftPayload {
    pub step_id: String,
    pub values: FormValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitPayload {
    pub values: FormValues,
}

/// HTTP status of a submission. Only the status is inspected, never the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitStatus {
    pub status: u16,
}

impl SubmitStatus {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Remote collaborator behind the intake flow.
#[async_trait]
pub trait IntakeApi: Send + Sync {
    /// Raw, unparsed schema document.
    async fn fetch_schema(&self) -> Result<Value, IntakeError>;
    async fn fetch_draft(&self) -> Result<DraftResponse, IntakeError>;
    async fn save_draft(&self, payload: &SaveDraftPayload) -> Result<DraftResponse, IntakeError>;
    /// Transport failures are errors; a non-success status is not.
    async fn submit(&self, payload: &SubmitPayload) -> Result<SubmitStatus, IntakeError>;
}

#[async_trait]
impl<T> IntakeApi for Arc<T>
where
    T: IntakeApi + ?Sized,
{
    async fn fetch_schema(&self) -> Result<Value, IntakeError> {
        (**self).fetch_schema().await
    }

    async fn fetch_draft(&self) -> Result<DraftResponse, IntakeError> {
        (**self).fetch_draft().await
    }

    async fn save_draft(&self, payload: &SaveDraftPayload) -> Result<DraftResponse, IntakeError> {
        (**self).save_draft(payload).await
    }

    async fn submit(&self, payload: &SubmitPayload) -> Result<SubmitStatus, IntakeError> {
        (**self).submit(payload).await
    }
}
