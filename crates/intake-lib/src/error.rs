use std::fmt;

use intake_spec::{Language, message};
use thiserror::Error;

/// Remote call an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchSchema,
    FetchDraft,
    SaveDraft,
    Submit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::FetchSchema => "schema fetch",
            Stage::FetchDraft => "draft fetch",
            Stage::SaveDraft => "draft save",
            Stage::Submit => "submit",
        })
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{stage} request to {path} failed: {source}")]
    Transport {
        stage: Stage,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{stage} request to {path} failed with status {status}")]
    Status {
        stage: Stage,
        path: String,
        status: u16,
    },
    #[error("{stage} response from {path} is not valid JSON: {source}")]
    Decode {
        stage: Stage,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid intake endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("{stage} failed: {message}")]
    Unavailable { stage: Stage, message: String },
}

impl IntakeError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            IntakeError::Transport { stage, .. }
            | IntakeError::Status { stage, .. }
            | IntakeError::Decode { stage, .. }
            | IntakeError::Unavailable { stage, .. } => Some(*stage),
            IntakeError::Url(_) => None,
        }
    }

    /// Static, non-technical text shown to the applicant. Raw detail stays in the log.
    pub fn user_message(&self, language: Language) -> String {
        let key = match self.stage() {
            Some(Stage::SaveDraft) => "intake.banner.save_failed",
            Some(Stage::Submit) => "intake.banner.submit_failed",
            Some(Stage::FetchSchema) | Some(Stage::FetchDraft) | None => {
                "intake.banner.load_failed"
            }
        };
        message(language, key)
    }
}
