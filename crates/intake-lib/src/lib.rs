pub mod api;
pub mod error;
pub mod http;
pub mod runner;
pub mod session;
pub mod view;

pub use api::{DraftResponse, IntakeApi, SaveDraftPayload, SubmitPayload, SubmitStatus};
pub use error::{IntakeError, Stage};
pub use http::{ApiEndpoints, HttpIntakeApi};
pub use runner::IntakeRunner;
pub use session::{BusyHandle, IntakeSession, NavigationOutcome};
pub use view::{Banner, Button, ErrorSummary, PageView, StepLink, StepView};

pub use intake_spec;
