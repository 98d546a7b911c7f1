use intake_spec::{Language, parse_intake_schema};
use tracing::{debug, error};

use crate::api::IntakeApi;
use crate::error::IntakeError;
use crate::session::IntakeSession;

/// Boots a session from the remote schema and draft.
pub struct IntakeRunner;

impl IntakeRunner {
    /// Fetches the schema and the draft concurrently and seeds a new session.
    ///
    /// Either failure aborts the load; the error's user message is the static
    /// load-failure text.
    pub async fn load<A: IntakeApi>(api: A, language: Language) -> Result<IntakeSession<A>, IntakeError> {
        let (raw_schema, draft) =
            match tokio::try_join!(api.fetch_schema(), api.fetch_draft()) {
                Ok(loaded) => loaded,
                Err(err) => {
                    error!(error = %err, "failed to load intake form");
                    return Err(err);
                }
            };

        let schema = parse_intake_schema(&raw_schema);
        debug!(
            version = %schema.version,
            steps = schema.steps.len(),
            "intake schema loaded"
        );
        Ok(IntakeSession::new(api, schema, language, Some(&draft)))
    }
}
