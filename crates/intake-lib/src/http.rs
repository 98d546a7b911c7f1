use async_trait::async_trait;
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::api::{DraftResponse, IntakeApi, SaveDraftPayload, SubmitPayload, SubmitStatus};
use crate::error::{IntakeError, Stage};

pub const DEFAULT_SCHEMA_PATH: &str = "/api/intake/schema";
pub const DEFAULT_DRAFT_PATH: &str = "/api/intake/draft";
pub const DEFAULT_SUBMIT_PATH: &str = "/api/intake/submit";

/// Endpoint paths, resolved against the client's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub schema: String,
    /// Used for both draft fetch (GET) and draft save (POST).
    pub draft: String,
    pub submit: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA_PATH.into(),
            draft: DEFAULT_DRAFT_PATH.into(),
            submit: DEFAULT_SUBMIT_PATH.into(),
        }
    }
}

/// [`IntakeApi`] over the intake REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpIntakeApi {
    client: reqwest::Client,
    base_url: Url,
    endpoints: ApiEndpoints,
}

impl HttpIntakeApi {
    pub fn new(base_url: &str) -> Result<Self, IntakeError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            endpoints: ApiEndpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Reuses a preconfigured client, e.g. one carrying session cookies.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, IntakeError> {
        let url = self.base_url.join(path)?;
        debug!(%method, %url, "intake request");
        Ok(self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json"))
    }

    fn decode_draft(&self, stage: Stage, raw: Value) -> Result<DraftResponse, IntakeError> {
        DraftResponse::from_json(raw).map_err(|source| IntakeError::Decode {
            stage,
            path: self.endpoints.draft.clone(),
            source,
        })
    }

    async fn request_json<T, B>(
        &self,
        stage: Stage,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, IntakeError>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| IntakeError::Transport {
            stage,
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntakeError::Status {
                stage,
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(T::default());
        }

        let bytes = response.bytes().await.map_err(|source| IntakeError::Transport {
            stage,
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| IntakeError::Decode {
            stage,
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl IntakeApi for HttpIntakeApi {
    async fn fetch_schema(&self) -> Result<Value, IntakeError> {
        self.request_json::<Value, Value>(Stage::FetchSchema, Method::GET, &self.endpoints.schema, None)
            .await
    }

    async fn fetch_draft(&self) -> Result<DraftResponse, IntakeError> {
        let raw = self
            .request_json::<Value, Value>(Stage::FetchDraft, Method::GET, &self.endpoints.draft, None)
            .await?;
        self.decode_draft(Stage::FetchDraft, raw)
    }

    async fn save_draft(&self, payload: &SaveDraftPayload) -> Result<DraftResponse, IntakeError> {
        let raw = self
            .request_json::<Value, _>(
                Stage::SaveDraft,
                Method::POST,
                &self.endpoints.draft,
                Some(payload),
            )
            .await?;
        self.decode_draft(Stage::SaveDraft, raw)
    }

    async fn submit(&self, payload: &SubmitPayload) -> Result<SubmitStatus, IntakeError> {
        let path = &self.endpoints.submit;
        let response = self
            .request(Method::POST, path)?
            .json(payload)
            .send()
            .await
            .map_err(|source| IntakeError::Transport {
                stage: Stage::Submit,
                path: path.clone(),
                source,
            })?;
        let status = response.status().as_u16();
        debug!(status, "intake submit answered");
        Ok(SubmitStatus { status })
    }
}
