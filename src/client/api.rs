use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::{
    application::validators::WaitlistForm,
    infra::{InfraError, http_client::try_build_client},
};

const WAITLIST_PATH: &str = "api/waitlist";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response body is not JSON (status {status})")]
    InvalidBody { status: u16 },
}

/// Status and decoded JSON body of a submission response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-provided `message`, when present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }
}

/// Port for posting a validated form to the submission endpoint.
#[async_trait]
pub trait WaitlistApi: Send + Sync {
    async fn submit(&self, form: &WaitlistForm) -> Result<ApiResponse, ClientError>;
}

pub struct HttpWaitlistApi {
    client: Client,
    endpoint: Url,
}

impl HttpWaitlistApi {
    pub fn new(base_url: &Url) -> Result<Self, InfraError> {
        let endpoint = base_url
            .join(WAITLIST_PATH)
            .map_err(|_| InfraError::ConfigInvalid { var: "base_url" })?;
        Ok(Self {
            client: try_build_client().map_err(InfraError::HttpClient)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl WaitlistApi for HttpWaitlistApi {
    async fn submit(&self, form: &WaitlistForm) -> Result<ApiResponse, ClientError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidBody { status })?;

        Ok(ApiResponse { status, body })
    }
}
