use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    infra::{InfraError, http_client::try_build_client},
    use_cases::conversion::{ConversionLead, ConversionSink},
};

const EVENTS_PATH: &str = "platform/events";

/// RD Station Marketing client for conversion events.
#[derive(Clone)]
pub struct RdStationClient {
    client: Client,
    api_url: Url,
    access_token: Option<SecretString>,
    conversion_identifier: String,
}

impl RdStationClient {
    pub fn new(
        api_url: Url,
        access_token: Option<SecretString>,
        conversion_identifier: String,
    ) -> Result<Self, InfraError> {
        Ok(Self {
            client: try_build_client().map_err(InfraError::HttpClient)?,
            api_url,
            access_token,
            conversion_identifier,
        })
    }

    fn events_url(&self) -> AppResult<Url> {
        let mut url = self
            .api_url
            .join(EVENTS_PATH)
            .map_err(|e| AppError::Internal(format!("Invalid RD Station URL: {e}")))?;
        url.query_pairs_mut().append_pair("event_type", "conversion");
        Ok(url)
    }
}

// ============================================================================
// RD Station Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConversionEventRequest<'a> {
    pub event_type: &'static str,
    pub event_family: &'static str,
    pub payload: ConversionPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct ConversionPayload<'a> {
    pub conversion_identifier: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_phone: Option<&'a str>,
}

impl<'a> ConversionEventRequest<'a> {
    pub fn new(conversion_identifier: &'a str, lead: &'a ConversionLead) -> Self {
        Self {
            event_type: "CONVERSION",
            event_family: "CDP",
            payload: ConversionPayload {
                conversion_identifier,
                email: &lead.email,
                name: lead.name.as_deref(),
                personal_phone: lead.phone.as_deref(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConversionEventResponse {
    event_uuid: String,
}

#[async_trait]
impl ConversionSink for RdStationClient {
    fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    async fn send_conversion(&self, lead: &ConversionLead) -> AppResult<String> {
        let token = self.access_token.as_ref().ok_or_else(|| {
            AppError::Configuration("RDSTATION_ACCESS_TOKEN is not set".into())
        })?;

        let response = self
            .client
            .post(self.events_url()?)
            .bearer_auth(token.expose_secret())
            .json(&ConversionEventRequest::new(&self.conversion_identifier, lead))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("RD Station request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read RD Station response: {e}")))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "RD Station API error");
            let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ConversionEventResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse RD Station response");
            AppError::Internal(format!("Failed to parse RD Station response: {e}"))
        })?;

        Ok(parsed.event_uuid)
    }
}
