use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{FieldErrors, is_valid_email},
};

/// A lead forwarded to the marketing-automation CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionLead {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Port for the external CRM that records conversion events.
#[async_trait]
pub trait ConversionSink: Send + Sync {
    /// Whether credentials for the CRM are present.
    fn is_configured(&self) -> bool;

    /// Send one conversion event and return the upstream event identifier.
    async fn send_conversion(&self, lead: &ConversionLead) -> AppResult<String>;
}

/// Check `{email, name?, phone?}`. Optional fields, when present, must be
/// non-empty strings.
pub fn validate_conversion_lead(input: &Value) -> Result<ConversionLead, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = match input.get("email") {
        Some(Value::String(email)) => {
            if !is_valid_email(email) {
                errors.add("email", "Invalid email");
            }
            if email.is_empty() {
                errors.add("email", "Email must not be empty");
            }
            Some(email.clone())
        }
        _ => {
            errors.add("email", "Email must be a string");
            None
        }
    };

    let name = optional_non_empty(input, "name", "Name", &mut errors);
    let phone = optional_non_empty(input, "phone", "Phone", &mut errors);

    match email {
        Some(email) if errors.is_empty() => Ok(ConversionLead { email, name, phone }),
        _ => Err(errors),
    }
}

fn optional_non_empty(
    input: &Value,
    field: &str,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match input.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => {
            errors.add(field, format!("{label} must not be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.add(field, format!("{label} must be a string"));
            None
        }
    }
}

#[derive(Clone)]
pub struct ConversionUseCases {
    sink: Arc<dyn ConversionSink>,
}

impl ConversionUseCases {
    pub fn new(sink: Arc<dyn ConversionSink>) -> Self {
        Self { sink }
    }

    /// Configuration check, body parsing, validation, then the upstream call.
    pub async fn forward(&self, body: &[u8]) -> AppResult<String> {
        if !self.sink.is_configured() {
            tracing::error!("RD Station is not configured (RDSTATION_ACCESS_TOKEN missing)");
            return Err(AppError::Configuration(
                "RDSTATION_ACCESS_TOKEN is not set".into(),
            ));
        }

        let raw: Value = serde_json::from_slice(body).map_err(|_| AppError::MalformedRequest)?;
        let lead = validate_conversion_lead(&raw).map_err(AppError::Validation)?;

        let event_uuid = self.sink.send_conversion(&lead).await?;
        tracing::info!(event_uuid = %event_uuid, "Conversion forwarded to RD Station");
        Ok(event_uuid)
    }
}
