use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use serde_json::{Value, json};

use super::{
    api::{ApiResponse, ClientError, WaitlistApi},
    messages::{Language, Messages},
    telemetry::{Telemetry, WAITLIST_ERROR, WAITLIST_INVALID, WAITLIST_REJECTED, WAITLIST_SUCCESS},
};
use crate::application::validators::{Field, FieldErrors, WaitlistForm, validate_waitlist_form};

/// How long the success state stays on screen before the modal closes.
pub const SUBMITTED_DWELL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Validating,
    Submitting,
    Submitted,
    Error,
}

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub company: String,
    pub position: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Company => &self.company,
            Field::Position => &self.position,
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Company => self.company = value,
            Field::Position => self.position = value,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "company": self.company,
            "position": self.position,
        })
    }
}

pub struct FormController {
    language: Language,
    telemetry: Arc<dyn Telemetry>,
    phase: Phase,
    values: FormValues,
    errors: BTreeMap<Field, String>,
    touched: BTreeSet<Field>,
    submit_error: Option<String>,
    submitted_at: Option<Instant>,
}

impl FormController {
    pub fn new(language: Language, telemetry: Arc<dyn Telemetry>) -> Self {
        Self {
            language,
            telemetry,
            phase: Phase::Editing,
            values: FormValues::default(),
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            submit_error: None,
            submitted_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    fn messages(&self) -> &'static Messages {
        self.language.messages()
    }

    /// Title and body shown while the success state dwells.
    pub fn success_notice(&self) -> Option<(&'static str, &'static str)> {
        let messages = self.messages();
        (self.phase == Phase::Submitted)
            .then_some((messages.success_title, messages.success_message))
    }

    /// Input is ignored on the success screen until the dwell resets the form.
    pub fn change(&mut self, field: Field, value: impl Into<String>) {
        if self.phase == Phase::Submitted {
            return;
        }
        self.values.set(field, value.into());
        self.errors.remove(&field);
        self.submit_error = None;
        if self.phase != Phase::Submitting {
            self.phase = Phase::Editing;
        }
    }

    /// Marks the field touched and shows its first rule violation, if any.
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        if let Err(errors) = validate_waitlist_form(&self.values.to_json()) {
            if let Some(message) = errors.first(field.as_str()) {
                let localized = self.messages().field_error(field, message);
                self.errors.insert(field, localized);
            }
        }
    }

    /// Errors are only shown once the user has left the field.
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if !self.touched.contains(&field) {
            return None;
        }
        self.errors.get(&field).map(String::as_str)
    }

    pub fn can_submit(&self) -> bool {
        !matches!(self.phase, Phase::Submitting | Phase::Submitted)
    }

    /// Runs the shared rules over every field. Returns the cleaned form when
    /// it may be sent; otherwise every field becomes touched and shows its
    /// first error.
    pub fn begin_submit(&mut self) -> Option<WaitlistForm> {
        if !self.can_submit() {
            return None;
        }
        self.submit_error = None;
        self.phase = Phase::Validating;

        match validate_waitlist_form(&self.values.to_json()) {
            Ok(form) => {
                self.phase = Phase::Submitting;
                Some(form)
            }
            Err(errors) => {
                self.telemetry.capture(
                    WAITLIST_INVALID,
                    json!({ "fields": errors.fields().collect::<Vec<_>>() }),
                );
                self.show_field_errors(&errors, true);
                self.phase = Phase::Editing;
                None
            }
        }
    }

    /// Validate, post through `api`, then apply the outcome.
    pub async fn submit(&mut self, api: &dyn WaitlistApi) {
        let Some(form) = self.begin_submit() else {
            return;
        };
        let result = api.submit(&form).await;
        self.apply_response(result, Instant::now());
    }

    pub fn apply_response(&mut self, result: Result<ApiResponse, ClientError>, now: Instant) {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.telemetry
                    .capture(WAITLIST_ERROR, json!({ "error": err.to_string() }));
                self.fail(self.messages().submit_error.to_string());
                return;
            }
        };

        if response.is_success() {
            self.telemetry
                .capture(WAITLIST_SUCCESS, json!({ "email": self.values.email }));
            self.phase = Phase::Submitted;
            self.submitted_at = Some(now);
            return;
        }

        self.telemetry
            .capture(WAITLIST_REJECTED, json!({ "status": response.status }));

        let messages = self.messages();
        let server_errors = response
            .body
            .get("errors")
            .filter(|_| response.status == 400)
            .and_then(|errors| serde_json::from_value::<FieldErrors>(errors.clone()).ok());

        match (response.status, server_errors) {
            (400, Some(errors)) => {
                self.errors.clear();
                if self.show_field_errors(&errors, false) {
                    self.phase = Phase::Error;
                } else {
                    let message = response.message().unwrap_or(messages.submit_error);
                    self.fail(message.to_string());
                }
            }
            (409, _) => {
                let message = response.message().unwrap_or(messages.duplicate_email);
                self.fail(message.to_string());
            }
            (429, _) => {
                let message = response.message().unwrap_or(messages.rate_limited);
                self.fail(message.to_string());
            }
            _ => {
                let message = response.message().unwrap_or(messages.submit_error);
                self.fail(message.to_string());
            }
        }
    }

    /// After the success dwell has elapsed the form is cleared and `true` is
    /// returned to signal that the modal should close.
    pub fn poll_dwell(&mut self, now: Instant) -> bool {
        match (self.phase, self.submitted_at) {
            (Phase::Submitted, Some(at)) if now.saturating_duration_since(at) >= SUBMITTED_DWELL => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = Phase::Editing;
        self.values = FormValues::default();
        self.errors.clear();
        self.touched.clear();
        self.submit_error = None;
        self.submitted_at = None;
    }

    fn fail(&mut self, message: String) {
        self.submit_error = Some(message);
        self.phase = Phase::Error;
    }

    /// Server errors are shown verbatim; local ones are localized.
    /// Returns whether any known field received an error.
    fn show_field_errors(&mut self, errors: &FieldErrors, localize: bool) -> bool {
        let messages = self.messages();
        let mut shown = false;
        for field in Field::ALL {
            if let Some(message) = errors.first(field.as_str()) {
                let message = if localize {
                    messages.field_error(field, message)
                } else {
                    message.to_string()
                };
                self.errors.insert(field, message);
                shown = true;
            }
            self.touched.insert(field);
        }
        shown
    }
}
