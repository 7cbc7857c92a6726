//! Field rules for the waitlist form.
//!
//! The same functions run on the server (authoritative check) and in the
//! client form controller (inline feedback), so both sides accept and reject
//! exactly the same inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 255;
pub const COMPANY_MAX_LEN: usize = 100;
pub const POSITION_MAX_LEN: usize = 100;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Company,
    Position,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Company, Field::Position];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Company => "company",
            Field::Position => "position",
        }
    }
}

/// Field name -> human-readable messages, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A waitlist submission that passed every rule; strings are trimmed and the
/// email is lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub position: String,
}

/// Run the waitlist rules over an untyped JSON body.
pub fn validate_waitlist_form(input: &Value) -> Result<WaitlistForm, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = required_string(input, Field::Name, "Name is required", &mut errors);
    if let Some(name) = &name {
        let len = name.chars().count();
        if len < NAME_MIN_LEN {
            errors.add("name", "Name must be at least 2 characters");
        }
        if len > NAME_MAX_LEN {
            errors.add("name", "Name must be at most 100 characters");
        }
    }

    let email = required_string(input, Field::Email, "Email is required", &mut errors)
        .map(|e| e.to_lowercase());
    if let Some(email) = &email {
        if !is_valid_email(email) {
            errors.add("email", "Invalid email");
        }
        if email.is_empty() {
            errors.add("email", "Email must not be empty");
        }
        if email.chars().count() > EMAIL_MAX_LEN {
            errors.add("email", "Email is too long");
        }
    }

    let company = required_string(input, Field::Company, "Company is required", &mut errors);
    if let Some(company) = &company {
        if company.is_empty() {
            errors.add("company", "Company name must not be empty");
        }
        if company.chars().count() > COMPANY_MAX_LEN {
            errors.add("company", "Company name must be at most 100 characters");
        }
    }

    let position = required_string(input, Field::Position, "Position is required", &mut errors);
    if let Some(position) = &position {
        if position.is_empty() {
            errors.add("position", "Position must not be empty");
        }
        if position.chars().count() > POSITION_MAX_LEN {
            errors.add("position", "Position must be at most 100 characters");
        }
    }

    match (name, email, company, position) {
        (Some(name), Some(email), Some(company), Some(position)) if errors.is_empty() => {
            Ok(WaitlistForm {
                name,
                email,
                company,
                position,
            })
        }
        _ => Err(errors),
    }
}

/// Trimmed string value of `field`, or a "required" error when it is absent
/// or not a string.
fn required_string(
    input: &Value,
    field: Field,
    required_message: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match input.get(field.as_str()) {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => {
            errors.add(field.as_str(), required_message);
            None
        }
    }
}
