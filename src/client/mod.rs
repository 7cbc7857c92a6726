//! Client-side controller for the waitlist modal.
//!
//! Drives the form through editing, validation, submission and the short
//! success dwell, using the same field rules as the server.

pub mod api;
pub mod form;
pub mod messages;
pub mod telemetry;

pub use api::{ApiResponse, ClientError, HttpWaitlistApi, WaitlistApi};
pub use form::{FormController, FormValues, Phase, SUBMITTED_DWELL};
pub use messages::{Language, Messages};
pub use telemetry::{Telemetry, TracingTelemetry};
