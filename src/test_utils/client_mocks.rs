//! Stubs for the client-side ports used by the form controller.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    application::validators::WaitlistForm,
    client::{
        api::{ApiResponse, ClientError, WaitlistApi},
        telemetry::Telemetry,
    },
};

/// Answers every submission with a canned response.
pub struct StubWaitlistApi {
    response: Option<ApiResponse>,
    submitted: Mutex<Vec<WaitlistForm>>,
}

impl StubWaitlistApi {
    pub fn responding(status: u16, body: Value) -> Self {
        Self {
            response: Some(ApiResponse { status, body }),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Every submission fails before a JSON body could be read.
    pub fn failing() -> Self {
        Self {
            response: None,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn submitted(&self) -> Vec<WaitlistForm> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl WaitlistApi for StubWaitlistApi {
    async fn submit(&self, form: &WaitlistForm) -> Result<ApiResponse, ClientError> {
        self.submitted.lock().unwrap().push(form.clone());
        self.response
            .clone()
            .ok_or(ClientError::InvalidBody { status: 502 })
    }
}

/// Keeps every captured event for assertions.
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn capture(&self, event: &str, properties: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), properties));
    }
}
