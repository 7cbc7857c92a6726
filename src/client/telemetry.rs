use serde_json::Value;

pub const WAITLIST_SUCCESS: &str = "waitlist_success";
pub const WAITLIST_ERROR: &str = "waitlist_error";
pub const WAITLIST_REJECTED: &str = "waitlist_rejected";
pub const WAITLIST_INVALID: &str = "waitlist_invalid";

/// Product analytics sink for form outcomes.
pub trait Telemetry: Send + Sync {
    fn capture(&self, event: &str, properties: Value);
}

/// Emits every captured event as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn capture(&self, event: &str, properties: Value) {
        tracing::info!(event = event, properties = %properties, "Telemetry event");
    }
}
