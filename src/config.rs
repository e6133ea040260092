//! Webhook endpoint and timeout configuration.
//!
//! The four backend webhooks are collaborators whose availability the
//! console must tolerate losing at any time, so their locations are plain
//! configuration rather than compile-time constants. The defaults point at
//! the demo deployment.

use std::time::Duration;

/// Configuration for the console's webhook calls.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Scenario metrics webhook (Analysis screen).
    pub metrics_url: String,

    /// Webhook returning the existing field mapping for a scenario.
    pub mapping_url: String,

    /// Webhook returning the raw-file headers discovered for a scenario.
    pub headers_url: String,

    /// Webhook that publishes the full mapping to the backend workflow.
    pub save_url: String,

    /// Per-request timeout. An in-flight call is aborted when it elapses.
    /// Default: 90 seconds (the metrics webhook runs a full optimization
    /// pass before answering).
    pub request_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            metrics_url: "https://wbdemo.shipsy.io/webhook/RPO".to_string(),
            mapping_url: "https://wbdemo.shipsy.io/webhook/get-scenario-mapping".to_string(),
            headers_url: "https://wbdemo.shipsy.io/webhook/get-scenario-raw-file-headers"
                .to_string(),
            save_url: "https://wbdemo.shipsy.io/webhook/save-mappings".to_string(),
            request_timeout: Duration::from_secs(90),
        }
    }
}
