//! Mapping load/save against the backend webhooks.
//!
//! [`MappingStore`] owns the Mapping screen's state: the two editable
//! internal associations, the discovered raw-file header sets, and the
//! simulated-mode flag. Loading issues the mapping and headers requests
//! concurrently; a failure in **either** call degrades the whole load to
//! fixed mock data flagged as simulated; partial success is treated as
//! total failure by policy (see the partial-failure test). Saving converts
//! both associations back to the wire shape and transmits the full
//! association in one request; there is no incremental sync.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::events::{EventLog, Severity};
use crate::mapping::{
    self, to_external, to_internal, EntityKind, ExternalMapping, InternalMapping,
};

/// Delay before a simulated save reports success. Models "save is a no-op
/// when there is nothing real to save" without completing instantly.
const SIMULATED_SAVE_DELAY: Duration = Duration::from_millis(800);

// ============================================================================
// Wire Types
// ============================================================================

/// Response of the get-mapping webhook. Both associations arrive in
/// external shape (raw header -> system field).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub scenario_name: Option<String>,
    #[serde(default)]
    pub vehicle_mapping: ExternalMapping,
    #[serde(default)]
    pub consignment_mapping: ExternalMapping,
}

/// One element of the get-headers response list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderFileGroup {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub files: RawFileHeaders,
}

/// Header sets discovered in the uploaded raw files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFileHeaders {
    #[serde(default)]
    pub consignments: HeaderList,
    #[serde(default)]
    pub vehicles: HeaderList,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderList {
    #[serde(default)]
    pub headers: Vec<String>,
}

/// Body of the save-mappings webhook: the full association for both
/// entities, in external shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMappingRequest {
    pub scenario_name: String,
    pub vehicle_mapping: ExternalMapping,
    pub consignment_mapping: ExternalMapping,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Transmitted to the live backend workflow.
    Published,
    /// Simulated mode: no network call was made.
    Simulated,
}

// ============================================================================
// Transport
// ============================================================================

/// Raw exchanges with the three mapping webhooks. A trait seam so tests
/// can force either paired call to fail deterministically.
pub trait MappingTransport: Send + Sync {
    /// POST `{"scenario_name": ...}` to the get-mapping webhook.
    fn request_mapping(
        &self,
        scenario: &str,
    ) -> impl Future<Output = Result<MappingResponse>> + Send;

    /// POST to the get-headers webhook.
    fn request_headers(
        &self,
        scenario: &str,
    ) -> impl Future<Output = Result<Vec<HeaderFileGroup>>> + Send;

    /// POST the full association to the save-mappings webhook.
    fn push_mappings(
        &self,
        request: &SaveMappingRequest,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Production transport over reqwest.
pub struct HttpMappingTransport {
    client: reqwest::Client,
    mapping_url: String,
    headers_url: String,
    save_url: String,
}

impl HttpMappingTransport {
    /// Build the HTTP transport from configuration.
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConsoleError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            mapping_url: config.mapping_url.clone(),
            headers_url: config.headers_url.clone(),
            save_url: config.save_url.clone(),
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConsoleError::Network {
                message: e.to_string(),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Network {
                message: format!("HTTP {}", status.as_u16()),
                status_code: Some(status.as_u16()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ConsoleError::MalformedResponse {
                message: e.to_string(),
            })
    }
}

impl MappingTransport for HttpMappingTransport {
    async fn request_mapping(&self, scenario: &str) -> Result<MappingResponse> {
        self.post_json(&self.mapping_url, json!({ "scenario_name": scenario }))
            .await
    }

    async fn request_headers(&self, scenario: &str) -> Result<Vec<HeaderFileGroup>> {
        // "sceanrio_name" is what the deployed webhook actually reads; the
        // misspelling is load-bearing and must not be corrected until the
        // backend's key changes.
        self.post_json(&self.headers_url, json!({ "sceanrio_name": scenario }))
            .await
    }

    async fn push_mappings(&self, request: &SaveMappingRequest) -> Result<()> {
        let response = self
            .client
            .post(&self.save_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ConsoleError::Network {
                message: e.to_string(),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Network {
                message: format!("HTTP {}", status.as_u16()),
                status_code: Some(status.as_u16()),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Mock Fallback
// ============================================================================

fn mock_vehicle_mapping() -> InternalMapping {
    [
        ("worker_code", "Vehicle ID"),
        ("weight", "Vehicle Max Weight"),
    ]
    .into_iter()
    .map(|(f, h)| (f.to_string(), h.to_string()))
    .collect()
}

fn mock_consignment_mapping() -> InternalMapping {
    [
        ("reference_number", "Order Ref"),
        ("destination_details_address_line_1", "Target Address"),
    ]
    .into_iter()
    .map(|(f, h)| (f.to_string(), h.to_string()))
    .collect()
}

fn mock_vehicle_headers() -> Vec<String> {
    [
        "Vehicle ID",
        "Vehicle Max Weight",
        "Driver Name",
        "volume",
        "delivery_time_start",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn mock_consignment_headers() -> Vec<String> {
    ["Order Ref", "Target Address", "pincode", "city", "service_time"]
        .into_iter()
        .map(String::from)
        .collect()
}

// ============================================================================
// Store
// ============================================================================

/// State container for the Mapping screen.
pub struct MappingStore<T: MappingTransport> {
    transport: T,
    events: Arc<EventLog>,

    scenario_name: String,
    vehicle_mapping: InternalMapping,
    consignment_mapping: InternalMapping,
    vehicle_headers: Vec<String>,
    consignment_headers: Vec<String>,
    simulated: bool,
    loaded: bool,
}

impl<T: MappingTransport> MappingStore<T> {
    /// Create a store over the given transport, logging to `events`.
    pub fn new(transport: T, events: Arc<EventLog>) -> Self {
        Self {
            transport,
            events,
            scenario_name: String::new(),
            vehicle_mapping: InternalMapping::new(),
            consignment_mapping: InternalMapping::new(),
            vehicle_headers: Vec::new(),
            consignment_headers: Vec::new(),
            simulated: false,
            loaded: false,
        }
    }

    /// Load the existing association and the discovered raw-file headers
    /// for a scenario.
    ///
    /// The two requests run concurrently and both run to completion. If
    /// either fails, the whole load falls back to the fixed mock
    /// association and header sets and the store enters simulated mode,
    /// never a mixed real/mock result.
    pub async fn load(&mut self, scenario: &str) {
        self.scenario_name = scenario.to_string();
        self.loaded = true;
        self.simulated = false;

        let (mapping_res, headers_res) = tokio::join!(
            self.transport.request_mapping(scenario),
            self.transport.request_headers(scenario),
        );

        let failure = match (mapping_res, headers_res) {
            (Ok(mapping), Ok(header_groups)) => {
                self.vehicle_mapping = to_internal(&mapping.vehicle_mapping);
                self.consignment_mapping = to_internal(&mapping.consignment_mapping);

                let files = header_groups.into_iter().next().map(|group| group.files);
                self.vehicle_headers = files
                    .as_ref()
                    .map(|f| f.vehicles.headers.clone())
                    .unwrap_or_default();
                self.consignment_headers = files
                    .map(|f| f.consignments.headers)
                    .unwrap_or_default();

                self.events.record(
                    Severity::Success,
                    format!("Loaded mapping configuration for '{}'", scenario),
                );
                return;
            }
            (Err(err), _) => ConsoleError::PartialLoad {
                failed_call: "get-scenario-mapping".to_string(),
                message: err.to_string(),
            },
            (Ok(_), Err(err)) => ConsoleError::PartialLoad {
                failed_call: "get-scenario-raw-file-headers".to_string(),
                message: err.to_string(),
            },
        };

        self.events.record(
            Severity::Warning,
            format!("{}. Entering simulation mode.", failure),
        );
        self.vehicle_mapping = mock_vehicle_mapping();
        self.consignment_mapping = mock_consignment_mapping();
        self.vehicle_headers = mock_vehicle_headers();
        self.consignment_headers = mock_consignment_headers();
        self.simulated = true;
    }

    /// Publish the full current association for both entities.
    ///
    /// In simulated mode no network call is made: the store waits a fixed
    /// short delay and reports simulated success. Against a live backend a
    /// rejected save is the one mapping error that surfaces to the caller.
    pub async fn save(&mut self) -> Result<SaveStatus> {
        if !self.loaded {
            return Err(ConsoleError::SaveFailed {
                message: "no scenario loaded".to_string(),
            });
        }

        if self.simulated {
            tokio::time::sleep(SIMULATED_SAVE_DELAY).await;
            self.events
                .record(Severity::Success, "Configuration saved (simulated)");
            return Ok(SaveStatus::Simulated);
        }

        let request = SaveMappingRequest {
            scenario_name: self.scenario_name.clone(),
            vehicle_mapping: to_external(&self.vehicle_mapping),
            consignment_mapping: to_external(&self.consignment_mapping),
        };

        match self.transport.push_mappings(&request).await {
            Ok(()) => {
                self.events.record(
                    Severity::Success,
                    format!(
                        "Mappings for '{}' published to the backend workflow",
                        self.scenario_name
                    ),
                );
                Ok(SaveStatus::Published)
            }
            Err(err) => {
                let failure = ConsoleError::SaveFailed {
                    message: err.to_string(),
                };
                self.events.record(Severity::Error, failure.to_string());
                Err(failure)
            }
        }
    }

    // ------------------------------------------------------------------
    // Editor surface
    // ------------------------------------------------------------------

    /// The editable association for an entity.
    pub fn mapping(&self, kind: EntityKind) -> &InternalMapping {
        match kind {
            EntityKind::Vehicle => &self.vehicle_mapping,
            EntityKind::Consignment => &self.consignment_mapping,
        }
    }

    fn mapping_mut(&mut self, kind: EntityKind) -> &mut InternalMapping {
        match kind {
            EntityKind::Vehicle => &mut self.vehicle_mapping,
            EntityKind::Consignment => &mut self.consignment_mapping,
        }
    }

    /// The discovered raw-file headers for an entity.
    pub fn headers(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Vehicle => &self.vehicle_headers,
            EntityKind::Consignment => &self.consignment_headers,
        }
    }

    /// Upsert one association row. See [`mapping::set_header`].
    pub fn set_header(&mut self, kind: EntityKind, field: &str, header: &str) {
        mapping::set_header(self.mapping_mut(kind), field, header);
    }

    /// Remove one association row. See [`mapping::remove_field`].
    pub fn remove_field(&mut self, kind: EntityKind, field: &str) -> bool {
        mapping::remove_field(self.mapping_mut(kind), field)
    }

    /// Add a new association row. See [`mapping::add_new`].
    pub fn add_new(&mut self, kind: EntityKind, field: &str, header: &str) -> Result<()> {
        let vocabulary = kind.vocabulary();
        mapping::add_new(self.mapping_mut(kind), vocabulary, field, header)
    }

    /// Vocabulary fields not yet mapped for an entity.
    pub fn available_fields(&self, kind: EntityKind) -> Vec<&'static str> {
        mapping::available_fields(self.mapping(kind), kind.vocabulary())
    }

    /// Mapped headers absent from the discovered header set, for UI
    /// flagging.
    pub fn headers_missing_from_file(&self, kind: EntityKind) -> Vec<String> {
        mapping::headers_missing_from_file(self.mapping(kind), self.headers(kind))
    }

    /// Whether the current data originates from fallback values.
    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }
}
