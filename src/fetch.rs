//! Scenario metrics fetching with fallback.
//!
//! One POST per scenario identifier against the metrics webhook, issued
//! concurrently and joined when all complete. Every failure path (network
//! error, elapsed timeout, non-2xx status, unparseable body, or an explicit
//! `success: false` from the backend) resolves to a record built from a
//! fixed fallback payload and flagged `is_mock`, so a dead backend degrades
//! the screen instead of blanking it.
//!
//! The remote exchange sits behind [`ScenarioTransport`] so tests can force
//! failures deterministically; [`HttpScenarioTransport`] is the production
//! implementation.

use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use serde_json::{json, Value};

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::events::{EventLog, Severity};
use crate::scenario::{
    normalize, AnalysisMetrics, ConsignmentStopMetrics, ProductValueMetrics, ScenarioPayload,
    ScenarioRecord, ScenarioSummary, TripMetrics, UtilisationMetrics, VehicleMetrics,
};

/// Raw exchange with the metrics webhook.
///
/// Implementations return the response body text on HTTP success and a
/// [`ConsoleError`] on connection failure, timeout, or non-2xx status.
/// Parsing and payload validation stay in [`ScenarioFetcher`] so the whole
/// failure taxonomy is exercised against stub transports.
pub trait ScenarioTransport: Send + Sync {
    /// POST `{"request_id": ...}` and return the body text.
    fn request_metrics(
        &self,
        request_id: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Production transport: reqwest client with a pooled connection and a
/// client-level timeout that aborts in-flight calls when it elapses.
pub struct HttpScenarioTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpScenarioTransport {
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
            url: config.metrics_url.clone(),
        })
    }
}

impl ScenarioTransport for HttpScenarioTransport {
    async fn request_metrics(&self, request_id: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "request_id": request_id }))
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

        response.text().await.map_err(|e| ConsoleError::Network {
            message: e.to_string(),
            status_code: None,
        })
    }
}

/// Fixed fallback payload, stamped with the requested scenario identifier.
///
/// Same shape as a successful webhook response so the normalizer treats
/// live and fallback data identically.
pub fn fallback_scenario_payload(request_id: &str) -> ScenarioPayload {
    ScenarioPayload {
        success: Some(true),
        message: None,
        request_id: Some(request_id.to_string()),
        hub_code: Some("PALAK".to_string()),
        summary: Some(ScenarioSummary {
            total_trips: 1,
            total_distance_km: 0.06,
            avg_trip_distance_km: 0.06,
            total_trip_hours: 2.11,
            avg_trip_hours: 2.11,
            total_consignments_planned: 13,
            total_consignments_served: 10,
            total_consignments_dropped: 3,
            avg_stops_per_trip: 10.0,
        }),
        drop_breakup: Vec::new(),
        analysis_metrics: Some(AnalysisMetrics {
            vehicles: VehicleMetrics {
                used_vehicles: Some(1),
                total_vehicles: Some(5),
                used_vehicle_ratio: Some(0.2),
                vehicles_doing_multi_trips: Some(0),
            },
            trips: TripMetrics {
                total_trips: Some(1),
                avg_trip_duration_hours: Some(2.11),
                min_trip_duration_hours: Some(2.11),
                max_trip_duration_hours: Some(2.11),
                avg_trip_distance_km: Some(0.06),
                min_trip_distance_km: Some(0.06),
                max_trip_distance_km: Some(0.06),
            },
            consignments_and_stops: ConsignmentStopMetrics {
                avg_cn_count: Some(10.0),
                min_cn_count: Some(10.0),
                max_cn_count: Some(10.0),
                avg_stop_count: Some(10.0),
                min_stop_count: Some(10.0),
                max_stop_count: Some(10.0),
            },
            utilisation: UtilisationMetrics {
                overall_weight_util_pct: Some(45.5),
                overall_vol_util_pct: Some(32.1),
                min_weight_util_pct: Some(45.5),
                max_weight_util_pct: Some(45.5),
                min_vol_util_pct: Some(32.1),
                max_vol_util_pct: Some(32.1),
            },
            product_value: ProductValueMetrics::default(),
            data_gaps: vec![
                "Capacity data missing from file upload.".to_string(),
                "Product value field not provided.".to_string(),
            ],
        }),
    }
}

/// Scenario metrics fetcher with per-scenario fallback.
pub struct ScenarioFetcher<T: ScenarioTransport> {
    transport: T,
    events: Arc<EventLog>,
}

impl<T: ScenarioTransport> ScenarioFetcher<T> {
    /// Create a fetcher over the given transport, logging to `events`.
    pub fn new(transport: T, events: Arc<EventLog>) -> Self {
        Self { transport, events }
    }

    /// Fetch and normalize one scenario.
    ///
    /// Never errors: every failure resolves to the fallback payload flagged
    /// `is_mock`, with a warning event naming the scenario and the reason.
    /// Returns `None` only when the resolved payload lacks a summary
    /// section entirely.
    pub async fn fetch_one(&self, scenario_id: &str) -> Option<ScenarioRecord> {
        self.events
            .record(Severity::Info, format!("Fetching: {}", scenario_id));

        let (payload, is_mock) = match self.resolve_payload(scenario_id).await {
            Ok(payload) => {
                self.events
                    .record(Severity::Success, format!("HTTP 200 OK for {}", scenario_id));
                (payload, false)
            }
            Err(err) => {
                self.events.record(
                    Severity::Warning,
                    format!("{}: {}. Using fallback.", scenario_id, err),
                );
                (fallback_scenario_payload(scenario_id), true)
            }
        };

        normalize(&payload, scenario_id, is_mock)
    }

    /// Fetch all requested scenarios concurrently.
    ///
    /// One call per identifier, no ordering dependency between them; the
    /// returned records preserve the requested order regardless of which
    /// call resolved first. Scenarios whose payload carried no summary are
    /// filtered out; the only error is every identifier producing no
    /// record.
    pub async fn fetch_all(&self, scenario_ids: &[String]) -> Result<Vec<ScenarioRecord>> {
        if scenario_ids.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "[ScenarioFetcher] Fetching {} scenario(s) concurrently",
            scenario_ids.len()
        );

        let tasks = scenario_ids.iter().map(|id| self.fetch_one(id));
        let results = futures::future::join_all(tasks).await;

        let records: Vec<ScenarioRecord> = results.into_iter().flatten().collect();
        debug!(
            "[ScenarioFetcher] {}/{} scenario(s) usable",
            records.len(),
            scenario_ids.len()
        );

        if records.is_empty() {
            return Err(ConsoleError::NoUsableRecords {
                requested: scenario_ids.len(),
            });
        }
        Ok(records)
    }

    /// Run the exchange and validation steps, returning the payload to
    /// normalize or the failure that should trigger fallback substitution.
    async fn resolve_payload(&self, scenario_id: &str) -> Result<ScenarioPayload> {
        let body = self.transport.request_metrics(scenario_id).await?;

        let value: Value =
            serde_json::from_str(&body).map_err(|_| ConsoleError::MalformedResponse {
                message: "Response is not valid JSON".to_string(),
            })?;

        // The webhook answers with a bare object or a single-element list.
        let item = match value {
            Value::Array(items) => items.into_iter().next(),
            other => Some(other),
        };
        let item = item.ok_or_else(|| ConsoleError::DomainFailure {
            message: "Scenario not found".to_string(),
        })?;

        let payload: ScenarioPayload =
            serde_json::from_value(item).map_err(|e| ConsoleError::MalformedResponse {
                message: format!("Unexpected response shape: {}", e),
            })?;

        if payload.success == Some(false) {
            return Err(ConsoleError::DomainFailure {
                message: payload
                    .message
                    .clone()
                    .unwrap_or_else(|| "Scenario not found".to_string()),
            });
        }

        Ok(payload)
    }
}
