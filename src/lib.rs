//! # RPO Console
//!
//! Scenario analytics and field-mapping core for a route-plan optimization
//! dashboard.
//!
//! This library provides the data layer behind two dashboard screens:
//! - **Analysis**: fetch trip/utilization metrics for one or more named
//!   scenarios, normalize them into flat UI-ready records, and compute
//!   per-metric bests across the set for comparison.
//! - **Mapping**: load, edit, and publish the association between internal
//!   system field names and raw spreadsheet column headers.
//!
//! The backend webhooks are collaborators that may disappear at any time:
//! every fetch failure degrades to fixed fallback data flagged as mock or
//! simulated, observable through a session [`EventLog`], instead of
//! surfacing as a fault.
//!
//! ## Quick Start
//!
//! ```rust
//! use rpo_console::scenario::{normalize, ScenarioPayload};
//!
//! let payload: ScenarioPayload = serde_json::from_str(r#"{
//!     "request_id": "IDBtest3",
//!     "hub_code": "PALAK",
//!     "summary": { "total_trips": 1, "avg_trip_hours": 2.11,
//!                  "total_consignments_planned": 13,
//!                  "total_consignments_dropped": 3 }
//! }"#).unwrap();
//!
//! let record = normalize(&payload, "IDBtest3", false).unwrap();
//! assert_eq!(record.avg_trip_time_str, "2h 7m");
//! assert_eq!(record.drop_split_str, "23.1");
//! ```

// Unified error handling
pub mod error;
pub use error::{ConsoleError, Result};

// Webhook endpoints and timeouts
pub mod config;
pub use config::ConsoleConfig;

// Session event log (the UI's debug console)
pub mod events;
pub use events::{EventEntry, EventLog, Severity};

// Scenario payloads and normalization
pub mod scenario;
pub use scenario::{
    drop_rate, format_hours_hm, normalize, AnalysisMetrics, DropBreakupItem, DropReason,
    ScenarioPayload, ScenarioRecord, ScenarioSummary,
};

// Cross-scenario comparison extremes
pub mod compare;
pub use compare::{aggregate, ComparisonExtremes};

// Scenario metrics fetching with fallback
pub mod fetch;
pub use fetch::{
    fallback_scenario_payload, HttpScenarioTransport, ScenarioFetcher, ScenarioTransport,
};

// Analysis screen state
pub mod analysis;
pub use analysis::{AnalysisMode, AnalysisView, ViewScope};

// Field mapping model, editor, and store
pub mod mapping;
pub use mapping::store::{
    HttpMappingTransport, MappingStore, MappingTransport, SaveStatus,
};
pub use mapping::{EntityKind, ExternalMapping, InternalMapping};
