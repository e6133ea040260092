//! Scenario metrics payloads and normalization.
//!
//! The metrics webhook answers with a loosely-shaped JSON document: summary
//! leaves may be absent, the analysis block is optional, and any of its
//! leaves may be null. This module is the validation boundary: the payload
//! is reshaped exactly once, here, into a fully-typed [`ScenarioRecord`]
//! that the rest of the crate (and the UI) can consume without touching
//! optional JSON again.
//!
//! Absence has two different meanings and the two must not be unified:
//! - Summary leaves (trips, distances, counts) default to 0.
//! - Analysis leaves (vehicles, utilization, product value) stay `None`,
//!   meaning "not computable from supplied data". The UI distinguishes
//!   "zero" from "unknown".
//!
//! ## Example
//! ```rust
//! use rpo_console::scenario::{format_hours_hm, drop_rate};
//!
//! assert_eq!(format_hours_hm(2.11), "2h 7m");
//! assert!((drop_rate(3, 13) - 23.076923).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Wire Types
// ============================================================================

/// One item from the metrics webhook (the response may be a bare object or
/// a single-element list; the fetcher unwraps the list before parsing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioPayload {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub hub_code: Option<String>,
    #[serde(default)]
    pub summary: Option<ScenarioSummary>,
    #[serde(default)]
    pub drop_breakup: Vec<DropBreakupItem>,
    #[serde(default)]
    pub analysis_metrics: Option<AnalysisMetrics>,
}

/// Plan-level totals. Missing leaves are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSummary {
    #[serde(default)]
    pub total_trips: u32,
    #[serde(default)]
    pub total_distance_km: f64,
    #[serde(default)]
    pub avg_trip_distance_km: f64,
    #[serde(default)]
    pub total_trip_hours: f64,
    #[serde(default)]
    pub avg_trip_hours: f64,
    #[serde(default)]
    pub total_consignments_planned: u32,
    #[serde(default)]
    pub total_consignments_served: u32,
    #[serde(default)]
    pub total_consignments_dropped: u32,
    #[serde(default)]
    pub avg_stops_per_trip: f64,
}

/// One drop-reason row as the backend reports it. Unordered on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropBreakupItem {
    #[serde(default)]
    pub reason_code: String,
    #[serde(default)]
    pub reason_label: Option<String>,
    #[serde(default)]
    pub dropped_count: u32,
    #[serde(default)]
    pub pct_of_dropped: f64,
    #[serde(default)]
    pub pct_of_planned: f64,
}

/// Optional deep-analysis block. Every leaf may be null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    #[serde(default)]
    pub vehicles: VehicleMetrics,
    #[serde(default)]
    pub trips: TripMetrics,
    #[serde(default)]
    pub consignments_and_stops: ConsignmentStopMetrics,
    #[serde(default)]
    pub utilisation: UtilisationMetrics,
    #[serde(default)]
    pub product_value: ProductValueMetrics,
    #[serde(default)]
    pub data_gaps: Vec<String>,
}

/// Fleet usage counts and ratio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleMetrics {
    #[serde(default)]
    pub used_vehicles: Option<u32>,
    #[serde(default)]
    pub total_vehicles: Option<u32>,
    #[serde(default)]
    pub used_vehicle_ratio: Option<f64>,
    #[serde(default)]
    pub vehicles_doing_multi_trips: Option<u32>,
}

/// Trip duration/distance spread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripMetrics {
    #[serde(default)]
    pub total_trips: Option<u32>,
    #[serde(default)]
    pub avg_trip_duration_hours: Option<f64>,
    #[serde(default)]
    pub min_trip_duration_hours: Option<f64>,
    #[serde(default)]
    pub max_trip_duration_hours: Option<f64>,
    #[serde(default)]
    pub avg_trip_distance_km: Option<f64>,
    #[serde(default)]
    pub min_trip_distance_km: Option<f64>,
    #[serde(default)]
    pub max_trip_distance_km: Option<f64>,
}

/// Consignment and stop count spread per trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsignmentStopMetrics {
    #[serde(default)]
    pub avg_cn_count: Option<f64>,
    #[serde(default)]
    pub min_cn_count: Option<f64>,
    #[serde(default)]
    pub max_cn_count: Option<f64>,
    #[serde(default)]
    pub avg_stop_count: Option<f64>,
    #[serde(default)]
    pub min_stop_count: Option<f64>,
    #[serde(default)]
    pub max_stop_count: Option<f64>,
}

/// Weight/volume utilization percentages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtilisationMetrics {
    #[serde(default)]
    pub overall_weight_util_pct: Option<f64>,
    #[serde(default)]
    pub overall_vol_util_pct: Option<f64>,
    #[serde(default)]
    pub min_weight_util_pct: Option<f64>,
    #[serde(default)]
    pub max_weight_util_pct: Option<f64>,
    #[serde(default)]
    pub min_vol_util_pct: Option<f64>,
    #[serde(default)]
    pub max_vol_util_pct: Option<f64>,
}

/// Declared-value statistics across consignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductValueMetrics {
    #[serde(default)]
    pub avg_product_value: Option<f64>,
    #[serde(default)]
    pub min_product_value: Option<f64>,
    #[serde(default)]
    pub max_product_value: Option<f64>,
}

// ============================================================================
// Normalized Record
// ============================================================================

/// A drop reason ready for display: label (falling back to the raw code)
/// plus the dropped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropReason {
    pub reason: String,
    pub count: u32,
}

/// Flat, UI-ready view of one scenario's metrics.
///
/// Constructed once per fetch response by [`normalize`], immutable
/// thereafter, and replaced wholesale on re-fetch. Numeric fields that the
/// UI renders with fixed precision carry a pre-formatted string alongside
/// the raw number so comparison logic and display never disagree on
/// rounding.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRecord {
    /// Scenario identifier (the backend's echo, or the requested id).
    pub id: String,
    /// Originating hub code, `"N/A"` when the backend omits it.
    pub hub: String,

    pub total_trips: u32,
    pub avg_distance_km: f64,
    /// `avg_distance_km` fixed to 2 decimals.
    pub avg_distance_str: String,
    /// Consignments served across all trips.
    pub total_stops: u32,
    pub avg_stops_per_trip: f64,
    /// `avg_stops_per_trip` fixed to 1 decimal.
    pub avg_stops_per_trip_str: String,
    /// Average trip duration as `"<hours>h <minutes>m"`.
    pub avg_trip_time_str: String,

    pub total_drops: u32,
    /// Dropped share of planned, in percent. Always equals
    /// `100 * total_drops / max(1, planned)`.
    pub drop_split_pct: f64,
    /// `drop_split_pct` fixed to 1 decimal.
    pub drop_split_str: String,
    /// Drop reasons sorted descending by count (stable on ties).
    pub drop_reasons: Vec<DropReason>,

    // Analysis leaves: `None` means "not computable from supplied data",
    // never zero.
    pub used_vehicles: Option<u32>,
    pub total_vehicles: Option<u32>,
    pub used_vehicle_ratio: Option<f64>,
    pub multi_trip_vehicles: Option<u32>,
    pub weight_util_pct: Option<f64>,
    pub vol_util_pct: Option<f64>,
    pub data_gaps: Vec<String>,

    /// Whether this record came from the live backend or fallback data.
    pub is_mock: bool,
}

impl ScenarioRecord {
    /// Used-vehicle ratio as a whole display percentage (0.2 -> 20).
    pub fn used_vehicle_ratio_pct(&self) -> Option<u32> {
        self.used_vehicle_ratio
            .map(|ratio| (ratio * 100.0).round() as u32)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Format decimal hours as `"<hours>h <minutes>m"`.
///
/// Non-finite input formats as `"0h 0m"`. Minutes are always in `[0, 59]`:
/// when rounding the fractional part lands on a full hour (e.g. 1.9999),
/// the hour is carried instead of printing `"1h 60m"`.
pub fn format_hours_hm(decimal_hours: f64) -> String {
    if !decimal_hours.is_finite() || decimal_hours < 0.0 {
        return "0h 0m".to_string();
    }
    let mut hours = decimal_hours.floor() as u64;
    let mut minutes = ((decimal_hours - decimal_hours.floor()) * 60.0).round() as u64;
    if minutes == 60 {
        hours += 1;
        minutes = 0;
    }
    format!("{}h {}m", hours, minutes)
}

/// Dropped share of planned consignments, in percent.
///
/// A plan with zero planned consignments is treated as a plan of one so the
/// rate is defined (and zero) rather than dividing by zero.
pub fn drop_rate(dropped: u32, planned: u32) -> f64 {
    (dropped as f64 / planned.max(1) as f64) * 100.0
}

/// Reshape a raw payload into a [`ScenarioRecord`].
///
/// Pure: no side effects, no network access. Returns `None` when the
/// payload lacks a summary section entirely; the caller filters such
/// results out instead of crashing.
///
/// `requested_id` backfills the record identifier when the backend omits
/// `request_id`; `is_mock` marks records built from fallback data.
pub fn normalize(
    payload: &ScenarioPayload,
    requested_id: &str,
    is_mock: bool,
) -> Option<ScenarioRecord> {
    let summary = payload.summary.as_ref()?;
    let analysis = payload.analysis_metrics.as_ref();

    let drop_split = drop_rate(
        summary.total_consignments_dropped,
        summary.total_consignments_planned,
    );

    let mut drop_reasons: Vec<DropReason> = payload
        .drop_breakup
        .iter()
        .map(|item| DropReason {
            reason: item
                .reason_label
                .as_deref()
                .filter(|label| !label.is_empty())
                .unwrap_or(&item.reason_code)
                .to_string(),
            count: item.dropped_count,
        })
        .collect();
    // Vec::sort_by is stable: equal counts keep their input-relative order,
    // which is part of the display contract.
    drop_reasons.sort_by(|a, b| b.count.cmp(&a.count));

    Some(ScenarioRecord {
        id: payload
            .request_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(requested_id)
            .to_string(),
        hub: payload
            .hub_code
            .as_deref()
            .filter(|hub| !hub.is_empty())
            .unwrap_or("N/A")
            .to_string(),
        total_trips: summary.total_trips,
        avg_distance_km: summary.avg_trip_distance_km,
        avg_distance_str: format!("{:.2}", summary.avg_trip_distance_km),
        total_stops: summary.total_consignments_served,
        avg_stops_per_trip: summary.avg_stops_per_trip,
        avg_stops_per_trip_str: format!("{:.1}", summary.avg_stops_per_trip),
        avg_trip_time_str: format_hours_hm(summary.avg_trip_hours),
        total_drops: summary.total_consignments_dropped,
        drop_split_pct: drop_split,
        drop_split_str: format!("{:.1}", drop_split),
        drop_reasons,
        used_vehicles: analysis.and_then(|a| a.vehicles.used_vehicles),
        total_vehicles: analysis.and_then(|a| a.vehicles.total_vehicles),
        used_vehicle_ratio: analysis.and_then(|a| a.vehicles.used_vehicle_ratio),
        multi_trip_vehicles: analysis.and_then(|a| a.vehicles.vehicles_doing_multi_trips),
        weight_util_pct: analysis.and_then(|a| a.utilisation.overall_weight_util_pct),
        vol_util_pct: analysis.and_then(|a| a.utilisation.overall_vol_util_pct),
        data_gaps: analysis.map(|a| a.data_gaps.clone()).unwrap_or_default(),
        is_mock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hours_hm() {
        assert_eq!(format_hours_hm(2.11), "2h 7m");
        assert_eq!(format_hours_hm(0.0), "0h 0m");
        assert_eq!(format_hours_hm(1.5), "1h 30m");
        assert_eq!(format_hours_hm(f64::NAN), "0h 0m");
    }

    #[test]
    fn test_format_hours_minutes_stay_in_range() {
        // Rounding 0.9999 * 60 would yield 60 minutes; the hour is carried.
        assert_eq!(format_hours_hm(1.9999), "2h 0m");

        for i in 0..1000 {
            let h = i as f64 * 0.0173;
            let formatted = format_hours_hm(h);
            let minutes: u64 = formatted
                .split(' ')
                .nth(1)
                .and_then(|m| m.trim_end_matches('m').parse().ok())
                .unwrap();
            assert!(minutes <= 59, "{} -> {}", h, formatted);
        }
    }

    #[test]
    fn test_drop_rate() {
        assert!((drop_rate(3, 13) - 23.076923).abs() < 1e-4);
        // Zero planned is guarded, not a division by zero.
        assert_eq!(drop_rate(0, 0), 0.0);
        assert_eq!(drop_rate(5, 0), 500.0);
        assert_eq!(drop_rate(0, 100), 0.0);
    }

    fn payload_with_summary() -> ScenarioPayload {
        ScenarioPayload {
            request_id: Some("SC-1".to_string()),
            hub_code: Some("PALAK".to_string()),
            summary: Some(ScenarioSummary {
                total_trips: 4,
                avg_trip_distance_km: 12.5,
                avg_trip_hours: 2.11,
                total_consignments_planned: 13,
                total_consignments_served: 10,
                total_consignments_dropped: 3,
                avg_stops_per_trip: 2.5,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_derived_fields() {
        let record = normalize(&payload_with_summary(), "SC-1", false).unwrap();

        assert_eq!(record.id, "SC-1");
        assert_eq!(record.hub, "PALAK");
        assert_eq!(record.avg_distance_str, "12.50");
        assert_eq!(record.avg_stops_per_trip_str, "2.5");
        assert_eq!(record.avg_trip_time_str, "2h 7m");
        assert_eq!(record.drop_split_str, "23.1");
        // The stored string must match the rounding of the numeric field.
        assert_eq!(record.drop_split_str, format!("{:.1}", record.drop_split_pct));
        assert!(!record.is_mock);
    }

    #[test]
    fn test_normalize_without_summary_is_none() {
        let payload = ScenarioPayload {
            request_id: Some("SC-2".to_string()),
            ..Default::default()
        };
        assert!(normalize(&payload, "SC-2", false).is_none());
    }

    #[test]
    fn test_normalize_backfills_requested_id_and_hub() {
        let mut payload = payload_with_summary();
        payload.request_id = None;
        payload.hub_code = None;

        let record = normalize(&payload, "asked-for", true).unwrap();
        assert_eq!(record.id, "asked-for");
        assert_eq!(record.hub, "N/A");
        assert!(record.is_mock);
    }

    #[test]
    fn test_drop_reasons_sorted_descending_stable() {
        let mut payload = payload_with_summary();
        payload.drop_breakup = vec![
            DropBreakupItem {
                reason_code: "B".to_string(),
                dropped_count: 5,
                ..Default::default()
            },
            DropBreakupItem {
                reason_code: "A".to_string(),
                dropped_count: 5,
                ..Default::default()
            },
            DropBreakupItem {
                reason_code: "C".to_string(),
                dropped_count: 2,
                ..Default::default()
            },
        ];

        let record = normalize(&payload, "SC-1", false).unwrap();
        let order: Vec<&str> = record
            .drop_reasons
            .iter()
            .map(|r| r.reason.as_str())
            .collect();
        // B before A preserved despite equal counts.
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_drop_reason_label_falls_back_to_code() {
        let mut payload = payload_with_summary();
        payload.drop_breakup = vec![
            DropBreakupItem {
                reason_code: "TW_MISS".to_string(),
                reason_label: Some("Time window missed".to_string()),
                dropped_count: 2,
                ..Default::default()
            },
            DropBreakupItem {
                reason_code: "CAP".to_string(),
                reason_label: Some(String::new()),
                dropped_count: 1,
                ..Default::default()
            },
        ];

        let record = normalize(&payload, "SC-1", false).unwrap();
        assert_eq!(record.drop_reasons[0].reason, "Time window missed");
        // Empty labels fall back to the raw code, same as missing ones.
        assert_eq!(record.drop_reasons[1].reason, "CAP");
    }

    #[test]
    fn test_analysis_nulls_survive_as_none() {
        let json = r#"{
            "request_id": "SC-3",
            "summary": { "total_trips": 1 },
            "analysis_metrics": {
                "vehicles": { "used_vehicles": 1, "total_vehicles": null },
                "utilisation": { "overall_weight_util_pct": null, "overall_vol_util_pct": 32.1 },
                "data_gaps": ["Capacity data missing from file upload."]
            }
        }"#;
        let payload: ScenarioPayload = serde_json::from_str(json).unwrap();
        let record = normalize(&payload, "SC-3", false).unwrap();

        assert_eq!(record.used_vehicles, Some(1));
        // null means "unknown", never zero.
        assert_eq!(record.total_vehicles, None);
        assert_eq!(record.weight_util_pct, None);
        assert_eq!(record.vol_util_pct, Some(32.1));
        assert_eq!(record.data_gaps.len(), 1);
    }

    #[test]
    fn test_missing_summary_leaves_default_to_zero() {
        let json = r#"{ "request_id": "SC-4", "summary": {} }"#;
        let payload: ScenarioPayload = serde_json::from_str(json).unwrap();
        let record = normalize(&payload, "SC-4", false).unwrap();

        assert_eq!(record.total_trips, 0);
        assert_eq!(record.total_drops, 0);
        assert_eq!(record.avg_distance_str, "0.00");
        assert_eq!(record.avg_trip_time_str, "0h 0m");
        assert_eq!(record.drop_split_pct, 0.0);
    }

    #[test]
    fn test_used_vehicle_ratio_pct() {
        let mut payload = payload_with_summary();
        payload.analysis_metrics = Some(AnalysisMetrics {
            vehicles: VehicleMetrics {
                used_vehicle_ratio: Some(0.2),
                ..Default::default()
            },
            ..Default::default()
        });
        let record = normalize(&payload, "SC-1", false).unwrap();
        assert_eq!(record.used_vehicle_ratio_pct(), Some(20));

        let bare = normalize(&payload_with_summary(), "SC-1", false).unwrap();
        assert_eq!(bare.used_vehicle_ratio_pct(), None);
    }
}
