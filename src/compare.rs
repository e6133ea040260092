//! Cross-scenario comparison extremes.
//!
//! When two or more scenarios are on screen, the comparison table marks the
//! "optimal" entry per metric. The extremes are recomputed whenever the
//! record set changes and are never persisted. A single record has no
//! relative best, so the aggregate is `None` below two records.

use serde::Serialize;

use crate::scenario::ScenarioRecord;

/// Per-metric best values across the current record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonExtremes {
    /// Lowest average trip distance (km).
    pub min_avg_distance_km: f64,
    /// Fewest dropped consignments.
    pub min_total_drops: u32,
    /// Fewest trips.
    pub min_total_trips: u32,
    /// Highest average stops per trip.
    pub max_avg_stops_per_trip: f64,
    /// Highest weight utilization, over records that report one.
    /// `None` when no record in the set carries the metric.
    pub max_weight_util_pct: Option<f64>,
}

/// Compute the extremes over a record set.
///
/// Each extreme is reduced independently over the full set. Records with a
/// null weight utilization are excluded from that reduction only: they do
/// not zero the metric and do not disqualify the computation.
pub fn aggregate(records: &[ScenarioRecord]) -> Option<ComparisonExtremes> {
    if records.len() < 2 {
        return None;
    }

    let min_avg_distance_km = records
        .iter()
        .map(|r| r.avg_distance_km)
        .fold(f64::INFINITY, f64::min);
    let max_avg_stops_per_trip = records
        .iter()
        .map(|r| r.avg_stops_per_trip)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_weight_util_pct = records
        .iter()
        .filter_map(|r| r.weight_util_pct)
        .fold(None, |best: Option<f64>, pct| {
            Some(best.map_or(pct, |b| b.max(pct)))
        });

    Some(ComparisonExtremes {
        min_avg_distance_km,
        min_total_drops: records.iter().map(|r| r.total_drops).min().unwrap_or(0),
        min_total_trips: records.iter().map(|r| r.total_trips).min().unwrap_or(0),
        max_avg_stops_per_trip,
        max_weight_util_pct,
    })
}
