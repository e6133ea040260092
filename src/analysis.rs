//! Analysis screen state.
//!
//! [`AnalysisView`] owns everything the Analysis screen renders: the
//! single/compare mode, the scenario tag set, the fetched records, the
//! blocking error slot, and the session event log. All mutation happens at
//! well-defined completion points (fetch resolved, user edit), so the view
//! needs no locking of its own.
//!
//! The one concurrency hazard is a fetch resolving after the screen has
//! been torn down. [`ViewScope`] is the guard: the UI clones a handle
//! before spawning `run_analysis` and retires it on teardown; results that
//! arrive afterwards are discarded rather than applied to stale state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::compare::{aggregate, ComparisonExtremes};
use crate::error::ConsoleError;
use crate::events::{EventLog, Severity};
use crate::fetch::{ScenarioFetcher, ScenarioTransport};
use crate::scenario::ScenarioRecord;

/// Whether the screen analyzes one scenario or compares several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Single,
    Compare,
}

/// Liveness flag for a consuming view.
///
/// Cloning shares the flag. Retiring it from any clone makes every holder
/// observe `is_alive() == false`; an in-flight `run_analysis` then drops
/// its results instead of applying them.
#[derive(Debug, Clone)]
pub struct ViewScope {
    alive: Arc<AtomicBool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Mark the consuming view as torn down.
    pub fn retire(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// State container for the Analysis screen.
pub struct AnalysisView<T: ScenarioTransport> {
    fetcher: ScenarioFetcher<T>,
    events: Arc<EventLog>,
    scope: ViewScope,

    mode: AnalysisMode,
    search_tags: Vec<String>,
    records: Vec<ScenarioRecord>,
    error: Option<ConsoleError>,
    has_searched: bool,
}

impl<T: ScenarioTransport> AnalysisView<T> {
    /// Create a view over the given transport.
    pub fn new(transport: T) -> Self {
        let events = Arc::new(EventLog::new());
        Self {
            fetcher: ScenarioFetcher::new(transport, Arc::clone(&events)),
            events,
            scope: ViewScope::new(),
            mode: AnalysisMode::Single,
            search_tags: Vec::new(),
            records: Vec::new(),
            error: None,
            has_searched: false,
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    /// Tag set used in compare mode.
    pub fn tags(&self) -> &[String] {
        &self.search_tags
    }

    /// Add a scenario tag. Trims the input; empty and duplicate tags are
    /// rejected. Returns whether the tag was added.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.search_tags.iter().any(|t| t == tag) {
            return false;
        }
        self.search_tags.push(tag.to_string());
        true
    }

    /// Remove a scenario tag; no-op when absent.
    pub fn remove_tag(&mut self, tag: &str) {
        self.search_tags.retain(|t| t != tag);
    }

    /// The identifiers a search would run for the current mode: the trimmed
    /// input in single mode, the tag set in compare mode.
    pub fn scenarios_to_run(&self, search_input: &str) -> Vec<String> {
        match self.mode {
            AnalysisMode::Single => {
                let trimmed = search_input.trim();
                if trimmed.is_empty() {
                    Vec::new()
                } else {
                    vec![trimmed.to_string()]
                }
            }
            AnalysisMode::Compare => self.search_tags.clone(),
        }
    }

    /// Fetch the requested scenarios and install the outcome.
    ///
    /// Clears previous records, error, and event log; fans out one fetch
    /// per identifier; and, if the view scope is still alive when all
    /// resolve, installs either the record set (requested order) or the
    /// aggregate "no usable records" error.
    pub async fn run_analysis(&mut self, scenarios: &[String]) {
        if scenarios.is_empty() {
            return;
        }

        self.has_searched = true;
        self.error = None;
        self.records.clear();
        self.events.clear();
        self.events.record(
            Severity::Info,
            format!("Starting analysis for: {}", scenarios.join(", ")),
        );

        let outcome = self.fetcher.fetch_all(scenarios).await;

        // The consuming screen may have been torn down while calls were in
        // flight; stale results must not be applied.
        if !self.scope.is_alive() {
            return;
        }

        match outcome {
            Ok(records) => self.records = records,
            Err(err) => self.error = Some(err),
        }
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn error(&self) -> Option<&ConsoleError> {
        self.error.as_ref()
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    /// Session event log (shared with the fetcher).
    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }

    /// Handle for the teardown guard. Clone it before spawning
    /// `run_analysis` and retire it when the screen unmounts.
    pub fn scope_handle(&self) -> ViewScope {
        self.scope.clone()
    }

    /// Per-metric bests for the comparison table.
    ///
    /// Only meaningful in compare mode with at least two records; `None`
    /// otherwise.
    pub fn best_metrics(&self) -> Option<ComparisonExtremes> {
        if self.mode != AnalysisMode::Compare {
            return None;
        }
        aggregate(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Transport answering every id with the same canned body.
    struct UniformTransport {
        body: Result<String>,
    }

    impl ScenarioTransport for UniformTransport {
        async fn request_metrics(&self, _request_id: &str) -> Result<String> {
            self.body.clone()
        }
    }

    fn live_view() -> AnalysisView<UniformTransport> {
        AnalysisView::new(UniformTransport {
            body: Ok(r#"{"success": true, "hub_code": "H",
                         "summary": {"total_trips": 2, "avg_trip_distance_km": 4.0,
                                     "total_consignments_planned": 10}}"#
                .to_string()),
        })
    }

    #[test]
    fn test_tag_management() {
        let mut view = live_view();
        assert!(view.add_tag("  plan-a  "));
        assert!(!view.add_tag("plan-a"));
        assert!(!view.add_tag("   "));
        assert!(view.add_tag("plan-b"));
        assert_eq!(view.tags(), &["plan-a", "plan-b"]);

        view.remove_tag("plan-a");
        assert_eq!(view.tags(), &["plan-b"]);
    }

    #[test]
    fn test_scenarios_to_run_by_mode() {
        let mut view = live_view();
        assert_eq!(view.scenarios_to_run(" s1 "), vec!["s1".to_string()]);
        assert!(view.scenarios_to_run("  ").is_empty());

        view.set_mode(AnalysisMode::Compare);
        view.add_tag("a");
        view.add_tag("b");
        assert_eq!(view.scenarios_to_run("ignored"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_run_analysis_installs_records() {
        let mut view = live_view();
        let ids = vec!["s1".to_string(), "s2".to_string()];
        view.run_analysis(&ids).await;

        assert!(view.has_searched());
        assert!(view.error().is_none());
        assert_eq!(view.records().len(), 2);
        assert!(!view.events().is_empty());
    }

    #[tokio::test]
    async fn test_run_analysis_installs_error_when_nothing_usable() {
        let mut view = AnalysisView::new(UniformTransport {
            body: Ok(r#"{"success": true}"#.to_string()),
        });
        view.run_analysis(&["s1".to_string()]).await;

        assert!(view.records().is_empty());
        assert!(matches!(
            view.error(),
            Some(ConsoleError::NoUsableRecords { requested: 1 })
        ));
    }

    #[tokio::test]
    async fn test_retired_scope_discards_results() {
        let mut view = live_view();
        let handle = view.scope_handle();
        handle.retire();

        view.run_analysis(&["s1".to_string()]).await;

        // Fetch succeeded, but the screen was gone: nothing applied.
        assert!(view.records().is_empty());
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn test_best_metrics_gated_on_compare_mode() {
        let mut view = live_view();
        let ids = vec!["s1".to_string(), "s2".to_string()];
        view.run_analysis(&ids).await;

        assert!(view.best_metrics().is_none());
        view.set_mode(AnalysisMode::Compare);
        assert!(view.best_metrics().is_some());
    }
}
