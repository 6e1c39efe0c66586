use serde::Serialize;
use timeslice_common::Timestamp;
use timeslice_kernel::TemporalStore;

/// Attribute history inspector for developer tooling.
///
/// Provides read-only views of a store's snapshot history for debugging and
/// demo output.
pub struct HistoryInspector;

impl HistoryInspector {
    /// Produce a summary of one attribute's history.
    pub fn summary<T>(store: &TemporalStore<T>) -> AttributeSummary {
        let history = store.history();
        AttributeSummary {
            name: store.name().to_string(),
            initialized: store.is_initialized(),
            snapshots: history.len(),
            earliest: history.earliest_at(),
            latest: history.latest_at(),
        }
    }

    /// List every snapshot with its value rendered via `Debug`.
    ///
    /// The row an as-of read at the scope's current query time would return
    /// is marked `selected`; with no active scope that is the latest row.
    pub fn timeline<T: std::fmt::Debug>(store: &TemporalStore<T>) -> Vec<HistoryRow> {
        let history = store.history();
        let selected = match store.scope().current() {
            Some(as_of) => history.index_at(as_of),
            None => history.len().checked_sub(1),
        };
        history
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| HistoryRow {
                at: e.at,
                value: format!("{:?}", e.value),
                selected: selected == Some(i),
            })
            .collect()
    }
}

/// Summary of one attribute's history for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSummary {
    pub name: String,
    pub initialized: bool,
    pub snapshots: usize,
    pub earliest: Option<Timestamp>,
    pub latest: Option<Timestamp>,
}

impl std::fmt::Display for AttributeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.earliest, self.latest) {
            (Some(first), Some(last)) => write!(
                f,
                "{}: snapshots={} first={} last={}",
                self.name,
                self.snapshots,
                first.format("%H:%M:%S%.3f"),
                last.format("%H:%M:%S%.3f"),
            ),
            _ => write!(
                f,
                "{}: snapshots={} (initialized={})",
                self.name, self.snapshots, self.initialized
            ),
        }
    }
}

/// One snapshot as listed by [`HistoryInspector::timeline`].
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub at: Timestamp,
    pub value: String,
    pub selected: bool,
}

impl std::fmt::Display for HistoryRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.selected { ">" } else { " " };
        write!(f, "{marker} {} {}", self.at.format("%H:%M:%S%.3f"), self.value)
    }
}
