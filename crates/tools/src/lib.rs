//! Developer tooling: read-only inspection of attribute histories.
//!
//! # Invariants
//! - Inspection never initializes an attribute or records a snapshot.

mod inspector;

pub use inspector::{AttributeSummary, HistoryInspector, HistoryRow};

pub fn crate_info() -> &'static str {
    "timeslice-tools v0.1.0"
}
