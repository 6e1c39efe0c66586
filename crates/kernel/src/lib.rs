//! Temporal kernel: per-attribute snapshot history, as-of scopes, lazy stores.
//!
//! # Invariants
//! - History is append-ordered by capture time and never pruned.
//! - Stored snapshots are owned copies, isolated from the live value.
//! - An attribute's initializer runs at most once, on first access.
//! - Leaving an as-of scope restores exactly the prior query time.

mod error;
mod history;
mod scope;
mod store;
mod timeline;

pub use error::{TemporalError, TemporalResult};
pub use history::{SnapshotEntry, SnapshotHistory};
pub use scope::{AsOfGuard, AsOfScope};
pub use store::TemporalStore;
pub use timeline::Timeline;
pub use timeslice_common::{Clock, ManualClock, SystemClock, TimelineId, Timestamp};

pub fn crate_info() -> &'static str {
    "timeslice-kernel v0.1.0"
}
