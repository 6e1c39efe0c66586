//! Shared types for timeslice: timestamps, timeline identity, clock sources.

mod clock;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{TimelineId, Timestamp};

pub fn crate_info() -> &'static str {
    "timeslice-common v0.1.0"
}
