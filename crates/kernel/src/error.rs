use timeslice_common::Timestamp;

/// Errors raised by temporal reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    /// The as-of query time precedes every recorded snapshot.
    #[error("no snapshot for '{attribute}' found at or before {as_of}")]
    NoSnapshotAvailable { attribute: String, as_of: Timestamp },
    /// A write was attempted while the attribute is viewed as of a past time.
    #[error("'{attribute}' is read-only while viewed as of {as_of}")]
    ReadOnlyUnderAsOf { attribute: String, as_of: Timestamp },
}

pub type TemporalResult<T> = Result<T, TemporalError>;
