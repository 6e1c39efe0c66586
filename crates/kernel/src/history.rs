use serde::{Deserialize, Serialize};
use timeslice_common::Timestamp;

use crate::error::{TemporalError, TemporalResult};

/// A single captured value and the time it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry<T> {
    pub at: Timestamp,
    pub value: T,
}

/// Timestamp-ordered snapshot history of one attribute.
///
/// Entries are owned copies: a recorded value can only be reached through
/// this history, and every read hands out a fresh clone. Isolation is only
/// as deep as `T::clone`; a `T` holding shared handles (`Rc<RefCell<_>>`,
/// `Arc<Mutex<_>>`) shares that state between snapshots and the live value.
///
/// # Invariants
/// - `entries` is sorted by `at`; equal timestamps keep recording order.
/// - Entries are never removed or modified after recording.
/// - `last_recorded` indexes the entry from the most recent `record` call.
#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    attribute: String,
    entries: Vec<SnapshotEntry<T>>,
    last_recorded: Option<usize>,
}

impl<T: Clone> SnapshotHistory<T> {
    /// Create an empty history for the named attribute.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            entries: Vec::new(),
            last_recorded: None,
        }
    }

    /// Record `value` as captured at `at`.
    ///
    /// Appends in the common case. A timestamp earlier than the last entry
    /// (clock stepped backwards) is inserted after every entry at or before
    /// it so lookups stay sorted.
    pub fn record(&mut self, at: Timestamp, value: T) {
        let index = match self.entries.last() {
            Some(last) if last.at > at => {
                tracing::warn!(
                    attribute = %self.attribute,
                    %at,
                    last = %last.at,
                    "snapshot timestamp earlier than latest entry, inserting in order"
                );
                self.entries.partition_point(|e| e.at <= at)
            }
            _ => self.entries.len(),
        };
        self.entries.insert(index, SnapshotEntry { at, value });
        self.last_recorded = Some(index);
        tracing::debug!(
            attribute = %self.attribute,
            %at,
            snapshots = self.entries.len(),
            "snapshot recorded"
        );
    }

    /// Value of the latest entry captured at or before `as_of`.
    ///
    /// Among entries sharing that timestamp the most recently recorded wins.
    pub fn resolve(&self, as_of: Timestamp) -> TemporalResult<T> {
        let index = self.index_at(as_of);
        tracing::trace!(attribute = %self.attribute, %as_of, ?index, "resolving as-of read");
        match index {
            Some(i) => Ok(self.entries[i].value.clone()),
            None => Err(TemporalError::NoSnapshotAvailable {
                attribute: self.attribute.clone(),
                as_of,
            }),
        }
    }

    /// Value of the most recently recorded entry, regardless of its timestamp.
    pub fn latest(&self) -> Option<T> {
        self.last_recorded.map(|i| self.entries[i].value.clone())
    }
}

impl<T> SnapshotHistory<T> {
    /// Name of the attribute this history belongs to.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position in [`entries`](Self::entries) of the snapshot an as-of read at
    /// `as_of` resolves to, `None` if every entry is later.
    pub fn index_at(&self, as_of: Timestamp) -> Option<usize> {
        self.entries
            .partition_point(|e| e.at <= as_of)
            .checked_sub(1)
    }

    /// Read-only access to all entries in timestamp order.
    pub fn entries(&self) -> &[SnapshotEntry<T>] {
        &self.entries
    }

    pub fn earliest_at(&self) -> Option<Timestamp> {
        self.entries.first().map(|e| e.at)
    }

    /// Highest capture time in the history.
    pub fn latest_at(&self) -> Option<Timestamp> {
        self.entries.last().map(|e| e.at)
    }
}
