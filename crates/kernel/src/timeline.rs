use std::rc::Rc;

use timeslice_common::{Clock, SystemClock, TimelineId, Timestamp};

use crate::scope::{AsOfGuard, AsOfScope};
use crate::store::TemporalStore;

/// The clock and as-of scope shared by one object graph.
///
/// A host type holds a `Timeline` next to its tracked attributes and declares
/// each attribute through [`Timeline::attribute`]. All attributes declared on
/// the same timeline switch to historical reads together.
///
/// ```ignore
/// struct Company {
///     timeline: Timeline,
///     credit_rating: TemporalStore<String>,
/// }
///
/// let timeline = Timeline::new();
/// let mut company = Company {
///     credit_rating: timeline.attribute("credit_rating", || "AAA".to_string()),
///     timeline,
/// };
/// let before = company.timeline.now();
/// company.credit_rating.set_snapshot("BB+".into());
/// let rating = company
///     .timeline
///     .with_as_of(Some(before), || company.credit_rating.get().map(|r| r.into_owned()));
/// ```
pub struct Timeline {
    id: TimelineId,
    scope: AsOfScope,
    clock: Rc<dyn Clock>,
}

impl Timeline {
    /// A timeline stamped by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        let id = TimelineId::new();
        tracing::debug!(timeline = %id.short(), "timeline created");
        Self {
            id,
            scope: AsOfScope::new(),
            clock,
        }
    }

    pub fn id(&self) -> TimelineId {
        self.id
    }

    pub fn scope(&self) -> &AsOfScope {
        &self.scope
    }

    /// Current time on this timeline's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Declare a tracked attribute bound to this timeline.
    pub fn attribute<T: Clone>(
        &self,
        name: impl Into<String>,
        initializer: impl Fn() -> T + 'static,
    ) -> TemporalStore<T> {
        let store = TemporalStore::new(name, self.scope.clone(), self.clock.clone(), initializer);
        tracing::trace!(timeline = %self.id.short(), attribute = store.name(), "attribute declared");
        store
    }

    /// See [`AsOfScope::enter`].
    pub fn enter(&self, as_of: Option<Timestamp>) -> AsOfGuard {
        self.scope.enter(as_of)
    }

    /// See [`AsOfScope::with_as_of`].
    pub fn with_as_of<R>(&self, as_of: Option<Timestamp>, body: impl FnOnce() -> R) -> R {
        self.scope.with_as_of(as_of, body)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("id", &self.id)
            .field("as_of", &self.scope.current())
            .finish()
    }
}
