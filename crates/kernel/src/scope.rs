use std::cell::Cell;
use std::rc::Rc;

use timeslice_common::Timestamp;

/// Shared as-of query time for one object graph.
///
/// Cloning the handle shares the underlying state: every store bound to a
/// clone sees the same query time. Independent scopes never affect each other.
/// The handle is `!Send` and `!Sync`; moving a graph to another thread means
/// building it there.
#[derive(Debug, Clone, Default)]
pub struct AsOfScope {
    state: Rc<ScopeState>,
}

#[derive(Debug, Default)]
struct ScopeState {
    as_of: Cell<Option<Timestamp>>,
    /// Number of guards whose frame is still open.
    depth: Cell<usize>,
}

impl AsOfScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active query time, `None` when reads resolve to live values.
    pub fn current(&self) -> Option<Timestamp> {
        self.state.as_of.get()
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// Number of open `enter` frames.
    pub fn depth(&self) -> usize {
        self.state.depth.get()
    }

    /// Whether two handles refer to the same scope state.
    pub fn shares_state_with(&self, other: &AsOfScope) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Switch reads to `as_of` until the returned guard is dropped.
    ///
    /// Dropping the guard restores exactly the value that was active before,
    /// including `None` and an outer scope's timestamp. `None` reads live
    /// values for the guard's lifetime.
    ///
    /// Frames close in stack order: dropping a guard also closes every frame
    /// entered after it, and a guard whose frame was already closed that way
    /// does nothing on drop.
    pub fn enter(&self, as_of: Option<Timestamp>) -> AsOfGuard {
        let saved = self.state.as_of.replace(as_of);
        let depth = self.state.depth.get();
        self.state.depth.set(depth + 1);
        tracing::debug!(?as_of, ?saved, depth, "entering as-of scope");
        AsOfGuard {
            scope: self.clone(),
            depth,
            saved,
        }
    }

    /// Run `body` with reads resolved as of `as_of`.
    ///
    /// The previous query time is restored when `body` returns, including
    /// when it returns an error or unwinds.
    pub fn with_as_of<R>(&self, as_of: Option<Timestamp>, body: impl FnOnce() -> R) -> R {
        let _guard = self.enter(as_of);
        body()
    }
}

/// Restores the prior query time of an [`AsOfScope`] on drop.
#[must_use = "the as-of scope is exited as soon as the guard is dropped"]
#[derive(Debug)]
pub struct AsOfGuard {
    scope: AsOfScope,
    depth: usize,
    saved: Option<Timestamp>,
}

impl AsOfGuard {
    /// The query time that will be restored on drop.
    pub fn restores_to(&self) -> Option<Timestamp> {
        self.saved
    }

    /// Whether this guard's frame is still open.
    pub fn is_open(&self) -> bool {
        self.scope.depth() > self.depth
    }
}

impl Drop for AsOfGuard {
    fn drop(&mut self) {
        if !self.is_open() {
            tracing::debug!(depth = self.depth, "as-of frame already closed by an outer guard");
            return;
        }
        tracing::debug!(restored = ?self.saved, depth = self.depth, "leaving as-of scope");
        self.scope.state.as_of.set(self.saved);
        self.scope.state.depth.set(self.depth);
    }
}
