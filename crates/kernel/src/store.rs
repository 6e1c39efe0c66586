use std::borrow::Cow;
use std::rc::Rc;

use timeslice_common::{Clock, Timestamp};

use crate::error::{TemporalError, TemporalResult};
use crate::history::SnapshotHistory;
use crate::scope::AsOfScope;

/// One tracked attribute: a live value plus its snapshot history.
///
/// The live value is produced lazily by the initializer on first access,
/// which also records the seed snapshot. Plain writes (`set`, `get_mut`)
/// change only the live value; `set_snapshot` and `snapshot_current` are the
/// only ways history grows.
///
/// Reads follow the bound [`AsOfScope`]: live when inactive, resolved from
/// history when active. Writes to the live value are rejected while the
/// scope is active.
///
/// Snapshots are isolated from the live value only if `T::clone` is a deep
/// copy. Owned data (`String`, `Vec`, plain structs) qualifies; a `T` built on
/// shared handles such as `Rc<RefCell<_>>` does not, and mutating through the
/// handle changes every snapshot that holds it.
pub struct TemporalStore<T> {
    name: String,
    live: Option<T>,
    history: SnapshotHistory<T>,
    initializer: Box<dyn Fn() -> T>,
    scope: AsOfScope,
    clock: Rc<dyn Clock>,
}

impl<T: Clone> TemporalStore<T> {
    /// Create an uninitialized store. `initializer` runs on first access only.
    pub fn new(
        name: impl Into<String>,
        scope: AsOfScope,
        clock: Rc<dyn Clock>,
        initializer: impl Fn() -> T + 'static,
    ) -> Self {
        let name = name.into();
        Self {
            history: SnapshotHistory::new(name.clone()),
            name,
            live: None,
            initializer: Box::new(initializer),
            scope,
            clock,
        }
    }

    /// Read the attribute.
    ///
    /// Outside an as-of scope this borrows the live value. Inside one it
    /// returns an owned copy of the snapshot in effect at the query time, or
    /// `NoSnapshotAvailable` if the query time precedes the seed snapshot.
    pub fn get(&mut self) -> TemporalResult<Cow<'_, T>> {
        if let Some(as_of) = self.scope.current() {
            self.ensure_live();
            return self.history.resolve(as_of).map(Cow::Owned);
        }
        Ok(Cow::Borrowed(&*self.ensure_live()))
    }

    /// Mutable access to the live value. Records nothing.
    pub fn get_mut(&mut self) -> TemporalResult<&mut T> {
        self.check_writable()?;
        Ok(self.ensure_live())
    }

    /// Overwrite the live value without recording a snapshot.
    pub fn set(&mut self, value: T) -> TemporalResult<()> {
        self.check_writable()?;
        *self.ensure_live() = value;
        Ok(())
    }

    /// Set the live value and record it as a snapshot taken now.
    ///
    /// Allowed inside an as-of scope: it appends to history and never
    /// rewrites what a past query time resolves to.
    pub fn set_snapshot(&mut self, value: T) -> Timestamp {
        self.ensure_live();
        let at = self.clock.now();
        self.history.record(at, value.clone());
        self.live = Some(value);
        at
    }

    /// Record the current live value as a snapshot taken now.
    pub fn snapshot_current(&mut self) -> Timestamp {
        let value = self.ensure_live().clone();
        let at = self.clock.now();
        self.history.record(at, value);
        at
    }

    fn ensure_live(&mut self) -> &mut T {
        let Self {
            name,
            live,
            history,
            initializer,
            clock,
            ..
        } = self;
        live.get_or_insert_with(|| {
            let value = initializer();
            let at = clock.now();
            tracing::debug!(attribute = %name, %at, "lazily initializing attribute");
            history.record(at, value.clone());
            value
        })
    }

    fn check_writable(&self) -> TemporalResult<()> {
        match self.scope.current() {
            Some(as_of) => Err(TemporalError::ReadOnlyUnderAsOf {
                attribute: self.name.clone(),
                as_of,
            }),
            None => Ok(()),
        }
    }
}

impl<T> TemporalStore<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the initializer has run.
    pub fn is_initialized(&self) -> bool {
        self.live.is_some()
    }

    pub fn history(&self) -> &SnapshotHistory<T> {
        &self.history
    }

    pub fn scope(&self) -> &AsOfScope {
        &self.scope
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TemporalStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalStore")
            .field("name", &self.name)
            .field("live", &self.live)
            .field("snapshots", &self.history.len())
            .field("as_of", &self.scope.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::Cell;
    use timeslice_common::ManualClock;

    fn rating_store(clock: &Rc<ManualClock>, scope: &AsOfScope) -> TemporalStore<String> {
        TemporalStore::new("credit_rating", scope.clone(), clock.clone(), || {
            "AAA".to_string()
        })
    }

    fn fixture() -> (Rc<ManualClock>, AsOfScope, TemporalStore<String>) {
        let clock = Rc::new(ManualClock::at_epoch());
        let scope = AsOfScope::new();
        let store = rating_store(&clock, &scope);
        (clock, scope, store)
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[test]
    fn initializer_runs_exactly_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let clock = Rc::new(ManualClock::at_epoch());
        let mut store = TemporalStore::new("count", AsOfScope::new(), clock, move || {
            counter.set(counter.get() + 1);
            50u32
        });
        assert_eq!(calls.get(), 0);
        assert!(!store.is_initialized());

        assert_eq!(*store.get().unwrap(), 50);
        assert_eq!(*store.get().unwrap(), 50);
        store.set(75).unwrap();
        *store.get_mut().unwrap() += 1;
        store.set_snapshot(100);
        store.snapshot_current();
        assert_eq!(*store.get().unwrap(), 100);

        assert_eq!(calls.get(), 1);
        assert!(store.is_initialized());
    }

    #[test]
    fn first_set_initializes_before_overwriting() {
        let (clock, _scope, mut store) = fixture();
        store.set("BB".into()).unwrap();
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history().resolve(clock.now()).unwrap(), "AAA");
        assert_eq!(*store.get().unwrap(), "BB");
    }

    #[test]
    fn first_get_seeds_history_at_now() {
        let (clock, _scope, mut store) = fixture();
        clock.advance(secs(7));
        assert!(store.history().is_empty());

        store.get().unwrap();
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history().earliest_at(), Some(clock.now()));
    }

    #[test]
    fn live_read_borrows_live_value() {
        let (_clock, _scope, mut store) = fixture();
        assert!(matches!(store.get().unwrap(), Cow::Borrowed(v) if v == "AAA"));
    }

    #[test]
    fn as_of_read_is_owned_copy() {
        let (clock, scope, mut store) = fixture();
        store.get().unwrap();
        let _guard = scope.enter(Some(clock.now()));
        {
            let mut read = store.get().unwrap();
            assert!(matches!(read, Cow::Owned(_)));
            read.to_mut().push_str("-modified");
        }
        assert_eq!(*store.get().unwrap(), "AAA");
    }

    #[test]
    fn plain_set_records_nothing_set_snapshot_records() {
        let (clock, scope, mut store) = fixture();
        store.get().unwrap();

        clock.advance(secs(1));
        store.set("X".into()).unwrap();
        assert_eq!(store.history().len(), 1);
        let at = clock.now();
        let seen = scope.with_as_of(Some(at), || store.get().map(Cow::into_owned));
        assert_eq!(seen.unwrap(), "AAA");

        clock.advance(secs(1));
        store.set_snapshot("X".into());
        assert_eq!(store.history().len(), 2);
        let at = clock.now();
        let seen = scope.with_as_of(Some(at), || store.get().map(Cow::into_owned));
        assert_eq!(seen.unwrap(), "X");
    }

    #[test]
    fn end_to_end_plain_write_then_snapshot() {
        let (clock, scope, mut store) = fixture();
        let t0 = clock.now();
        assert_eq!(*store.get().unwrap(), "AAA");

        let t1 = clock.advance(secs(1));
        store.set("AA+".into()).unwrap();
        assert_eq!(store.history().resolve(t1).unwrap(), "AAA");

        let t2 = clock.advance(secs(1));
        assert_eq!(store.set_snapshot("BBB".into()), t2);
        assert_eq!(store.history().resolve(t2).unwrap(), "BBB");
        assert_eq!(store.history().resolve(t1).unwrap(), "AAA");
        assert_eq!(store.history().resolve(t0).unwrap(), "AAA");

        // set_snapshot also replaces the live value
        assert_eq!(*store.get().unwrap(), "BBB");

        // a plain write after the snapshot shows live but not in history
        clock.advance(secs(1));
        store.set("AA+".into()).unwrap();
        assert_eq!(*store.get().unwrap(), "AA+");
        let at = clock.now();
        let historical = scope.with_as_of(Some(at), || store.get().map(Cow::into_owned));
        assert_eq!(historical.unwrap(), "BBB");
    }

    #[test]
    fn as_of_reads_select_by_phase() {
        let (clock, scope, mut store) = fixture();
        let t1 = clock.now();
        store.get().unwrap();
        let t2 = clock.advance(secs(10));
        store.set_snapshot("AA+".into());
        let t3 = clock.advance(secs(10));
        store.set_snapshot("AA".into());

        let mut read_at = |at| scope.with_as_of(Some(at), || store.get().map(Cow::into_owned));
        assert_eq!(read_at(t1).unwrap(), "AAA");
        assert_eq!(read_at(t2 - secs(1)).unwrap(), "AAA");
        assert_eq!(read_at(t2).unwrap(), "AA+");
        assert_eq!(read_at(t3 - secs(1)).unwrap(), "AA+");
        assert_eq!(read_at(t3).unwrap(), "AA");
        assert_eq!(read_at(t3 + secs(3600)).unwrap(), "AA");
    }

    #[test]
    fn pre_history_as_of_read_fails_with_attribute_name() {
        let (clock, scope, mut store) = fixture();
        clock.advance(secs(60));
        store.get().unwrap();

        let before = Timestamp::UNIX_EPOCH;
        let err = scope
            .with_as_of(Some(before), || store.get().map(Cow::into_owned))
            .unwrap_err();
        assert_eq!(
            err,
            TemporalError::NoSnapshotAvailable {
                attribute: "credit_rating".into(),
                as_of: before,
            }
        );
    }

    #[test]
    fn first_access_under_as_of_seeds_at_now() {
        let (clock, scope, mut store) = fixture();
        let past = clock.now();
        let now = clock.advance(secs(5));

        let err = scope.with_as_of(Some(past), || store.get().map(Cow::into_owned));
        assert!(matches!(err, Err(TemporalError::NoSnapshotAvailable { .. })));
        assert!(store.is_initialized());

        let ok = scope.with_as_of(Some(now), || store.get().map(Cow::into_owned));
        assert_eq!(ok.unwrap(), "AAA");
    }

    #[test]
    fn writes_rejected_under_as_of() {
        let (clock, scope, mut store) = fixture();
        store.get().unwrap();
        let at = clock.now();

        {
            let _guard = scope.enter(Some(at));
            let err = store.set("D".into()).unwrap_err();
            assert_eq!(
                err,
                TemporalError::ReadOnlyUnderAsOf {
                    attribute: "credit_rating".into(),
                    as_of: at,
                }
            );
            assert!(store.get_mut().is_err());
        }

        assert_eq!(*store.get().unwrap(), "AAA");
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn rejected_write_does_not_initialize() {
        let (clock, scope, mut store) = fixture();
        let _guard = scope.enter(Some(clock.now()));
        assert!(store.set("D".into()).is_err());
        assert!(!store.is_initialized());
        assert!(store.history().is_empty());
    }

    #[test]
    fn set_snapshot_allowed_under_as_of() {
        let (clock, scope, mut store) = fixture();
        store.get().unwrap();
        let past = clock.now();
        clock.advance(secs(1));

        let _guard = scope.enter(Some(past));
        store.set_snapshot("CCC".into());
        assert_eq!(store.history().len(), 2);
        // the past view is unchanged
        assert_eq!(*store.get().unwrap(), "AAA");
    }

    #[test]
    fn snapshots_are_isolated_from_in_place_mutation() {
        let clock = Rc::new(ManualClock::at_epoch());
        let scope = AsOfScope::new();
        let mut store: TemporalStore<Vec<Vec<u32>>> =
            TemporalStore::new("matrix", scope.clone(), clock.clone(), || vec![vec![0]]);

        let t0 = clock.now();
        store.get().unwrap();

        let t1 = clock.advance(secs(1));
        store.get_mut().unwrap()[0].push(1);
        store.snapshot_current();

        clock.advance(secs(1));
        store.get_mut().unwrap()[0].push(2);
        store.get_mut().unwrap().push(vec![9]);

        let mut read_at = |at| scope.with_as_of(Some(at), || store.get().map(Cow::into_owned));
        assert_eq!(read_at(t0).unwrap(), vec![vec![0]]);
        assert_eq!(read_at(t1).unwrap(), vec![vec![0, 1]]);
        assert_eq!(*store.get().unwrap(), vec![vec![0, 1, 2], vec![9]]);
    }

    #[test]
    fn shared_handle_values_share_state_across_snapshots() {
        use std::cell::RefCell;

        let clock = Rc::new(ManualClock::at_epoch());
        let scope = AsOfScope::new();
        let mut store: TemporalStore<Rc<RefCell<u32>>> =
            TemporalStore::new("shared", scope.clone(), clock.clone(), || {
                Rc::new(RefCell::new(1))
            });

        let t0 = clock.now();
        let handle: Rc<RefCell<u32>> = store.get().unwrap().into_owned();
        clock.advance(secs(1));
        *handle.borrow_mut() = 2;

        let past = scope.with_as_of(Some(t0), || store.get().map(Cow::into_owned));
        assert_eq!(*past.unwrap().borrow(), 2);
    }

    #[test]
    fn snapshot_of_caller_value_is_isolated() {
        let (clock, scope, mut store) = fixture();
        let mut mine = String::from("BB+");
        clock.advance(secs(1));
        let at = store.set_snapshot(mine.clone());
        mine.push_str("-changed");

        let seen = scope.with_as_of(Some(at), || store.get().map(Cow::into_owned));
        assert_eq!(seen.unwrap(), "BB+");
    }

    #[test]
    fn stores_sharing_a_scope_switch_together() {
        let clock = Rc::new(ManualClock::at_epoch());
        let scope = AsOfScope::new();
        let mut rating = rating_store(&clock, &scope);
        let mut employees = TemporalStore::new("employee_count", scope.clone(), clock.clone(), || 50);

        let t0 = clock.now();
        rating.get().unwrap();
        employees.get().unwrap();
        clock.advance(secs(1));
        rating.set_snapshot("A+".into());
        employees.set_snapshot(75);

        let _guard = scope.enter(Some(t0));
        assert_eq!(*rating.get().unwrap(), "AAA");
        assert_eq!(*employees.get().unwrap(), 50);
    }

    #[test]
    fn debug_shows_name_and_snapshot_count() {
        let (_clock, _scope, mut store) = fixture();
        store.get().unwrap();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("credit_rating"));
        assert!(dbg.contains("snapshots: 1"));
    }
}
