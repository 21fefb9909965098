#![forbid(unsafe_code)]

//! Observable value cells with equality-gated change notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value, a version counter, and an ordered
//! subscriber list in shared, reference-counted storage. Writes go through
//! [`set()`](Observable::set), which drops the write wholesale when the new
//! value compares equal to the current one; only accepted writes bump the
//! version and notify subscribers.
//!
//! Subscribers are held behind `Weak` references. The strong reference
//! lives in the [`Subscription`] guard returned by
//! [`subscribe()`](Observable::subscribe), so releasing the guard is enough
//! to stop delivery even when eager removal is not possible. Dead entries
//! are pruned lazily while snapshotting a notification cycle.
//!
//! [`Reader<T>`] is the handle given to consumers: read and subscribe,
//! never write. Mutation stays with whoever created the cell.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 per accepted (value-changing) write.
//! 2. A write equal to the current value is dropped whole: no version bump,
//!    no callbacks.
//! 3. Callbacks run synchronously inside `set`, in subscription order, over
//!    a snapshot taken when the write is accepted; registrations and
//!    removals during a cycle take effect the next cycle.
//! 4. Dropping a [`Subscription`] (or the callback's last strong reference)
//!    prevents any delivery after the in-flight cycle.
//! 5. After [`close()`](Observable::close), writes and new subscriptions are
//!    silent no-ops; reads keep serving the final value.
//!
//! # Failure Modes
//!
//! - **Callback panics**: the value and version are already committed; the
//!   remaining callbacks of that cycle are skipped by the unwind. The cell
//!   itself stays consistent and unborrowed.
//! - **Cell dropped while a `Subscription` lives**: the guard's cleanup
//!   finds no cell to update and does nothing.
//! - **Unsubscribe from inside a callback**: removal misses the in-flight
//!   snapshot; the current cycle still delivers to every callback captured
//!   at its start.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::selector::Selector;

// ─── Subscriber registry ─────────────────────────────────────────────────────

/// Monotonic handle for one registered callback.
pub(crate) type SubscriberId = u64;

struct Entry<T> {
    id: SubscriberId,
    callback: Weak<dyn Fn(&T)>,
}

/// Ordered registry of weak subscriber callbacks.
///
/// The same closure may be registered any number of times; each registration
/// gets its own id and is removable on its own.
pub(crate) struct SubscriberList<T> {
    entries: Vec<Entry<T>>,
    next_id: SubscriberId,
}

impl<T> SubscriberList<T> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a callback, returning its removal id.
    pub(crate) fn add(&mut self, callback: &Rc<dyn Fn(&T)>) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            callback: Rc::downgrade(callback),
        });
        id
    }

    /// Remove a callback by id. Unknown ids are a silent no-op.
    pub(crate) fn remove(&mut self, id: SubscriberId) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Upgrade every live callback, pruning dead entries in place.
    ///
    /// The returned vector preserves registration order and holds strong
    /// references, so the callbacks survive for the length of one
    /// notification cycle even if their guards are dropped mid-cycle.
    pub(crate) fn snapshot(&mut self) -> Vec<Rc<dyn Fn(&T)>> {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|entry| match entry.callback.upgrade() {
            Some(callback) => {
                live.push(callback);
                true
            }
            None => false,
        });
        live
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries whose callback is still alive.
    pub(crate) fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.callback.strong_count() > 0)
            .count()
    }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// RAII guard for one registered callback.
///
/// Dropping the guard (or calling
/// [`unsubscribe()`](Subscription::unsubscribe)) releases the callback's
/// strong reference and removes its registry entry. Removal is idempotent:
/// releasing a guard whose entry is already gone does nothing.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// A guard that was never wired to a registry (e.g. subscribing to a
    /// closed cell). Dropping it does nothing.
    pub(crate) const fn inert() -> Self {
        Self { cleanup: None }
    }

    /// Whether this guard still holds a registered callback.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Explicitly release the callback. Equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// ─── Observable ──────────────────────────────────────────────────────────────

/// Shared interior for [`Observable<T>`].
struct ObservableInner<T> {
    /// Current value.
    value: T,
    /// Monotonically increasing version, bumped on each accepted write.
    version: u64,
    /// Closed cells drop writes and new subscriptions.
    closed: bool,
    /// Registered change callbacks, in subscription order.
    subscribers: SubscriberList<T>,
}

/// A shared, version-tracked value cell with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. `version()` counts accepted writes exactly.
/// 2. `set()` with a value equal to the current one notifies nobody.
/// 3. Notification order is subscription order, over a stable snapshot.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("closed", &inner.closed)
            .finish()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    /// Create a cell holding `value`, at version 0, with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                closed: false,
                subscribers: SubscriberList::new(),
            })),
        }
    }

    /// Access the current value by reference without cloning.
    ///
    /// # Panics
    ///
    /// Panics if `f` writes back into the same cell (`set`/`update`).
    /// Reads are fine.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let inner = self.inner.borrow();
        f(&inner.value)
    }

    /// Number of accepted writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Whether [`close()`](Self::close) has been called on any handle.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    /// Close the cell: release every subscriber and drop all future writes.
    ///
    /// Reads (`get`, `with`, `version`) keep working on the final value.
    /// Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.subscribers.clear();
        #[cfg(feature = "tracing")]
        log_closed(inner.version);
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.live_count()
    }

    /// A read-only handle onto the same cell.
    #[must_use]
    pub fn reader(&self) -> Reader<T> {
        Reader {
            inner: self.clone(),
        }
    }

    /// A non-owning read handle for delivery-time access to the live value.
    pub(crate) fn weak(&self) -> WeakCell<T> {
        WeakCell {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Clone> Observable<T> {
    /// Get a clone of the current value. Non-blocking, never fails.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Replace the current value, notifying subscribers of the change.
    ///
    /// If `value` compares equal to the current value the write is dropped
    /// whole: no version bump, no notifications. Writes to a closed cell
    /// are dropped the same way.
    ///
    /// Callbacks run synchronously, in subscription order, over a snapshot
    /// of the subscriber list taken when the write is accepted. A callback
    /// that subscribes or unsubscribes affects the next cycle, not this one.
    pub fn set(&self, value: T) {
        let (snapshot, current) = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                #[cfg(feature = "tracing")]
                log_write_dropped("closed", inner.version);
                return;
            }
            if inner.value == value {
                #[cfg(feature = "tracing")]
                log_write_dropped("unchanged", inner.version);
                return;
            }
            inner.value = value;
            inner.version += 1;
            #[cfg(feature = "tracing")]
            log_write_accepted(inner.version, inner.subscribers.live_count());
            (inner.subscribers.snapshot(), inner.value.clone())
        };
        // Borrow released: callbacks may freely read or write the cell.
        for callback in &snapshot {
            callback(&current);
        }
    }

    /// Clone the current value, let `f` modify it, and write it back.
    ///
    /// Goes through [`set()`](Self::set), so a modification that leaves the
    /// value equal to the original notifies nobody.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Register `callback` to run after every accepted write.
    ///
    /// The callback receives a reference to the freshly stored value. The
    /// same closure may be registered more than once; each registration is
    /// delivered and removed independently. Subscribing to a closed cell
    /// returns an inert guard and the callback never runs.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&T)> = Rc::new(callback);
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return Subscription::inert();
            }
            inner.subscribers.add(&callback)
        };
        let weak_inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            // Holds the only strong reference: dropping it below guarantees
            // the callback misses every later snapshot even if eager
            // removal is skipped.
            let _callback = callback;
            if let Some(cell) = weak_inner.upgrade()
                && let Ok(mut inner) = cell.try_borrow_mut()
            {
                inner.subscribers.remove(id);
            }
        })
    }

    /// Observe a projection of this cell.
    ///
    /// The selector re-notifies its own subscribers only when the projected
    /// value changes (structural inequality).
    #[must_use]
    pub fn select<U>(&self, project: impl Fn(&T) -> U + 'static) -> Selector<U>
    where
        U: Clone + PartialEq + 'static,
    {
        Selector::new(self, project)
    }

    /// Observe a projection with a custom change predicate.
    ///
    /// `changed` receives `(previous, next)` and returns true when the
    /// projection should count as changed and subscribers be notified.
    #[must_use]
    pub fn select_by<U>(
        &self,
        project: impl Fn(&T) -> U + 'static,
        changed: impl Fn(&U, &U) -> bool + 'static,
    ) -> Selector<U>
    where
        U: Clone + 'static,
    {
        Selector::with_compare(self, project, changed)
    }
}

// ─── Weak cell access ────────────────────────────────────────────────────────

/// Weak read handle onto an [`Observable`]'s interior.
///
/// Used by selectors to re-read the cell's value while a notification is
/// being delivered, without extending the cell's lifetime the way a full
/// handle would.
pub(crate) struct WeakCell<T> {
    inner: Weak<RefCell<ObservableInner<T>>>,
}

impl<T> WeakCell<T> {
    /// Borrow the live value, or `None` when the cell is gone.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let cell = self.inner.upgrade()?;
        let inner = cell.borrow();
        Some(f(&inner.value))
    }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Read-only handle to an [`Observable`].
///
/// Obtained from [`Observable::reader`]. Exposes reads and subscriptions;
/// mutation stays with the owning side. Cloning a `Reader` observes the
/// same cell.
pub struct Reader<T> {
    inner: Observable<T>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Reader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reader").field(&self.inner).finish()
    }
}

impl<T> Reader<T> {
    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.with(f)
    }

    /// Number of accepted writes since the cell was created.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version()
    }

    /// Whether the underlying cell has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl<T: Clone> Reader<T> {
    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.get()
    }
}

impl<T: Clone + PartialEq + 'static> Reader<T> {
    /// Register `callback` to run after every accepted write.
    ///
    /// Same delivery contract as [`Observable::subscribe`].
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.subscribe(callback)
    }

    /// Observe a projection of the cell. See [`Observable::select`].
    #[must_use]
    pub fn select<U>(&self, project: impl Fn(&T) -> U + 'static) -> Selector<U>
    where
        U: Clone + PartialEq + 'static,
    {
        self.inner.select(project)
    }

    /// Observe a projection with a custom change predicate. See
    /// [`Observable::select_by`].
    #[must_use]
    pub fn select_by<U>(
        &self,
        project: impl Fn(&T) -> U + 'static,
        changed: impl Fn(&U, &U) -> bool + 'static,
    ) -> Selector<U>
    where
        U: Clone + 'static,
    {
        self.inner.select_by(project, changed)
    }
}

// ─── Tracing helpers ─────────────────────────────────────────────────────────

#[cfg(feature = "tracing")]
fn log_write_accepted(version: u64, subscribers: usize) {
    tracing::trace!(message = "observable.write", version, subscribers);
}

#[cfg(feature = "tracing")]
fn log_write_dropped(reason: &str, version: u64) {
    tracing::trace!(message = "observable.write_dropped", reason, version);
}

#[cfg(feature = "tracing")]
fn log_closed(version: u64) {
    tracing::debug!(message = "observable.closed", version);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
