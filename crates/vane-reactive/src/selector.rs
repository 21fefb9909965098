#![forbid(unsafe_code)]

//! Derived observation of a projected slice of an [`Observable`].
//!
//! # Design
//!
//! [`Selector<U>`] narrows a source cell to the slice a consumer cares
//! about. It stores the projection of the source value at construction as
//! its baseline, re-projects from the cell's live value on every source
//! notification, and forwards to its own subscribers only when the
//! projection changed under its change predicate. The source cell never
//! learns about projections; the selector is an ordinary subscriber.
//!
//! Suppression composes with the source's own equality gate: a write the
//! source drops never reaches the selector, and a write the source accepts
//! is still dropped here when the projected slice is untouched. Consumers
//! therefore observe at most as many events as direct subscribers, usually
//! fewer.
//!
//! # Invariants
//!
//! 1. The baseline is the projection of the source value at construction;
//!    `version()` starts at 0.
//! 2. Each source notification recomputes the projection exactly once,
//!    from the value the cell holds at delivery time.
//! 3. Subscribers are notified iff `changed(&previous, &next)` returns
//!    true; the baseline and version advance only on forwarded changes.
//! 4. Forwarded notifications run in subscription order, over a stable
//!    snapshot, with the same mid-cycle semantics as the source cell.
//! 5. Dropping the last handle unregisters from the source; nothing is
//!    forwarded afterwards.
//!
//! # Failure Modes
//!
//! - **Projection panics**: the panic unwinds out of the source's `set`
//!   call; the baseline is untouched because the predicate never ran.
//! - **Projection writes the cell**: panics, same as [`Observable::with`];
//!   projections are reads.
//! - **Predicate never true**: subscribers simply never fire;
//!   [`current()`](Selector::current) keeps serving the baseline.
//! - **Source closed or dropped**: the upstream callback is released; the
//!   selector keeps serving its last forwarded value and stays safe to
//!   drop.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::observable::{Observable, SubscriberList, Subscription};

/// Shared interior for [`Selector<U>`].
struct SelectorInner<U> {
    /// Last forwarded projection (or the construction baseline).
    current: U,
    /// Bumped once per forwarded change.
    version: u64,
    /// Change predicate: `(previous, next) -> true` means notify.
    changed: Box<dyn Fn(&U, &U) -> bool>,
    /// Downstream callbacks, in subscription order.
    subscribers: SubscriberList<U>,
    /// Guard keeping the upstream callback registered. Never read after
    /// wiring, but must stay alive with the selector.
    _source: Option<Subscription>,
}

/// A derived observable carrying one projection of a source cell.
///
/// Cloning a `Selector` creates a new handle to the **same** inner state;
/// the upstream registration is released when the last handle drops.
pub struct Selector<U> {
    inner: Rc<RefCell<SelectorInner<U>>>,
}

impl<U> Clone for Selector<U> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<U: fmt::Debug> fmt::Debug for Selector<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Selector")
            .field("current", &inner.current)
            .field("version", &inner.version)
            .finish()
    }
}

impl<U: Clone + 'static> Selector<U> {
    /// Observe `project` over `source`, forwarding on structural change.
    ///
    /// Equivalent to [`with_compare`](Self::with_compare) with the
    /// predicate `|prev, next| prev != next`.
    #[must_use]
    pub fn new<T>(source: &Observable<T>, project: impl Fn(&T) -> U + 'static) -> Self
    where
        U: PartialEq,
        T: Clone + PartialEq + 'static,
    {
        Self::with_compare(source, project, |prev, next| prev != next)
    }

    /// Observe `project` over `source` with a custom change predicate.
    ///
    /// The baseline is evaluated immediately from the source's current
    /// value. On each later source notification the projection is
    /// recomputed from the value the cell holds at that moment and
    /// `changed(&baseline, &next)` decides whether the baseline advances
    /// and subscribers fire. A false verdict leaves the baseline as it
    /// was, so a slow drift only fires once it crosses the predicate from
    /// the last *forwarded* value.
    #[must_use]
    pub fn with_compare<T: Clone + PartialEq + 'static>(
        source: &Observable<T>,
        project: impl Fn(&T) -> U + 'static,
        changed: impl Fn(&U, &U) -> bool + 'static,
    ) -> Self {
        let baseline = source.with(|value| project(value));
        let inner = Rc::new(RefCell::new(SelectorInner {
            current: baseline,
            version: 0,
            changed: Box::new(changed),
            subscribers: SubscriberList::new(),
            _source: None,
        }));

        // Weak wiring: the source callback must not keep the selector
        // alive, or dropped selectors would keep projecting forever. The
        // same goes for the source cell in the other direction.
        let weak_inner = Rc::downgrade(&inner);
        let weak_source = source.weak();
        let sub = source.subscribe(move |_| {
            let Some(cell) = weak_inner.upgrade() else {
                return;
            };
            // Re-project from the live value, not the delivered payload:
            // an earlier subscriber may have written the cell again
            // mid-cycle, and a stale redelivery must not move the
            // baseline backwards.
            let Some(next) = weak_source.with(|value| project(value)) else {
                return;
            };
            let snapshot = {
                let mut inner = cell.borrow_mut();
                if !(inner.changed)(&inner.current, &next) {
                    #[cfg(feature = "tracing")]
                    log_suppressed(inner.version);
                    return;
                }
                inner.current = next.clone();
                inner.version += 1;
                inner.subscribers.snapshot()
            };
            for callback in &snapshot {
                callback(&next);
            }
        });
        inner.borrow_mut()._source = Some(sub);

        Self { inner }
    }
}

impl<U> Selector<U> {
    /// Access the last forwarded projection by reference.
    pub fn with<R>(&self, f: impl FnOnce(&U) -> R) -> R {
        let inner = self.inner.borrow();
        f(&inner.current)
    }

    /// Number of forwarded changes since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of live downstream subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.live_count()
    }
}

impl<U: Clone> Selector<U> {
    /// Get a clone of the last forwarded projection.
    #[must_use]
    pub fn current(&self) -> U {
        self.inner.borrow().current.clone()
    }
}

impl<U: 'static> Selector<U> {
    /// Register `callback` to run on every forwarded change.
    ///
    /// The callback receives a reference to the freshly forwarded
    /// projection. Delivery follows the same contract as
    /// [`Observable::subscribe`]: subscription order, stable snapshot,
    /// removal on guard drop.
    pub fn subscribe(&self, callback: impl Fn(&U) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&U)> = Rc::new(callback);
        let id = self.inner.borrow_mut().subscribers.add(&callback);
        let weak_inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            let _callback = callback;
            if let Some(cell) = weak_inner.upgrade()
                && let Ok(mut inner) = cell.try_borrow_mut()
            {
                inner.subscribers.remove(id);
            }
        })
    }
}

#[cfg(feature = "tracing")]
fn log_suppressed(version: u64) {
    tracing::trace!(message = "selector.suppressed", version);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn baseline_from_construction() {
        let cell = Observable::new(10);
        let doubled = Selector::new(&cell, |v| v * 2);

        assert_eq!(doubled.current(), 20);
        assert_eq!(doubled.version(), 0);
    }

    #[test]
    fn forwards_only_on_projection_change() {
        let cell = Observable::new((0u32, 0u32));
        let first = cell.select(|&(a, _)| a);

        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = Rc::clone(&events);
        let _sub = first.subscribe(move |v| events_clone.borrow_mut().push(*v));

        // Second field changes: container notifies, selector stays silent.
        cell.set((0, 1));
        cell.set((0, 2));
        assert_eq!(cell.version(), 2);
        assert_eq!(first.version(), 0);
        assert!(events.borrow().is_empty());

        // First field changes: exactly one forwarded event.
        cell.set((5, 2));
        assert_eq!(*events.borrow(), vec![5]);
        assert_eq!(first.current(), 5);
        assert_eq!(first.version(), 1);
    }

    #[test]
    fn round_trip_on_other_field_is_fully_suppressed() {
        let cell = Observable::new((1u32, 0u32));
        let first = cell.select(|&(a, _)| a);
        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        let _sub = first.subscribe(move |_| fired_clone.set(fired_clone.get() + 1));

        // b walks away and back; a never moves. The container fires for
        // each accepted write, the selector for none of them.
        cell.set((1, 7));
        cell.set((1, 0));
        assert_eq!(cell.version(), 2);
        assert_eq!(fired.get(), 0);
        assert_eq!(first.current(), 1);

        // Selector is still live, not wedged.
        cell.set((2, 0));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn custom_predicate_gates_and_retains_baseline() {
        let cell = Observable::new(0i32);
        // Only jumps of at least 2 from the last forwarded value count.
        let coarse = cell.select_by(|v| *v, |prev, next| (next - prev).abs() >= 2);

        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = Rc::clone(&events);
        let _sub = coarse.subscribe(move |v| events_clone.borrow_mut().push(*v));

        cell.set(1); // |1 - 0| = 1: suppressed, baseline stays 0.
        assert_eq!(coarse.current(), 0);

        cell.set(2); // |2 - 0| = 2: forwarded, baseline becomes 2.
        cell.set(3); // |3 - 2| = 1: suppressed.
        cell.set(5); // |5 - 2| = 3: forwarded.

        assert_eq!(*events.borrow(), vec![2, 5]);
        assert_eq!(coarse.version(), 2);
        assert_eq!(coarse.current(), 5);
    }

    #[test]
    fn never_more_events_than_source() {
        let cell = Observable::new(0u32);
        let parity = cell.select(|v| v % 2);

        let source_events = Rc::new(Cell::new(0u32));
        let source_clone = Rc::clone(&source_events);
        let _direct = cell.subscribe(move |_| source_clone.set(source_clone.get() + 1));

        let selector_events = Rc::new(Cell::new(0u32));
        let selector_clone = Rc::clone(&selector_events);
        let _derived = parity.subscribe(move |_| selector_clone.set(selector_clone.get() + 1));

        for v in [1, 3, 5, 6, 8, 9, 9, 2] {
            cell.set(v);
        }
        assert!(selector_events.get() <= source_events.get());
        assert_eq!(source_events.get(), 7); // one write gated (9 -> 9)
        assert_eq!(selector_events.get(), 4); // parity flips at 1, 6, 9, 2
    }

    #[test]
    fn downstream_subscription_order_and_removal() {
        let cell = Observable::new(0);
        let identity = cell.select(|v| *v);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let s1 = identity.subscribe(move |_| o1.borrow_mut().push("first"));
        let o2 = Rc::clone(&order);
        let _s2 = identity.subscribe(move |_| o2.borrow_mut().push("second"));

        cell.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second"]);

        s1.unsubscribe();
        assert_eq!(identity.subscriber_count(), 1);
        cell.set(2);
        assert_eq!(*order.borrow(), vec!["first", "second", "second"]);
    }

    #[test]
    fn drop_selector_unregisters_from_source() {
        let cell = Observable::new(0);
        let identity = cell.select(|v| *v);
        assert_eq!(cell.subscriber_count(), 1);

        drop(identity);
        assert_eq!(cell.subscriber_count(), 0);

        // Late writes reach nobody and must not panic.
        cell.set(1);
    }

    #[test]
    fn dropped_selector_never_projects_again() {
        let cell = Observable::new(0);
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let identity = cell.select(move |v| {
            calls_clone.set(calls_clone.get() + 1);
            *v
        });

        cell.set(1);
        assert_eq!(calls.get(), 2); // baseline + one notification

        drop(identity);
        cell.set(2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn selector_on_closed_source_is_silent() {
        let cell = Observable::new(3);
        cell.close();

        let identity = cell.select(|v| *v);
        assert_eq!(identity.current(), 3);

        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        let _sub = identity.subscribe(move |_| fired_clone.set(fired_clone.get() + 1));

        cell.set(4);
        assert_eq!(fired.get(), 0);
        assert_eq!(identity.current(), 3);
    }

    #[test]
    fn close_after_construction_stops_forwarding() {
        let cell = Observable::new(0);
        let identity = cell.select(|v| *v);
        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        let _sub = identity.subscribe(move |_| fired_clone.set(fired_clone.get() + 1));

        cell.set(1);
        assert_eq!(fired.get(), 1);

        cell.close();
        cell.set(2);
        assert_eq!(fired.get(), 1);
        assert_eq!(identity.current(), 1);
    }

    #[test]
    fn selector_survives_source_drop() {
        let identity;
        {
            let cell = Observable::new(9);
            identity = cell.select(|v| *v);
        }
        assert_eq!(identity.current(), 9);
        let _sub = identity.subscribe(|_| {});
        drop(identity);
    }

    #[test]
    fn clone_shares_state() {
        let cell = Observable::new(1);
        let a = cell.select(|v| v * 10);
        let b = a.clone();

        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        let _sub = b.subscribe(move |_| fired_clone.set(fired_clone.get() + 1));

        cell.set(2);
        assert_eq!(a.current(), 20);
        assert_eq!(b.current(), 20);
        assert_eq!(a.version(), 1);
        assert_eq!(fired.get(), 1);

        // Upstream registration survives dropping one handle.
        drop(a);
        cell.set(3);
        assert_eq!(b.current(), 30);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn with_avoids_clone() {
        let cell = Observable::new(String::from("abc"));
        let length = cell.select(String::len);
        assert_eq!(length.with(|len| *len), 3);
    }

    #[test]
    fn projection_runs_once_per_source_event() {
        let cell = Observable::new(0);
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let identity = cell.select(move |v| {
            calls_clone.set(calls_clone.get() + 1);
            *v
        });
        let _a = identity.subscribe(|_| {});
        let _b = identity.subscribe(|_| {});

        cell.set(1);
        // One baseline evaluation plus one per accepted write, regardless
        // of downstream fan-out.
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn reentrant_source_write_mid_cycle_stays_in_sync() {
        let cell = Observable::new(0);

        // Registered ahead of the selector: bumps the cell again while the
        // first cycle is still delivering.
        let writer = cell.clone();
        let _bump = cell.subscribe(move |v| {
            if *v == 1 {
                writer.set(2);
            }
        });

        let identity = cell.select(|v| *v);
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = Rc::clone(&events);
        let _sub = identity.subscribe(move |v| events_clone.borrow_mut().push(*v));

        cell.set(1);

        // The nested cycle forwards 2; the outer cycle's stale payload
        // re-projects to the same value and is suppressed.
        assert_eq!(cell.get(), 2);
        assert_eq!(identity.current(), 2);
        assert_eq!(*events.borrow(), vec![2]);
        assert_eq!(identity.version(), 1);
    }

    #[test]
    fn debug_format() {
        let cell = Observable::new(5);
        let identity = cell.select(|v| *v);
        let dbg = format!("{:?}", identity);
        assert!(dbg.contains("Selector"));
        assert!(dbg.contains('5'));
    }
}
