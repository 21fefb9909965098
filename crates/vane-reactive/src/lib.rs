#![forbid(unsafe_code)]

//! Reactive state cells for Vane.
//!
//! This crate provides the change-tracking primitives the rest of Vane is
//! built on:
//!
//! - [`Observable`]: a shared, version-tracked value cell with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Reader`]: read-only handle to an [`Observable`]; read and subscribe,
//!   never write.
//! - [`Selector`]: derived observation of a projection of an [`Observable`],
//!   forwarding only when the projected value changes.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` callback references and
//! cleaned up lazily while snapshotting a notification cycle; strong
//! ownership of each callback lives in the [`Subscription`] guard returned
//! at registration.
//!
//! `Selector<U>` subscribes to its source via `Observable::subscribe()`,
//! recomputes the projection on every source notification, and re-notifies
//! its own subscribers only when the projection changed under its change
//! predicate.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version
//!    bump, no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. A selector never notifies while its projection is unchanged under its
//!    change predicate, and its subscribers observe at most as many events
//!    as the source publishes.
//! 6. A closed cell drops writes and new subscriptions silently; reads keep
//!    serving the final value.

pub mod observable;
pub mod selector;

pub use observable::{Observable, Reader, Subscription};
pub use selector::Selector;
