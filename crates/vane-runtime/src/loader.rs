#![forbid(unsafe_code)]

//! The load orchestrator: one data source driving one state cell.
//!
//! # Design
//!
//! [`Loader<S>`] owns an [`Observable`] holding a [`LoadState`] and is its
//! single writer. [`load()`](Loader::load) publishes `Loading`, awaits the
//! source's fetch (the only suspension point), maps the result through
//! [`LoadState::from_result`], and publishes the outcome. Consumers reach
//! the cell through [`watch()`](Loader::watch) or the forwarding subscribe
//! and select methods; nothing outside the loader can write it.
//!
//! Overlapping `load()` calls are raced deliberately: each call publishes
//! its own `Loading` (gated away while already loading) and its own
//! resolution, and the last resolution to land wins. There is no request
//! de-duplication and no cancellation.
//!
//! # Invariants
//!
//! 1. State only moves `Idle -> Loading -> Ready | Failed`, plus
//!    `Ready | Failed -> Loading` on refresh.
//! 2. One `Loading` notification per quiet-to-loading edge; publishing
//!    `Loading` while already loading is suppressed by the cell's
//!    equality gate.
//! 3. Source failures become `Failed` state, never a panic or an error
//!    return out of `load()`.
//! 4. After [`dispose()`](Loader::dispose) (or drop), late resolutions are
//!    swallowed by the closed cell: no write, no notification, no fault.
//!
//! # Failure Modes
//!
//! - **Fetch future never resolves**: the cell stays `Loading`; a later
//!   `load()` call can still refresh past it.
//! - **Two loads in flight**: both resolutions are published in completion
//!   order; subscribers see the earlier one replaced by the later.
//! - **Consumer holds a stale snapshot**: reads are point-in-time clones;
//!   subscribe for currency.

use std::fmt;

use vane_core::{LoadState, Source};
use vane_reactive::{Observable, Reader, Selector, Subscription};

/// Orchestrates one asynchronous data source into a reactive state cell.
///
/// The loader is the cell's single writer. Everything it hands out —
/// snapshots, readers, subscriptions, selectors — is read-only.
pub struct Loader<S: Source> {
    source: S,
    state: Observable<LoadState<S::Output>>,
}

impl<S: Source> Loader<S>
where
    S::Output: Clone + PartialEq + 'static,
{
    /// Create a loader over `source`, starting in [`LoadState::Idle`].
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Observable::new(LoadState::Idle),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LoadState<S::Output> {
        self.state.get()
    }

    /// Read-only handle to the state cell.
    #[must_use]
    pub fn watch(&self) -> Reader<LoadState<S::Output>> {
        self.state.reader()
    }

    /// Register a callback on every published state change.
    ///
    /// Same delivery contract as [`Observable::subscribe`].
    pub fn subscribe(&self, callback: impl Fn(&LoadState<S::Output>) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    /// Observe a projection of the state. See [`Observable::select`].
    #[must_use]
    pub fn select<U>(&self, project: impl Fn(&LoadState<S::Output>) -> U + 'static) -> Selector<U>
    where
        U: Clone + PartialEq + 'static,
    {
        self.state.select(project)
    }

    /// Observe a projection with a custom change predicate. See
    /// [`Observable::select_by`].
    #[must_use]
    pub fn select_by<U>(
        &self,
        project: impl Fn(&LoadState<S::Output>) -> U + 'static,
        changed: impl Fn(&U, &U) -> bool + 'static,
    ) -> Selector<U>
    where
        U: Clone + 'static,
    {
        self.state.select_by(project, changed)
    }

    /// Run one load: publish `Loading`, await the fetch, publish the
    /// mapped result.
    ///
    /// Completes without error regardless of the fetch outcome; failures
    /// land in the state as [`LoadState::Failed`]. Calling `load` again
    /// while a fetch is pending races the resolutions: last write wins.
    pub async fn load(&self) {
        self.state.set(LoadState::Loading);
        let result = self.source.fetch().await;
        let next = LoadState::from_result(result);
        tracing::debug!(state = next.name(), "load settled");
        self.state.set(next);
    }

    /// Close the state cell, releasing every subscriber and selector.
    ///
    /// Idempotent. A fetch still in flight keeps running; its resolution
    /// is dropped by the closed cell.
    pub fn dispose(&self) {
        self.state.close();
    }

    /// Whether [`dispose()`](Self::dispose) has run (directly or via
    /// drop).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.is_closed()
    }
}

impl<S: Source> Drop for Loader<S> {
    fn drop(&mut self) {
        self.state.close();
    }
}

impl<S: Source> fmt::Debug for Loader<S>
where
    S::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
