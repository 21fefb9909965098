#![forbid(unsafe_code)]

//! Lifecycle state for one asynchronous load.
//!
//! [`LoadState<T>`] is the closed set of outcomes a load can be in at any
//! moment: it has not started, it is in flight, it produced a value, or it
//! failed. Views render from whichever variant is current; there is no
//! separate error channel.
//!
//! # Invariants
//!
//! 1. Exactly one variant is active at a time (enforced by the type).
//! 2. Equality is structural: same variant and same payload. This is what
//!    makes change suppression in the state cell correct.
//! 3. Payloads are reachable only through their own variant (`ready()`,
//!    `error()`, or an exhaustive `match`/[`fold`](LoadState::fold)); there
//!    is no way to ask a non-`Ready` state for data.
//! 4. [`from_result`](LoadState::from_result) is total: every `Ok` becomes
//!    `Ready`, every `Err` becomes `Failed` with the rendered message.

use std::fmt;

use crate::error::LoadError;

/// Progress of one asynchronous load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// No load has been requested yet.
    Idle,
    /// A load is in flight.
    Loading,
    /// The last load produced this value.
    Ready(T),
    /// The last load failed.
    Failed(LoadError),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    /// Shorthand for `Failed(LoadError::new(message))`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(LoadError::new(message))
    }

    /// Map a fetch result into the corresponding state.
    ///
    /// This is the single point where `Ok`/`Err` outcomes become lifecycle
    /// state; the error is rendered to its display form here and never
    /// travels further as a live value.
    #[must_use]
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(LoadError::new(err.to_string())),
        }
    }

    /// Whether no load has been requested yet.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the last load produced a value.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Whether the last load failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether the last load has finished, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }

    /// Variant name for log fields; avoids a `Debug` bound on `T`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }

    /// The loaded value, if this state is `Ready`.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if this state is `Failed`.
    #[must_use]
    pub const fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The loaded value by move, if this state is `Ready`.
    #[must_use]
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Map the `Ready` payload, carrying every other variant across as-is.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Idle => LoadState::Idle,
            Self::Loading => LoadState::Loading,
            Self::Ready(value) => LoadState::Ready(f(value)),
            Self::Failed(err) => LoadState::Failed(err),
        }
    }

    /// Exhaustive case analysis with one handler per variant.
    ///
    /// Every handler is mandatory; a new variant cannot be added without
    /// breaking every `fold` call site, which is the point.
    pub fn fold<R>(
        self,
        on_idle: impl FnOnce() -> R,
        on_loading: impl FnOnce() -> R,
        on_ready: impl FnOnce(T) -> R,
        on_failed: impl FnOnce(LoadError) -> R,
    ) -> R {
        match self {
            Self::Idle => on_idle(),
            Self::Loading => on_loading(),
            Self::Ready(value) => on_ready(value),
            Self::Failed(err) => on_failed(err),
        }
    }
}
