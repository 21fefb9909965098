#![forbid(unsafe_code)]

//! The asynchronous data-source boundary.
//!
//! A [`Source`] produces one value per [`fetch`](Source::fetch) call, or
//! fails. Failures travel inside the returned `Result` — never as a panic
//! and never through a side channel — so the orchestrator's mapping into
//! lifecycle state is total.

use std::fmt;
use std::future::Future;

/// An asynchronous "fetch value or fail" boundary.
///
/// Implementations may be slow; callers treat the returned future as the
/// only suspension point of a load.
pub trait Source {
    /// Value produced by a successful fetch.
    type Output;
    /// Failure type; only its rendered form reaches the state cell.
    type Error: fmt::Display;

    /// Start one fetch attempt.
    fn fetch(&self) -> impl Future<Output = Result<Self::Output, Self::Error>>;
}

/// Adapter turning a closure into a [`Source`].
///
/// Built by [`source_fn`]; mostly useful in tests and demos where a full
/// repository type would be noise.
pub struct FnSource<F> {
    fetch: F,
}

/// Wrap `fetch` as a [`Source`].
///
/// ```
/// use vane_core::{LoadState, Source, source_fn};
///
/// let source = source_fn(|| async { Ok::<_, String>(42) });
/// let state = LoadState::from_result(futures::executor::block_on(source.fetch()));
/// assert_eq!(state, LoadState::Ready(42));
/// ```
pub fn source_fn<F, Fut, T, E>(fetch: F) -> FnSource<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    FnSource { fetch }
}

impl<F, Fut, T, E> Source for FnSource<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    type Output = T;
    type Error = E;

    fn fetch(&self) -> impl Future<Output = Result<T, E>> {
        (self.fetch)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[test]
    fn fn_source_forwards_ok() {
        let source = source_fn(|| async { Ok::<_, String>("value") });
        assert_eq!(block_on(source.fetch()), Ok("value"));
    }

    #[test]
    fn fn_source_forwards_err() {
        let source = source_fn(|| async { Err::<i32, _>("boom".to_string()) });
        assert_eq!(block_on(source.fetch()), Err("boom".to_string()));
    }

    #[test]
    fn each_fetch_is_a_fresh_attempt() {
        let calls = Cell::new(0u32);
        let source = source_fn(|| {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok::<_, String>(n) }
        });

        assert_eq!(block_on(source.fetch()), Ok(1));
        assert_eq!(block_on(source.fetch()), Ok(2));
        assert_eq!(calls.get(), 2);
    }
}
