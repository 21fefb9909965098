#![forbid(unsafe_code)]

//! Profile screen: one fetch, observed end to end.
//!
//! Runs a single load through [`Loader`], printing every lifecycle
//! transition the state cell publishes along the way.

use std::time::Duration;

use futures::executor::block_on;
use futures_timer::Delay;
use thiserror::Error;
use vane_core::{LoadState, source_fn};
use vane_runtime::Loader;

use crate::cli::Opts;

/// What the mock directory service returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

/// Failure surface of the mock directory service.
#[derive(Debug, Error)]
#[error("no profile for user {0}")]
pub struct UnknownUser(pub u64);

async fn fetch_profile(user_id: u64, latency: Duration) -> Result<UserProfile, UnknownUser> {
    Delay::new(latency).await;
    if user_id == 42 {
        Ok(UserProfile {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
        })
    } else {
        Err(UnknownUser(user_id))
    }
}

pub fn run(opts: &Opts) {
    let latency = Duration::from_millis(opts.latency_ms);
    let loader = Loader::new(source_fn(move || fetch_profile(42, latency)));
    let _tap = loader.subscribe(|state| println!("  -> {}", describe(state)));

    println!(
        "Fetching profile for user 42 ({}ms simulated latency)",
        opts.latency_ms
    );
    block_on(loader.load());

    println!();
    println!("Final state: {}", describe(&loader.state()));
}

fn describe(state: &LoadState<UserProfile>) -> String {
    state.clone().fold(
        || "idle".to_string(),
        || "loading".to_string(),
        |profile| format!("ready: {} <{}>", profile.name, profile.email),
        |error| format!("failed: {error}"),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::pin::pin;
    use std::rc::Rc;
    use std::task::Context;

    use super::*;

    #[test]
    fn fetch_suspends_while_latency_elapses() {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut fut = pin!(fetch_profile(42, Duration::from_secs(60)));
        // The latency is awaited, not slept through: the future parks
        // until the timer fires instead of stalling the executor.
        assert!(fut.as_mut().poll(&mut cx).is_pending());
    }

    #[test]
    fn known_user_resolves_to_john_doe() {
        let profile = block_on(fetch_profile(42, Duration::ZERO)).unwrap();
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.email, "john.doe@example.com");
    }

    #[test]
    fn unknown_user_is_a_displayable_error() {
        let error = block_on(fetch_profile(7, Duration::ZERO)).unwrap_err();
        assert_eq!(error.to_string(), "no profile for user 7");
    }

    #[test]
    fn load_publishes_loading_then_ready_transcript() {
        let loader = Loader::new(source_fn(|| fetch_profile(42, Duration::ZERO)));
        let events = Rc::new(RefCell::new(Vec::new()));
        let _tap = loader.subscribe({
            let events = events.clone();
            move |state| events.borrow_mut().push(describe(state))
        });

        block_on(loader.load());

        assert_eq!(
            *events.borrow(),
            vec![
                "loading".to_string(),
                "ready: John Doe <john.doe@example.com>".to_string(),
            ]
        );
    }
}
