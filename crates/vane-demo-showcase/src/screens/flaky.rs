#![forbid(unsafe_code)]

//! Flaky screen: recovery through repeated loads.
//!
//! The source fails a configurable number of times before it succeeds. Each
//! retry re-enters the lifecycle through `Loading`, so listeners see every
//! failed round as well as the eventual recovery.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::executor::block_on;
use futures_timer::Delay;
use thiserror::Error;
use vane_core::{LoadState, Source, source_fn};
use vane_runtime::Loader;

use crate::cli::Opts;

#[derive(Debug, Error)]
#[error("upstream timed out after {0}ms")]
pub struct Timeout(u64);

/// A source that fails `fail_count` times, then succeeds forever.
fn flaky_source(fail_count: u32, latency: Duration) -> impl Source<Output = String, Error = Timeout> {
    let remaining = Rc::new(Cell::new(fail_count));
    source_fn(move || {
        let remaining = remaining.clone();
        async move {
            Delay::new(latency).await;
            if remaining.get() > 0 {
                remaining.set(remaining.get() - 1);
                Err(Timeout(latency.as_millis() as u64))
            } else {
                Ok("fresh data".to_string())
            }
        }
    })
}

pub fn run(opts: &Opts) {
    let latency = Duration::from_millis(opts.latency_ms);
    let loader = Loader::new(flaky_source(opts.fail_count, latency));
    let _tap = loader.subscribe(|state| println!("  -> {}", describe(state)));

    let max_rounds = opts.fail_count + 1;
    for round in 1..=max_rounds {
        println!("Load attempt {round} of {max_rounds}");
        block_on(loader.load());
        if loader.state().is_ready() {
            break;
        }
    }

    println!();
    println!("Final state: {}", describe(&loader.state()));
}

fn describe(state: &LoadState<String>) -> String {
    state.clone().fold(
        || "idle".to_string(),
        || "loading".to_string(),
        |payload| format!("ready: {payload}"),
        |error| format!("failed: {error}"),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn recovers_after_configured_failures() {
        let loader = Loader::new(flaky_source(2, Duration::ZERO));
        let events = Rc::new(RefCell::new(Vec::new()));
        let _tap = loader.subscribe({
            let events = events.clone();
            move |state| events.borrow_mut().push(describe(state))
        });

        for _ in 0..3 {
            block_on(loader.load());
        }

        assert_eq!(
            *events.borrow(),
            vec![
                "loading".to_string(),
                "failed: upstream timed out after 0ms".to_string(),
                "loading".to_string(),
                "failed: upstream timed out after 0ms".to_string(),
                "loading".to_string(),
                "ready: fresh data".to_string(),
            ]
        );
        assert!(loader.state().is_ready());
    }

    #[test]
    fn zero_failures_succeeds_on_the_first_round() {
        let loader = Loader::new(flaky_source(0, Duration::ZERO));
        block_on(loader.load());
        assert_eq!(loader.state().ready(), Some(&"fresh data".to_string()));
    }

    #[test]
    fn stays_failed_while_failures_remain() {
        let loader = Loader::new(flaky_source(3, Duration::ZERO));
        block_on(loader.load());
        block_on(loader.load());
        assert!(loader.state().is_failed());
    }
}
