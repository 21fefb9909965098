#![forbid(unsafe_code)]

//! Races screen: overlapping loads without cancellation.
//!
//! Two loads run concurrently against a hand-resolved source. Neither is
//! cancelled; whichever resolution lands last owns the final state, no
//! matter which load started first.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use vane_core::{LoadState, Source};
use vane_runtime::Loader;

use crate::cli::Opts;

/// A source whose fetches resolve only when the driver says so.
///
/// Each fetch pops the next scripted channel in enqueue order, so the n-th
/// `load()` is bound to the n-th sender regardless of resolution order.
struct ScriptedSource {
    pending: Rc<RefCell<VecDeque<oneshot::Receiver<Result<String, String>>>>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            pending: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Script one future fetch, returning the sender that resolves it.
    fn enqueue(&self) -> oneshot::Sender<Result<String, String>> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push_back(rx);
        tx
    }
}

impl Source for ScriptedSource {
    type Output = String;
    type Error = String;

    fn fetch(&self) -> impl Future<Output = Result<String, String>> {
        // Pop eagerly so the binding happens at call time, not first poll.
        let rx = self.pending.borrow_mut().pop_front();
        async move {
            match rx {
                Some(rx) => match rx.await {
                    Ok(result) => result,
                    Err(_) => Err("script dropped the sender".to_string()),
                },
                None => Err("no scripted response left".to_string()),
            }
        }
    }
}

pub fn run(_opts: &Opts) {
    let source = ScriptedSource::new();
    let first_tx = source.enqueue();
    let second_tx = source.enqueue();

    let loader = Rc::new(Loader::new(source));
    let _tap = loader.subscribe(|state| println!("  -> {}", describe(state)));

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    for label in ["first", "second"] {
        let task = {
            let loader = loader.clone();
            async move { loader.load().await }
        };
        if spawner.spawn_local(task).is_err() {
            eprintln!("executor shut down before load '{label}' could start");
            return;
        }
        println!("started load '{label}'");
        pool.run_until_stalled();
    }

    println!("resolving 'second' while 'first' is still in flight");
    let _ = second_tx.send(Ok("payload from second".to_string()));
    pool.run_until_stalled();

    println!("resolving 'first' last, so it wins");
    let _ = first_tx.send(Ok("payload from first".to_string()));
    pool.run_until_stalled();

    println!();
    println!("Final state: {}", describe(&loader.state()));
}

fn describe(state: &LoadState<String>) -> String {
    match state {
        LoadState::Idle => "idle".to_string(),
        LoadState::Loading => "loading".to_string(),
        LoadState::Ready(payload) => format!("ready: {payload}"),
        LoadState::Failed(error) => format!("failed: {error}"),
    }
}
