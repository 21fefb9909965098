#![forbid(unsafe_code)]

//! Binary entry point for the Vane demo showcase.
//!
//! Dispatches to a screen from the registry and wires up log output.
//! Diagnostics are quiet by default; set `RUST_LOG=debug` to watch the
//! reactive internals while a screen runs.

mod cli;
mod screens;

use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    let opts = cli::Opts::parse();
    init_tracing();

    if opts.list {
        println!("Available screens:");
        for (index, entry) in screens::screen_registry().iter().enumerate() {
            println!("  {:>2}  {:<8} {}", index + 1, entry.name, entry.blurb);
        }
        return;
    }

    match screens::find(&opts.screen) {
        Some(entry) => {
            tracing::debug!(screen = entry.name, "screen selected");
            (entry.run)(&opts);
        }
        None => {
            eprintln!("Unknown screen: {}", opts.screen);
            eprintln!("Run with --list to see available screens.");
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
