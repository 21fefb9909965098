#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo showcase.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `VANE_DEMO_*` prefix.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Vane Demo Showcase - Reactive Load Pipeline Walkthroughs

USAGE:
    vane-demo-showcase [OPTIONS]

OPTIONS:
    --screen=NAME        Screen to run, by name or 1-based index (default: profile)
    --latency-ms=N       Simulated fetch latency in milliseconds (default: 120)
    --fail-count=N       Failures before the flaky source recovers (default: 2)
    --list               List available screens and exit
    --help, -h           Show this help message
    --version, -V        Show version

SCREENS:
    1  Profile    Fetch a user profile through the full load lifecycle
    2  Counter    Field-level selectors and suppressed notifications
    3  Flaky      Retry a failing source until it recovers
    4  Races      Overlapping loads and last-write-wins settlement

ENVIRONMENT VARIABLES:
    VANE_DEMO_SCREEN         Override --screen (profile|counter|flaky|races)
    VANE_DEMO_LATENCY_MS     Override --latency-ms
    VANE_DEMO_FAIL_COUNT     Override --fail-count";

/// Parsed command-line options.
pub struct Opts {
    /// Screen name or 1-based index.
    pub screen: String,
    /// Simulated fetch latency in milliseconds.
    pub latency_ms: u64,
    /// Failures before the flaky source recovers.
    pub fail_count: u32,
    /// List screens instead of running one.
    pub list: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            screen: "profile".into(),
            latency_ms: 120,
            fail_count: 2,
            list: false,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Ok(val) = env::var("VANE_DEMO_SCREEN") {
            opts.screen = val;
        }
        if let Ok(val) = env::var("VANE_DEMO_LATENCY_MS")
            && let Ok(n) = val.parse()
        {
            opts.latency_ms = n;
        }
        if let Ok(val) = env::var("VANE_DEMO_FAIL_COUNT")
            && let Ok(n) = val.parse()
        {
            opts.fail_count = n;
        }

        // Parse command-line args (override env vars)
        let args: Vec<String> = env::args().skip(1).collect();
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("{HELP_TEXT}");
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("vane-demo-showcase {VERSION}");
                    process::exit(0);
                }
                "--list" => {
                    opts.list = true;
                }
                other => {
                    if let Some(val) = other.strip_prefix("--screen=") {
                        opts.screen = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--latency-ms=") {
                        match val.parse() {
                            Ok(n) => opts.latency_ms = n,
                            Err(_) => {
                                eprintln!("Invalid --latency-ms value: {val}");
                                process::exit(1);
                            }
                        }
                    } else if let Some(val) = other.strip_prefix("--fail-count=") {
                        match val.parse() {
                            Ok(n) => opts.fail_count = n,
                            Err(_) => {
                                eprintln!("Invalid --fail-count value: {val}");
                                process::exit(1);
                            }
                        }
                    } else {
                        eprintln!("Unknown argument: {other}");
                        eprintln!("Run with --help for usage information.");
                        process::exit(1);
                    }
                }
            }
            i += 1;
        }

        opts
    }
}
