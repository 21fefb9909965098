#![forbid(unsafe_code)]

//! Screen registry for the demo showcase.
//!
//! Each screen is a self-contained console walkthrough of one part of the
//! reactive load pipeline. Screens are addressed by name or 1-based index.

pub mod dual_counter;
pub mod flaky;
pub mod profile;
pub mod races;

use crate::cli::Opts;

/// A runnable demo screen.
pub struct ScreenEntry {
    /// Stable name used by `--screen=NAME`.
    pub name: &'static str,
    /// One-line description shown by `--list`.
    pub blurb: &'static str,
    /// Entry point.
    pub run: fn(&Opts),
}

/// All screens, in display order.
pub fn screen_registry() -> Vec<ScreenEntry> {
    vec![
        ScreenEntry {
            name: "profile",
            blurb: "Fetch a user profile through the full load lifecycle",
            run: profile::run,
        },
        ScreenEntry {
            name: "counter",
            blurb: "Field-level selectors and suppressed notifications",
            run: dual_counter::run,
        },
        ScreenEntry {
            name: "flaky",
            blurb: "Retry a failing source until it recovers",
            run: flaky::run,
        },
        ScreenEntry {
            name: "races",
            blurb: "Overlapping loads and last-write-wins settlement",
            run: races::run,
        },
    ]
}

/// Look up a screen by name or 1-based index.
pub fn find(key: &str) -> Option<ScreenEntry> {
    let registry = screen_registry();
    if let Ok(index) = key.parse::<usize>() {
        if index >= 1 && index <= registry.len() {
            return registry.into_iter().nth(index - 1);
        }
        return None;
    }
    registry.into_iter().find(|entry| entry.name == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_unique() {
        let registry = screen_registry();
        for (i, a) in registry.iter().enumerate() {
            for b in registry.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn find_by_name() {
        assert_eq!(find("counter").map(|entry| entry.name), Some("counter"));
    }

    #[test]
    fn find_by_index_is_one_based() {
        assert_eq!(find("1").map(|entry| entry.name), Some("profile"));
        assert_eq!(find("4").map(|entry| entry.name), Some("races"));
    }

    #[test]
    fn find_rejects_out_of_range_indices() {
        assert!(find("0").is_none());
        assert!(find("5").is_none());
    }

    #[test]
    fn find_rejects_unknown_names() {
        assert!(find("dashboard").is_none());
    }
}
