#![forbid(unsafe_code)]

//! Vane public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.
//!
//! ```
//! use futures::executor::block_on;
//! use vane::prelude::*;
//!
//! let loader = Loader::new(source_fn(|| async { Ok::<_, String>("hello") }));
//! block_on(loader.load());
//! assert_eq!(loader.state().ready(), Some(&"hello"));
//! ```

pub mod prelude {
    pub use vane_core as core;
    pub use vane_reactive as reactive;
    pub use vane_runtime as runtime;

    pub use vane_core::{FnSource, LoadError, LoadState, Source, source_fn};
    pub use vane_reactive::{Observable, Reader, Selector, Subscription};
    pub use vane_runtime::Loader;
}
