#![forbid(unsafe_code)]

//! Core: load lifecycle state and the asynchronous data-source boundary.

pub mod error;
pub mod load_state;
pub mod source;

pub use error::LoadError;
pub use load_state::LoadState;
pub use source::{FnSource, Source, source_fn};
