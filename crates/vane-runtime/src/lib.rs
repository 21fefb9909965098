#![forbid(unsafe_code)]

//! Load orchestration for Vane.
//!
//! [`Loader`] owns one reactive state cell and drives it through the load
//! lifecycle: publish `Loading`, await the data source, publish the mapped
//! resolution. Consumers watch the cell read-only; the loader is its single
//! writer.

pub mod loader;

pub use loader::Loader;
