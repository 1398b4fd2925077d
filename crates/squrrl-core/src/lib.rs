//! squrrl-core
//!
//! Data model and single-pass loader for Open Library dumps: author and book
//! registries, the author-key and works decoders, the load orchestrator, and
//! validation of the column batches handed to the vector sink.
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod lang;
pub mod loader;
pub mod registry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
