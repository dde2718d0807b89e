//! # Formats Module
//!
//! Import bundle definitions.

pub mod dataset;

pub use dataset::{Dataset, derive_tag_entries};
