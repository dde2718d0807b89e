//! # imgtag
//!
//! The imgtag application: an axum HTTP API and a clap CLI over the
//! `imgtag-core` catalog engine.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
