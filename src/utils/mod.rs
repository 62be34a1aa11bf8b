// src/utils/mod.rs
//! Common utilities
//!
//! - **errors**: Crate-wide error type and Result alias
//! - **ids**: ULID-based identifier generation
//! - **time**: Epoch-millisecond clock helpers

pub mod errors;
pub mod ids;
pub mod time;

pub use errors::{RecorderError, Result};
