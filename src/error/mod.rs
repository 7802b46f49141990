//! Error handling
//!
//! Defines error types and handling for the image hosting server.

pub mod types;

pub use types::*;
