//! HTTP server
//!
//! Owns startup (config, database checks, upload root), the router, and the
//! shared application state.

pub mod core;

pub use core::{AppState, Server};
