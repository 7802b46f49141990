//! HTTP request handlers
//!
//! Route handlers for account management and the image gallery, plus the
//! inline HTML pages they render.

pub mod account;
pub mod gallery;
pub mod pages;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use std::fmt;

/// Log the failure with context and answer with a generic transient message;
/// internals never reach the client.
pub(crate) fn internal_error(context: &str, err: &dyn fmt::Display) -> Response {
    error!("{}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong. Please try again.",
    )
        .into_response()
}
