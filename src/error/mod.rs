//! Error handling for segment-export.
//!
//! Errors are grouped by the phase that raised them:
//! - [`ConfigError`]: configuration problems found before any network call
//! - [`ApiError`]: timeout, transport, HTTP status, decode and GraphQL failures
//! - [`ExportError`]: cancellation and write failures during CSV export
//!
//! All of them convert into the top-level [`AppError`], whose `Display`
//! output is meant to be shown to the user verbatim.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ApiError, AppError, ConfigError, ExportError, Result};
