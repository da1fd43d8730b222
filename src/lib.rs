//! segment-export library
//!
//! Fetches one page of customer segment members from a commerce platform's
//! GraphQL Admin API and writes them as a CSV report.
//!
//! # Modules
//!
//! - `query`: GraphQL request document builder
//! - `client`: API client with deadline handling and error classification
//! - `export`: CSV exporter for files and stdout
//! - `pipeline`: the fetch-and-export run tying the three together
//! - `deadline`: process-wide deadline and cancellation token
//! - `model`: records and envelopes shared by the components
//! - `config`: configuration loading and resolution
//! - `cli`: command-line interface
//! - `error`: error types and handling
//!
//! # Example
//!
//! ```no_run
//! use segment_export::{Config, RunSettings, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.api.domain = Some("my-shop.example.com".to_string());
//!     config.api.access_token = Some("token".to_string());
//!     config.fetch.output = "-".to_string();
//!
//!     let settings = RunSettings::resolve(&config)?;
//!     let summary = pipeline::run(&settings).await?;
//!     eprintln!("Exported {} customers", summary.exported);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod deadline;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod query;

// Re-export commonly used types
pub use client::{ApiClient, Endpoint};
pub use config::{Config, RunSettings};
pub use deadline::Deadline;
pub use error::{AppError, Result};
pub use export::{Destination, export};
pub use model::{CustomerRecord, FetchParameters, QueryEnvelope, ResponseEnvelope};
pub use pipeline::ExportSummary;
pub use query::build_query;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
