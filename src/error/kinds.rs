use std::{fmt, io, time::Duration};

/// Crate-wide `Result` type using [`AppError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Top-level error type for segment-export.
///
/// Each variant names the phase that failed; the wrapped kind carries the cause.
/// Every error is fatal to the invocation, nothing is retried internally.
#[derive(Debug)]
pub enum AppError {
    /// Configuration errors (detected before any network call).
    Config(ConfigError),

    /// GraphQL API call errors.
    Api(ApiError),

    /// CSV export errors.
    Export(ExportError),

    /// I/O errors outside the export loop.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Errors raised while executing the GraphQL request.
#[derive(Debug)]
pub enum ApiError {
    /// The deadline elapsed before a response was obtained.
    Timeout { after: Duration },

    /// Connection, TLS or other transport failure.
    Transport(String),

    /// Non-success HTTP status. The body is kept verbatim for diagnostics.
    Http { status: u16, body: String },

    /// The response body was not a valid GraphQL envelope.
    Decode(String),

    /// The server answered with application-level GraphQL errors.
    GraphQl { messages: Vec<String> },
}

/// Errors raised while writing the CSV report.
#[derive(Debug)]
pub enum ExportError {
    /// The deadline expired between rows. Rows already written are kept.
    Cancelled { rows_written: usize },

    /// Opening, writing or flushing the destination failed.
    Write(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {e}"),
            AppError::Api(e) => write!(f, "API request failed: {e}"),
            AppError::Export(e) => write!(f, "CSV export failed: {e}"),
            AppError::Io(e) => write!(f, "I/O error: {e}"),
            AppError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Timeout { after } => {
                write!(f, "operation timed out after {} seconds", after.as_secs_f64())
            }
            ApiError::Transport(msg) => write!(f, "HTTP request failed: {msg}"),
            ApiError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::Decode(msg) => write!(f, "failed to decode response: {msg}"),
            ApiError::GraphQl { messages } => {
                write!(f, "GraphQL errors: {}", messages.join("; "))
            }
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Cancelled { rows_written } => write!(
                f,
                "operation timed out during CSV export ({rows_written} rows written)"
            ),
            ExportError::Write(msg) => write!(f, "write failed: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Api(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::Io(e) => Some(e),
            AppError::Generic(_) => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for ApiError {}
impl std::error::Error for ExportError {}

impl AppError {
    /// Returns `true` if the deadline expired in either phase.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            AppError::Api(ApiError::Timeout { .. })
                | AppError::Export(ExportError::Cancelled { .. })
        )
    }
}

/* ========================= Conversions to AppError ========================= */

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Write(err.to_string())
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Write(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::InvalidFormat(err.to_string())
    }
}
