//! GraphQL Admin API client
//!
//! Performs exactly one `POST` per call under the invocation [`Deadline`],
//! and classifies every failure into an [`ApiError`]:
//! - deadline expiry is `Timeout`, never a generic transport failure
//! - a non-success status is `Http` with the raw body, which is not parsed
//! - a body that is not a valid envelope is `Decode`
//! - a valid envelope carrying GraphQL errors is `GraphQl`; its records are dropped
//!
//! There are no retries; the first failure is returned to the caller.

mod wire;

use std::fmt;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, warn};

use crate::deadline::Deadline;
use crate::error::{ApiError, ConfigError, Result};
use crate::model::{QueryEnvelope, ResponseEnvelope};

/// Admin API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "2025-01";

/// Header carrying the access token when none is configured
pub const DEFAULT_AUTH_HEADER: &str = "X-Access-Token";

/// GraphQL endpoint of one store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    /// `https://{domain}/admin/api/{version}/graphql.json`
    pub fn for_domain(domain: &str, version: &str) -> Self {
        let domain = domain.trim();
        let host = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .unwrap_or(domain)
            .trim_end_matches('/');
        Self::with_base_url(&format!("https://{host}"), version)
    }

    /// Same path under an explicit scheme and host, e.g. a local test server
    pub fn with_base_url(base_url: &str, version: &str) -> Self {
        Self {
            url: format!(
                "{}/admin/api/{}/graphql.json",
                base_url.trim_end_matches('/'),
                version
            ),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// HTTP client for the segment-members query
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    auth_header: HeaderName,
}

impl ApiClient {
    /// Create a client sending the credential in `auth_header`
    ///
    /// # Returns
    /// * `Result<Self>` - Client, or a config error for an invalid header name
    pub fn new(auth_header: &str) -> Result<Self> {
        let auth_header =
            HeaderName::from_bytes(auth_header.as_bytes()).map_err(|_| {
                ConfigError::InvalidValue {
                    field: "api.auth_header".to_string(),
                    value: auth_header.to_string(),
                }
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("segment-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { http, auth_header })
    }

    /// Execute one GraphQL request
    ///
    /// # Arguments
    /// * `endpoint` - Store GraphQL endpoint
    /// * `credential` - Access token sent in the auth header
    /// * `envelope` - Query document and variables
    /// * `deadline` - Invocation deadline covering connect, send and receive
    ///
    /// # Returns
    /// * `Result<ResponseEnvelope>` - Envelope with no application errors, or the classified failure
    pub async fn execute(
        &self,
        endpoint: &Endpoint,
        credential: &str,
        envelope: &QueryEnvelope,
        deadline: &Deadline,
    ) -> Result<ResponseEnvelope> {
        let timeout = ApiError::Timeout {
            after: deadline.duration(),
        };
        if deadline.is_expired() {
            return Err(timeout.into());
        }

        let mut token = HeaderValue::from_str(credential).map_err(|_| {
            ConfigError::InvalidValue {
                field: "api.access_token".to_string(),
                value: "<redacted>".to_string(),
            }
        })?;
        token.set_sensitive(true);

        debug!("POST {}", endpoint);

        let request = self
            .http
            .post(endpoint.url())
            .header(self.auth_header.clone(), token)
            .timeout(deadline.remaining())
            .json(envelope);

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = deadline.expired() => {
                warn!("Deadline expired before the API responded");
                return Err(timeout.into());
            }
            result = exchange => result.map_err(|e| {
                if e.is_timeout() {
                    timeout
                } else {
                    ApiError::Transport(e.to_string())
                }
            })?,
        };

        debug!("API responded with status {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into());
        }

        let response = wire::decode_response(&body)?;
        if response.has_errors() {
            return Err(ApiError::GraphQl {
                messages: response.error_messages(),
            }
            .into());
        }

        info!("Fetched {} segment members", response.records.len());
        Ok(response)
    }
}
