//! Data model shared by the query builder, the API client and the exporter
//!
//! Every value here lives for a single invocation: it is built from the
//! resolved configuration or decoded from the API response, read, and dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Filter and sort parameters for one segment-members fetch
///
/// The filter expression and sort key are opaque to this crate; they are
/// handed to the remote API as-is and any syntax error is reported by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParameters {
    filter_query: String,
    limit: u32,
    sort_key: String,
    reverse: bool,
}

impl FetchParameters {
    /// Create fetch parameters
    ///
    /// # Arguments
    /// * `filter_query` - Segment filter expression, passed through verbatim
    /// * `limit` - Number of members to fetch, must be greater than zero
    /// * `sort_key` - Sort key understood by the remote API
    /// * `reverse` - Whether to reverse the sort order
    ///
    /// # Returns
    /// * `Result<Self, ConfigError>` - Parameters, or `InvalidValue` for a zero limit
    pub fn new(
        filter_query: impl Into<String>,
        limit: u32,
        sort_key: impl Into<String>,
        reverse: bool,
    ) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "first".to_string(),
                value: limit.to_string(),
            });
        }

        Ok(Self {
            filter_query: filter_query.into(),
            limit,
            sort_key: sort_key.into(),
            reverse,
        })
    }

    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }
}

/// One customer segment member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    /// Opaque platform identifier (e.g. `gid://shopify/Customer/1`)
    pub id: String,
    pub display_name: String,
    /// Default email address, if the customer has one
    pub email: Option<String>,
    /// Total amount spent, kept in decimal form end to end
    pub amount: Decimal,
    pub currency_code: String,
}

/// GraphQL request document: query text plus variables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEnvelope {
    pub query: String,
    pub variables: serde_json::Map<String, serde_json::Value>,
}

/// Application-level error reported in the GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationError {
    pub message: String,
}

/// Decoded GraphQL response
///
/// When `application_errors` is non-empty the records must be treated as
/// incomplete; the client turns such a response into an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub records: Vec<CustomerRecord>,
    pub application_errors: Vec<ApplicationError>,
}

impl ResponseEnvelope {
    pub fn has_errors(&self) -> bool {
        !self.application_errors.is_empty()
    }

    /// Error messages in the order the server reported them
    pub fn error_messages(&self) -> Vec<String> {
        self.application_errors
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_parameters_rejects_zero_limit() {
        let err = FetchParameters::new("tag:vip", 0, "amount_spent", true).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "first"));
    }

    #[test]
    fn test_fetch_parameters_accessors() {
        let params = FetchParameters::new("tag:vip", 10, "name", false).unwrap();
        assert_eq!(params.filter_query(), "tag:vip");
        assert_eq!(params.limit(), 10);
        assert_eq!(params.sort_key(), "name");
        assert!(!params.reverse());
    }

    #[test]
    fn test_response_envelope_error_messages() {
        let envelope = ResponseEnvelope {
            records: Vec::new(),
            application_errors: vec![
                ApplicationError {
                    message: "Throttled".to_string(),
                },
                ApplicationError {
                    message: "Invalid query".to_string(),
                },
            ],
        };
        assert!(envelope.has_errors());
        assert_eq!(envelope.error_messages(), vec!["Throttled", "Invalid query"]);
    }
}
