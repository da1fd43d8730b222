//! Wire shapes of the segment-members GraphQL response
//!
//! These mirror the JSON the API sends and are converted into the
//! [`crate::model`] types right after decoding.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;
use crate::model::{ApplicationError, CustomerRecord, ResponseEnvelope};

/// Lists may arrive as `null` as well as absent
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    data: Option<SegmentMembersData>,
    #[serde(default, deserialize_with = "null_as_empty")]
    errors: Vec<ApplicationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentMembersData {
    #[serde(default)]
    customer_segment_members: Option<MemberConnection>,
}

#[derive(Debug, Deserialize)]
struct MemberConnection {
    #[serde(default, deserialize_with = "null_as_empty")]
    edges: Vec<MemberEdge>,
}

#[derive(Debug, Deserialize)]
struct MemberEdge {
    node: MemberNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberNode {
    id: String,
    display_name: String,
    #[serde(default)]
    default_email_address: Option<EmailAddress>,
    amount_spent: MoneyV2,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoneyV2 {
    amount: Decimal,
    currency_code: String,
}

impl MemberNode {
    fn into_record(self) -> CustomerRecord {
        CustomerRecord {
            id: self.id,
            display_name: self.display_name,
            email: self.default_email_address.and_then(|e| e.email_address),
            amount: self.amount_spent.amount,
            currency_code: self.amount_spent.currency_code,
        }
    }
}

impl GraphqlResponse {
    /// Convert into a [`ResponseEnvelope`]
    ///
    /// A response without `data.customerSegmentMembers` is only acceptable
    /// when it carries application errors; otherwise it is malformed.
    pub(crate) fn into_envelope(self) -> Result<ResponseEnvelope, ApiError> {
        let connection = self.data.and_then(|d| d.customer_segment_members);

        let records = match connection {
            Some(conn) => conn
                .edges
                .into_iter()
                .map(|edge| edge.node.into_record())
                .collect(),
            None if !self.errors.is_empty() => Vec::new(),
            None => {
                return Err(ApiError::Decode(
                    "response is missing data.customerSegmentMembers".to_string(),
                ));
            }
        };

        Ok(ResponseEnvelope {
            records,
            application_errors: self.errors,
        })
    }
}

/// Decode a success-status response body
pub(crate) fn decode_response(body: &[u8]) -> Result<ResponseEnvelope, ApiError> {
    let response: GraphqlResponse =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    response.into_envelope()
}
