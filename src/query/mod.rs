//! GraphQL query builder for customer segment members

use serde_json::{Map, Value};

use crate::model::{FetchParameters, QueryEnvelope};

/// Fixed document fetching one page of segment members
pub const SEGMENT_MEMBERS_QUERY: &str = r#"query GetCustomerSegmentMembers($first: Int!, $query: String!, $sortKey: String, $reverse: Boolean!) {
  customerSegmentMembers(first: $first, query: $query, sortKey: $sortKey, reverse: $reverse) {
    edges {
      node {
        id
        displayName
        defaultEmailAddress {
          emailAddress
        }
        amountSpent {
          amount
          currencyCode
        }
      }
    }
  }
}"#;

/// Build the request document for the given parameters
///
/// The variables map holds exactly `first`, `query`, `sortKey` and `reverse`,
/// copied from `params` without transformation.
pub fn build_query(params: &FetchParameters) -> QueryEnvelope {
    let mut variables = Map::new();
    variables.insert("first".to_string(), Value::from(params.limit()));
    variables.insert("query".to_string(), Value::from(params.filter_query()));
    variables.insert("sortKey".to_string(), Value::from(params.sort_key()));
    variables.insert("reverse".to_string(), Value::from(params.reverse()));

    QueryEnvelope {
        query: SEGMENT_MEMBERS_QUERY.to_string(),
        variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_hold_exactly_four_keys() {
        let params = FetchParameters::new("customer_tags CONTAINS 'vip'", 25, "amount_spent", true)
            .unwrap();
        let envelope = build_query(&params);

        let mut keys: Vec<&str> = envelope.variables.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["first", "query", "reverse", "sortKey"]);

        assert_eq!(envelope.variables["first"], json!(25));
        assert_eq!(envelope.variables["query"], json!("customer_tags CONTAINS 'vip'"));
        assert_eq!(envelope.variables["sortKey"], json!("amount_spent"));
        assert_eq!(envelope.variables["reverse"], json!(true));
    }

    #[test]
    fn test_filter_passed_through_verbatim() {
        // Not valid filter syntax; the builder must not care
        let raw = "customer_tags CONTAINS 'unterminated AND \"quotes\" \u{00e9}";
        let params = FetchParameters::new(raw, u32::MAX, "", false).unwrap();
        let envelope = build_query(&params);

        assert_eq!(envelope.variables["query"], json!(raw));
        assert_eq!(envelope.variables["first"], json!(u32::MAX));
        assert_eq!(envelope.variables["sortKey"], json!(""));
        assert_eq!(envelope.variables["reverse"], json!(false));
    }

    #[test]
    fn test_document_declares_all_variables() {
        for var in ["$first: Int!", "$query: String!", "$sortKey: String", "$reverse: Boolean!"] {
            assert!(SEGMENT_MEMBERS_QUERY.contains(var), "missing {var}");
        }
    }

    #[test]
    fn test_envelope_serializes_as_graphql_body() {
        let params = FetchParameters::new("tag:a", 1, "name", false).unwrap();
        let body = serde_json::to_value(build_query(&params)).unwrap();

        assert_eq!(body["query"], json!(SEGMENT_MEMBERS_QUERY));
        assert_eq!(
            body["variables"],
            json!({"first": 1, "query": "tag:a", "sortKey": "name", "reverse": false})
        );
    }
}
