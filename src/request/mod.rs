//! JSON request boundary: turns a request body into a [`QuotaQuery`] and
//! errors into response bodies.

use crate::error::{RequestError, ScrapeError};
use crate::models::QuotaQuery;
use crate::utils::current_year;
use serde::Deserialize;
use serde_json::{json, Value};

/// Incoming body. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotaRequest {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub include_details: Option<bool>,
}

impl QuotaRequest {
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Requires an origin or an order number; blank strings count as absent.
    pub fn into_query(self) -> Result<QuotaQuery, RequestError> {
        let origin = non_blank(self.origin);
        let order_number = non_blank(self.order_number);
        if origin.is_none() && order_number.is_none() {
            return Err(RequestError::MissingCriteria);
        }

        Ok(QuotaQuery {
            origin,
            order_number,
            year: self.year.unwrap_or_else(current_year),
            offset: self.offset.unwrap_or(0),
            include_details: self.include_details.unwrap_or(false),
        })
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse and validate a raw JSON body in one step.
pub fn parse_request(body: &str) -> Result<QuotaQuery, RequestError> {
    QuotaRequest::from_json(body)?.into_query()
}

// ── Error bodies ──────────────────────────────────────────────────────────────

pub fn bad_request_body(err: &RequestError) -> Value {
    match err {
        RequestError::MissingCriteria => json!({
            "error": err.to_string(),
            "examples": {
                "search_by_origin": {"origin": "MA"},
                "search_by_order": {"order_number": "091100"},
                "search_by_both": {"origin": "MA", "order_number": "091100"}
            }
        }),
        RequestError::InvalidJson(_) => json!({ "error": err.to_string() }),
    }
}

pub fn failure_body(err: &ScrapeError) -> Value {
    json!({ "error": err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_full_request() {
        let query = assert_ok!(parse_request(
            r#"{"origin": "MA", "order_number": "091100", "year": 2026, "include_details": true}"#
        ));
        assert_eq!(
            query,
            QuotaQuery {
                origin: Some("MA".into()),
                order_number: Some("091100".into()),
                year: 2026,
                offset: 0,
                include_details: true,
            }
        );
    }

    #[test]
    fn test_defaults() {
        let query = assert_ok!(parse_request(r#"{"order_number": "091100"}"#));
        assert_eq!(query.origin, None);
        assert_eq!(query.year, current_year());
        assert!(!query.include_details);
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let query = assert_ok!(parse_request(
            r#"{"origin": "MA", "year": null, "include_details": null}"#
        ));
        assert_eq!(query.origin.as_deref(), Some("MA"));
        assert_eq!(query.year, current_year());
        assert!(!query.include_details);
    }

    #[test]
    fn test_missing_criteria() {
        let err = assert_err!(parse_request(r#"{"year": 2026, "origin": "  "}"#));
        assert!(matches!(err, RequestError::MissingCriteria));
        let body = bad_request_body(&err);
        assert_eq!(body["examples"]["search_by_origin"]["origin"], "MA");
    }

    #[test]
    fn test_invalid_json() {
        let err = assert_err!(parse_request("origin=MA"));
        assert!(matches!(err, RequestError::InvalidJson(_)));
        assert_eq!(
            bad_request_body(&err),
            json!({"error": "Invalid JSON in request body"})
        );
    }
}
