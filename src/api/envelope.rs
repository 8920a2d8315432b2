//! Normalized response envelope and the upstream body shapes it is built from.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};

/// Error name used when our own deadline aborted the call.
pub const TIMEOUT_ERROR_NAME: &str = "TimeoutError";
pub const TIMEOUT_ERROR_MESSAGE: &str = "Request timed out. Please try again.";

/// Error name used for transport and decoding failures.
pub const NETWORK_ERROR_NAME: &str = "NetworkError";
pub const NETWORK_ERROR_MESSAGE: &str = "Network request failed";

/// Fallback name for non-2xx responses without a structured error body.
pub const GENERIC_ERROR_NAME: &str = "Error";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete resource";

/// Synthetic status for a call aborted by the deadline.
pub const TIMEOUT_STATUS: u16 = 408;

/// Synthetic status for failures that never produced an HTTP status.
pub const NETWORK_ERROR_STATUS: u16 = 500;

/// Error object carried by a failure envelope.
///
/// Upstream error objects are kept exactly as received and serialize back to
/// the same JSON. `status`, `name` and `message` are read from them with
/// defaults: the HTTP status, [`GENERIC_ERROR_NAME`] and an empty message.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: u16,
    name: String,
    message: String,
    fields: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: u16, name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();

        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::from(status));
        fields.insert("name".to_string(), Value::String(name.clone()));
        fields.insert("message".to_string(), Value::String(message.clone()));

        Self {
            status,
            name,
            message,
            fields,
        }
    }

    pub fn timeout() -> Self {
        Self::new(TIMEOUT_STATUS, TIMEOUT_ERROR_NAME, TIMEOUT_ERROR_MESSAGE)
    }

    /// Transport or decoding failure. An empty message falls back to a generic one.
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            NETWORK_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self::new(NETWORK_ERROR_STATUS, NETWORK_ERROR_NAME, message)
    }

    /// Adopt an upstream `error` object without altering it.
    ///
    /// A missing or non-numeric `status` reads as `http_status`.
    pub fn from_upstream(fields: Map<String, Value>, http_status: u16) -> Self {
        let status = fields
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(http_status);
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(GENERIC_ERROR_NAME)
            .to_string();
        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            status,
            name,
            message,
            fields,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Any member as received, e.g. `details`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Uniform result of one upstream request.
///
/// A success carries `data` (absent when the upstream payload was `null`) and
/// optional `meta`; a failure carries an [`ApiError`]. Built once by the
/// normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        status: u16,
        data: Option<T>,
        meta: Option<Value>,
    },
    Failure {
        status: u16,
        error: ApiError,
    },
}

impl<T> ApiResponse<T> {
    /// Failure envelope whose status mirrors the error's own status.
    pub(crate) fn failure(error: ApiError) -> Self {
        ApiResponse::Failure {
            status: error.status(),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// HTTP status, or the synthetic 408/500 code.
    pub fn status(&self) -> u16 {
        match self {
            ApiResponse::Success { status, .. } | ApiResponse::Failure { status, .. } => *status,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => data.as_ref(),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResponse::Success { data, .. } => data,
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn meta(&self) -> Option<&Value> {
        match self {
            ApiResponse::Success { meta, .. } => meta.as_ref(),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiResponse::Failure { error, .. } => Some(error),
            ApiResponse::Success { .. } => None,
        }
    }
}

// Wire shape: { success, status, data, meta? } or { success, status, error }.
impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiResponse::Success { status, data, meta } => {
                let len = if meta.is_some() { 4 } else { 3 };
                let mut s = serializer.serialize_struct("ApiResponse", len)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("status", status)?;
                s.serialize_field("data", data)?;
                if let Some(meta) = meta {
                    s.serialize_field("meta", meta)?;
                }
                s.end()
            }
            ApiResponse::Failure { status, error } => {
                let mut s = serializer.serialize_struct("ApiResponse", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("status", status)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Shape of a decoded upstream body, checked structurally at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UpstreamBody {
    /// Non-2xx body with an `error` object.
    Failure(ApiError),
    /// Non-2xx body without one; `message` is the body's own message, if any.
    Unstructured { message: Option<String> },
    /// 2xx body, unwrapped one level.
    Payload { data: Value, meta: Option<Value> },
}

impl UpstreamBody {
    /// Classify `body` as received with `http_status`.
    ///
    /// 2xx bodies are unwrapped one level: `data` if present, else the whole
    /// body, with `meta` carried alongside. Other bodies are checked for an
    /// `error` object.
    pub(crate) fn classify(body: Value, http_status: u16) -> Self {
        if (200..300).contains(&http_status) {
            return Self::payload(body);
        }

        if let Some(Value::Object(error)) = body.get("error") {
            return UpstreamBody::Failure(ApiError::from_upstream(error.clone(), http_status));
        }

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_owned);
        UpstreamBody::Unstructured { message }
    }

    fn payload(body: Value) -> Self {
        match body {
            Value::Object(mut object) => {
                let meta = object.get("meta").cloned();
                match object.remove("data") {
                    Some(data) => UpstreamBody::Payload { data, meta },
                    None => UpstreamBody::Payload {
                        data: Value::Object(object),
                        meta,
                    },
                }
            }
            other => UpstreamBody::Payload {
                data: other,
                meta: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_success_body_unwraps_data() {
        let body = json!({ "data": { "id": 1, "title": "Home" }, "meta": { "page": 1 } });
        assert_eq!(
            UpstreamBody::classify(body, 200),
            UpstreamBody::Payload {
                data: json!({ "id": 1, "title": "Home" }),
                meta: Some(json!({ "page": 1 })),
            }
        );
    }

    #[test]
    fn test_success_body_without_data_is_whole_body() {
        let body = json!({ "id": 3, "meta": "m" });
        assert_eq!(
            UpstreamBody::classify(body.clone(), 200),
            UpstreamBody::Payload {
                data: body,
                meta: Some(json!("m")),
            }
        );

        assert_eq!(
            UpstreamBody::classify(json!([1, 2]), 204),
            UpstreamBody::Payload {
                data: json!([1, 2]),
                meta: None,
            }
        );
    }

    #[test]
    fn test_error_body_structured() {
        let body = json!({
            "data": null,
            "error": { "status": 403, "name": "ForbiddenError", "message": "Forbidden", "details": {} }
        });
        let UpstreamBody::Failure(error) = UpstreamBody::classify(body, 403) else {
            panic!("expected structured failure");
        };
        assert_eq!(error.status(), 403);
        assert_eq!(error.name(), "ForbiddenError");
        assert_eq!(error.message(), "Forbidden");
        assert_eq!(error.get("details"), Some(&json!({})));
    }

    #[test]
    fn test_error_body_unstructured() {
        assert_eq!(
            UpstreamBody::classify(json!({ "message": "boom" }), 500),
            UpstreamBody::Unstructured {
                message: Some("boom".to_string())
            }
        );
        assert_eq!(
            UpstreamBody::classify(json!({ "error": "plain text" }), 500),
            UpstreamBody::Unstructured { message: None }
        );
        assert_eq!(
            UpstreamBody::classify(Value::Null, 502),
            UpstreamBody::Unstructured { message: None }
        );
    }

    #[test]
    fn test_upstream_error_status_filled_from_http() {
        let upstream = json!({ "message": "nope" });
        let error = ApiError::from_upstream(object(upstream.clone()), 409);
        assert_eq!(error.status(), 409);
        assert_eq!(error.name(), GENERIC_ERROR_NAME);
        assert_eq!(error.message(), "nope");
        assert_eq!(serde_json::to_value(&error).unwrap(), upstream);
    }

    #[test]
    fn test_upstream_error_keeps_non_numeric_status() {
        let upstream = json!({ "status": "409", "name": "ConflictError" });
        let error = ApiError::from_upstream(object(upstream.clone()), 409);
        assert_eq!(error.status(), 409);
        assert_eq!(error.message(), "");
        assert_eq!(error.get("status"), Some(&json!("409")));
        assert_eq!(serde_json::to_value(&error).unwrap(), upstream);
    }

    #[test]
    fn test_upstream_error_roundtrips_to_same_json() {
        let upstream = json!({
            "status": 400,
            "name": "ValidationError",
            "message": "bad",
            "details": { "errors": [] }
        });
        let error = ApiError::from_upstream(object(upstream.clone()), 400);
        assert_eq!(serde_json::to_value(&error).unwrap(), upstream);
    }

    #[test]
    fn test_network_error_fallback_message() {
        assert_eq!(ApiError::network("").message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(ApiError::network("connection refused").message(), "connection refused");
    }

    #[test]
    fn test_envelope_wire_shape() {
        let ok: ApiResponse<Value> = ApiResponse::Success {
            status: 200,
            data: Some(json!({ "id": 1 })),
            meta: None,
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "success": true, "status": 200, "data": { "id": 1 } })
        );

        let failed: ApiResponse<Value> = ApiResponse::failure(ApiError::timeout());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "success": false,
                "status": 408,
                "error": { "status": 408, "name": "TimeoutError", "message": TIMEOUT_ERROR_MESSAGE }
            })
        );
        assert_eq!(failed.status(), 408);
        assert!(failed.data().is_none());
    }
}
