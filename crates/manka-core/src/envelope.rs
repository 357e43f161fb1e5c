//! Response envelope and the shared envelope check.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{AppError, HttpError};

/// Envelope code for a successful reply.
pub const SUCCESS_CODE: i64 = 0;

/// Envelope code for an expired or missing session.
pub const UNAUTHORIZED_CODE: i64 = 401;

/// Message used when the backend reports a failure without one.
pub const DEFAULT_ERROR_MESSAGE: &str = "unknown error";

/// The `{code, msg, data}` wrapper every backend reply uses.
///
/// `data` is only meaningful when `code == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Status discriminator.
    pub code: i64,
    /// Human-readable message.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub msg: String,
    /// Payload.
    pub data: T,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Untyped envelope as it comes off the wire.
#[derive(Deserialize)]
struct WireEnvelope {
    code: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    msg: String,
    #[serde(default)]
    data: Value,
}

impl<T> Envelope<T> {
    /// Whether this envelope reports success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Consume the envelope and return its payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl Envelope<Value> {
    /// Decode `data` into the caller's type.
    ///
    /// # Errors
    /// Returns `HttpError::Decode` if `data` does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Envelope<T>, HttpError> {
        let data = serde_json::from_value(self.data).map_err(HttpError::Decode)?;
        Ok(Envelope {
            code: self.code,
            msg: self.msg,
            data,
        })
    }
}

/// Transport-neutral HTTP response handed to [`check_response`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    pub status_text: String,
    /// Raw body bytes.
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response from its parts.
    #[must_use]
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Create a 200 response carrying a JSON body.
    #[must_use]
    pub fn ok_json(body: &Value) -> Self {
        Self::new(200, "OK", body.to_string())
    }
}

/// Decide success or failure for a raw response.
///
/// Pure: an authentication failure is reported as `HttpError::Unauthorized`
/// and the sign-out side effect is left to the caller.
///
/// # Errors
/// - `HttpError::Network` when the status is not 200
/// - `HttpError::Decode` when the body is not an envelope
/// - `HttpError::Unauthorized` when `code == 401`
/// - `HttpError::App` for any other non-zero code
pub fn check_response(raw: &RawResponse) -> Result<Envelope<Value>, HttpError> {
    if raw.status != 200 {
        return Err(HttpError::Network {
            status: raw.status,
            status_text: raw.status_text.clone(),
        });
    }

    let wire: WireEnvelope = serde_json::from_slice(&raw.body).map_err(HttpError::Decode)?;
    if wire.code == SUCCESS_CODE {
        return Ok(Envelope {
            code: wire.code,
            msg: wire.msg,
            data: wire.data,
        });
    }

    Err(AppError::new(wire.msg, wire.code).into())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Archive {
        archive_id: String,
        archive_name: String,
    }

    #[test]
    fn test_success_keeps_data_intact() {
        let data = json!({"archiveId": "123", "archiveName": "Test", "tags": [1, 2]});
        let raw = RawResponse::ok_json(&json!({"code": 0, "msg": "", "data": data}));

        let envelope = check_response(&raw).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.data, data);

        let typed: Envelope<Archive> = envelope.decode().unwrap();
        assert_eq!(typed.data.archive_id, "123");
        assert_eq!(typed.data.archive_name, "Test");
    }

    #[test]
    fn test_unauthorized() {
        let raw = RawResponse::ok_json(&json!({"code": 401, "msg": "unauthorized", "data": null}));
        let err = check_response(&raw).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some(401));
        assert_eq!(err.message(), Some("unauthorized"));
    }

    #[test]
    fn test_application_error_with_empty_message() {
        let raw = RawResponse::ok_json(&json!({"code": 500, "msg": "", "data": null}));
        let err = check_response(&raw).unwrap_err();
        assert!(matches!(err, HttpError::App(_)));
        assert_eq!(err.code(), Some(500));
        assert_eq!(err.message(), Some(DEFAULT_ERROR_MESSAGE));
    }

    #[test]
    fn test_application_error_keeps_blank_message() {
        let raw = RawResponse::ok_json(&json!({"code": 500, "msg": "  ", "data": null}));
        let err = check_response(&raw).unwrap_err();
        assert_eq!(err.code(), Some(500));
        assert_eq!(err.message(), Some("  "));
    }

    #[test]
    fn test_application_error_with_missing_or_null_message() {
        for body in [json!({"code": 3}), json!({"code": 3, "msg": null})] {
            let err = check_response(&RawResponse::ok_json(&body)).unwrap_err();
            assert_eq!(err.code(), Some(3));
            assert_eq!(err.message(), Some(DEFAULT_ERROR_MESSAGE));
        }
    }

    #[test]
    fn test_non_200_status_is_network_error() {
        let raw = RawResponse::new(503, "Service Unavailable", r#"{"code":0,"msg":"","data":1}"#);
        let err = check_response(&raw).unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.code(), None);
        match err {
            HttpError::Network {
                status,
                status_text,
            } => {
                assert_eq!(status, 503);
                assert_eq!(status_text, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_network_error() {
        let raw = RawResponse::new(200, "OK", "<html>gateway</html>");
        let err = check_response(&raw).unwrap_err();
        assert!(matches!(err, HttpError::Decode(_)));
        assert!(err.is_network());
    }

    #[test]
    fn test_decode_mismatch() {
        let raw = RawResponse::ok_json(&json!({"code": 0, "msg": "", "data": {"archiveId": 1}}));
        let err = check_response(&raw).unwrap().decode::<Archive>().unwrap_err();
        assert!(matches!(err, HttpError::Decode(_)));
    }
}
