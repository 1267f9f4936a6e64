//! The `{code, message, data}` wrapper every backend response uses.
//!
//! [`unwrap_envelope`] is the single place where a raw response turns into
//! either the caller's payload or an [`ApiError`]. Every failure it returns
//! has already been logged, exactly once.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// The only `code` the backend uses for success.
pub const SUCCESS_CODE: i64 = 200;

/// Response envelope. `data` is generic so each call site declares the
/// payload shape it expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    #[serde(default, deserialize_with = "message_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Accept any JSON for `message`; backends occasionally send numbers or null.
/// Falsy values (`null`, `false`, `0`, `""`) count as no message.
fn message_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Unwraps a raw response into the payload type `T`.
///
/// - non-2xx status: `ApiError::Http`, no envelope is read
/// - body is not an envelope: `ApiError::Deserialization`
/// - `code != 200`: `ApiError::Application` carrying `message` or the fallback
/// - otherwise `data` is decoded as `T`, with a missing `data` read as `null`
pub fn unwrap_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        let err = ApiError::Http {
            status: response.status,
            body: response.body,
        };
        error!(error = %err, "Request Error");
        return Err(err);
    }

    let envelope: Envelope<Value> = serde_json::from_str(&response.body).map_err(|e| {
        let err = ApiError::Deserialization(e.to_string());
        error!(error = %err, "Request Error");
        err
    })?;

    if !envelope.is_success() {
        let err = ApiError::application(envelope.code, envelope.message);
        error!(code = envelope.code, message = %err, "API Error");
        return Err(err);
    }

    serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(|e| {
        let err = ApiError::Deserialization(e.to_string());
        error!(error = %err, "Request Error");
        err
    })
}
