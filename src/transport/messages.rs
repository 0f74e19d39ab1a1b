use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

use crate::domain::validation::exact_integer;
use crate::domain::{MessageResponse, NormalizedMessage, ResponseBody};

use super::BoxError;

/// Path of the message submission endpoint, relative to the base endpoint.
pub const MESSAGES_PATH: &str = "messages.json";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] BoxError),
}

// Only `status` must be well-formed; the other fields fall back to `None` when mistyped.
#[derive(Debug, Clone, Deserialize)]
struct MessageJsonResponse {
    #[serde(deserialize_with = "status_code")]
    status: i64,
    #[serde(default, deserialize_with = "lenient")]
    request: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    user: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    errors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    receipt: Option<String>,
}

impl From<MessageJsonResponse> for MessageResponse {
    fn from(value: MessageJsonResponse) -> Self {
        Self {
            status: value.status,
            request: value.request.unwrap_or_default(),
            user: value.user,
            errors: value.errors,
            receipt: value.receipt,
        }
    }
}

fn status_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    exact_integer(&number).ok_or_else(|| D::Error::custom("status must be an integral number"))
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

pub fn encode_message_json(message: &NormalizedMessage) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(message)
}

/// Decode whatever body came back.
///
/// The body is kept even when decoding fails: a JSON parse error yields the raw
/// text alongside the error. An empty body decodes to `None`.
pub fn decode_message_response(
    content_type: Option<&str>,
    body: Result<Vec<u8>, BoxError>,
) -> (Option<ResponseBody>, Option<TransportError>) {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(err) => return (None, Some(TransportError::Body(err))),
    };
    if bytes.is_empty() {
        return (None, None);
    }

    if !content_type.is_some_and(is_json) {
        return (Some(raw(&bytes)), None);
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => match MessageJsonResponse::deserialize(&value) {
            Ok(parsed) => (Some(ResponseBody::Message(parsed.into())), None),
            Err(_) => (Some(ResponseBody::Json(value)), None),
        },
        Err(err) => (Some(raw(&bytes)), Some(TransportError::Json(err))),
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE)
        || essence.to_ascii_lowercase().ends_with("+json")
}

fn raw(bytes: &[u8]) -> ResponseBody {
    ResponseBody::Raw(String::from_utf8_lossy(bytes).into_owned())
}
