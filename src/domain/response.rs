use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded `messages.json` response.
pub struct MessageResponse {
    /// `1` means the message was accepted; anything else is a failure.
    pub status: i64,
    pub request: String,
    pub user: Option<String>,
    pub errors: Option<Vec<String>>,
    /// Receipt id, returned for emergency-priority messages.
    pub receipt: Option<String>,
}

impl MessageResponse {
    pub const STATUS_OK: i64 = 1;

    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_OK
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Response body as far as it could be decoded.
pub enum ResponseBody {
    /// JSON body with the expected response shape.
    Message(MessageResponse),
    /// Valid JSON of some other shape.
    Json(Value),
    /// Non-JSON body, or JSON that failed to parse.
    Raw(String),
}

impl ResponseBody {
    pub fn as_message(&self) -> Option<&MessageResponse> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Service-reported error strings, if any.
    pub fn errors(&self) -> &[String] {
        self.as_message()
            .and_then(|message| message.errors.as_deref())
            .unwrap_or_default()
    }
}
