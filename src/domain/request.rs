use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::domain::validation::{
    FieldSpec, FieldType, ValidationError, check_fields, exact_integer, kind_of,
};
use crate::domain::value::{AppToken, Priority, Sound, UserKey};

const NAMESPACE: &str = "message";
const ATTACHMENT: &str = "attachment";
const EMERGENCY_ONLY: [&str; 3] = ["retry", "expire", "callback"];

const MESSAGE_FIELDS: [FieldSpec; 13] = [
    FieldSpec::required("message", FieldType::String),
    FieldSpec::optional("title", FieldType::String),
    FieldSpec::optional("url", FieldType::String),
    FieldSpec::optional("url_title", FieldType::String),
    FieldSpec::optional("callback", FieldType::String),
    FieldSpec::optional("sound", FieldType::String),
    FieldSpec::optional("retry", FieldType::Number),
    FieldSpec::optional("expire", FieldType::Number),
    FieldSpec::optional("timestamp", FieldType::Number),
    FieldSpec::optional("html", FieldType::Boolean),
    FieldSpec::optional("monospace", FieldType::Boolean),
    FieldSpec::optional("priority", FieldType::StringOrNumber),
    FieldSpec::optional("device", FieldType::Any),
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Target device(s) for a message (`device`).
pub enum Device {
    One(String),
    Many(Vec<String>),
}

impl Device {
    fn into_value(self) -> Value {
        match self {
            Self::One(name) => Value::String(name),
            Self::Many(names) => Value::Array(names.into_iter().map(Value::String).collect()),
        }
    }
}

impl From<&str> for Device {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for Device {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for Device {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Typed message fields.
///
/// Build with [`Message::new`] and the chained setters, or with struct update syntax.
/// A `Message` still goes through the same validation as raw JSON input before it is sent.
pub struct Message {
    pub message: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub url_title: Option<String>,
    pub device: Option<Device>,
    pub priority: Option<Priority>,
    pub sound: Option<Sound>,
    pub timestamp: Option<u64>,
    pub retry: Option<u32>,
    pub expire: Option<u32>,
    pub callback: Option<String>,
    pub html: bool,
    pub monospace: bool,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Supplementary URL shown with the message.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Link text for [`Message::url`]; requires a URL.
    pub fn url_title(mut self, url_title: impl Into<String>) -> Self {
        self.url_title = Some(url_title.into());
        self
    }

    pub fn device(mut self, device: impl Into<Device>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn sound(mut self, sound: Sound) -> Self {
        self.sound = Some(sound);
        self
    }

    /// Unix timestamp shown instead of the time the API received the message.
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Emergency priority only: seconds between retries.
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Emergency priority only: seconds before retrying stops.
    pub fn expire(mut self, expire: u32) -> Self {
        self.expire = Some(expire);
        self
    }

    /// Emergency priority only: URL called when the message is acknowledged.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }

    fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("message".to_owned(), Value::String(self.message));

        let strings = [
            ("title", self.title),
            ("url", self.url),
            ("url_title", self.url_title),
            ("callback", self.callback),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                fields.insert(name.to_owned(), Value::String(value));
            }
        }

        if let Some(device) = self.device {
            fields.insert("device".to_owned(), device.into_value());
        }
        if let Some(priority) = self.priority {
            fields.insert(Priority::FIELD.to_owned(), Value::from(priority.value()));
        }
        if let Some(sound) = self.sound {
            fields.insert(Sound::FIELD.to_owned(), Value::from(sound.as_str()));
        }
        if let Some(timestamp) = self.timestamp {
            fields.insert("timestamp".to_owned(), Value::from(timestamp));
        }
        if let Some(retry) = self.retry {
            fields.insert("retry".to_owned(), Value::from(retry));
        }
        if let Some(expire) = self.expire {
            fields.insert("expire".to_owned(), Value::from(expire));
        }
        if self.html {
            fields.insert("html".to_owned(), Value::Bool(true));
        }
        if self.monospace {
            fields.insert("monospace".to_owned(), Value::Bool(true));
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Unvalidated message input: a bare string, a JSON value, or a typed [`Message`].
///
/// A bare string is shorthand for `{"message": <string>}`.
pub struct MessageInput(Value);

impl MessageInput {
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<&str> for MessageInput {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl From<String> for MessageInput {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<Value> for MessageInput {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Message> for MessageInput {
    fn from(value: Message) -> Self {
        Self(Value::Object(value.into_fields()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Validated request body for `messages.json`.
///
/// `token` and `user` are left empty by [`validate_message`]; the client fills them in.
pub struct NormalizedMessage {
    pub token: String,
    pub user: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monospace: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl NormalizedMessage {
    pub fn with_credentials(mut self, token: &AppToken, user: &UserKey) -> Self {
        self.token = token.as_str().to_owned();
        self.user = user.as_str().to_owned();
        self
    }
}

/// Validate message input and normalize it into a request body.
///
/// The field-type pass reports every problem at once; the cross-field rules that
/// follow stop at the first failure, in this order: attachment, html/monospace,
/// url_title/url, device shape, priority, emergency-only fields, sound.
///
/// A JSON `null` counts as an absent field everywhere except `attachment`: the
/// key being present at all, even as `null`, fails validation.
pub fn validate_message(
    input: impl Into<MessageInput>,
) -> Result<NormalizedMessage, ValidationError> {
    let fields = match input.into().into_value() {
        Value::String(text) => {
            let mut fields = Map::new();
            fields.insert("message".to_owned(), Value::String(text));
            fields
        }
        Value::Object(fields) => fields,
        other => {
            return Err(ValidationError::InvalidInput {
                kind: kind_of(&other),
            });
        }
    };

    check_fields(NAMESPACE, &MESSAGE_FIELDS, &fields)?;

    if fields.contains_key(ATTACHMENT) {
        return Err(ValidationError::UnsupportedField { field: ATTACHMENT });
    }

    let html = flag(&fields, "html");
    let monospace = flag(&fields, "monospace");
    if html && monospace {
        return Err(ValidationError::Conflict {
            first: "html",
            second: "monospace",
        });
    }

    if present(&fields, "url_title") && !present(&fields, "url") {
        return Err(ValidationError::MissingDependency {
            field: "url_title",
            requires: "url",
        });
    }

    let device = match fields.get("device") {
        None | Some(Value::Null) => None,
        Some(value) => flatten_device(value)?,
    };

    let priority = match fields.get(Priority::FIELD) {
        None | Some(Value::Null) => None,
        Some(value) => Some(resolve_priority(value).ok_or_else(|| {
            ValidationError::UnknownPriority {
                value: value.to_string(),
            }
        })?),
    };

    if priority != Some(Priority::Emergency) {
        if let Some(field) = EMERGENCY_ONLY.into_iter().find(|f| present(&fields, f)) {
            return Err(ValidationError::RequiresEmergency { field });
        }
    }

    let sound = match string(&fields, Sound::FIELD) {
        None => None,
        Some(name) => Some(
            Sound::from_name(&name)
                .ok_or(ValidationError::UnknownSound { value: name })?
                .as_str()
                .to_owned(),
        ),
    };

    Ok(NormalizedMessage {
        token: String::new(),
        user: String::new(),
        message: string(&fields, "message").unwrap_or_default(),
        device,
        title: string(&fields, "title"),
        url: string(&fields, "url"),
        url_title: string(&fields, "url_title"),
        priority: priority.map(Priority::value),
        sound,
        timestamp: number(&fields, "timestamp"),
        html: html.then_some(1),
        monospace: monospace.then_some(1),
        retry: number(&fields, "retry"),
        expire: number(&fields, "expire"),
        callback: string(&fields, "callback"),
    })
}

fn present(fields: &Map<String, Value>, name: &str) -> bool {
    !matches!(fields.get(name), None | Some(Value::Null))
}

fn flag(fields: &Map<String, Value>, name: &str) -> bool {
    matches!(fields.get(name), Some(Value::Bool(true)))
}

fn string(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name) {
        Some(Value::String(value)) => Some(value.clone()),
        _ => None,
    }
}

fn number(fields: &Map<String, Value>, name: &str) -> Option<Number> {
    match fields.get(name) {
        Some(Value::Number(value)) => Some(value.clone()),
        _ => None,
    }
}

// Names are joined verbatim; a comma inside a device name is not escaped.
fn flatten_device(value: &Value) -> Result<Option<String>, ValidationError> {
    match value {
        Value::String(name) => Ok(Some(name.clone())),
        Value::Array(items) => {
            let names = items
                .iter()
                .map(|item| item.as_str().ok_or(ValidationError::InvalidDevice))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(names.join(",")))
        }
        _ => Err(ValidationError::InvalidDevice),
    }
}

fn resolve_priority(value: &Value) -> Option<Priority> {
    match value {
        Value::String(name) => Priority::from_name(name),
        Value::Number(number) => exact_integer(number).and_then(Priority::from_value),
        _ => None,
    }
}
