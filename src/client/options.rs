use std::env;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::domain::validation::{FieldSpec, FieldType, check_fields};
use crate::domain::{AppToken, UserKey, ValidationError};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.pushover.net/1";

pub const TOKEN_ENV: &str = "PUSHOVER_TOKEN";
pub const USER_KEY_ENV: &str = "PUSHOVER_USER_KEY";
pub const BASE_URL_ENV: &str = "PUSHOVER_BASE_URL";

const NAMESPACE: &str = "client";

const CLIENT_FIELDS: [FieldSpec; 3] = [
    FieldSpec::required("token", FieldType::String),
    FieldSpec::required("user_key", FieldType::String),
    FieldSpec::optional("base_url", FieldType::String),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Credentials and endpoint for a [`crate::PushoverClient`].
///
/// Nothing is checked until the client is built; all field problems are then
/// reported together.
pub struct ClientOptions {
    pub token: String,
    pub user_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ValidatedOptions {
    pub token: AppToken,
    pub user_key: UserKey,
    pub base_endpoint: String,
}

impl ClientOptions {
    pub fn new(token: impl Into<String>, user_key: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_key: user_key.into(),
            base_url: None,
        }
    }

    /// Override the API root, e.g. for a proxy or a local test server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read `PUSHOVER_TOKEN`, `PUSHOVER_USER_KEY` and the optional `PUSHOVER_BASE_URL`.
    ///
    /// Missing credentials are left empty and reported when the client is built.
    pub fn from_env() -> Self {
        Self {
            token: env::var(TOKEN_ENV).unwrap_or_default(),
            user_key: env::var(USER_KEY_ENV).unwrap_or_default(),
            base_url: env::var(BASE_URL_ENV).ok(),
        }
    }

    pub(crate) fn validate(&self) -> Result<ValidatedOptions, ValidationError> {
        check_fields(NAMESPACE, &CLIENT_FIELDS, &self.to_fields())?;

        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(ValidatedOptions {
            token: AppToken::new(self.token.as_str())?,
            user_key: UserKey::new(self.user_key.as_str())?,
            base_endpoint: normalize_base_url(base_url)?,
        })
    }

    fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("token".to_owned(), Value::from(self.token.as_str()));
        fields.insert("user_key".to_owned(), Value::from(self.user_key.as_str()));
        if let Some(base_url) = self.base_url.as_deref() {
            fields.insert("base_url".to_owned(), Value::from(base_url));
        }
        fields
    }
}

/// Parse `raw` and return it without query, fragment or trailing slashes.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }

    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.as_str().trim_end_matches('/').to_owned())
}
