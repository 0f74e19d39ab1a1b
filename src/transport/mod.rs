//! Transport layer: HTTP and wire-format details (serialization/deserialization).

use std::error::Error as StdError;

mod messages;

pub use messages::{
    JSON_CONTENT_TYPE, MESSAGES_PATH, TransportError, decode_message_response, encode_message_json,
};

pub type BoxError = Box<dyn StdError + Send + Sync>;
