//! Typed Rust client for the Pushover message API.
//!
//! The crate is split into a domain layer (message and option validation, priority
//! and sound tables), a transport layer for wire-format details, and a small client
//! layer that performs one `POST messages.json` per notification and classifies the
//! response.
//!
//! ```rust,no_run
//! use pushover::{ClientOptions, Message, Priority, PushoverClient, Sound};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pushover::PushoverError> {
//!     let client = PushoverClient::new(ClientOptions::new("app-token", "user-key"))?;
//!
//!     client.notify("backup finished").await?;
//!
//!     let message = Message {
//!         title: Some("disk".to_owned()),
//!         priority: Some(Priority::High),
//!         sound: Some(Sound::Siren),
//!         ..Message::new("disk usage above 95%")
//!     };
//!     let response = client.notify(message).await?;
//!     println!("request id: {}", response.request);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    BoxFuture, ClientOptions, HttpRequest, HttpResponse, HttpTransport, PushoverClient,
    PushoverClientBuilder, PushoverError, notify,
};
pub use domain::{
    AppToken, Device, Message, MessageInput, MessageResponse, NormalizedMessage, PRIORITIES,
    Priority, ResponseBody, SOUNDS, Sound, UserKey, ValidationError, validate_message,
};
pub use transport::BoxError;
