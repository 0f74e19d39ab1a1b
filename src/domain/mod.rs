//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
pub(crate) mod validation;
mod value;

pub use request::{Device, Message, MessageInput, NormalizedMessage, validate_message};
pub use response::{MessageResponse, ResponseBody};
pub use validation::ValidationError;
pub use value::{AppToken, PRIORITIES, Priority, SOUNDS, Sound, UserKey};
