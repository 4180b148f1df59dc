//! Error types surfaced by the adapter.

use thiserror::Error;

pub use crate::protocol::topic::TopicFormatError;
pub use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum AirmxError {
    #[error(transparent)]
    Topic(#[from] TopicFormatError),

    #[error("Could not find the device with ID {0}.")]
    DeviceNotFound(u64),

    #[error("Failed to validate the message from device {device_id}.")]
    Signature { device_id: u64 },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A control command cannot be built before the device has reported.
    #[error("No status has been observed for device {0}.")]
    NoStatus(u64),

    #[error("Failed to encode the message: {0}")]
    Encode(serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Instant push failed for {failures} device(s), first: {first}")]
    InstantPush { failures: usize, first: String },

    #[error("{failures} listener(s) failed, first: {first}")]
    Listener { failures: usize, first: String },
}

/// The payload could not be turned into the shape its command requires.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message carries no signature.")]
    MissingSignature,

    #[error("{kind} status expects a message with command ID {expected}.")]
    UnexpectedCommand {
        kind: &'static str,
        expected: u32,
        actual: u32,
    },
}

pub type Result<T, E = AirmxError> = std::result::Result<T, E>;
