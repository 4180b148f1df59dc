//! Wire-level pieces of the protocol: topic addressing, the message envelope
//! and the two signing conventions.

pub mod message;
pub mod signer;
pub mod topic;

pub use message::{
    command, CommandMessage, EagleControlData, InstantPushData, MessageEnvelope, MessageSource,
};
pub use signer::Signer;
pub use topic::{Topic, TopicFormatError, COMMAND_FLAGS, STATUS_FILTER};
