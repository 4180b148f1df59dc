//! Wire envelope shared by every message in both directions.
//!
//! Field order is part of the protocol: signatures are computed over the
//! literal serialized text, so `cmdId, name, time, from, data[, sig]` must be
//! emitted exactly in that order. `serde_json` writes struct fields in
//! declaration order, which the types below rely on.

use serde::{Deserialize, Serialize};

/// Command identifiers understood by this adapter.
pub mod command {
    pub const INSTANT_PUSH: u32 = 40;
    pub const EAGLE_CONTROL: u32 = 100;
    pub const SNOW_STATUS: u32 = 200;
    pub const EAGLE_STATUS: u32 = 210;
}

/// Originator of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MessageSource {
    Snow = 1,
    Eagle = 2,
    AppIos = 3,
    AppAndroid = 4,
}

impl TryFrom<u8> for MessageSource {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Snow),
            2 => Ok(Self::Eagle),
            3 => Ok(Self::AppIos),
            4 => Ok(Self::AppAndroid),
            other => Err(format!("unknown message source {}", other)),
        }
    }
}

impl From<MessageSource> for u8 {
    fn from(source: MessageSource) -> Self {
        source as u8
    }
}

/// One signed wire message. The shape of `data` is selected by `cmd_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope<T> {
    pub cmd_id: u32,
    pub name: String,
    pub time: i64,
    pub from: MessageSource,
    pub data: T,
    pub sig: String,
}

/// The two fields every inbound message is inspected for before the payload
/// is decoded into a typed status. Neither is required to be present or well
/// typed: an odd `cmdId` is an unhandled command and an odd `sig` fails
/// validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnvelopeHeader {
    #[serde(default)]
    pub cmd_id: Option<serde_json::Value>,
    #[serde(default)]
    pub sig: Option<serde_json::Value>,
}

impl EnvelopeHeader {
    /// The command id, when it is a non-negative integer that fits a `u32`.
    pub fn command_id(&self) -> Option<u32> {
        self.cmd_id
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
    }

    pub fn sig(&self) -> Option<&str> {
        self.sig.as_ref().and_then(serde_json::Value::as_str)
    }
}

/// An outbound message before it is signed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMessage<T> {
    pub cmd_id: u32,
    pub name: String,
    pub time: i64,
    pub from: MessageSource,
    pub data: T,
}

impl<T> CommandMessage<T> {
    pub fn new(cmd_id: u32, name: impl Into<String>, data: T, time: i64) -> Self {
        Self {
            cmd_id,
            name: name.into(),
            time,
            from: MessageSource::AppAndroid,
            data,
        }
    }

    pub fn into_envelope(self, sig: String) -> MessageEnvelope<T> {
        MessageEnvelope {
            cmd_id: self.cmd_id,
            name: self.name,
            time: self.time,
            from: self.from,
            data: self.data,
            sig,
        }
    }
}

/// Asks a device to report its state right away instead of waiting for the
/// next scheduled report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantPushData {
    pub frequency_time: u32,
    pub duration_time: u32,
}

impl Default for InstantPushData {
    fn default() -> Self {
        Self {
            frequency_time: 2,
            duration_time: 1,
        }
    }
}

impl CommandMessage<InstantPushData> {
    pub fn instant_push(data: InstantPushData, time: i64) -> Self {
        Self::new(command::INSTANT_PUSH, "instantPush", data, time)
    }
}

/// The complete control surface of an Eagle purifier. Firmware expects every
/// field on every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EagleControlData {
    pub power: u8,
    pub heat_status: u8,
    pub mode: u8,
    pub cadr: u32,
    pub denoise: u8,
}

impl CommandMessage<EagleControlData> {
    pub fn eagle_control(data: EagleControlData, time: i64) -> Self {
        Self::new(command::EAGLE_CONTROL, "control", data, time)
    }
}
