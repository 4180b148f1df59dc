//! Status reports from Eagle air purifiers (command 210).

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::protocol::{command, EagleControlData, MessageEnvelope};

/// Operating mode reported and accepted by Eagle firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EagleMode {
    Manual,
    Ai,
    Silent,
    Turbo,
    /// A code this adapter has no name for, preserved as received.
    Other(u8),
}

impl From<u8> for EagleMode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Manual,
            1 => Self::Ai,
            2 => Self::Silent,
            3 => Self::Turbo,
            other => Self::Other(other),
        }
    }
}

impl From<EagleMode> for u8 {
    fn from(mode: EagleMode) -> Self {
        match mode {
            EagleMode::Manual => 0,
            EagleMode::Ai => 1,
            EagleMode::Silent => 2,
            EagleMode::Turbo => 3,
            EagleMode::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EagleStatusData {
    pub version: String,
    pub power: u8,
    pub mode: u8,
    pub status: u8,
    pub denoise: u8,
    pub heat_status: u8,
    pub cadr: u32,
    pub prm: u32,
    #[serde(default)]
    pub diff_pressure1: Option<i64>,
    #[serde(default)]
    pub diff_pressure2: Option<i64>,
    pub t0: i32,
    pub g4_id: String,
    pub g4_percent: u32,
    pub carbon_id: String,
    pub carbon_percent: u32,
    pub hepa_id: String,
    pub hepa_percent: u32,
}

/// Latest known state of one purifier. Each report replaces the previous one
/// wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct EagleStatus {
    device_id: u64,
    message: MessageEnvelope<EagleStatusData>,
}

impl EagleStatus {
    pub const fn command_id() -> u32 {
        command::EAGLE_STATUS
    }

    pub fn from_message(
        device_id: u64,
        message: MessageEnvelope<EagleStatusData>,
    ) -> Result<Self, DecodeError> {
        if message.cmd_id != Self::command_id() {
            return Err(DecodeError::UnexpectedCommand {
                kind: "Eagle",
                expected: Self::command_id(),
                actual: message.cmd_id,
            });
        }

        Ok(Self { device_id, message })
    }

    pub fn decode(device_id: u64, raw: &str) -> Result<Self, DecodeError> {
        let message = serde_json::from_str(raw)?;
        Self::from_message(device_id, message)
    }

    pub fn device_id(&self) -> u64 {
        self.device_id
    }

    pub fn message(&self) -> &MessageEnvelope<EagleStatusData> {
        &self.message
    }

    fn data(&self) -> &EagleStatusData {
        &self.message.data
    }

    pub fn power(&self) -> u8 {
        self.data().power
    }

    pub fn is_on(&self) -> bool {
        self.power() == 1
    }

    pub fn is_off(&self) -> bool {
        !self.is_on()
    }

    pub fn mode(&self) -> EagleMode {
        EagleMode::from(self.data().mode)
    }

    pub fn is_silent_mode(&self) -> bool {
        self.mode() == EagleMode::Silent
    }

    pub fn status(&self) -> u8 {
        self.data().status
    }

    pub fn denoise(&self) -> u8 {
        self.data().denoise
    }

    pub fn is_denoise_on(&self) -> bool {
        self.denoise() == 1
    }

    pub fn is_denoise_off(&self) -> bool {
        !self.is_denoise_on()
    }

    pub fn heat_status(&self) -> u8 {
        self.data().heat_status
    }

    pub fn is_heater_on(&self) -> bool {
        self.heat_status() == 1
    }

    pub fn is_heater_off(&self) -> bool {
        !self.is_heater_on()
    }

    /// Fan throughput (clean air delivery rate).
    pub fn cadr(&self) -> u32 {
        self.data().cadr
    }

    pub fn prm(&self) -> u32 {
        self.data().prm
    }

    /// Raw `t0` reading.
    pub fn temperature(&self) -> i32 {
        self.data().t0
    }

    pub fn g4_id(&self) -> &str {
        &self.data().g4_id
    }

    pub fn g4_percent(&self) -> u32 {
        self.data().g4_percent
    }

    pub fn carbon_id(&self) -> &str {
        &self.data().carbon_id
    }

    pub fn carbon_percent(&self) -> u32 {
        self.data().carbon_percent
    }

    pub fn hepa_id(&self) -> &str {
        &self.data().hepa_id
    }

    pub fn hepa_percent(&self) -> u32 {
        self.data().hepa_percent
    }

    pub fn version(&self) -> &str {
        &self.data().version
    }

    /// The control-relevant slice of this report.
    pub fn control_data(&self) -> EagleControlData {
        let data = self.data();
        EagleControlData {
            power: data.power,
            heat_status: data.heat_status,
            mode: data.mode,
            cadr: data.cadr,
            denoise: data.denoise,
        }
    }
}
