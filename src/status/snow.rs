//! Status reports from Snow air-quality monitors (command 200).

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::protocol::{command, MessageEnvelope};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorState {
    Sampling,
    Other(String),
}

impl From<String> for SensorState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "sampling" => Self::Sampling,
            _ => Self::Other(state),
        }
    }
}

impl From<SensorState> for String {
    fn from(state: SensorState) -> Self {
        match state {
            SensorState::Sampling => "sampling".to_string(),
            SensorState::Other(state) => state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BatteryState {
    Charging,
    Discharge,
    Other(String),
}

impl From<String> for BatteryState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "charging" => Self::Charging,
            "discharge" => Self::Discharge,
            _ => Self::Other(state),
        }
    }
}

impl From<BatteryState> for String {
    fn from(state: BatteryState) -> Self {
        match state {
            BatteryState::Charging => "charging".to_string(),
            BatteryState::Discharge => "discharge".to_string(),
            BatteryState::Other(state) => state,
        }
    }
}

/// Raw report body. Temperatures and humidities are hundredths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowStatusData {
    pub battery: u32,
    pub battery_state: BatteryState,
    pub co2: f64,
    pub co2_state: SensorState,
    pub co2_time: i64,
    pub h: f64,
    pub humi_state: SensorState,
    pub oh: f64,
    pub opm100: f64,
    pub opm25: f64,
    pub ot: f64,
    pub pm100: f64,
    pub pm25: f64,
    #[serde(default)]
    pub pm250: Option<f64>,
    #[serde(default)]
    pub pm50: Option<f64>,
    pub pm_state: SensorState,
    pub pm_time: i64,
    pub t: f64,
    pub temp_state: SensorState,
    pub temp_unit: String,
    pub time: i64,
    pub tvoc: f64,
    pub tvoc_duration: i64,
    pub tvoc_state: SensorState,
    pub tvoc_time: i64,
    pub tvoc_unit: String,
    pub version: String,
    pub version_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnowStatus {
    device_id: u64,
    message: MessageEnvelope<SnowStatusData>,
}

impl SnowStatus {
    pub const fn command_id() -> u32 {
        command::SNOW_STATUS
    }

    pub fn from_message(
        device_id: u64,
        message: MessageEnvelope<SnowStatusData>,
    ) -> Result<Self, DecodeError> {
        if message.cmd_id != Self::command_id() {
            return Err(DecodeError::UnexpectedCommand {
                kind: "Snow",
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

    pub fn message(&self) -> &MessageEnvelope<SnowStatusData> {
        &self.message
    }

    fn data(&self) -> &SnowStatusData {
        &self.message.data
    }

    pub fn battery(&self) -> u32 {
        self.data().battery
    }

    pub fn battery_state(&self) -> &BatteryState {
        &self.data().battery_state
    }

    pub fn is_charging(&self) -> bool {
        self.data().battery_state == BatteryState::Charging
    }

    pub fn is_discharge(&self) -> bool {
        self.data().battery_state == BatteryState::Discharge
    }

    pub fn temperature(&self) -> f64 {
        self.data().t / 100.0
    }

    pub fn temperature_state(&self) -> &SensorState {
        &self.data().temp_state
    }

    pub fn is_temperature_sampling(&self) -> bool {
        self.data().temp_state == SensorState::Sampling
    }

    pub fn temperature_unit(&self) -> &str {
        &self.data().temp_unit
    }

    pub fn outdoor_temperature(&self) -> f64 {
        self.data().ot / 100.0
    }

    pub fn humidity(&self) -> f64 {
        self.data().h / 100.0
    }

    pub fn humidity_state(&self) -> &SensorState {
        &self.data().humi_state
    }

    pub fn is_humidity_sampling(&self) -> bool {
        self.data().humi_state == SensorState::Sampling
    }

    pub fn outdoor_humidity(&self) -> f64 {
        self.data().oh / 100.0
    }

    /// Indoor PM2.5.
    pub fn pm25(&self) -> f64 {
        self.data().pm25
    }

    /// Indoor PM10.
    pub fn pm100(&self) -> f64 {
        self.data().pm100
    }

    pub fn outdoor_pm25(&self) -> f64 {
        self.data().opm25
    }

    pub fn outdoor_pm100(&self) -> f64 {
        self.data().opm100
    }

    pub fn pm_state(&self) -> &SensorState {
        &self.data().pm_state
    }

    pub fn is_pm_sampling(&self) -> bool {
        self.data().pm_state == SensorState::Sampling
    }

    pub fn pm_time(&self) -> i64 {
        self.data().pm_time
    }

    pub fn co2(&self) -> f64 {
        self.data().co2
    }

    pub fn co2_state(&self) -> &SensorState {
        &self.data().co2_state
    }

    pub fn is_co2_sampling(&self) -> bool {
        self.data().co2_state == SensorState::Sampling
    }

    pub fn co2_time(&self) -> i64 {
        self.data().co2_time
    }

    pub fn tvoc(&self) -> f64 {
        self.data().tvoc
    }

    pub fn tvoc_duration(&self) -> i64 {
        self.data().tvoc_duration
    }

    pub fn tvoc_state(&self) -> &SensorState {
        &self.data().tvoc_state
    }

    pub fn is_tvoc_sampling(&self) -> bool {
        self.data().tvoc_state == SensorState::Sampling
    }

    pub fn tvoc_time(&self) -> i64 {
        self.data().tvoc_time
    }

    pub fn tvoc_unit(&self) -> &str {
        &self.data().tvoc_unit
    }

    /// Device-side time of the report.
    pub fn time(&self) -> i64 {
        self.data().time
    }

    pub fn version(&self) -> &str {
        &self.data().version
    }

    pub fn version_type(&self) -> &str {
        &self.data().version_type
    }
}
