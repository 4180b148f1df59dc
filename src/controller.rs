//! Per-device control intents for Eagle purifiers.
//!
//! Eagle firmware only accepts complete control states. Every intent is a
//! partial [`ControlPatch`] laid over the control fields of the last cached
//! report, so a device that has never reported cannot be controlled.

use tracing::debug;

use crate::adapter::Airmx;
use crate::error::{AirmxError, Result};
use crate::protocol::EagleControlData;
use crate::status::{EagleMode, EagleStatus};
use crate::transport::Transport;

/// Fan rate used by turbo mode.
pub const TURBO_CADR: u32 = 100;

const ON: u8 = 1;
const OFF: u8 = 0;

/// The fields an intent changes. Everything left `None` keeps its cached value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlPatch {
    pub power: Option<u8>,
    pub heat_status: Option<u8>,
    pub mode: Option<EagleMode>,
    pub cadr: Option<u32>,
    pub denoise: Option<u8>,
}

impl ControlPatch {
    pub fn merge(self, current: EagleControlData) -> EagleControlData {
        EagleControlData {
            power: self.power.unwrap_or(current.power),
            heat_status: self.heat_status.unwrap_or(current.heat_status),
            mode: self.mode.map(u8::from).unwrap_or(current.mode),
            cadr: self.cadr.unwrap_or(current.cadr),
            denoise: self.denoise.unwrap_or(current.denoise),
        }
    }
}

pub struct EagleController<'a, T: Transport> {
    airmx: &'a Airmx<T>,
    device_id: u64,
}

impl<'a, T: Transport> EagleController<'a, T> {
    pub fn new(airmx: &'a Airmx<T>, device_id: u64) -> Self {
        Self { airmx, device_id }
    }

    pub fn device_id(&self) -> u64 {
        self.device_id
    }

    /// Latest report from this device.
    pub fn status(&self) -> Result<EagleStatus> {
        self.airmx
            .eagle_status(self.device_id)
            .ok_or(AirmxError::NoStatus(self.device_id))
    }

    pub fn turn_on(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            power: Some(ON),
            ..ControlPatch::default()
        })
    }

    pub fn turn_off(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            power: Some(OFF),
            ..ControlPatch::default()
        })
    }

    pub fn heat_on(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            heat_status: Some(ON),
            ..ControlPatch::default()
        })
    }

    pub fn heat_off(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            heat_status: Some(OFF),
            ..ControlPatch::default()
        })
    }

    pub fn denoise_on(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            denoise: Some(ON),
            ..ControlPatch::default()
        })
    }

    pub fn denoise_off(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            denoise: Some(OFF),
            ..ControlPatch::default()
        })
    }

    /// Switches to manual mode at the given rate, powering the device on.
    pub fn set_fan_rate(&self, cadr: u32) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            power: Some(ON),
            mode: Some(EagleMode::Manual),
            cadr: Some(cadr),
            ..ControlPatch::default()
        })
    }

    pub fn enable_automatic(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            mode: Some(EagleMode::Ai),
            ..ControlPatch::default()
        })
    }

    pub fn enable_silent(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            mode: Some(EagleMode::Silent),
            ..ControlPatch::default()
        })
    }

    pub fn enable_turbo(&self) -> Result<EagleControlData> {
        self.apply(ControlPatch {
            mode: Some(EagleMode::Turbo),
            cadr: Some(TURBO_CADR),
            ..ControlPatch::default()
        })
    }

    /// Merges `patch` over the cached state and publishes the result. Returns
    /// the control data that was sent.
    pub fn apply(&self, patch: ControlPatch) -> Result<EagleControlData> {
        let _guard = self.airmx.control_lock().lock();
        let status = self.status()?;
        let data = patch.merge(status.control_data());
        debug!(
            "Merged {:?} over cached state of device {}",
            patch, self.device_id
        );
        self.airmx.control(self.device_id, data)?;
        Ok(data)
    }
}
