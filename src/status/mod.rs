//! Typed views over decoded status reports and the in-memory cache of the
//! latest purifier report per device.

pub mod cache;
pub mod eagle;
pub mod snow;

pub use cache::StatusCache;
pub use eagle::{EagleMode, EagleStatus, EagleStatusData};
pub use snow::{BatteryState, SensorState, SnowStatus, SnowStatusData};
