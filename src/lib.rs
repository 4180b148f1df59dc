//! Protocol adapter for AIRMX air purifiers (Eagle) and air-quality monitors
//! (Snow) speaking signed JSON over MQTT.
//!
//! [`Airmx`] is driven by two events from the transport, `connected` and
//! `message`. It authenticates inbound reports, keeps the latest purifier
//! status per device and fans reports out to registered listeners. Control
//! goes through [`EagleController`], which rebuilds a complete control state
//! from the cached report before signing and publishing it.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod mqtt;
pub mod protocol;
pub mod status;
pub mod transport;

pub use adapter::{Airmx, Dispatched, Listener, ListenerResult};
pub use config::{AdapterConfig, Config, Device, ListenerPolicy, TopicPolicy};
pub use controller::{ControlPatch, EagleController};
pub use error::{AirmxError, DecodeError, Result};
pub use protocol::{EagleControlData, MessageEnvelope, MessageSource, Signer, Topic};
pub use status::{EagleMode, EagleStatus, SnowStatus, StatusCache};
pub use transport::{Transport, TransportError};
