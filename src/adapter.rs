//! The dispatcher between the transport and application code.
//!
//! # Data flow
//!
//! ```text
//! transport ──► handle_message ──► Topic::parse ──► Signer ──► decode(cmdId)
//!                                                                  │
//!                                          StatusCache ◄───────────┤
//!                                                                  ▼
//!                                                            listeners
//!
//! EagleController ──► StatusCache (merge) ──► control ──► Signer ──► transport
//! ```
//!
//! The adapter holds no connection of its own. It reacts to `connected` and
//! `message` events handed to it by the transport driver and is safe to share
//! between threads: the cache, the listener registries and the control path
//! are each guarded by their own lock.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{AdapterConfig, Device, ListenerPolicy, TopicPolicy};
use crate::controller::EagleController;
use crate::error::{AirmxError, DecodeError, Result};
use crate::protocol::message::EnvelopeHeader;
use crate::protocol::{
    command, CommandMessage, EagleControlData, InstantPushData, Signer, Topic, STATUS_FILTER,
};
use crate::status::{EagleStatus, SnowStatus, StatusCache};
use crate::transport::Transport;

pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A registered status callback.
pub type Listener<S> = Arc<dyn Fn(&S) -> ListenerResult + Send + Sync>;

struct Listeners {
    eagle: Vec<Listener<EagleStatus>>,
    snow: Vec<Listener<SnowStatus>>,
}

/// Outcome of a message that passed validation (or was dropped before it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Snow { device_id: u64 },
    Eagle { device_id: u64 },
    /// Signed correctly but carries a command this adapter does not handle.
    /// `cmd_id` is `None` when the field is absent or not an integer.
    Unhandled { device_id: u64, cmd_id: Option<i64> },
    /// The topic did not parse and [`TopicPolicy::Ignore`] is in effect.
    Dropped,
}

pub struct Airmx<T: Transport> {
    transport: T,
    devices: Vec<Device>,
    settings: AdapterConfig,
    signer: Signer,
    eagles: StatusCache,
    listeners: RwLock<Listeners>,
    control_lock: Mutex<()>,
}

impl<T: Transport> Airmx<T> {
    pub fn new(transport: T, devices: Vec<Device>) -> Self {
        Self::with_settings(transport, devices, AdapterConfig::default())
    }

    pub fn with_settings(transport: T, devices: Vec<Device>, settings: AdapterConfig) -> Self {
        Self {
            transport,
            devices,
            settings,
            signer: Signer::new(),
            eagles: StatusCache::new(),
            listeners: RwLock::new(Listeners {
                eagle: Vec::new(),
                snow: Vec::new(),
            }),
            control_lock: Mutex::new(()),
        }
    }

    pub fn on_snow_update<F>(&self, callback: F) -> &Self
    where
        F: Fn(&SnowStatus) -> ListenerResult + Send + Sync + 'static,
    {
        self.listeners.write().snow.push(Arc::new(callback));
        self
    }

    pub fn on_eagle_update<F>(&self, callback: F) -> &Self
    where
        F: Fn(&EagleStatus) -> ListenerResult + Send + Sync + 'static,
    {
        self.listeners.write().eagle.push(Arc::new(callback));
        self
    }

    /// Called by the transport driver after every (re)connect.
    ///
    /// Subscribes to the status filter and asks every configured device to
    /// report right away, so partial control commands work without waiting
    /// for the next scheduled report.
    pub fn handle_connect(&self) -> Result<()> {
        info!("Connected, subscribing to {}", STATUS_FILTER);
        self.transport.subscribe(STATUS_FILTER)?;

        let push = InstantPushData::from(self.settings.instant_push);
        let time = unix_time();
        let mut failures = 0;
        let mut first = None;

        for device in &self.devices {
            if let Err(e) = self.publish(device, CommandMessage::instant_push(push, time)) {
                warn!("Instant push to device {} failed: {}", device.id, e);
                failures += 1;
                first.get_or_insert_with(|| e.to_string());
            }
        }
        debug!(
            "Requested instant push from {} of {} device(s)",
            self.devices.len() - failures,
            self.devices.len()
        );

        match first {
            Some(first) => Err(AirmxError::InstantPush { failures, first }),
            None => Ok(()),
        }
    }

    /// Validates, decodes and fans out one inbound message.
    pub fn handle_message(&self, topic: &str, payload: &[u8]) -> Result<Dispatched> {
        let topic = match Topic::parse(topic) {
            Ok(topic) => topic,
            Err(e) => match self.settings.topic_policy {
                TopicPolicy::Strict => return Err(e.into()),
                TopicPolicy::Ignore => {
                    debug!("Dropping message on unrecognised topic {}: {}", topic, e);
                    return Ok(Dispatched::Dropped);
                }
            },
        };
        let device_id = topic.device_id();
        let device = self.get_device(device_id)?;

        let raw = std::str::from_utf8(payload).map_err(DecodeError::from)?;
        let header: EnvelopeHeader = serde_json::from_str(raw).map_err(DecodeError::from)?;
        self.validate_message(device, raw, header.sig())?;

        match header.command_id() {
            Some(command::SNOW_STATUS) => {
                let status = SnowStatus::decode(device_id, raw)?;
                debug!("Snow status from device {}", device_id);
                self.notify_snow(&status)?;
                Ok(Dispatched::Snow { device_id })
            }
            Some(command::EAGLE_STATUS) => {
                let status = EagleStatus::decode(device_id, raw)?;
                debug!("Eagle status from device {}", device_id);
                self.eagles.insert(status.clone());
                self.notify_eagle(&status)?;
                Ok(Dispatched::Eagle { device_id })
            }
            _ => {
                let cmd_id = header.cmd_id.as_ref().and_then(Value::as_i64);
                debug!("Ignoring command {:?} from device {}", header.cmd_id, device_id);
                Ok(Dispatched::Unhandled { device_id, cmd_id })
            }
        }
    }

    /// Signs and publishes a complete control state to one purifier.
    pub fn control(&self, device_id: u64, data: EagleControlData) -> Result<()> {
        let device = self.get_device(device_id)?;
        info!("Sending control to device {}: {:?}", device_id, data);
        self.publish(device, CommandMessage::eagle_control(data, unix_time()))
    }

    pub fn eagle_status(&self, device_id: u64) -> Option<EagleStatus> {
        self.eagles.get(device_id)
    }

    /// Controller for one Eagle purifier.
    pub fn device(&self, device_id: u64) -> EagleController<'_, T> {
        EagleController::new(self, device_id)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn cache(&self) -> &StatusCache {
        &self.eagles
    }

    /// Serialises read-merge-publish sequences issued by controllers.
    pub(crate) fn control_lock(&self) -> &Mutex<()> {
        &self.control_lock
    }

    fn get_device(&self, device_id: u64) -> Result<&Device> {
        self.devices
            .iter()
            .find(|device| device.id == device_id)
            .ok_or(AirmxError::DeviceNotFound(device_id))
    }

    /// A missing or unlocatable signature fails the same way a wrong one does.
    fn validate_message(&self, device: &Device, raw: &str, sig: Option<&str>) -> Result<()> {
        let verified = sig.is_some_and(|sig| {
            self.signer
                .verify(raw, &device.key, sig)
                .unwrap_or(false)
        });
        if !verified {
            warn!("Signature mismatch for device {}", device.id);
            return Err(AirmxError::Signature {
                device_id: device.id,
            });
        }
        Ok(())
    }

    fn publish<D: Serialize>(&self, device: &Device, message: CommandMessage<D>) -> Result<()> {
        let sig = self
            .signer
            .sign(&message, &device.key)
            .map_err(AirmxError::Encode)?;
        let payload =
            serde_json::to_string(&message.into_envelope(sig)).map_err(AirmxError::Encode)?;
        let topic = Topic::command(device.id).to_string();
        debug!("Publishing to {}: {}", topic, payload);
        self.transport.publish(&topic, payload)?;
        Ok(())
    }

    fn notify_snow(&self, status: &SnowStatus) -> Result<()> {
        let listeners = self.listeners.read().snow.clone();
        self.notify("snow", &listeners, status)
    }

    fn notify_eagle(&self, status: &EagleStatus) -> Result<()> {
        let listeners = self.listeners.read().eagle.clone();
        self.notify("eagle", &listeners, status)
    }

    /// Runs every listener in registration order, whatever the others return.
    fn notify<S>(&self, kind: &str, listeners: &[Listener<S>], status: &S) -> Result<()> {
        let mut failures = 0;
        let mut first = None;

        for (index, listener) in listeners.iter().enumerate() {
            if let Err(e) = listener(status) {
                warn!("The {} listener #{} failed: {}", kind, index, e);
                failures += 1;
                first.get_or_insert_with(|| e.to_string());
            }
        }

        match (self.settings.listener_policy, first) {
            (ListenerPolicy::Propagate, Some(first)) => {
                Err(AirmxError::Listener { failures, first })
            }
            _ => Ok(()),
        }
    }
}

fn unix_time() -> i64 {
    chrono::Utc::now().timestamp()
}
