#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use airmx::{AdapterConfig, Airmx, Device, Signer, Transport, TransportError};
use parking_lot::Mutex;
use serde_json::Value;

pub const KEY: &str = "f0eb21fe346c88e1d1ac73546022cd5d";
pub const OTHER_KEY: &str = "0123456789abcdef0123456789abcdef";

pub const EAGLE_STATUS: &str = include_str!("../fixtures/eagle_status.json");
pub const EAGLE_STATUS_BAD_SIG: &str = include_str!("../fixtures/eagle_status_bad_sig.json");
pub const EAGLE_STATUS_INCOMPLETE: &str =
    include_str!("../fixtures/eagle_status_incomplete.json");
pub const SNOW_STATUS: &str = include_str!("../fixtures/snow_status.json");
pub const UNKNOWN_COMMAND: &str = include_str!("../fixtures/unknown_command.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Subscribe(String),
    Publish { topic: String, payload: String },
}

/// Transport double that records every hand-off.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    fail_publish: AtomicBool,
    failing_topics: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Publish { topic, payload } => Some((topic, payload)),
                Call::Subscribe(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Rejects every publish to `topic`, leaving other topics untouched.
    pub fn fail_topic(&self, topic: &str) {
        self.failing_topics.lock().push(topic.to_string());
    }
}

impl Transport for RecordingTransport {
    fn subscribe(&self, filter: &str) -> Result<(), TransportError> {
        self.calls.lock().push(Call::Subscribe(filter.to_string()));
        Ok(())
    }

    fn publish(&self, topic: &str, payload: String) -> Result<(), TransportError> {
        let failing = self.fail_publish.load(Ordering::SeqCst)
            || self.failing_topics.lock().iter().any(|t| t == topic);
        if failing {
            return Err(TransportError::Publish {
                topic: topic.to_string(),
                reason: "queue full".to_string(),
            });
        }
        self.calls.lock().push(Call::Publish {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}

pub fn devices() -> Vec<Device> {
    vec![Device::new(1, KEY), Device::new(2, OTHER_KEY)]
}

pub fn adapter() -> (Arc<RecordingTransport>, Airmx<Arc<RecordingTransport>>) {
    adapter_with(AdapterConfig::default())
}

pub fn adapter_with(
    settings: AdapterConfig,
) -> (Arc<RecordingTransport>, Airmx<Arc<RecordingTransport>>) {
    let transport = Arc::new(RecordingTransport::default());
    let airmx = Airmx::with_settings(transport.clone(), devices(), settings);
    (transport, airmx)
}

/// Re-signs an inbound payload after its body has been edited.
pub fn resign(raw: &str, key: &str) -> String {
    let end = raw.find("\"sig\"").expect("payload has a sig field");
    let body = &raw[..end];
    let sig = Signer::new()
        .inbound_digest(&format!("{}\"sig\":\"\"}}", body), key)
        .expect("digest");
    format!("{}\"sig\":\"{}\"}}", body, sig)
}

/// Checks an outbound payload against the outbound signing convention and
/// returns it parsed.
pub fn verify_outbound(payload: &str, key: &str) -> Value {
    let end = payload.find(",\"sig\"").expect("payload has a sig field");
    let body = &payload[1..end];
    let value: Value = serde_json::from_str(payload).expect("valid json");
    let expected = Signer::new().sign_text(body, key);
    assert_eq!(value["sig"], Value::String(expected), "bad signature on {}", payload);
    value
}
