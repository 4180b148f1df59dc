//! # MQTT Integration
//!
//! Binds the adapter to a real broker through `rumqttc`.
//!
//! ```text
//! mqtt/
//! ├── config.rs        - Broker settings and MqttOptions construction
//! ├── transport.rs     - Transport implementation over AsyncClient
//! └── mqtt_handler.rs  - Session state machine polling the EventLoop
//! ```
//!
//! The adapter itself stays transport-agnostic; nothing outside this module
//! and `main.rs` touches `rumqttc`.

pub mod config;
pub mod mqtt_handler;
pub mod transport;

pub use config::MqttConfig;
pub use mqtt_handler::{run_session, MqttSession};
pub use transport::MqttTransport;
