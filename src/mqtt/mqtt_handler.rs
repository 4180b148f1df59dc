//! Broker session driver with statum typestates.
//!
//! # State Machine
//!
//! ```text
//! Disconnected ──(ConnAck)──► Connected
//!      ▲                          │
//!      └────(poll error)──────────┘
//! ```
//!
//! Entering `Connected` calls [`Airmx::handle_connect`]; every inbound publish
//! while connected goes to [`Airmx::handle_message`]. Reconnecting is left to
//! `rumqttc`: polling the event loop again after an error opens a new
//! connection.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{Event, EventLoop, Incoming};
use statum::{machine, state};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::transport::MqttTransport;
use crate::adapter::Airmx;

#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Disconnected,
    Connected,
}

#[machine]
pub struct MqttSession<S: SessionState> {
    event_loop: EventLoop,
    airmx: Arc<Airmx<MqttTransport>>,
    reconnect_delay: Duration,
}

impl MqttSession<Disconnected> {
    pub fn create(
        event_loop: EventLoop,
        airmx: Arc<Airmx<MqttTransport>>,
        reconnect_delay: Duration,
    ) -> Self {
        Self::new(event_loop, airmx, reconnect_delay)
    }

    /// Polls until the broker acknowledges a connection. Returns `None` when
    /// shutdown is requested first.
    pub async fn connect(mut self, shutdown: &CancellationToken) -> Option<MqttSession<Connected>> {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested while disconnected");
                    return None;
                }
                event = self.event_loop.poll() => event,
            };

            match event {
                Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                    info!("Connected to broker: {:?}", ack.code);
                    let connected: MqttSession<Connected> = self.transition();
                    if let Err(e) = connected.airmx.handle_connect() {
                        error!("Failed to bootstrap devices after connect: {}", e);
                    }
                    return Some(connected);
                }
                Ok(event) => debug!("Ignoring {:?} before connect", event),
                Err(e) => {
                    warn!(
                        "Connection attempt failed: {}, retrying in {:?}",
                        e, self.reconnect_delay
                    );
                    tokio::select! {
                        _ = shutdown.cancelled() => return None,
                        _ = tokio::time::sleep(self.reconnect_delay) => {}
                    }
                }
            }
        }
    }
}

impl MqttSession<Connected> {
    /// Feeds broker events to the adapter until the connection drops
    /// (`Some`) or shutdown is requested (`None`).
    pub async fn run(mut self, shutdown: &CancellationToken) -> Option<MqttSession<Disconnected>> {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, disconnecting");
                    if let Err(e) = self.airmx.transport().client().try_disconnect() {
                        warn!("Failed to queue disconnect: {}", e);
                    }
                    return None;
                }
                event = self.event_loop.poll() => event,
            };

            match event {
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    if let Err(e) = self.airmx.handle_message(&publish.topic, &publish.payload) {
                        warn!("Rejected message on {}: {}", publish.topic, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Connection lost: {}", e);
                    return Some(self.transition());
                }
            }
        }
    }
}

/// Alternates between the two states until `shutdown` fires.
pub async fn run_session(
    event_loop: EventLoop,
    airmx: Arc<Airmx<MqttTransport>>,
    reconnect_delay: Duration,
    shutdown: CancellationToken,
) {
    let mut session = MqttSession::<Disconnected>::create(event_loop, airmx, reconnect_delay);
    loop {
        let Some(connected) = session.connect(&shutdown).await else {
            break;
        };
        let Some(disconnected) = connected.run(&shutdown).await else {
            break;
        };
        session = disconnected;
    }
    info!("MQTT session stopped");
}
