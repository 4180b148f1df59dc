//! Boundary to the publish/subscribe transport.
//!
//! The adapter never owns a connection. It is handed `connected` and
//! `message` events by whoever drives the transport and calls back through
//! this trait to subscribe and publish. Both calls are hand-offs: they queue
//! the request and return without waiting for the broker.

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to subscribe to {topic}: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("Failed to publish to {topic}: {reason}")]
    Publish { topic: String, reason: String },
}

pub trait Transport: Send + Sync {
    fn subscribe(&self, filter: &str) -> Result<(), TransportError>;

    fn publish(&self, topic: &str, payload: String) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn subscribe(&self, filter: &str) -> Result<(), TransportError> {
        (**self).subscribe(filter)
    }

    fn publish(&self, topic: &str, payload: String) -> Result<(), TransportError> {
        (**self).publish(topic, payload)
    }
}
