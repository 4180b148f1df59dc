use rumqttc::{AsyncClient, QoS};

use crate::transport::{Transport, TransportError};

/// [`Transport`] over a `rumqttc` client. Requests are queued on the client's
/// request channel and flushed by the event loop the session driver polls.
#[derive(Clone, Debug)]
pub struct MqttTransport {
    client: AsyncClient,
    qos: QoS,
}

impl MqttTransport {
    pub fn new(client: AsyncClient) -> Self {
        Self {
            client,
            qos: QoS::AtLeastOnce,
        }
    }

    pub fn client(&self) -> &AsyncClient {
        &self.client
    }
}

impl Transport for MqttTransport {
    fn subscribe(&self, filter: &str) -> Result<(), TransportError> {
        self.client
            .try_subscribe(filter, self.qos)
            .map_err(|e| TransportError::Subscribe {
                topic: filter.to_string(),
                reason: e.to_string(),
            })
    }

    fn publish(&self, topic: &str, payload: String) -> Result<(), TransportError> {
        self.client
            .try_publish(topic, self.qos, false, payload)
            .map_err(|e| TransportError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}
