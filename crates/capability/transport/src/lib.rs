use async_trait::async_trait;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use tracing::{debug, warn};

pub mod wire;

pub use wire::{Envelope, PositionFix, TimestampedFloat, TimestampedInt, enclose, open_envelope};

/// 传输链路错误。
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("publish error: {0}")]
    Publish(String),
    #[error("payload error: {0}")]
    Payload(String),
}

/// 消息发布器抽象。
#[async_trait]
pub trait TransportPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// 空发布器（发布关闭时的占位）。
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl TransportPublisher for NoopPublisher {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), TransportError> {
        Ok(())
    }
}

/// MQTT 发布器配置。
#[derive(Debug, Clone)]
pub struct MqttPublisherConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub qos: u8,
}

/// MQTT 发布器实现。
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
}

impl MqttPublisher {
    pub fn connect(
        config: MqttPublisherConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), TransportError> {
        let client_id = format!("trk-publish-{}", uuid::Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (config.username, config.password) {
            options.set_credentials(username, password);
        }
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(err) = eventloop.poll().await {
                    warn!(target: "trk.transport", "mqtt eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
        Ok((
            Self {
                client,
                qos: qos_from_u8(config.qos),
            },
            handle,
        ))
    }
}

#[async_trait]
impl TransportPublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        debug!(
            target: "trk.transport",
            topic = %topic,
            payload_size = payload.len(),
            "telemetry_publish"
        );
        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|err| TransportError::Publish(err.to_string()))?;
        Ok(())
    }
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtMostOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_mapping_defaults_to_at_most_once() {
        assert_eq!(qos_from_u8(0), QoS::AtMostOnce);
        assert_eq!(qos_from_u8(1), QoS::AtLeastOnce);
        assert_eq!(qos_from_u8(2), QoS::ExactlyOnce);
        assert_eq!(qos_from_u8(7), QoS::AtMostOnce);
    }
}
