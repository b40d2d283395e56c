//! Message-bus port and the MQTT session adapter behind it.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnAck, ConnectReturnCode, Event, MqttOptions, Packet, QoS};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::BrokerConfig;

/// Error type for broker operations
#[derive(Debug, Error)]
pub enum BusError {
    #[error("mqtt connection failed: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
    #[error("broker refused the connection: {0:?}")]
    Refused(ConnectReturnCode),
    #[error("mqtt request failed: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// The publish capability the reporting core consumes.
///
/// Callers only ever log a failed publish; delivery is best-effort.
pub trait MessageBus {
    type Error: std::fmt::Display;

    async fn publish(&self, topic: &str, payload: String) -> Result<(), Self::Error>;
}

/// An established MQTT session.
///
/// Keep-alive and reconnection live in the background driver task; link
/// trouble after the initial handshake never surfaces to the core.
pub struct MqttSession {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

impl MqttSession {
    const KEEP_ALIVE: Duration = Duration::from_secs(30);
    const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

    /// Connect to the broker and wait for its ConnAck before returning.
    /// A refused or failed handshake propagates to process start-up.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, BusError> {
        info!(
            "connecting to MQTT broker {}:{} as {}",
            config.host, config.port, config.client_id
        );

        let mut options =
            MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(Self::KEEP_ALIVE);
        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(user.clone(), password.clone());
        }

        let (client, mut event_loop) = AsyncClient::new(options, 16);

        loop {
            match event_loop.poll().await? {
                Event::Incoming(Packet::ConnAck(ConnAck {
                    code: ConnectReturnCode::Success,
                    ..
                })) => break,
                Event::Incoming(Packet::ConnAck(ConnAck { code, .. })) => {
                    return Err(BusError::Refused(code))
                }
                event => trace!(?event, "mqtt handshake event"),
            }
        }
        info!("connected to MQTT broker");

        let driver = tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(event) => trace!(?event, "mqtt event"),
                    Err(err) => {
                        warn!("mqtt connection lost: {err}");
                        tokio::time::sleep(Self::RECONNECT_PAUSE).await;
                    }
                }
            }
        });

        Ok(Self { client, driver })
    }

    /// Send the protocol-level disconnect and stop the driver task.
    pub async fn disconnect(self) -> Result<(), BusError> {
        self.client.disconnect().await?;
        self.driver.abort();
        debug!("mqtt session closed");
        Ok(())
    }
}

impl MessageBus for MqttSession {
    type Error = BusError;

    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await?;
        Ok(())
    }
}
