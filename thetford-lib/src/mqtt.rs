//! MQTT publisher using rumqttc.

use crate::dispatcher::Publisher;
use crate::error::BridgeError;
use rumqttc::{AsyncClient, Event, MqttOptions, Outgoing, QoS};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

const CLIENT_ID: &str = "thetford";
const REQUEST_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl MqttSettings {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into().trim().to_string(),
            port,
            username: String::new(),
            password: String::new(),
            client_id: CLIENT_ID.to_string(),
            keep_alive: Duration::from_secs(60),
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.trim().to_string();
        self.password = password.trim().to_string();
        self
    }

    pub fn options(&self) -> MqttOptions {
        let mut opts = MqttOptions::new(&self.client_id, &self.host, self.port);
        opts.set_keep_alive(self.keep_alive);
        if !self.username.is_empty() {
            opts.set_credentials(&self.username, &self.password);
        }
        opts
    }
}

/// Fire-and-forget publisher. The event loop runs on its own task and
/// reconnects on its own after connection errors.
pub struct MqttPublisher {
    client: AsyncClient,
    event_task: JoinHandle<()>,
}

impl MqttPublisher {
    /// Must be called from within a tokio runtime.
    pub fn connect(settings: &MqttSettings) -> Self {
        info!("Connecting to \"{}:{}\"", settings.host, settings.port);
        let (client, mut event_loop) = AsyncClient::new(settings.options(), REQUEST_CAPACITY);

        let event_task = tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        debug!("MQTT disconnect sent");
                        break;
                    }
                    Ok(Event::Incoming(packet)) => debug!(?packet, "MQTT incoming"),
                    Ok(Event::Outgoing(_)) => {}
                    Err(e) => {
                        warn!("MQTT connection error: {}", e);
                        sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Self { client, event_task }
    }

    pub async fn disconnect(self) -> Result<(), BridgeError> {
        self.client.disconnect().await?;
        if timeout(DISCONNECT_TIMEOUT, self.event_task).await.is_err() {
            warn!("MQTT event loop did not stop in time");
        }
        info!("Disconnected from MQTT broker.");
        Ok(())
    }
}

impl Publisher for MqttPublisher {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), BridgeError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())?;
        Ok(())
    }
}
