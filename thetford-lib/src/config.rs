use crate::constants::DEFAULT_POLL_INTERVAL_SECS;
use crate::dispatcher::{Dispatcher, Publisher};
use crate::error::BridgeError;
use crate::model::Model;
use crate::source::SampleLimit;
use std::time::Duration;

/// Everything the bridge needs besides the broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub model: Model,
    /// Records go to `{base_topic}/{title}`
    pub base_topic: String,
    pub sample_limit: SampleLimit,
    /// Period of the adapter's master sequence
    pub interval: Duration,
}

impl BridgeConfig {
    pub fn new(model: Model, base_topic: impl Into<String>) -> Self {
        Self {
            model,
            base_topic: base_topic.into().trim().trim_end_matches('/').to_string(),
            sample_limit: SampleLimit::unlimited(),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    pub fn with_sample_limit(mut self, limit: SampleLimit) -> Self {
        self.sample_limit = limit;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The interval as the adapter's master sequence encodes it.
    pub fn interval_ms(&self) -> Result<u32, BridgeError> {
        u32::try_from(self.interval.as_millis())
            .map_err(|_| BridgeError::InvalidConfig(format!("Polling interval of {:?} is too long", self.interval)))
    }

    pub fn dispatcher<P: Publisher>(&self, publisher: Option<P>) -> Dispatcher<P> {
        Dispatcher::new(self.model, self.base_topic.as_str(), publisher)
    }
}
