use crate::decoder;
use crate::error::BridgeError;
use crate::frame::{LinFrame, StatusFrame};
use crate::model::Model;
use crate::sensor::{Origin, SensorRecord};
use tracing::{debug, info, warn};

/// Sink for decoded records. Publishing is best-effort: an error is
/// reported back but the dispatcher never retries.
pub trait Publisher {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), BridgeError>;
}

/// Decides which decoded records leave the process for a given model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionPolicy {
    model: Model,
}

impl EmissionPolicy {
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    /// Field records pass when their index is published for the model;
    /// derived records are always published once produced.
    pub fn allows(&self, record: &SensorRecord) -> bool {
        match record.origin {
            Origin::Field(index) => self.model.published_indices().contains(&index),
            Origin::Synthetic => true,
        }
    }
}

/// Decodes accepted frames and forwards the eligible records.
pub struct Dispatcher<P> {
    model: Model,
    policy: EmissionPolicy,
    base_topic: String,
    publisher: Option<P>,
    frames_accepted: u64,
}

impl<P: Publisher> Dispatcher<P> {
    /// A dispatcher without a publisher decodes and logs only.
    pub fn new(model: Model, base_topic: impl Into<String>, publisher: Option<P>) -> Self {
        Self {
            model,
            policy: EmissionPolicy::new(model),
            base_topic: base_topic.into().trim().trim_end_matches('/').to_string(),
            publisher,
            frames_accepted: 0,
        }
    }

    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    pub fn publisher(&self) -> Option<&P> {
        self.publisher.as_ref()
    }

    pub fn into_publisher(self) -> Option<P> {
        self.publisher
    }

    pub fn topic_for(&self, record: &SensorRecord) -> String {
        format!("{}/{}", self.base_topic, record.title)
    }

    /// Handles one frame from the bus. Returns `false` when the frame is
    /// not a status frame and was ignored.
    pub fn handle_frame(&mut self, frame: &LinFrame) -> bool {
        let Some(status) = StatusFrame::from_lin(frame) else {
            return false;
        };
        self.frames_accepted += 1;

        info!("Updating ...");
        info!("Frame #{}:\n{}", self.frames_accepted, status);

        for record in decoder::decode(&status, self.model) {
            if self.policy.allows(&record) {
                self.emit(&record);
            }
        }

        info!("... done");
        true
    }

    fn emit(&self, record: &SensorRecord) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        let payload = match record.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(title = record.title, "Failed to encode record: {}", e);
                return;
            }
        };
        let topic = self.topic_for(record);
        debug!(%topic, "{}", payload);
        if let Err(e) = publisher.publish(&topic, &payload) {
            warn!(%topic, "Publish failed: {}", e);
        }
    }
}
