//! Common test utilities and shared imports

// Not every test file uses every helper
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use thetford_lib::decoder::decode;
#[allow(unused_imports)]
pub use thetford_lib::error::BridgeError;
#[allow(unused_imports)]
pub use thetford_lib::frame::{LinFrame, StatusFrame};
#[allow(unused_imports)]
pub use thetford_lib::model::Model;
#[allow(unused_imports)]
pub use thetford_lib::sensor::{Origin, SensorRecord, SensorValue};
#[allow(unused_imports)]
pub use thetford_lib::{Dispatcher, Publisher};

use std::sync::{Arc, Mutex};

/// Status frame captured from an N4000 running on mains in automatic mode
#[allow(dead_code)]
pub const N4000_STATUS_FRAME: &str = "0f0440000d8a0000";

/// Status frame captured from a T2000 on battery, fridge level 3, freezer level 2
#[allow(dead_code)]
pub const T2000_STATUS_FRAME: &str = "0523000000870000";

/// Build a status frame from a hex string
#[allow(dead_code)]
pub fn status_frame(hex_data: &str) -> StatusFrame {
    let bytes: [u8; 8] = hex::decode(hex_data)
        .expect("Failed to decode hex")
        .try_into()
        .expect("Status frame must be 8 bytes");
    StatusFrame::new(bytes)
}

/// Status frame with one byte set and all others zero
#[allow(dead_code)]
pub fn frame_with(index: usize, byte: u8) -> StatusFrame {
    let mut bytes = [0u8; 8];
    bytes[index] = byte;
    StatusFrame::new(bytes)
}

#[allow(dead_code)]
pub fn lin_frame(id: u8, hex_data: &str) -> LinFrame {
    LinFrame::new(id, hex::decode(hex_data).expect("Failed to decode hex"))
}

/// Publisher that records every (topic, payload) pair it is handed
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingPublisher {
    pub messages: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn topics(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn payloads(&self) -> Vec<serde_json::Value> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| serde_json::from_str(p).expect("Payload is not JSON"))
            .collect()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), BridgeError> {
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        if self.fail {
            return Err(BridgeError::InvalidReport("broker unavailable".to_string()));
        }
        Ok(())
    }
}

/// Find the record with the given title, panicking if there is none
#[allow(dead_code)]
pub fn record<'a>(records: &'a [SensorRecord], title: &str) -> &'a SensorRecord {
    records
        .iter()
        .find(|r| r.title == title)
        .unwrap_or_else(|| panic!("No record titled {:?}", title))
}
