use nusb::transfer::TransferError;
use thiserror::Error;

/// The primary error type for the `thetford-lib` library.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("USBlini adapter not found. Is the device with id 04d8:e870 connected?")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    #[error("USB transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Timeout during USB operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
