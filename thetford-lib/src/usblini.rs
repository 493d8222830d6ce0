//! # USBlini LIN adapter
//!
//! The adapter (`04d8:e870`) exposes one vendor-specific bulk interface.
//! The host sends short commands on `ENDPOINT_OUT`:
//!
//! | command | layout |
//! |---|---|
//! | `SetBaudrate` | `[0x01, baud_lo, baud_hi]` |
//! | `MasterWrite` | `[0x02, id, checksum_mode, len, data..]` |
//! | `MasterSetSequence` | `[0x03, interval_ms (u32 le), spacing_ms (u16 le), count, ids..]` |
//!
//! Once a master sequence is installed the adapter polls the listed
//! identifiers on its own and reports every completed frame on
//! `ENDPOINT_IN` as `[report_type, protected_id, len, data..]`.

use crate::constants::{
    ENDPOINT_IN, ENDPOINT_OUT, LIN_MAX_DATA_LEN, OPEN_RETRY_DELAY_SECS, REPORT_HEADER_SIZE, REPORT_SIZE,
    USBLINI_PID, USBLINI_VID,
};
use crate::error::BridgeError;
use crate::frame::LinFrame;
use crate::source::FrameSource;
use bytes::{Buf, Bytes, BytesMut};
use nusb::{Interface, transfer::RequestBuffer};
use num_enum::{FromPrimitive, IntoPrimitive};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

// Default timeout for USB writes
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

// Read window for a single frame report
const DEFAULT_READ_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Command {
    SetBaudrate = 0x01,
    MasterWrite = 0x02,
    MasterSetSequence = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum ReportType {
    Frame = 0x10,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Checksum the adapter appends to frames it transmits as master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive)]
#[repr(u8)]
pub enum ChecksumMode {
    #[default]
    None = 0,
    Classic = 1,
    Enhanced = 2,
}

pub fn build_set_baudrate(baud: u16) -> Vec<u8> {
    let mut command = BytesMut::with_capacity(3);
    command.extend_from_slice(&[Command::SetBaudrate.into()]);
    command.extend_from_slice(&baud.to_le_bytes());
    command.to_vec()
}

pub fn build_master_write(id: u8, checksum: ChecksumMode, data: &[u8]) -> Result<Vec<u8>, BridgeError> {
    if data.len() > LIN_MAX_DATA_LEN {
        return Err(BridgeError::InvalidReport(format!(
            "LIN frame payload of {} bytes exceeds {}",
            data.len(),
            LIN_MAX_DATA_LEN
        )));
    }
    let mut command = BytesMut::with_capacity(4 + data.len());
    command.extend_from_slice(&[Command::MasterWrite.into(), id, checksum.into(), data.len() as u8]);
    command.extend_from_slice(data);
    Ok(command.to_vec())
}

pub fn build_master_set_sequence(interval_ms: u32, spacing_ms: u16, ids: &[u8]) -> Result<Vec<u8>, BridgeError> {
    let count = u8::try_from(ids.len())
        .map_err(|_| BridgeError::InvalidReport(format!("Sequence of {} identifiers is too long", ids.len())))?;
    let mut command = BytesMut::with_capacity(8 + ids.len());
    command.extend_from_slice(&[Command::MasterSetSequence.into()]);
    command.extend_from_slice(&interval_ms.to_le_bytes());
    command.extend_from_slice(&spacing_ms.to_le_bytes());
    command.extend_from_slice(&[count]);
    command.extend_from_slice(ids);
    Ok(command.to_vec())
}

/// Parses one IN report. Reports other than frame reports yield `None`.
pub fn parse_report(mut bytes: Bytes) -> Result<Option<LinFrame>, BridgeError> {
    if bytes.len() < REPORT_HEADER_SIZE {
        return Err(BridgeError::InsufficientData {
            expected: REPORT_HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let report_type = ReportType::from_primitive(bytes.get_u8());
    let protected_id = bytes.get_u8();
    let len = bytes.get_u8() as usize;

    if report_type != ReportType::Frame {
        debug!(?report_type, "Skipping non-frame report");
        return Ok(None);
    }
    if len > LIN_MAX_DATA_LEN {
        return Err(BridgeError::InvalidReport(format!("Frame length {} exceeds {}", len, LIN_MAX_DATA_LEN)));
    }
    if bytes.remaining() < len {
        return Err(BridgeError::InsufficientData {
            expected: REPORT_HEADER_SIZE + len,
            actual: REPORT_HEADER_SIZE + bytes.remaining(),
        });
    }

    Ok(Some(LinFrame::new(protected_id, bytes.split_to(len))))
}

/// Represents a connection to a USBlini adapter.
pub struct UsbLini {
    interface: Interface,
    read_window: Duration,
}

impl UsbLini {
    pub fn open() -> Result<Self, BridgeError> {
        info!("Searching for USBlini adapter...");
        let device_info = nusb::list_devices()?
            .find(|d| d.vendor_id() == USBLINI_VID && d.product_id() == USBLINI_PID)
            .ok_or(BridgeError::DeviceNotFound)?;

        info!(
            "Found device on bus {} addr {}",
            device_info.bus_number(),
            device_info.device_address()
        );

        let device = device_info.open()?;
        let interface = device.detach_and_claim_interface(0)?;
        info!("Interface claimed successfully.");

        Ok(Self {
            interface,
            read_window: DEFAULT_READ_WINDOW,
        })
    }

    /// Keeps trying to open the adapter until it shows up.
    pub async fn open_with_retry() -> Self {
        loop {
            match Self::open() {
                Ok(adapter) => {
                    info!("Open succeeded");
                    return adapter;
                }
                Err(e) => {
                    warn!("Open failed ({}), check connection and cable", e);
                    warn!("Retrying in {} seconds ..", OPEN_RETRY_DELAY_SECS);
                    sleep(Duration::from_secs(OPEN_RETRY_DELAY_SECS)).await;
                }
            }
        }
    }

    pub async fn set_baudrate(&self, baud: u16) -> Result<(), BridgeError> {
        info!(baud, "Setting LIN baud rate");
        self.send_bytes(build_set_baudrate(baud)).await
    }

    pub async fn master_write(&self, id: u8, checksum: ChecksumMode, data: &[u8]) -> Result<(), BridgeError> {
        self.send_bytes(build_master_write(id, checksum, data)?).await
    }

    /// Installs the adapter's own polling schedule. An empty `ids` list
    /// stops polling.
    pub async fn master_set_sequence(&self, interval_ms: u32, spacing_ms: u16, ids: &[u8]) -> Result<(), BridgeError> {
        info!(interval_ms, spacing_ms, ids = hex::encode(ids), "Setting master sequence");
        self.send_bytes(build_master_set_sequence(interval_ms, spacing_ms, ids)?).await
    }

    /// Stops the master sequence and releases the interface.
    pub async fn close(self) -> Result<(), BridgeError> {
        self.master_set_sequence(0, 0, &[]).await?;
        info!("USBlini adapter closed.");
        Ok(())
    }

    async fn send_bytes(&self, data: Vec<u8>) -> Result<(), BridgeError> {
        debug!(bytes = hex::encode(&data), "USB Write");
        let write_transfer = self.interface.bulk_out(ENDPOINT_OUT, data);
        let completion = timeout(WRITE_TIMEOUT, write_transfer).await?;
        completion.into_result()?;
        Ok(())
    }

    async fn read_report(&self) -> Result<Option<Bytes>, BridgeError> {
        let read_transfer = self.interface.bulk_in(ENDPOINT_IN, RequestBuffer::new(REPORT_SIZE));
        let Ok(completion) = timeout(self.read_window, read_transfer).await else {
            return Ok(None);
        };
        let data = completion.into_result()?;
        debug!(bytes = hex::encode(&data), "USB Read");
        Ok(Some(Bytes::from(data)))
    }
}

impl FrameSource for UsbLini {
    async fn next_frame(&mut self) -> Result<Option<LinFrame>, BridgeError> {
        let Some(report) = self.read_report().await? else {
            return Ok(None);
        };
        match parse_report(report) {
            Ok(frame) => Ok(frame),
            Err(e) => {
                warn!("Dropping malformed report: {}", e);
                Ok(None)
            }
        }
    }
}
