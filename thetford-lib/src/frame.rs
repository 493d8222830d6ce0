use crate::constants::{STATUS_FRAME_ID, STATUS_FRAME_LEN};
use bytes::Bytes;
use modular_bitfield::prelude::*;
use std::fmt;

/// LIN protected identifier as it appears on the wire: a 6-bit frame
/// identifier followed by two parity bits.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectedId {
    pub frame_id: B6,
    pub parity: B2,
}

/// Tank level byte of the T2000 series: fridge in the low nibble,
/// freezer in the high nibble.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelByte {
    pub fridge: B4,
    pub freezer: B4,
}

/// A frame as delivered by the bus transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinFrame {
    /// Frame identifier with parity bits removed
    pub id: u8,
    pub data: Bytes,
}

impl LinFrame {
    pub fn new(id: u8, data: impl Into<Bytes>) -> Self {
        Self {
            id: ProtectedId::from_bytes([id]).frame_id(),
            data: data.into(),
        }
    }
}

/// The 8-byte control status frame of the refrigerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFrame {
    bytes: [u8; STATUS_FRAME_LEN],
}

impl StatusFrame {
    pub fn new(bytes: [u8; STATUS_FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Accepts only status frames; everything else the bus carries is
    /// ignored.
    pub fn from_lin(frame: &LinFrame) -> Option<Self> {
        if frame.id != STATUS_FRAME_ID {
            return None;
        }
        let bytes = frame.data.get(..STATUS_FRAME_LEN)?.try_into().ok()?;
        Some(Self { bytes })
    }

    pub fn byte(&self, index: usize) -> u8 {
        self.bytes[index]
    }
}

impl fmt::Display for StatusFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.bytes.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "Byte {index}: 0b{byte:08b} 0x{byte:02x} ({byte})")?;
        }
        Ok(())
    }
}
