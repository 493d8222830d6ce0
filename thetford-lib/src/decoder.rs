//! Status frame decoding.
//!
//! Turns the 8 bytes of a status frame into [`SensorRecord`]s. Records come
//! out in frame index order; records derived from another byte follow the
//! record of that byte directly:
//!
//! - N4000: `Supply`, `Mode`, `Level`, `Dplus`, `Status`, `ExtSupply`, `IntSupply`, 6, 7
//! - T2000: `Supply`, `Level`, `LvlFridge`, `LvlFreezer`, `Dplus`, `Status`, `ExtSupply`, `IntSupply`, 6, 7
//!
//! Decoding has no failure path: every byte value maps to a record.

use crate::constants::{DPLUS_ACTIVE_FLAG, INT_SUPPLY_SCALE, MODE_AUTO_FLAG, STATUS_FRAME_LEN};
use crate::frame::{LevelByte, StatusFrame};
use crate::model::Model;
use crate::sensor::{FaultCode, OperatingMode, Origin, SensorRecord, SensorValue};
use num_enum::FromPrimitive;
use tracing::{trace, warn};

pub const FIELD_TITLES: [&str; STATUS_FRAME_LEN] = ["Supply", "Level", "Dplus", "Status", "ExtSupply", "IntSupply", "", ""];

pub const MODE_TITLE: &str = "Mode";
pub const FRIDGE_LEVEL_TITLE: &str = "LvlFridge";
pub const FREEZER_LEVEL_TITLE: &str = "LvlFreezer";

pub const INDEX_MODE: usize = 0;
pub const INDEX_LEVEL: usize = 1;
pub const INDEX_DPLUS: usize = 2;
pub const INDEX_STATUS: usize = 3;
pub const INDEX_EXT_SUPPLY: usize = 4;
pub const INDEX_INT_SUPPLY: usize = 5;

pub fn operating_mode(byte: u8) -> OperatingMode {
    OperatingMode::from_primitive(byte & !MODE_AUTO_FLAG)
}

pub fn is_automatic(byte: u8) -> bool {
    byte & MODE_AUTO_FLAG != 0
}

pub fn fault_code(byte: u8) -> FaultCode {
    let code = FaultCode::from_primitive(byte);
    if !code.is_known() {
        warn!("Unexpected status code {}", byte);
    }
    code
}

/// Decode every field of `frame` for the given model.
pub fn decode(frame: &StatusFrame, model: Model) -> Vec<SensorRecord> {
    let mut records = Vec::with_capacity(STATUS_FRAME_LEN + 2);
    for index in 0..STATUS_FRAME_LEN {
        decode_field(frame.byte(index), index, model, &mut records);
    }
    records
}

fn decode_field(byte: u8, index: usize, model: Model, out: &mut Vec<SensorRecord>) {
    let title = FIELD_TITLES[index];
    let value = match index {
        INDEX_MODE => {
            let mode = operating_mode(byte);
            trace!("{} / {}", mode, auto_label(byte));
            Some(SensorValue::Text(mode.to_string()))
        }
        INDEX_LEVEL => {
            trace!("{}: {}", title, byte);
            match model {
                Model::N4000 => Some(SensorValue::Integer(i64::from(byte) + 1)),
                Model::T2000 => Some(SensorValue::Integer(i64::from(byte))),
            }
        }
        INDEX_DPLUS => {
            trace!("{}: {}", title, byte);
            match model {
                Model::N4000 => Some(SensorValue::Boolean(byte & DPLUS_ACTIVE_FLAG != 0)),
                Model::T2000 => None,
            }
        }
        INDEX_STATUS => {
            trace!("Status {}", byte);
            Some(SensorValue::Text(fault_code(byte).to_string()))
        }
        INDEX_EXT_SUPPLY => {
            trace!("{}: {} {}", title, byte, model.unit(index).unwrap_or_default());
            match model {
                Model::N4000 => Some(SensorValue::Integer(i64::from(byte))),
                Model::T2000 => None,
            }
        }
        INDEX_INT_SUPPLY => {
            trace!("{}: {} {}", title, byte, model.unit(index).unwrap_or_default());
            Some(SensorValue::Decimal(f64::from(byte) / INT_SUPPLY_SCALE))
        }
        _ => None,
    };

    out.push(SensorRecord {
        title,
        byte: Some(byte),
        value,
        unit: model.unit(index),
        origin: Origin::Field(index),
    });

    match (index, model) {
        (INDEX_MODE, Model::N4000) => out.push(SensorRecord {
            title: MODE_TITLE,
            byte: Some(byte & MODE_AUTO_FLAG),
            value: Some(SensorValue::Text(auto_label(byte).to_string())),
            unit: None,
            origin: Origin::Synthetic,
        }),
        (INDEX_LEVEL, Model::T2000) => {
            let level = LevelByte::from_bytes([byte]);
            out.push(level_record(FRIDGE_LEVEL_TITLE, level.fridge()));
            out.push(level_record(FREEZER_LEVEL_TITLE, level.freezer()));
        }
        _ => {}
    }
}

fn auto_label(byte: u8) -> &'static str {
    if is_automatic(byte) { "Automatic" } else { "Manual" }
}

fn level_record(title: &'static str, level: u8) -> SensorRecord {
    SensorRecord {
        title,
        byte: None,
        value: Some(SensorValue::Integer(i64::from(level))),
        unit: None,
        origin: Origin::Synthetic,
    }
}
