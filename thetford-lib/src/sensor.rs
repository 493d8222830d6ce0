use num_enum::FromPrimitive;
use serde::Serialize;
use std::fmt;

/// Energy source / operating mode reported in frame byte 0, with the
/// automatic-selection bit masked off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum OperatingMode {
    Off = 0,
    On = 1,
    Standby = 2,
    Gas = 3,
    BatteryFault = 4,
    Battery = 5,
    Fault = 6,
    Mains = 7,
    Night = 9,
    #[num_enum(catch_all)]
    Other(u8),
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Off | OperatingMode::Standby => f.write_str("Off"),
            OperatingMode::On => f.write_str("On"),
            OperatingMode::Gas => f.write_str("Gas"),
            OperatingMode::BatteryFault => f.write_str("FaultBattery?"),
            OperatingMode::Battery => f.write_str("Battery"),
            OperatingMode::Fault => f.write_str("Fault?"),
            OperatingMode::Mains => f.write_str("Mains~230V"),
            OperatingMode::Night => f.write_str("Night"),
            OperatingMode::Other(code) => write!(f, "{code}"),
        }
    }
}

/// Controller status code from frame byte 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum FaultCode {
    Online = 0,
    Gas = 3,
    Heater12V = 4,
    Supply12V = 6,
    DPlus = 7,
    Heater230V = 8,
    Control = 9,
    Supply230V = 10,
    NoEnergySource = 11,
    TempSensor = 13,
    Fault23 = 23,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl FaultCode {
    pub fn is_known(&self) -> bool {
        !matches!(self, FaultCode::Unknown(_))
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::Online => f.write_str("Online"),
            FaultCode::Gas => f.write_str("GasFault"),
            FaultCode::Heater12V => f.write_str("HeaterFault12V"),
            FaultCode::Supply12V => f.write_str("Fault12V"),
            FaultCode::DPlus => f.write_str("FaultDPlus"),
            FaultCode::Heater230V => f.write_str("HeaterFault230V"),
            FaultCode::Control => f.write_str("ControlFault"),
            FaultCode::Supply230V => f.write_str("Fault230V"),
            FaultCode::NoEnergySource => f.write_str("NoEnergySource"),
            FaultCode::TempSensor => f.write_str("TempSensorFault"),
            FaultCode::Fault23 => f.write_str("Fault23"),
            FaultCode::Unknown(code) => write!(f, "UnknownFault({code})"),
        }
    }
}

/// Interpreted value of a sensor field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Text(String),
}

/// Where a record came from: a frame index, or derived from another field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Field(usize),
    Synthetic,
}

/// One decoded reading. Serializes to the JSON body published on
/// `{base_topic}/{title}`; title and origin stay out of the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    #[serde(skip)]
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip)]
    pub origin: Origin,
}

impl SensorRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
