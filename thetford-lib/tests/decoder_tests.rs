//! Tests for status frame decoding

mod common;

use common::*;
use num_enum::FromPrimitive;
use thetford_lib::decoder::{fault_code, is_automatic, operating_mode};
use thetford_lib::sensor::{FaultCode, OperatingMode};

fn titles(records: &[SensorRecord]) -> Vec<&'static str> {
    records.iter().map(|r| r.title).collect()
}

#[test]
fn test_record_order_n4000() {
    let records = decode(&status_frame(N4000_STATUS_FRAME), Model::N4000);
    assert_eq!(
        titles(&records),
        vec!["Supply", "Mode", "Level", "Dplus", "Status", "ExtSupply", "IntSupply", "", ""]
    );
}

#[test]
fn test_record_order_t2000() {
    let records = decode(&status_frame(T2000_STATUS_FRAME), Model::T2000);
    assert_eq!(
        titles(&records),
        vec!["Supply", "Level", "LvlFridge", "LvlFreezer", "Dplus", "Status", "ExtSupply", "IntSupply", "", ""]
    );
}

#[test]
fn test_decode_n4000_frame() {
    let records = decode(&status_frame(N4000_STATUS_FRAME), Model::N4000);

    assert_eq!(record(&records, "Supply").value, Some(SensorValue::Text("Mains~230V".into())));
    assert_eq!(record(&records, "Mode").value, Some(SensorValue::Text("Automatic".into())));
    assert_eq!(record(&records, "Level").value, Some(SensorValue::Integer(5)));
    assert_eq!(record(&records, "Dplus").value, Some(SensorValue::Boolean(true)));
    assert_eq!(record(&records, "Status").value, Some(SensorValue::Text("Online".into())));

    let ext = record(&records, "ExtSupply");
    assert_eq!(ext.value, Some(SensorValue::Integer(13)));
    assert_eq!(ext.unit, Some("V"));

    let int = record(&records, "IntSupply");
    assert_eq!(int.value, Some(SensorValue::Decimal(13.8)));
    assert_eq!(int.unit, Some("V"));
}

#[test]
fn test_decode_t2000_frame() {
    let records = decode(&status_frame(T2000_STATUS_FRAME), Model::T2000);

    assert_eq!(record(&records, "Supply").value, Some(SensorValue::Text("Battery".into())));
    assert_eq!(record(&records, "Level").value, Some(SensorValue::Integer(0x23)));
    assert_eq!(record(&records, "Dplus").value, None);
    assert_eq!(record(&records, "ExtSupply").value, None);
    assert_eq!(record(&records, "ExtSupply").unit, None);
    assert_eq!(record(&records, "IntSupply").value, Some(SensorValue::Decimal(13.5)));
    assert_eq!(record(&records, "IntSupply").unit, Some("V"));
}

#[test]
fn test_mode_auto_flag_n4000() {
    let records = decode(&frame_with(0, 0x09), Model::N4000);

    let supply = &records[0];
    assert_eq!(supply.title, "Supply");
    assert_eq!(supply.byte, Some(0x09));
    assert_eq!(supply.value, Some(SensorValue::Text("On".into())));

    let mode = &records[1];
    assert_eq!(mode.title, "Mode");
    assert_eq!(mode.byte, Some(0x08));
    assert_eq!(mode.value, Some(SensorValue::Text("Automatic".into())));
    assert_eq!(mode.origin, Origin::Synthetic);
}

#[test]
fn test_mode_manual_n4000() {
    let records = decode(&frame_with(0, 0x03), Model::N4000);
    assert_eq!(records[0].value, Some(SensorValue::Text("Gas".into())));
    assert_eq!(records[1].byte, Some(0));
    assert_eq!(records[1].value, Some(SensorValue::Text("Manual".into())));
}

#[test]
fn test_mode_auto_flag_absent_for_t2000() {
    let records = decode(&frame_with(0, 0x09), Model::T2000);
    assert_eq!(records[0].value, Some(SensorValue::Text("On".into())));
    assert!(records.iter().all(|r| r.title != "Mode"));
}

#[test]
fn test_mode_table() {
    let expected = [
        (0x00, "Off"),
        (0x01, "On"),
        (0x02, "Off"),
        (0x03, "Gas"),
        (0x04, "FaultBattery?"),
        (0x05, "Battery"),
        (0x06, "Fault?"),
        (0x07, "Mains~230V"),
        (0x09, "On"),
        (0x0f, "Mains~230V"),
        (0x10, "16"),
        (0x18, "16"),
        (0xff, "247"),
    ];
    for (byte, label) in expected {
        assert_eq!(operating_mode(byte).to_string(), label, "mode byte {:#04x}", byte);
    }
    // Night is code 9, which carries the auto bit and so only appears
    // through the table directly
    assert_eq!(OperatingMode::from_primitive(9).to_string(), "Night");
    assert_eq!(operating_mode(0x0b), OperatingMode::Gas);
    assert!(is_automatic(0x0b));
    assert!(!is_automatic(0x03));
}

#[test]
fn test_level_split_t2000() {
    let records = decode(&frame_with(1, 0x23), Model::T2000);

    let fridge = record(&records, "LvlFridge");
    assert_eq!(fridge.value, Some(SensorValue::Integer(3)));
    assert_eq!(fridge.byte, None);
    assert_eq!(fridge.origin, Origin::Synthetic);

    let freezer = record(&records, "LvlFreezer");
    assert_eq!(freezer.value, Some(SensorValue::Integer(2)));
    assert_eq!(freezer.byte, None);
}

#[test]
fn test_level_n4000_is_offset_by_one() {
    let records = decode(&frame_with(1, 5), Model::N4000);
    assert_eq!(record(&records, "Level").value, Some(SensorValue::Integer(6)));
    assert!(records.iter().all(|r| r.title != "LvlFridge" && r.title != "LvlFreezer"));

    let records = decode(&frame_with(1, 0xff), Model::N4000);
    assert_eq!(record(&records, "Level").value, Some(SensorValue::Integer(256)));
}

#[test]
fn test_dplus_flag() {
    assert_eq!(
        record(&decode(&frame_with(2, 0x40), Model::N4000), "Dplus").value,
        Some(SensorValue::Boolean(true))
    );
    assert_eq!(
        record(&decode(&frame_with(2, 0xbf), Model::N4000), "Dplus").value,
        Some(SensorValue::Boolean(false))
    );
    let dplus_t2000 = decode(&frame_with(2, 0x40), Model::T2000);
    assert_eq!(record(&dplus_t2000, "Dplus").byte, Some(0x40));
    assert_eq!(record(&dplus_t2000, "Dplus").value, None);
}

#[test]
fn test_fault_code_table() {
    let expected = [
        (0, "Online"),
        (3, "GasFault"),
        (4, "HeaterFault12V"),
        (6, "Fault12V"),
        (7, "FaultDPlus"),
        (8, "HeaterFault230V"),
        (9, "ControlFault"),
        (10, "Fault230V"),
        (11, "NoEnergySource"),
        (13, "TempSensorFault"),
        (23, "Fault23"),
        (1, "UnknownFault(1)"),
        (200, "UnknownFault(200)"),
    ];
    for (byte, label) in expected {
        assert_eq!(fault_code(byte).to_string(), label, "status code {}", byte);
    }
    assert_eq!(fault_code(5), FaultCode::Unknown(5));
}

#[test]
fn test_status_is_never_empty() {
    for byte in 0..=u8::MAX {
        for model in [Model::N4000, Model::T2000] {
            let records = decode(&frame_with(3, byte), model);
            match &record(&records, "Status").value {
                Some(SensorValue::Text(label)) => assert!(!label.is_empty(), "empty status for {}", byte),
                other => panic!("Status for {} decoded to {:?}", byte, other),
            }
        }
    }
}

#[test]
fn test_int_supply_tenths() {
    let records = decode(&frame_with(5, 87), Model::N4000);
    assert_eq!(record(&records, "IntSupply").value, Some(SensorValue::Decimal(8.7)));

    let records = decode(&frame_with(5, 0), Model::T2000);
    assert_eq!(record(&records, "IntSupply").value, Some(SensorValue::Decimal(0.0)));
}

#[test]
fn test_unused_bytes_have_no_value() {
    let records = decode(&status_frame("00000000000000ab"), Model::N4000);
    let last = records.last().unwrap();
    assert_eq!(last.title, "");
    assert_eq!(last.byte, Some(0xab));
    assert_eq!(last.value, None);
    assert_eq!(last.unit, None);
    assert_eq!(last.origin, Origin::Field(7));
}

#[test]
fn test_decode_is_deterministic() {
    for model in [Model::N4000, Model::T2000] {
        let frame = status_frame(N4000_STATUS_FRAME);
        assert_eq!(decode(&frame, model), decode(&frame, model));
    }
}

#[test]
fn test_every_byte_value_decodes() {
    for byte in 0..=u8::MAX {
        let frame = StatusFrame::new([byte; 8]);
        assert_eq!(decode(&frame, Model::N4000).len(), 9);
        assert_eq!(decode(&frame, Model::T2000).len(), 10);
    }
}

#[test]
fn test_record_json_shape() {
    let records = decode(&status_frame(N4000_STATUS_FRAME), Model::N4000);

    assert_eq!(record(&records, "Supply").to_json().unwrap(), r#"{"byte":15,"value":"Mains~230V"}"#);
    assert_eq!(record(&records, "Mode").to_json().unwrap(), r#"{"byte":8,"value":"Automatic"}"#);
    assert_eq!(record(&records, "Dplus").to_json().unwrap(), r#"{"byte":64,"value":true}"#);
    assert_eq!(
        record(&records, "IntSupply").to_json().unwrap(),
        r#"{"byte":138,"value":13.8,"unit":"V"}"#
    );

    let t2000 = decode(&status_frame(T2000_STATUS_FRAME), Model::T2000);
    assert_eq!(record(&t2000, "LvlFreezer").to_json().unwrap(), r#"{"value":2}"#);
    assert_eq!(record(&t2000, "ExtSupply").to_json().unwrap(), r#"{"byte":0}"#);
}
