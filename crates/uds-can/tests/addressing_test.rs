//! Addressing validation and holder tests
//!
//! Run with: cargo test -p uds-can --test addressing_test

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;

use uds_can::can_id::{encode_mixed_29bit, encode_normal_fixed};
use uds_can::{
    AddressingConfig, AddressingError, AddressingInformation, AddressingParams, AddressingType,
    CanAddressingFormat, PacketAiParams,
};

fn normal_fixed_holder() -> AddressingInformation {
    AddressingInformation::builder(CanAddressingFormat::NormalFixed)
        .rx_physical(&AddressingParams::new().target_address(0x10).source_address(0xF1))
        .unwrap()
        .tx_physical(&AddressingParams::new().target_address(0xF1).source_address(0x10))
        .unwrap()
        .rx_functional(&AddressingParams::new().target_address(0x33).source_address(0xF1))
        .unwrap()
        .tx_functional(&AddressingParams::new().target_address(0xF1).source_address(0x33))
        .unwrap()
        .build()
        .unwrap()
}

fn physical() -> PacketAiParams {
    PacketAiParams::new(AddressingType::Physical)
}

fn functional() -> PacketAiParams {
    PacketAiParams::new(AddressingType::Functional)
}

#[rstest]
#[case::normal_11bit(
    CanAddressingFormat::Normal11Bit,
    physical().with_can_id(0x7E0)
)]
#[case::normal_11bit_bad(
    CanAddressingFormat::Normal11Bit,
    physical().with_can_id(0x7E0).with_source_address(1)
)]
#[case::normal_fixed(
    CanAddressingFormat::NormalFixed,
    functional().with_can_id(0x18DB33F1)
)]
#[case::normal_fixed_bad(
    CanAddressingFormat::NormalFixed,
    physical().with_can_id(0x18DA10F1).with_target_address(0x11)
)]
#[case::extended(
    CanAddressingFormat::Extended,
    physical().with_can_id(0x6F1).with_target_address(0x12)
)]
#[case::mixed_11bit_bad(
    CanAddressingFormat::Mixed11Bit,
    physical().with_can_id(0x800).with_address_extension(1)
)]
#[case::mixed_29bit(
    CanAddressingFormat::Mixed29Bit,
    physical().with_target_address(0x10).with_source_address(0xF1).with_address_extension(0)
)]
fn validation_is_idempotent(#[case] format: CanAddressingFormat, #[case] params: PacketAiParams) {
    let first = format.validate_packet_ai(&params).map_err(|e| e.to_string());
    let second = format.validate_packet_ai(&params).map_err(|e| e.to_string());
    assert_eq!(first, second);
}

#[rstest]
fn differing_target_address_always_fails(
    #[values(CanAddressingFormat::NormalFixed, CanAddressingFormat::Mixed29Bit)]
    format: CanAddressingFormat,
    #[values(0x00, 0x10, 0x7F, 0xFF)] encoded: u8,
    #[values(0x00, 0x01, 0x10, 0xFE, 0xFF)] supplied: u8,
) {
    let can_id = match format {
        CanAddressingFormat::NormalFixed => {
            encode_normal_fixed(AddressingType::Physical, encoded, 0xF1, None).unwrap()
        }
        _ => encode_mixed_29bit(AddressingType::Physical, encoded, 0xF1, None).unwrap(),
    };
    let mut params = PacketAiParams::new(AddressingType::Physical)
        .with_can_id(can_id)
        .with_target_address(supplied);
    if format == CanAddressingFormat::Mixed29Bit {
        params = params.with_address_extension(0);
    }

    let result = format.validate_packet_ai(&params);
    if encoded == supplied {
        let info = result.unwrap();
        assert_eq!(info.target_address, Some(encoded));
        assert_eq!(info.source_address, Some(0xF1));
    } else {
        assert!(matches!(result, Err(AddressingError::Inconsistent(_))));
    }
}

#[test]
fn holder_parameters_cannot_be_reassigned() {
    let builder = AddressingInformation::builder(CanAddressingFormat::NormalFixed)
        .rx_physical(&AddressingParams::new().target_address(0x10).source_address(0xF1))
        .unwrap()
        .tx_physical(&AddressingParams::new().target_address(0xF1).source_address(0x10))
        .unwrap()
        .rx_functional(&AddressingParams::new().target_address(0x33).source_address(0xF1))
        .unwrap()
        .tx_functional(&AddressingParams::new().target_address(0xF1).source_address(0x33))
        .unwrap();
    let params = AddressingParams::new().can_id(0x18DA10F1);

    assert!(matches!(builder.clone().rx_physical(&params), Err(AddressingError::AlreadySet(_))));
    assert!(matches!(builder.clone().tx_physical(&params), Err(AddressingError::AlreadySet(_))));
    assert!(matches!(builder.clone().rx_functional(&params), Err(AddressingError::AlreadySet(_))));
    assert!(matches!(builder.tx_functional(&params), Err(AddressingError::AlreadySet(_))));
}

#[test]
fn other_end_swaps_directions() {
    let holder = normal_fixed_holder();
    let peer = holder.get_other_end();

    assert_eq!(peer.rx_physical(), holder.tx_physical());
    assert_eq!(peer.tx_physical(), holder.rx_physical());
    assert_eq!(peer.rx_functional(), holder.tx_functional());
    assert_eq!(peer.tx_functional(), holder.rx_functional());
    assert_eq!(peer.rx_physical().can_id, 0x18DAF110);
    assert_eq!(peer.get_other_end(), holder);
}

#[test]
fn input_packets_are_classified() {
    let holder = normal_fixed_holder();
    assert_eq!(
        holder.is_input_packet(0x18DA10F1, &[0x02, 0x10, 0x03]),
        Some(AddressingType::Physical)
    );
    assert_eq!(
        holder.is_input_packet(0x18DB33F1, &[0x02, 0x3E, 0x80]),
        Some(AddressingType::Functional)
    );
    assert_eq!(holder.is_input_packet(0x18DAF110, &[0x02, 0x50, 0x03]), None);
    assert_eq!(holder.is_input_packet(0x7E0, &[0x02, 0x10, 0x03]), None);
}

#[test]
fn mixed_29bit_input_packets_match_extension() {
    let ext = |ae: i64, ta: i64, sa: i64| {
        AddressingParams::new().target_address(ta).source_address(sa).address_extension(ae)
    };
    let holder = AddressingInformation::builder(CanAddressingFormat::Mixed29Bit)
        .rx_physical(&ext(0x01, 0x10, 0xF1))
        .unwrap()
        .tx_physical(&ext(0x01, 0xF1, 0x10))
        .unwrap()
        .rx_functional(&ext(0x02, 0x33, 0xF1))
        .unwrap()
        .tx_functional(&ext(0x02, 0xF1, 0x33))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(holder.rx_physical().can_id, 0x18CE10F1);
    assert_eq!(holder.rx_functional().can_id, 0x18CD33F1);
    assert_eq!(
        holder.is_input_packet(0x18CE10F1, &[0x01, 0x02, 0x10, 0x01]),
        Some(AddressingType::Physical)
    );
    assert_eq!(holder.is_input_packet(0x18CE10F1, &[0x05, 0x02, 0x10, 0x01]), None);
    assert_eq!(holder.is_input_packet(0x18CE10F1, &[]), None);
}

#[test]
fn config_file_builds_holder() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
format = "normal_fixed"

[rx_physical]
can_id = 0x18DA10F1

[tx_physical]
target_address = 0xF1
source_address = 0x10

[rx_functional]
target_address = 0x33
source_address = 0xF1
addressing_type = "FUNCTIONAL"

[tx_functional]
target_address = 0xF1
source_address = 0x33
"#
    )
    .unwrap();

    let holder = AddressingConfig::from_file(file.path())
        .unwrap()
        .into_addressing_information()
        .unwrap();
    assert_eq!(holder, normal_fixed_holder());
}

#[test]
fn config_with_extension_for_normal_fixed_fails() {
    let config = AddressingConfig::from_toml(
        r#"
format = "normal_fixed"
rx_physical = { can_id = 0x18DA10F1, address_extension = 1 }
tx_physical = { can_id = 0x18DAF110 }
rx_functional = { can_id = 0x18DB33F1 }
tx_functional = { can_id = 0x18DBF133 }
"#,
    )
    .unwrap();
    assert!(matches!(
        config.into_addressing_information(),
        Err(AddressingError::Usage(_))
    ));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        AddressingConfig::from_file(dir.path().join("missing.toml")),
        Err(AddressingError::Io(_))
    ));
}
