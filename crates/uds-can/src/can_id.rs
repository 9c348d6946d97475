//! CAN identifier handling
//!
//! Normal fixed and mixed 29-bit addressing embed the addressing type,
//! target address and source address in the identifier itself:
//!
//! ```text
//!  28..26   25  24  23..16  15..8   7..0
//! priority  R   DP    PF     TA      SA
//! ```
//!
//! PF selects the format and addressing type (0xDA/0xDB for normal fixed,
//! 0xCE/0xCD for mixed 29-bit); R and DP must be zero.

use uds_core::{AddressingType, ValueError};

use crate::error::{AddressingError, AddressingResult};

/// Highest 11-bit identifier
pub const MAX_STANDARD_ID: u32 = 0x7FF;
/// Highest 29-bit identifier
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;
/// Priority used when the caller gives none
pub const DEFAULT_PRIORITY: u8 = 6;
/// Highest 3-bit priority
pub const MAX_PRIORITY: u8 = 7;

const PRIORITY_SHIFT: u32 = 26;
/// R, DP and PF bits
const FORMAT_MASK: u32 = 0x03FF_0000;

const NORMAL_FIXED_PHYSICAL: u32 = 0x00DA_0000;
const NORMAL_FIXED_FUNCTIONAL: u32 = 0x00DB_0000;
const MIXED_29BIT_PHYSICAL: u32 = 0x00CE_0000;
const MIXED_29BIT_FUNCTIONAL: u32 = 0x00CD_0000;

/// Addressing fields carried by a 29-bit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanIdFields {
    pub addressing_type: AddressingType,
    pub target_address: u8,
    pub source_address: u8,
    pub priority: u8,
}

/// Identifier layout of one 29-bit addressing format
#[derive(Debug, Clone, Copy)]
struct FixedLayout {
    name: &'static str,
    physical: u32,
    functional: u32,
}

const NORMAL_FIXED: FixedLayout = FixedLayout {
    name: "normal fixed",
    physical: NORMAL_FIXED_PHYSICAL,
    functional: NORMAL_FIXED_FUNCTIONAL,
};

const MIXED_29BIT: FixedLayout = FixedLayout {
    name: "mixed 29-bit",
    physical: MIXED_29BIT_PHYSICAL,
    functional: MIXED_29BIT_FUNCTIONAL,
};

impl FixedLayout {
    fn encode(
        &self,
        addressing_type: AddressingType,
        target_address: u8,
        source_address: u8,
        priority: Option<u8>,
    ) -> AddressingResult<u32> {
        let priority = validate_priority(priority.unwrap_or(DEFAULT_PRIORITY))?;
        let base = match addressing_type {
            AddressingType::Physical => self.physical,
            AddressingType::Functional => self.functional,
        };
        Ok(((priority as u32) << PRIORITY_SHIFT)
            | base
            | ((target_address as u32) << 8)
            | source_address as u32)
    }

    fn decode(&self, can_id: u32) -> AddressingResult<CanIdFields> {
        if !is_extended_id(can_id) {
            return Err(AddressingError::invalid_can_id(can_id, "not a 29-bit identifier"));
        }
        let addressing_type = match can_id & FORMAT_MASK {
            id if id == self.physical => AddressingType::Physical,
            id if id == self.functional => AddressingType::Functional,
            _ => {
                return Err(AddressingError::invalid_can_id(
                    can_id,
                    format!("not a {} addressed identifier", self.name),
                ))
            }
        };
        Ok(CanIdFields {
            addressing_type,
            target_address: (can_id >> 8) as u8,
            source_address: can_id as u8,
            priority: (can_id >> PRIORITY_SHIFT) as u8,
        })
    }
}

fn validate_priority(priority: u8) -> AddressingResult<u8> {
    if priority > MAX_PRIORITY {
        return Err(ValueError::OutOfRange {
            name: "priority".to_string(),
            value: priority as i64,
            min: 0,
            max: MAX_PRIORITY as i64,
        }
        .into());
    }
    Ok(priority)
}

/// Whether the value fits an 11-bit identifier
pub fn is_standard_id(can_id: u32) -> bool {
    can_id <= MAX_STANDARD_ID
}

/// Whether the value fits a 29-bit identifier
pub fn is_extended_id(can_id: u32) -> bool {
    can_id <= MAX_EXTENDED_ID
}

/// Whether the value is a usable CAN identifier of either width
pub fn is_can_id(can_id: u32) -> bool {
    is_extended_id(can_id)
}

pub fn is_normal_11bit_addressed(can_id: u32) -> bool {
    is_standard_id(can_id)
}

pub fn is_mixed_11bit_addressed(can_id: u32) -> bool {
    is_standard_id(can_id)
}

pub fn is_normal_fixed_addressed(can_id: u32) -> bool {
    NORMAL_FIXED.decode(can_id).is_ok()
}

pub fn is_mixed_29bit_addressed(can_id: u32) -> bool {
    MIXED_29BIT.decode(can_id).is_ok()
}

/// Build a normal fixed identifier (priority defaults to 6)
pub fn encode_normal_fixed(
    addressing_type: AddressingType,
    target_address: u8,
    source_address: u8,
    priority: Option<u8>,
) -> AddressingResult<u32> {
    NORMAL_FIXED.encode(addressing_type, target_address, source_address, priority)
}

pub fn decode_normal_fixed(can_id: u32) -> AddressingResult<CanIdFields> {
    NORMAL_FIXED.decode(can_id)
}

/// Build a mixed 29-bit identifier (priority defaults to 6)
pub fn encode_mixed_29bit(
    addressing_type: AddressingType,
    target_address: u8,
    source_address: u8,
    priority: Option<u8>,
) -> AddressingResult<u32> {
    MIXED_29BIT.encode(addressing_type, target_address, source_address, priority)
}

pub fn decode_mixed_29bit(can_id: u32) -> AddressingResult<CanIdFields> {
    MIXED_29BIT.decode(can_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_normal_fixed_tester_ids() {
        // Tester (0xF1) to ECU 0x10 and back
        let request = encode_normal_fixed(AddressingType::Physical, 0x10, 0xF1, None).unwrap();
        assert_eq!(request, 0x18DA10F1);
        let response = decode_normal_fixed(0x18DAF110).unwrap();
        assert_eq!(response.addressing_type, AddressingType::Physical);
        assert_eq!(response.target_address, 0xF1);
        assert_eq!(response.source_address, 0x10);
        assert_eq!(response.priority, DEFAULT_PRIORITY);

        let functional = encode_normal_fixed(AddressingType::Functional, 0x33, 0xF1, None).unwrap();
        assert_eq!(functional, 0x18DB33F1);
    }

    #[test]
    fn test_mixed_29bit_ids() {
        assert_eq!(
            encode_mixed_29bit(AddressingType::Physical, 0x10, 0xF1, Some(3)).unwrap(),
            0x0CCE10F1
        );
        let fields = decode_mixed_29bit(0x18CD00F1).unwrap();
        assert_eq!(fields.addressing_type, AddressingType::Functional);
        assert_eq!(fields.priority, 6);
        assert!(decode_mixed_29bit(0x18DA10F1).is_err());
        assert!(decode_normal_fixed(0x18CE10F1).is_err());
    }

    #[rstest]
    #[case::data_page_set(0x19DA10F1)]
    #[case::reserved_set(0x1ADA10F1)]
    #[case::too_wide(0x20DA10F1)]
    #[case::standard(0x7E0)]
    fn test_rejects_foreign_ids(#[case] can_id: u32) {
        assert!(!is_normal_fixed_addressed(can_id));
        assert!(decode_normal_fixed(can_id).is_err());
    }

    #[test]
    fn test_priority_range() {
        assert!(matches!(
            encode_normal_fixed(AddressingType::Physical, 0, 0, Some(8)),
            Err(AddressingError::ValueOutOfRange(_))
        ));
        assert_eq!(
            encode_normal_fixed(AddressingType::Physical, 0, 0, Some(0)).unwrap(),
            0x00DA0000
        );
    }

    #[test]
    fn test_id_widths() {
        assert!(is_standard_id(0x7FF));
        assert!(!is_standard_id(0x800));
        assert!(is_extended_id(0x1FFFFFFF));
        assert!(!is_can_id(0x20000000));
        assert!(is_normal_11bit_addressed(0x7E0));
        assert!(is_mixed_11bit_addressed(0x7E8));
    }
}
