//! Raw byte validation

use crate::error::{ValueError, ValueResult};

/// Confirm that `value` is a single raw byte and return it narrowed.
pub fn validate_raw_byte(value: i64) -> ValueResult<u8> {
    u8::try_from(value).map_err(|_| ValueError::NotAByte { value })
}

/// Validate every element of a byte sequence.
///
/// Fails on the first element outside `0..=255`.
pub fn validate_raw_bytes(values: &[i64]) -> ValueResult<Vec<u8>> {
    values.iter().map(|&v| validate_raw_byte(v)).collect()
}
