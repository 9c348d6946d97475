//! Common error types for value validation

use thiserror::Error;

/// Result type for value validation
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised when a single value fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Value does not fit into one byte
    #[error("value {value} is not a raw byte (expected 0..=255)")]
    NotAByte { value: i64 },

    /// Value is outside a format-specific range
    #[error("{name} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Value is not a member of an enumeration
    #[error("unknown {kind}: {value}")]
    UnknownEnumerant { kind: &'static str, value: String },
}
