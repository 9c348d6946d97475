//! Addressing errors

use thiserror::Error;
use uds_core::ValueError;

/// Result type for addressing operations
pub type AddressingResult<T> = Result<T, AddressingError>;

/// Errors raised while validating or assembling addressing information
#[derive(Debug, Error)]
pub enum AddressingError {
    /// Argument the selected addressing format does not carry
    #[error("usage error: {0}")]
    Usage(String),

    /// Arguments are individually valid but contradict each other, or a
    /// mandatory companion field is missing
    #[error("inconsistent addressing information: {0}")]
    Inconsistent(String),

    /// Field value outside its range
    #[error(transparent)]
    ValueOutOfRange(#[from] ValueError),

    /// CAN identifier not usable with the addressing format
    #[error("invalid CAN ID 0x{can_id:X}: {reason}")]
    InvalidCanId { can_id: u32, reason: String },

    /// Write-once parameter set assigned a second time
    #[error("{0} addressing parameters are already set")]
    AlreadySet(&'static str),

    /// Holder built before all parameter sets were assigned
    #[error("{0} addressing parameters are not set")]
    Incomplete(&'static str),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AddressingError {
    pub(crate) fn invalid_can_id(can_id: u32, reason: impl Into<String>) -> Self {
        AddressingError::InvalidCanId {
            can_id,
            reason: reason.into(),
        }
    }
}
