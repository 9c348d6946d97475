//! Error types for layout definitions and payload translation

use thiserror::Error;
use uds_core::ValueError;

/// Errors raised while building data records, service definitions or catalogs
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Bit length is zero or wider than a raw value can hold
    #[error("record '{record}': invalid bit length {length} (expected 1..={max})")]
    InvalidLength { record: String, length: u32, max: u32 },

    /// Children of a composite record do not add up to its declared length
    #[error("composite '{record}': children occupy {children} bits but {declared} are declared")]
    CompositeLengthMismatch {
        record: String,
        declared: u32,
        children: u32,
    },

    /// Composite record without children, or with reoccurring children
    #[error("composite '{record}': {reason}")]
    InvalidComposite { record: String, reason: String },

    /// Linear formula cannot be inverted
    #[error("record '{record}': invalid formula ({reason})")]
    InvalidFormula { record: String, reason: String },

    /// Minimum occurrence count exceeds the maximum
    #[error("record '{record}': min occurrences {min} exceed max occurrences {max}")]
    InvalidOccurrences { record: String, min: usize, max: usize },

    /// A record with a variable occurrence count is followed by further elements
    #[error("record '{record}' has a variable occurrence count and must be last in its layout")]
    VariableRecordNotLast { record: String },

    /// Name used more than once along one layout walk
    #[error("duplicate record name '{0}'")]
    DuplicateName(String),

    /// Two raw values map to the same label
    #[error("record '{record}': label '{label}' is mapped more than once")]
    DuplicateLabel { record: String, label: String },

    /// A mapped raw value does not fit into the record's bit length
    #[error("record '{record}': mapped raw value 0x{raw:X} exceeds {length} bits")]
    LabelOutOfRange { record: String, raw: u64, length: u32 },

    /// Conditional record has no single-occurrence record in front of it
    #[error("conditional '{0}' has no preceding trigger record")]
    MissingTrigger(String),

    /// Response SID would not fit into a byte
    #[error("service '{service}': SID 0x{sid:02X} has no valid response SID")]
    InvalidServiceIdentifier { service: String, sid: u8 },

    /// Registry or catalog already holds this key
    #[error("duplicate {kind}: {key}")]
    DuplicateEntry { kind: &'static str, key: String },

    /// Invalid DID data description
    #[error("DID 0x{did:04X}: {reason}")]
    InvalidDidData { did: u16, reason: String },

    /// Invalid DID string format
    #[error("invalid DID format: {0}")]
    InvalidDidFormat(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised by a single decode or encode call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Caller supplied an argument combination the operation does not accept
    #[error("usage error: {0}")]
    Usage(String),

    /// First payload byte matches no known service
    #[error("unknown service identifier 0x{0:02X}")]
    UnknownServiceIdentifier(u8),

    /// Payload ends before a mandatory record
    #[error("payload too short for '{record}': needs {needed} bits, {available} available")]
    PayloadTooShort {
        record: String,
        needed: usize,
        available: usize,
    },

    /// Payload holds bits beyond the end of the layout
    #[error("payload has {bits} trailing bits after the last record")]
    TrailingData { bits: usize },

    /// Encoded records do not end on a byte boundary
    #[error("encoded records occupy {bits} bits, which is not a whole number of bytes")]
    UnalignedPayload { bits: usize },

    /// Mandatory record has no value
    #[error("missing value for record '{0}'")]
    MissingValue(String),

    /// Raw value does not fit into the record's bit length
    #[error("record '{record}': value {value} out of range (max {max})")]
    ValueOutOfRange { record: String, value: String, max: u64 },

    /// Number of occurrences outside the record's bounds
    #[error("record '{record}': {count} occurrences outside [{min}, {max}]")]
    OccurrenceCount {
        record: String,
        count: usize,
        min: usize,
        max: String,
    },

    /// Label has no raw value, or raw value has no label under a strict mapping
    #[error("record '{record}': no mapping for {value}")]
    MappingMiss { record: String, value: String },

    /// Physical value kind the record cannot encode
    #[error("record '{record}': cannot encode {reason}")]
    UnencodableValue { record: String, reason: String },

    /// Conditional record reached without a decoded trigger value
    #[error("conditional '{0}' reached without a trigger value")]
    MissingTrigger(String),

    /// Byte range validation failed
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Result type for definition building
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result type for decode/encode calls
pub type CodecResult<T> = Result<T, CodecError>;

/// Parse a DID string (hex) to u16
///
/// Accepts formats: "F405", "0xF405", "0XF405", "f405"
pub fn parse_did(s: &str) -> DefinitionResult<u16> {
    let s = s.trim().trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|_| DefinitionError::InvalidDidFormat(s.to_string()))
}

/// Format a DID as hex string (uppercase, no prefix)
pub fn format_did(did: u16) -> String {
    format!("{:04X}", did)
}
