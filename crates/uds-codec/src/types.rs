//! Value types exchanged with the translation engine
//!
//! Decoding produces [`PhysicalValue`]s, and encoding consumes them through a
//! [`FieldValues`] mapping keyed by data record name.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// Label shown for raw values that have no valid physical meaning
pub const ERROR_LABEL: &str = "ERROR";

/// Physical values keyed by data record name
///
/// Composite records take a nested [`PhysicalValue::Group`] keyed by child name.
pub type FieldValues = BTreeMap<String, PhysicalValue>;

/// Physical (human-meaningful) value of a data record
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalValue {
    /// Unsigned integer (identity mapping, or raw pass-through)
    Raw(u64),
    /// Enumerated label
    Label(String),
    /// Scaled value produced by a linear formula
    Float(f64),
    /// ASCII text
    Text(String),
    /// Raw value outside the record's valid range
    Error,
    /// Child values of a composite record
    Group(FieldValues),
    /// One value per occurrence of a reoccurring record
    Sequence(Vec<PhysicalValue>),
}

impl PhysicalValue {
    /// Raw integer carried by this value, if any
    pub fn as_raw(&self) -> Option<u64> {
        match self {
            PhysicalValue::Raw(raw) => Some(*raw),
            _ => None,
        }
    }

    /// Text carried by a label or text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhysicalValue::Label(s) | PhysicalValue::Text(s) => Some(s),
            PhysicalValue::Error => Some(ERROR_LABEL),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PhysicalValue::Float(v) => Some(*v),
            PhysicalValue::Raw(raw) => Some(*raw as f64),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PhysicalValue::Error)
    }

    /// Build a group value from `(child name, value)` pairs
    pub fn group<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<PhysicalValue>,
    {
        PhysicalValue::Group(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<u64> for PhysicalValue {
    fn from(raw: u64) -> Self {
        PhysicalValue::Raw(raw)
    }
}

impl From<u8> for PhysicalValue {
    fn from(raw: u8) -> Self {
        PhysicalValue::Raw(raw as u64)
    }
}

impl From<u16> for PhysicalValue {
    fn from(raw: u16) -> Self {
        PhysicalValue::Raw(raw as u64)
    }
}

impl From<f64> for PhysicalValue {
    fn from(value: f64) -> Self {
        PhysicalValue::Float(value)
    }
}

impl From<&str> for PhysicalValue {
    fn from(label: &str) -> Self {
        PhysicalValue::Label(label.to_string())
    }
}

impl From<FieldValues> for PhysicalValue {
    fn from(values: FieldValues) -> Self {
        PhysicalValue::Group(values)
    }
}

impl fmt::Display for PhysicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalValue::Raw(raw) => write!(f, "0x{:X}", raw),
            PhysicalValue::Label(s) | PhysicalValue::Text(s) => f.write_str(s),
            PhysicalValue::Float(v) => write!(f, "{}", v),
            PhysicalValue::Error => f.write_str(ERROR_LABEL),
            PhysicalValue::Group(values) => {
                f.write_str("{")?;
                for (i, (name, value)) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
            PhysicalValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for PhysicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PhysicalValue::Raw(raw) => serializer.serialize_u64(*raw),
            PhysicalValue::Label(s) | PhysicalValue::Text(s) => serializer.serialize_str(s),
            PhysicalValue::Float(v) => serializer.serialize_f64(*v),
            PhysicalValue::Error => serializer.serialize_str(ERROR_LABEL),
            PhysicalValue::Group(values) => {
                let mut map = serializer.serialize_map(Some(values.len()))?;
                for (name, value) in values {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            PhysicalValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Raw value of a decoded record: one integer, or one per occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Single(u64),
    Multiple(Vec<u64>),
}

impl RawValue {
    pub fn as_single(&self) -> Option<u64> {
        match self {
            RawValue::Single(raw) => Some(*raw),
            RawValue::Multiple(_) => None,
        }
    }

    /// Raw bytes of a reoccurring 8-bit record
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            RawValue::Single(raw) => u8::try_from(*raw).ok().map(|b| vec![b]),
            RawValue::Multiple(raws) => raws.iter().map(|&r| u8::try_from(r).ok()).collect(),
        }
    }
}

/// What a mapped record does with a raw value that has no label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Decoding fails with a mapping-miss error
    #[default]
    Fail,
    /// The raw integer is surfaced as the physical value
    PassThrough,
    /// The physical value becomes [`PhysicalValue::Error`]
    ErrorLabel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_physical_values() {
        let value = PhysicalValue::group([
            ("memorySizeLength", PhysicalValue::Raw(2)),
            ("memoryAddressLength", PhysicalValue::Raw(3)),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"memoryAddressLength": 3, "memorySizeLength": 2})
        );
        assert_eq!(serde_json::to_value(PhysicalValue::Error).unwrap(), json!("ERROR"));
        assert_eq!(
            serde_json::to_value(PhysicalValue::Sequence(vec![1u64.into(), "x".into()])).unwrap(),
            json!([1, "x"])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PhysicalValue::Raw(0x1234).to_string(), "0x1234");
        assert_eq!(PhysicalValue::Error.to_string(), "ERROR");
        assert_eq!(
            PhysicalValue::group([("a", 1u64)]).to_string(),
            "{a: 0x1}"
        );
    }

    #[test]
    fn test_raw_value_bytes() {
        assert_eq!(RawValue::Multiple(vec![0x12, 0x34]).to_bytes(), Some(vec![0x12, 0x34]));
        assert_eq!(RawValue::Single(0x1234).to_bytes(), None);
        assert_eq!(RawValue::Single(7).as_single(), Some(7));
    }
}
