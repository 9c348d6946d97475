//! Decoded data records

use serde::Serialize;

use crate::types::{FieldValues, PhysicalValue, RawValue};

/// One node of a decoded message tree
///
/// Built fresh by every decode call and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedDataRecord {
    name: String,
    length: u32,
    raw_value: RawValue,
    physical_value: PhysicalValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<DecodedDataRecord>,
}

impl DecodedDataRecord {
    pub(crate) fn new(
        name: impl Into<String>,
        length: u32,
        raw_value: RawValue,
        physical_value: PhysicalValue,
        unit: Option<String>,
        children: Vec<DecodedDataRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            length,
            raw_value,
            physical_value,
            unit,
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bit length of one occurrence
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn raw_value(&self) -> &RawValue {
        &self.raw_value
    }

    pub fn physical_value(&self) -> &PhysicalValue {
        &self.physical_value
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Decoded children of a composite record (empty for leaves)
    pub fn children(&self) -> &[DecodedDataRecord] {
        &self.children
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&DecodedDataRecord> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Find a decoded record by name
pub fn find_record<'a>(
    records: &'a [DecodedDataRecord],
    name: &str,
) -> Option<&'a DecodedDataRecord> {
    records.iter().find(|r| r.name() == name)
}

/// Collect the physical values of decoded records into an encodable mapping
///
/// Service identifier records (`SID`/`RSID`) are left out, so the result can
/// be passed straight back to an encode call.
pub fn to_field_values(records: &[DecodedDataRecord]) -> FieldValues {
    records
        .iter()
        .filter(|r| r.name() != "SID" && r.name() != "RSID")
        .map(|r| (r.name().to_string(), r.physical_value().clone()))
        .collect()
}

/// Render decoded records as a JSON object of physical values keyed by name
pub fn to_json(records: &[DecodedDataRecord]) -> serde_json::Result<serde_json::Value> {
    let mut object = serde_json::Map::with_capacity(records.len());
    for record in records {
        object.insert(record.name().to_string(), serde_json::to_value(record.physical_value())?);
    }
    Ok(serde_json::Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<DecodedDataRecord> {
        let reset_type = DecodedDataRecord::new(
            "resetType",
            7,
            RawValue::Single(1),
            PhysicalValue::Label("hardReset".into()),
            None,
            vec![],
        );
        vec![
            DecodedDataRecord::new(
                "SID",
                8,
                RawValue::Single(0x11),
                PhysicalValue::Label("ECUReset".into()),
                None,
                vec![],
            ),
            DecodedDataRecord::new(
                "SubFunction",
                8,
                RawValue::Single(0x01),
                PhysicalValue::group([("resetType", "hardReset")]),
                None,
                vec![reset_type],
            ),
        ]
    }

    #[test]
    fn test_lookup_helpers() {
        let records = sample();
        let sub_function = find_record(&records, "SubFunction").unwrap();
        assert_eq!(sub_function.child("resetType").unwrap().raw_value(), &RawValue::Single(1));
        assert!(find_record(&records, "powerDownTime").is_none());
    }

    #[test]
    fn test_field_values_skip_sid() {
        let values = to_field_values(&sample());
        assert_eq!(values.len(), 1);
        assert!(values.contains_key("SubFunction"));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            to_json(&sample()).unwrap(),
            json!({"SID": "ECUReset", "SubFunction": {"resetType": "hardReset"}})
        );
    }

    #[test]
    fn test_serialize_omits_empty_parts() {
        let records = sample();
        assert_eq!(
            serde_json::to_value(&records[0]).unwrap(),
            json!({"name": "SID", "length": 8, "raw_value": 17, "physical_value": "ECUReset"})
        );
    }
}
