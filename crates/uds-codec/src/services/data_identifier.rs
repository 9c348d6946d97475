//! ReadDataByIdentifier (0x22) and WriteDataByIdentifier (0x2E)
//!
//! The data following a DID is selected by a conditional record keyed on the
//! DID, with one branch per catalog entry.

use crate::catalog::DidCatalog;
use crate::error::DefinitionResult;
use crate::layout::ConditionalRecord;
use crate::service::ServiceDefinition;
use crate::service_id::service_id;

fn did_data(catalog: &DidCatalog) -> ConditionalRecord {
    ConditionalRecord::new("dataRecordSelector", catalog.data_layouts())
        .with_default(catalog.unknown_data_layout())
}

/// Request carries one or more DIDs; the response carries one DID and its data
///
/// A positive response to a multi-DID request, with several DID/data pairs
/// back to back, is not decoded: a fixed-length first DID leaves the rest of
/// the payload as trailing data, and a variable-length one absorbs it.
pub fn read_data_by_identifier(catalog: &DidCatalog) -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "ReadDataByIdentifier",
        service_id::READ_DATA_BY_ID,
        vec![catalog
            .data_identifier_record()
            .with_occurrences(1, 0)
            .into()],
        vec![
            catalog.data_identifier_record().into(),
            did_data(catalog).into(),
        ],
    )
}

pub fn write_data_by_identifier(catalog: &DidCatalog) -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "WriteDataByIdentifier",
        service_id::WRITE_DATA_BY_ID,
        vec![
            catalog.data_identifier_record().into(),
            did_data(catalog).into(),
        ],
        vec![catalog.data_identifier_record().into()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoded::find_record;
    use crate::error::CodecError;
    use crate::types::{FieldValues, PhysicalValue};
    use pretty_assertions::assert_eq;

    fn vin_response() -> Vec<u8> {
        let mut payload = vec![0x62, 0xF1, 0x90];
        payload.extend_from_slice(b"WVWZZZ1JZ3W386752");
        payload
    }

    #[test]
    fn test_read_vin() {
        let service = read_data_by_identifier(&DidCatalog::standard()).unwrap();
        let records = service.decode(&vin_response()).unwrap();
        assert_eq!(
            find_record(&records, "dataIdentifier").unwrap().physical_value(),
            &PhysicalValue::Label("VIN".into())
        );
        assert_eq!(
            find_record(&records, "VIN").unwrap().physical_value(),
            &PhysicalValue::Text("WVWZZZ1JZ3W386752".into())
        );
    }

    #[test]
    fn test_read_several_dids() {
        let service = read_data_by_identifier(&DidCatalog::standard()).unwrap();
        let records = service.decode(&[0x22, 0xF1, 0x90, 0xF1, 0x8C]).unwrap();
        assert_eq!(
            records[1].physical_value(),
            &PhysicalValue::Sequence(vec!["VIN".into(), "ECUSerialNumber".into()])
        );
    }

    #[test]
    fn test_response_holds_one_did() {
        let service = read_data_by_identifier(&DidCatalog::standard()).unwrap();
        assert_eq!(service.decode(&[0x62, 0xF1, 0x86, 0x01]).unwrap().len(), 3);
        assert!(matches!(
            service.decode(&[0x62, 0xF1, 0x86, 0x01, 0xF1, 0x86, 0x03]),
            Err(CodecError::TrailingData { bits: 24 })
        ));
    }

    #[test]
    fn test_unknown_did_is_raw() {
        let service = read_data_by_identifier(&DidCatalog::standard()).unwrap();
        let records = service.decode(&[0x62, 0x12, 0x34, 0x01, 0x02]).unwrap();
        assert_eq!(records[1].physical_value(), &PhysicalValue::Raw(0x1234));
        assert_eq!(records[2].name(), "dataRecord");
        assert_eq!(records[2].raw_value().to_bytes(), Some(vec![0x01, 0x02]));
    }

    #[test]
    fn test_write_by_name() {
        let service = write_data_by_identifier(&DidCatalog::standard()).unwrap();
        let values: FieldValues = [
            ("dataIdentifier".to_string(), PhysicalValue::from("activeDiagnosticSession")),
            ("activeDiagnosticSession".to_string(), PhysicalValue::Raw(0x03)),
        ]
        .into_iter()
        .collect();
        assert_eq!(service.encode_request(&values).unwrap(), vec![0x2E, 0xF1, 0x86, 0x03]);
        assert_eq!(service.decode(&[0x6E, 0xF1, 0x86]).unwrap().len(), 2);
    }
}
