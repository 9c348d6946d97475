//! uds-codec - Data-record translation engine for UDS payloads
//!
//! Decodes raw request/response payloads of ISO 14229 diagnostic services
//! into trees of named, physical values and encodes such values back into
//! bytes.
//!
//! # Features
//!
//! - **Bit-level layouts** - records of any width up to 64 bits, packed MSB first
//! - **Composite records** - e.g. a suppress bit and a 7-bit sub-function in one byte
//! - **Conditional records** - the layout that follows depends on the value just decoded
//! - **Protocol editions** - 2013 and 2020 variants of the same service side by side
//! - **DID catalog** - standard identification DIDs, extensible from YAML files
//!
//! # Quick Start
//!
//! ```rust
//! use uds_codec::{DidCatalog, PhysicalValue, ServiceRegistry};
//!
//! let registry = ServiceRegistry::standard(&DidCatalog::standard()).unwrap();
//!
//! // ECUReset positive response, rapid power shutdown enabled, time unknown
//! let records = registry.decode(&[0x51, 0x04, 0xFF]).unwrap();
//! assert_eq!(records[0].physical_value(), &PhysicalValue::Label("ECUReset".into()));
//! assert_eq!(
//!     records[1].physical_value(),
//!     &PhysicalValue::Label("enableRapidPowerShutDown".into())
//! );
//! assert!(records[2].physical_value().is_error());
//! ```
//!
//! # DID catalog files
//!
//! ```yaml
//! meta:
//!   name: Engine ECU
//!   version: "1.0"
//!
//! dids:
//!   "0xF405":
//!     name: coolantTemperature
//!     type: linear      # raw | text | linear
//!     length: 1         # bytes
//!     offset: -40
//!     unit: °C
//! ```

mod bits;
pub mod catalog;
pub mod decode;
pub mod decoded;
pub mod encode;
pub mod error;
pub mod layout;
pub mod nrc;
pub mod precision;
pub mod record;
pub mod registry;
pub mod service;
pub mod service_id;
pub mod services;
pub mod types;

// Re-export main types
pub use catalog::{CatalogMeta, DidCatalog, DidCatalogBuilder, DidData, DidEntry};
pub use decoded::{find_record, to_field_values, to_json, DecodedDataRecord};
pub use error::{format_did, parse_did, CodecError, CodecResult, DefinitionError, DefinitionResult};
pub use layout::{ConditionalRecord, Layout, LayoutElement};
pub use nrc::nrc_name;
pub use record::{DataRecord, LinearFormula, Mapping, RecordKind};
pub use registry::{ServiceRegistry, ServiceRegistryBuilder};
pub use service::ServiceDefinition;
pub use service_id::service_name;
pub use types::{FieldValues, MissPolicy, PhysicalValue, RawValue, ERROR_LABEL};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::DidCatalog;
    pub use crate::error::{CodecError, CodecResult, DefinitionError, DefinitionResult};
    pub use crate::layout::{ConditionalRecord, Layout};
    pub use crate::record::{DataRecord, LinearFormula, Mapping};
    pub use crate::registry::ServiceRegistry;
    pub use crate::service::ServiceDefinition;
    pub use crate::types::{FieldValues, PhysicalValue};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_workflow() {
        let yaml = r#"
meta:
  name: Test ECU
  version: "1.0"

dids:
  "0xF40C":
    name: engineSpeed
    type: linear
    length: 2
    factor: 0.25
    unit: rpm
  "0x0200":
    name: partNumberSuffix
    type: text
    length: 4
"#;
        let catalog = DidCatalogBuilder::standard().load_yaml(yaml).unwrap().build();
        let registry = ServiceRegistry::standard(&catalog).unwrap();

        let records = registry.decode(&[0x62, 0xF4, 0x0C, 0x1C, 0x20]).unwrap();
        assert_eq!(
            to_json(&records).unwrap(),
            json!({
                "RSID": "ReadDataByIdentifier",
                "dataIdentifier": "engineSpeed",
                "engineSpeed": 1800.0
            })
        );
        assert_eq!(records[2].unit(), Some("rpm"));

        let bytes = registry
            .encode(None, Some(0x62), &to_field_values(&records))
            .unwrap();
        assert_eq!(bytes, vec![0x62, 0xF4, 0x0C, 0x1C, 0x20]);

        let records = registry.decode(&[0x62, 0x02, 0x00, b'A', b'B', b'-', b'1']).unwrap();
        assert_eq!(records[2].physical_value(), &PhysicalValue::Text("AB-1".into()));
    }

    #[test]
    fn test_precision_handling() {
        let catalog = DidCatalog::builder()
            .add(
                0xF500,
                "injectionTime",
                DidData::Linear {
                    length: 2,
                    factor: 0.01,
                    offset: 0.0,
                    unit: Some("ms".into()),
                },
            )
            .unwrap()
            .build();
        let service = services::read_data_by_identifier(&catalog).unwrap();

        // 140 * 0.01 should be 1.4, not 1.4000000000000001
        let records = service.decode(&[0x62, 0xF5, 0x00, 0x00, 0x8C]).unwrap();
        assert_eq!(records[2].physical_value(), &PhysicalValue::Float(1.4));
    }

    #[test]
    fn test_fine_factor_round_trip() {
        let fine = |factor: f64| DidData::Linear {
            length: 2,
            factor,
            offset: 0.0,
            unit: None,
        };
        let catalog = DidCatalog::builder()
            .add(0x0100, "leakCurrent", fine(1e-7))
            .unwrap()
            .add(0x0101, "chargeRate", fine(1e-12))
            .unwrap()
            .build();
        let registry = ServiceRegistry::standard(&catalog).unwrap();

        for payload in [[0x62, 0x01, 0x00, 0x00, 0x05], [0x62, 0x01, 0x01, 0x00, 0x05]] {
            let records = registry.decode(&payload).unwrap();
            let bytes = registry
                .encode(None, Some(0x62), &to_field_values(&records))
                .unwrap();
            assert_eq!(bytes, payload.to_vec());
        }

        let records = registry.decode(&[0x62, 0x01, 0x00, 0x00, 0x05]).unwrap();
        assert_eq!(records[2].physical_value(), &PhysicalValue::Float(5e-7));
    }
}
