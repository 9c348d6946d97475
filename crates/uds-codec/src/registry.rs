//! Service registry - dispatch payloads to service definitions by identifier

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::DidCatalog;
use crate::decode::decode_payload;
use crate::decoded::DecodedDataRecord;
use crate::error::{CodecError, CodecResult, DefinitionError, DefinitionResult};
use crate::layout::Layout;
use crate::service::{encode_with_identifier, ServiceDefinition, RSID_RECORD};
use crate::service_id::service_id::NEGATIVE_RESPONSE;
use crate::services;
use crate::types::FieldValues;

/// Immutable set of service definitions keyed by request and response SID
///
/// Built once through [`ServiceRegistryBuilder`]; lookups need no locking.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Vec<ServiceDefinition>,
    /// Request and response SIDs → index into `services`
    by_sid: HashMap<u8, usize>,
    by_name: HashMap<String, usize>,
    negative_response: Layout,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    /// Registry of the built-in services, with DID layouts from `catalog`
    pub fn standard(catalog: &DidCatalog) -> DefinitionResult<Self> {
        Ok(Self::builder()
            .register(services::diagnostic_session_control()?)?
            .register(services::ecu_reset()?)?
            .register(services::read_data_by_identifier(catalog)?)?
            .register(services::write_data_by_identifier(catalog)?)?
            .register(services::routine_control()?)?
            .register(services::request_download()?)?
            .register(services::transfer_data()?)?
            .register(services::request_transfer_exit()?)?
            .register(services::tester_present()?)?
            .register(services::control_dtc_setting()?)?
            .build())
    }

    /// Service owning a request or response SID
    pub fn get(&self, sid: u8) -> Option<&ServiceDefinition> {
        self.by_sid.get(&sid).map(|&i| &self.services[i])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ServiceDefinition> {
        self.by_name.get(name).map(|&i| &self.services[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Decode a request, positive response or negative response
    pub fn decode(&self, payload: &[u8]) -> CodecResult<Vec<DecodedDataRecord>> {
        match payload.first() {
            Some(&NEGATIVE_RESPONSE) => decode_payload(&self.negative_response, payload),
            Some(&sid) => self
                .get(sid)
                .ok_or(CodecError::UnknownServiceIdentifier(sid))?
                .decode(payload),
            None => Err(CodecError::PayloadTooShort {
                record: "SID".to_string(),
                needed: 8,
                available: 0,
            }),
        }
    }

    /// Encode a request (`sid`) or a response (`rsid`, positive or negative)
    pub fn encode(
        &self,
        sid: Option<u8>,
        rsid: Option<u8>,
        values: &FieldValues,
    ) -> CodecResult<Vec<u8>> {
        let (id, is_request) = match (sid, rsid) {
            (Some(sid), None) => (sid, true),
            (None, Some(rsid)) => (rsid, false),
            (Some(_), Some(_)) => {
                return Err(CodecError::Usage(
                    "give either a request SID or a response SID, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(CodecError::Usage(
                    "a request SID or a response SID is required".to_string(),
                ))
            }
        };

        if !is_request && id == NEGATIVE_RESPONSE {
            return encode_with_identifier(&self.negative_response, RSID_RECORD, id, values);
        }
        match self.get(id) {
            Some(service) if is_request && service.request_sid() == id => {
                service.encode_request(values)
            }
            Some(service) if !is_request && service.response_sid() == id => {
                service.encode_response(values)
            }
            _ => Err(CodecError::UnknownServiceIdentifier(id)),
        }
    }
}

/// Builder for [`ServiceRegistry`]
#[derive(Debug, Default)]
pub struct ServiceRegistryBuilder {
    services: Vec<ServiceDefinition>,
    by_sid: HashMap<u8, usize>,
    by_name: HashMap<String, usize>,
}

impl ServiceRegistryBuilder {
    /// Add a service; its SIDs and name must not be taken yet
    pub fn register(mut self, service: ServiceDefinition) -> DefinitionResult<Self> {
        for sid in [service.request_sid(), service.response_sid()] {
            if sid == NEGATIVE_RESPONSE || self.by_sid.contains_key(&sid) {
                return Err(DefinitionError::DuplicateEntry {
                    kind: "service identifier",
                    key: format!("0x{:02X}", sid),
                });
            }
        }
        if self.by_name.contains_key(service.name()) {
            return Err(DefinitionError::DuplicateEntry {
                kind: "service name",
                key: service.name().to_string(),
            });
        }

        debug!(
            service = service.name(),
            sid = format!("0x{:02X}", service.request_sid()),
            rsid = format!("0x{:02X}", service.response_sid()),
            "Registered service"
        );
        let index = self.services.len();
        self.by_sid.insert(service.request_sid(), index);
        self.by_sid.insert(service.response_sid(), index);
        self.by_name.insert(service.name().to_string(), index);
        self.services.push(service);
        Ok(self)
    }

    pub fn build(self) -> ServiceRegistry {
        let negative_response = services::negative_response_layout(
            self.services.iter().map(|s| (s.request_sid(), s.name())),
        );
        ServiceRegistry {
            services: self.services,
            by_sid: self.by_sid,
            by_name: self.by_name,
            negative_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhysicalValue;

    fn registry() -> ServiceRegistry {
        ServiceRegistry::standard(&DidCatalog::standard()).unwrap()
    }

    #[test]
    fn test_standard_registry() {
        let registry = registry();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.get(0x11).unwrap().name(), "ECUReset");
        assert_eq!(registry.get(0x51).unwrap().name(), "ECUReset");
        assert_eq!(registry.get_by_name("TransferData").unwrap().request_sid(), 0x36);
        assert!(registry.get(0x27).is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = ServiceRegistry::builder()
            .register(services::ecu_reset_2013().unwrap())
            .unwrap()
            .register(services::ecu_reset_2020().unwrap());
        assert!(matches!(
            result,
            Err(DefinitionError::DuplicateEntry { kind: "service identifier", .. })
        ));

        let clash = ServiceDefinition::new("ECUReset", 0x12, vec![], vec![]).unwrap();
        let result = ServiceRegistry::builder()
            .register(services::ecu_reset().unwrap())
            .unwrap()
            .register(clash);
        assert!(matches!(
            result,
            Err(DefinitionError::DuplicateEntry { kind: "service name", .. })
        ));
    }

    #[test]
    fn test_response_sid_collides_with_request_sid() {
        let low = ServiceDefinition::new("Low", 0x10, vec![], vec![]).unwrap();
        let high = ServiceDefinition::new("High", 0x50, vec![], vec![]).unwrap();
        assert!(ServiceRegistry::builder().register(low).unwrap().register(high).is_err());
    }

    #[test]
    fn test_negative_response_dispatch() {
        let records = registry().decode(&[0x7F, 0x11, 0x12]).unwrap();
        assert_eq!(records[0].physical_value(), &PhysicalValue::Label("NegativeResponse".into()));
        assert_eq!(records[1].physical_value(), &PhysicalValue::Label("ECUReset".into()));
        assert_eq!(
            records[2].physical_value(),
            &PhysicalValue::Label("subFunctionNotSupported".into())
        );

        let values: FieldValues = [
            ("RequestSID".to_string(), PhysicalValue::from("ECUReset")),
            ("NRC".to_string(), PhysicalValue::from("conditionsNotCorrect")),
        ]
        .into_iter()
        .collect();
        assert_eq!(registry().encode(None, Some(0x7F), &values).unwrap(), vec![0x7F, 0x11, 0x22]);
    }

    #[test]
    fn test_unknown_and_usage_errors() {
        let registry = registry();
        assert_eq!(registry.decode(&[0x27, 0x01]), Err(CodecError::UnknownServiceIdentifier(0x27)));
        assert!(matches!(registry.decode(&[]), Err(CodecError::PayloadTooShort { .. })));

        let empty = FieldValues::new();
        assert!(matches!(registry.encode(None, None, &empty), Err(CodecError::Usage(_))));
        assert!(matches!(
            registry.encode(Some(0x11), Some(0x51), &empty),
            Err(CodecError::Usage(_))
        ));
        assert_eq!(
            registry.encode(Some(0x51), None, &empty),
            Err(CodecError::UnknownServiceIdentifier(0x51))
        );
    }
}
