//! Service definitions
//!
//! A [`ServiceDefinition`] pairs a request layout with a positive response
//! layout. The identifier byte is part of each layout as a mapped 8-bit
//! record (`SID` or `RSID`) whose label is the service name.

use std::collections::BTreeSet;

use tracing::debug;

use crate::decode::decode_payload;
use crate::decoded::DecodedDataRecord;
use crate::encode::encode_payload;
use crate::error::{CodecError, CodecResult, DefinitionError, DefinitionResult};
use crate::layout::{validate_layout, Layout, LayoutElement};
use crate::record::{DataRecord, Mapping};
use crate::service_id::POSITIVE_RESPONSE_OFFSET;
use crate::types::{FieldValues, PhysicalValue};

/// Name of the identifier record at the start of every request
pub const SID_RECORD: &str = "SID";
/// Name of the identifier record at the start of every response
pub const RSID_RECORD: &str = "RSID";

/// Request and positive response layouts of one diagnostic service
///
/// Immutable after construction and free of per-message state, so one
/// definition can serve any number of concurrent decode/encode calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDefinition {
    name: String,
    request_sid: u8,
    response_sid: u8,
    request: Layout,
    response: Layout,
}

impl ServiceDefinition {
    /// Build and validate a service definition
    ///
    /// The response SID is derived as `sid + 0x40`.
    pub fn new(
        name: impl Into<String>,
        sid: u8,
        request_layout: Layout,
        response_layout: Layout,
    ) -> DefinitionResult<Self> {
        let name = name.into();
        let response_sid = sid.checked_add(POSITIVE_RESPONSE_OFFSET).ok_or_else(|| {
            DefinitionError::InvalidServiceIdentifier {
                service: name.clone(),
                sid,
            }
        })?;

        let request = with_identifier(SID_RECORD, sid, &name, request_layout);
        let response = with_identifier(RSID_RECORD, response_sid, &name, response_layout);
        validate_layout(&request, &BTreeSet::new(), false)?;
        validate_layout(&response, &BTreeSet::new(), false)?;

        Ok(Self {
            name,
            request_sid: sid,
            response_sid,
            request,
            response,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_sid(&self) -> u8 {
        self.request_sid
    }

    pub fn response_sid(&self) -> u8 {
        self.response_sid
    }

    /// Request layout after the identifier record
    pub fn request_layout(&self) -> &[LayoutElement] {
        &self.request[1..]
    }

    /// Response layout after the identifier record
    pub fn response_layout(&self) -> &[LayoutElement] {
        &self.response[1..]
    }

    /// Decode a request or positive response payload
    ///
    /// The first byte selects the layout; the first decoded record is the
    /// identifier itself.
    pub fn decode(&self, payload: &[u8]) -> CodecResult<Vec<DecodedDataRecord>> {
        let first = *payload.first().ok_or_else(|| CodecError::PayloadTooShort {
            record: SID_RECORD.to_string(),
            needed: 8,
            available: 0,
        })?;
        let layout = if first == self.request_sid {
            &self.request
        } else if first == self.response_sid {
            &self.response
        } else {
            return Err(CodecError::UnknownServiceIdentifier(first));
        };

        debug!(
            service = self.name.as_str(),
            sid = format!("0x{:02X}", first),
            payload = hex::encode_upper(payload),
            "Decoding payload"
        );
        decode_payload(layout, payload)
    }

    /// Encode values into a payload
    ///
    /// Exactly one of `sid` (request) or `rsid` (positive response) must be
    /// given, and it must belong to this service.
    pub fn encode(
        &self,
        sid: Option<u8>,
        rsid: Option<u8>,
        values: &FieldValues,
    ) -> CodecResult<Vec<u8>> {
        match (sid, rsid) {
            (Some(sid), None) if sid == self.request_sid => self.encode_request(values),
            (None, Some(rsid)) if rsid == self.response_sid => self.encode_response(values),
            (Some(id), None) | (None, Some(id)) => Err(CodecError::UnknownServiceIdentifier(id)),
            (Some(_), Some(_)) => Err(CodecError::Usage(
                "give either a request SID or a response SID, not both".to_string(),
            )),
            (None, None) => Err(CodecError::Usage(
                "a request SID or a response SID is required".to_string(),
            )),
        }
    }

    pub fn encode_request(&self, values: &FieldValues) -> CodecResult<Vec<u8>> {
        encode_with_identifier(&self.request, SID_RECORD, self.request_sid, values)
    }

    pub fn encode_response(&self, values: &FieldValues) -> CodecResult<Vec<u8>> {
        encode_with_identifier(&self.response, RSID_RECORD, self.response_sid, values)
    }
}

fn with_identifier(record: &str, id: u8, service: &str, layout: Layout) -> Layout {
    let mut full = Vec::with_capacity(layout.len() + 1);
    full.push(DataRecord::mapped(record, 8, Mapping::strict([(id as u64, service)])).into());
    full.extend(layout);
    full
}

pub(crate) fn encode_with_identifier(
    layout: &[LayoutElement],
    record: &str,
    id: u8,
    values: &FieldValues,
) -> CodecResult<Vec<u8>> {
    let mut values = values.clone();
    values.insert(record.to_string(), PhysicalValue::Raw(id as u64));
    encode_payload(layout, &values)
}
