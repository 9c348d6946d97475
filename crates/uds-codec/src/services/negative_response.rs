//! NegativeResponse (0x7F)

use crate::layout::Layout;
use crate::nrc::NEGATIVE_RESPONSE_CODES;
use crate::record::{DataRecord, Mapping};
use crate::service::RSID_RECORD;
use crate::service_id::service_id;

pub const REQUEST_SID_RECORD: &str = "RequestSID";
pub const NRC_RECORD: &str = "NRC";

/// Layout of `7F <request SID> <NRC>`
///
/// `services` names the request SIDs; unknown SIDs and codes decode to
/// their raw value.
pub fn negative_response_layout<'a>(services: impl IntoIterator<Item = (u8, &'a str)>) -> Layout {
    vec![
        DataRecord::mapped(
            RSID_RECORD,
            8,
            Mapping::strict([(service_id::NEGATIVE_RESPONSE as u64, "NegativeResponse")]),
        )
        .into(),
        DataRecord::mapped(
            REQUEST_SID_RECORD,
            8,
            Mapping::pass_through(services.into_iter().map(|(sid, name)| (sid as u64, name))),
        )
        .into(),
        DataRecord::mapped(
            NRC_RECORD,
            8,
            Mapping::pass_through(
                NEGATIVE_RESPONSE_CODES
                    .iter()
                    .map(|&(code, name)| (code as u64, name)),
            ),
        )
        .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_payload;
    use crate::types::PhysicalValue;

    #[test]
    fn test_negative_response() {
        let layout = negative_response_layout([(0x22, "ReadDataByIdentifier")]);
        let records = decode_payload(&layout, &[0x7F, 0x22, 0x31]).unwrap();
        assert_eq!(
            records[1].physical_value(),
            &PhysicalValue::Label("ReadDataByIdentifier".into())
        );
        assert_eq!(records[2].physical_value(), &PhysicalValue::Label("requestOutOfRange".into()));

        let records = decode_payload(&layout, &[0x7F, 0xBA, 0xF0]).unwrap();
        assert_eq!(records[1].physical_value(), &PhysicalValue::Raw(0xBA));
        assert_eq!(records[2].physical_value(), &PhysicalValue::Raw(0xF0));
    }
}
