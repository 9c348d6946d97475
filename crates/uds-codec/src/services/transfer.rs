//! RequestDownload (0x34), TransferData (0x36) and RequestTransferExit (0x37)

use super::optional_bytes;
use crate::error::DefinitionResult;
use crate::layout::{ConditionalRecord, Layout};
use crate::record::DataRecord;
use crate::service::ServiceDefinition;
use crate::service_id::service_id;

/// Widest memory address, memory size or block length field, in bytes
const MAX_FIELD_BYTES: u64 = 8;

fn data_format_identifier() -> DataRecord {
    DataRecord::composite(
        "dataFormatIdentifier",
        8,
        vec![
            DataRecord::raw("compressionMethod", 4),
            DataRecord::raw("encryptingMethod", 4),
        ],
    )
}

fn address_and_length_format_identifier() -> DataRecord {
    DataRecord::composite(
        "addressAndLengthFormatIdentifier",
        8,
        vec![
            DataRecord::raw("memorySizeLength", 4),
            DataRecord::raw("memoryAddressLength", 4),
        ],
    )
}

/// memoryAddress and memorySize, sized by the preceding format identifier
fn memory_address_and_size() -> ConditionalRecord {
    let branches = (1..=MAX_FIELD_BYTES).flat_map(|size| {
        (1..=MAX_FIELD_BYTES).map(move |address| {
            let layout: Layout = vec![
                DataRecord::raw("memoryAddress", address as u32 * 8).into(),
                DataRecord::raw("memorySize", size as u32 * 8).into(),
            ];
            ((size << 4) | address, layout)
        })
    });
    ConditionalRecord::new("memoryAddressAndSize", branches).required()
}

fn length_format_identifier() -> DataRecord {
    DataRecord::composite(
        "lengthFormatIdentifier",
        8,
        vec![
            DataRecord::raw("maxNumberOfBlockLengthLength", 4),
            DataRecord::raw("reserved", 4),
        ],
    )
}

fn max_number_of_block_length() -> ConditionalRecord {
    let branches = (1..=MAX_FIELD_BYTES).map(|length| {
        let layout: Layout =
            vec![DataRecord::raw("maxNumberOfBlockLength", length as u32 * 8).into()];
        (length << 4, layout)
    });
    ConditionalRecord::new("maxNumberOfBlockLength", branches).required()
}

pub fn request_download() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "RequestDownload",
        service_id::REQUEST_DOWNLOAD,
        vec![
            data_format_identifier().into(),
            address_and_length_format_identifier().into(),
            memory_address_and_size().into(),
        ],
        vec![
            length_format_identifier().into(),
            max_number_of_block_length().into(),
        ],
    )
}

pub fn transfer_data() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "TransferData",
        service_id::TRANSFER_DATA,
        vec![
            DataRecord::raw("blockSequenceCounter", 8).into(),
            optional_bytes("transferRequestParameterRecord").into(),
        ],
        vec![
            DataRecord::raw("blockSequenceCounter", 8).into(),
            optional_bytes("transferResponseParameterRecord").into(),
        ],
    )
}

pub fn request_transfer_exit() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "RequestTransferExit",
        service_id::REQUEST_TRANSFER_EXIT,
        vec![optional_bytes("transferRequestParameterRecord").into()],
        vec![optional_bytes("transferResponseParameterRecord").into()],
    )
}
