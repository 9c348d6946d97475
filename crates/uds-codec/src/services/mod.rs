//! Built-in service definitions
//!
//! Each function builds one [`ServiceDefinition`]. Services with more than
//! one protocol edition expose every edition plus an alias for the edition
//! in general use.

mod data_identifier;
mod ecu_reset;
mod negative_response;
mod routine_control;
mod session;
mod transfer;

pub use data_identifier::{read_data_by_identifier, write_data_by_identifier};
pub use ecu_reset::{ecu_reset, ecu_reset_2013, ecu_reset_2020};
pub use negative_response::{negative_response_layout, NRC_RECORD, REQUEST_SID_RECORD};
pub use routine_control::routine_control;
pub use session::{control_dtc_setting, diagnostic_session_control, tester_present};
pub use transfer::{request_download, request_transfer_exit, transfer_data};

use crate::record::{DataRecord, Mapping};

/// Bit 7 of a sub-function byte
pub const SUPPRESS_POS_RSP_RECORD: &str = "suppressPosRspMsgIndicationBit";

/// Name of the bit-grouped sub-function record
pub const SUB_FUNCTION_RECORD: &str = "SubFunction";

fn suppress_pos_rsp_bit() -> DataRecord {
    DataRecord::mapped(SUPPRESS_POS_RSP_RECORD, 1, Mapping::strict([(0, "no"), (1, "yes")]))
}

/// Sub-function byte: suppress bit followed by the 7-bit sub-function value
fn sub_function(inner: DataRecord) -> DataRecord {
    DataRecord::composite(SUB_FUNCTION_RECORD, 8, vec![suppress_pos_rsp_bit(), inner])
}

/// Trailing run of raw bytes that may be empty
fn optional_bytes(name: &str) -> DataRecord {
    DataRecord::raw(name, 8).with_occurrences(0, 0)
}
