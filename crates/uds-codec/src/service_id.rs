//! Service identifiers and standard data identifiers

/// Standard UDS service ID constants
pub mod service_id {
    pub const DIAGNOSTIC_SESSION_CONTROL: u8 = 0x10;
    pub const ECU_RESET: u8 = 0x11;
    pub const CLEAR_DIAGNOSTIC_INFO: u8 = 0x14;
    pub const READ_DTC_INFO: u8 = 0x19;
    pub const READ_DATA_BY_ID: u8 = 0x22;
    pub const READ_MEMORY_BY_ADDRESS: u8 = 0x23;
    pub const SECURITY_ACCESS: u8 = 0x27;
    pub const COMMUNICATION_CONTROL: u8 = 0x28;
    pub const WRITE_DATA_BY_ID: u8 = 0x2E;
    pub const IO_CONTROL_BY_ID: u8 = 0x2F;
    pub const ROUTINE_CONTROL: u8 = 0x31;
    pub const REQUEST_DOWNLOAD: u8 = 0x34;
    pub const REQUEST_UPLOAD: u8 = 0x35;
    pub const TRANSFER_DATA: u8 = 0x36;
    pub const REQUEST_TRANSFER_EXIT: u8 = 0x37;
    pub const TESTER_PRESENT: u8 = 0x3E;
    pub const NEGATIVE_RESPONSE: u8 = 0x7F;
    pub const CONTROL_DTC_SETTING: u8 = 0x85;
}

/// Offset between a request SID and its positive response SID
pub const POSITIVE_RESPONSE_OFFSET: u8 = 0x40;

/// Request SIDs and their service names
pub const SERVICE_NAMES: &[(u8, &str)] = &[
    (service_id::DIAGNOSTIC_SESSION_CONTROL, "DiagnosticSessionControl"),
    (service_id::ECU_RESET, "ECUReset"),
    (service_id::CLEAR_DIAGNOSTIC_INFO, "ClearDiagnosticInformation"),
    (service_id::READ_DTC_INFO, "ReadDTCInformation"),
    (service_id::READ_DATA_BY_ID, "ReadDataByIdentifier"),
    (service_id::READ_MEMORY_BY_ADDRESS, "ReadMemoryByAddress"),
    (service_id::SECURITY_ACCESS, "SecurityAccess"),
    (service_id::COMMUNICATION_CONTROL, "CommunicationControl"),
    (service_id::WRITE_DATA_BY_ID, "WriteDataByIdentifier"),
    (service_id::IO_CONTROL_BY_ID, "InputOutputControlByIdentifier"),
    (service_id::ROUTINE_CONTROL, "RoutineControl"),
    (service_id::REQUEST_DOWNLOAD, "RequestDownload"),
    (service_id::REQUEST_UPLOAD, "RequestUpload"),
    (service_id::TRANSFER_DATA, "TransferData"),
    (service_id::REQUEST_TRANSFER_EXIT, "RequestTransferExit"),
    (service_id::TESTER_PRESENT, "TesterPresent"),
    (service_id::CONTROL_DTC_SETTING, "ControlDTCSetting"),
];

/// Name of the service a request SID belongs to
pub fn service_name(sid: u8) -> Option<&'static str> {
    SERVICE_NAMES
        .iter()
        .find(|(s, _)| *s == sid)
        .map(|(_, name)| *name)
}

/// Standard UDS Data Identifiers (ISO 14229-1 Annex C)
pub mod standard_did {
    // Boot / Software Identification
    pub const BOOT_SOFTWARE_ID: u16 = 0xF180;
    pub const APPLICATION_SOFTWARE_ID: u16 = 0xF181;
    pub const APPLICATION_DATA_ID: u16 = 0xF182;
    pub const BOOT_SOFTWARE_FINGERPRINT: u16 = 0xF183;
    pub const APP_SOFTWARE_FINGERPRINT: u16 = 0xF184;
    pub const APP_DATA_FINGERPRINT: u16 = 0xF185;

    // Session
    pub const ACTIVE_DIAGNOSTIC_SESSION: u16 = 0xF186;

    // Identification
    pub const SPARE_PART_NUMBER: u16 = 0xF187;
    pub const ECU_SOFTWARE_NUMBER: u16 = 0xF188;
    pub const ECU_SOFTWARE_VERSION: u16 = 0xF189;
    pub const SYSTEM_SUPPLIER_ID: u16 = 0xF18A;
    pub const ECU_MANUFACTURING_DATE: u16 = 0xF18B;
    pub const ECU_SERIAL_NUMBER: u16 = 0xF18C;

    // Vehicle / Hardware
    pub const VIN: u16 = 0xF190;
    pub const ECU_HARDWARE_NUMBER: u16 = 0xF191;
    pub const SUPPLIER_HW_NUMBER: u16 = 0xF192;
    pub const SUPPLIER_HW_VERSION: u16 = 0xF193;
    pub const SUPPLIER_SW_NUMBER: u16 = 0xF194;
    pub const SUPPLIER_SW_VERSION: u16 = 0xF195;
    pub const SYSTEM_NAME: u16 = 0xF197;
    pub const TESTER_SERIAL_NUMBER: u16 = 0xF198;
    pub const PROGRAMMING_DATE: u16 = 0xF199;
    pub const ODX_FILE: u16 = 0xF19E;
}
