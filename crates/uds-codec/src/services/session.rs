//! DiagnosticSessionControl (0x10), TesterPresent (0x3E) and ControlDTCSetting (0x85)

use super::{optional_bytes, sub_function};
use crate::error::DefinitionResult;
use crate::record::{DataRecord, LinearFormula, Mapping};
use crate::service::ServiceDefinition;
use crate::service_id::service_id;

fn session_types() -> Mapping {
    Mapping::pass_through([
        (0x01, "defaultSession"),
        (0x02, "programmingSession"),
        (0x03, "extendedDiagnosticSession"),
        (0x04, "safetySystemDiagnosticSession"),
    ])
}

pub fn diagnostic_session_control() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "DiagnosticSessionControl",
        service_id::DIAGNOSTIC_SESSION_CONTROL,
        vec![sub_function(DataRecord::mapped("diagnosticSessionType", 7, session_types())).into()],
        vec![
            DataRecord::mapped("diagnosticSessionType", 8, session_types()).into(),
            DataRecord::linear("P2Server_max", 16, LinearFormula::new(1.0, 0.0))
                .with_unit("ms")
                .into(),
            DataRecord::linear("P2*Server_max", 16, LinearFormula::new(10.0, 0.0))
                .with_unit("ms")
                .into(),
        ],
    )
}

fn zero_sub_function(length: u32) -> DataRecord {
    DataRecord::mapped("zeroSubFunction", length, Mapping::strict([(0x00, "zeroSubFunction")]))
}

pub fn tester_present() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "TesterPresent",
        service_id::TESTER_PRESENT,
        vec![sub_function(zero_sub_function(7)).into()],
        vec![zero_sub_function(8).into()],
    )
}

fn dtc_setting_types() -> Mapping {
    Mapping::pass_through([(0x01, "on"), (0x02, "off")])
}

pub fn control_dtc_setting() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "ControlDTCSetting",
        service_id::CONTROL_DTC_SETTING,
        vec![
            sub_function(DataRecord::mapped("DTCSettingType", 7, dtc_setting_types())).into(),
            optional_bytes("DTCSettingControlOptionRecord").into(),
        ],
        vec![DataRecord::mapped("DTCSettingType", 8, dtc_setting_types()).into()],
    )
}
