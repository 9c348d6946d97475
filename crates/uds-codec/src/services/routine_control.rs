//! RoutineControl (0x31)

use super::{optional_bytes, sub_function};
use crate::error::DefinitionResult;
use crate::record::{DataRecord, Mapping};
use crate::service::ServiceDefinition;
use crate::service_id::service_id;

fn routine_control_types() -> Mapping {
    Mapping::strict([
        (0x01, "startRoutine"),
        (0x02, "stopRoutine"),
        (0x03, "requestRoutineResults"),
    ])
}

pub fn routine_control() -> DefinitionResult<ServiceDefinition> {
    ServiceDefinition::new(
        "RoutineControl",
        service_id::ROUTINE_CONTROL,
        vec![
            sub_function(DataRecord::mapped(
                "routineControlType",
                7,
                routine_control_types(),
            ))
            .into(),
            DataRecord::raw("routineIdentifier", 16).into(),
            optional_bytes("routineControlOptionRecord").into(),
        ],
        vec![
            DataRecord::mapped("routineControlType", 8, routine_control_types()).into(),
            DataRecord::raw("routineIdentifier", 16).into(),
            optional_bytes("routineStatusRecord").into(),
        ],
    )
}
