//! ECUReset (0x11)

use super::sub_function;
use crate::error::DefinitionResult;
use crate::layout::{ConditionalRecord, LayoutElement};
use crate::record::{DataRecord, LinearFormula, Mapping};
use crate::service::ServiceDefinition;
use crate::service_id::service_id;

const ENABLE_RAPID_POWER_SHUT_DOWN: u64 = 0x04;

fn reset_types() -> Mapping {
    Mapping::strict([
        (0x01, "hardReset"),
        (0x02, "keyOffOnReset"),
        (0x03, "softReset"),
        (ENABLE_RAPID_POWER_SHUT_DOWN, "enableRapidPowerShutDown"),
        (0x05, "disableRapidPowerShutDown"),
    ])
}

fn build(power_down_time: DataRecord) -> DefinitionResult<ServiceDefinition> {
    let request = vec![sub_function(DataRecord::mapped("resetType", 7, reset_types())).into()];
    let response: Vec<LayoutElement> = vec![
        DataRecord::mapped("resetType", 8, reset_types()).into(),
        ConditionalRecord::new(
            "powerDownTime",
            [(ENABLE_RAPID_POWER_SHUT_DOWN, vec![power_down_time.into()])],
        )
        .into(),
    ];
    ServiceDefinition::new("ECUReset", service_id::ECU_RESET, request, response)
}

/// ISO 14229-1:2013 layout; `powerDownTime` is a plain seconds value
pub fn ecu_reset_2013() -> DefinitionResult<ServiceDefinition> {
    build(DataRecord::raw("powerDownTime", 8).with_unit("s"))
}

/// ISO 14229-1:2020 layout; `powerDownTime` 0xFF means failure or time not available
pub fn ecu_reset_2020() -> DefinitionResult<ServiceDefinition> {
    build(
        DataRecord::linear(
            "powerDownTime",
            8,
            LinearFormula::new(1.0, 0.0).with_valid_raw_range(0x00, 0xFE),
        )
        .with_unit("s"),
    )
}

pub use ecu_reset_2020 as ecu_reset;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhysicalValue;

    #[test]
    fn test_editions_differ_on_unavailable_time() {
        let old = ecu_reset_2013().unwrap().decode(&[0x51, 0x04, 0xFF]).unwrap();
        assert_eq!(old[2].physical_value(), &PhysicalValue::Raw(0xFF));

        let new = ecu_reset().unwrap().decode(&[0x51, 0x04, 0xFF]).unwrap();
        assert_eq!(new[2].physical_value(), &PhysicalValue::Error);
        assert_eq!(new[2].unit(), Some("s"));
    }

    #[test]
    fn test_both_editions_share_identifiers() {
        let old = ecu_reset_2013().unwrap();
        let new = ecu_reset_2020().unwrap();
        assert_eq!(old.request_sid(), new.request_sid());
        assert_eq!(old.response_sid(), 0x51);
        assert_eq!(old.request_layout(), new.request_layout());
    }
}
