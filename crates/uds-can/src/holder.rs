//! Addressing information of one CAN node
//!
//! An [`AddressingInformation`] bundles the four validated parameter sets a
//! node needs: receive and transmit, each physical and functional. It is
//! assembled once through [`AddressingInformationBuilder`], where each set
//! can be assigned exactly once, and is immutable afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uds_core::{validate_raw_byte, AddressingType, ValueError};

use crate::can_id::MAX_EXTENDED_ID;
use crate::error::{AddressingError, AddressingResult};
use crate::format::CanAddressingFormat;
use crate::validator::{PacketAddressingInfo, PacketAiParams};

/// Unvalidated addressing parameters of one packet direction
///
/// Integer fields are checked against their ranges when the set is
/// assigned to a builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressing_type: Option<AddressingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_address: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_address: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_extension: Option<i64>,
}

impl AddressingParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_id(mut self, can_id: i64) -> Self {
        self.can_id = Some(can_id);
        self
    }

    pub fn target_address(mut self, target_address: i64) -> Self {
        self.target_address = Some(target_address);
        self
    }

    pub fn source_address(mut self, source_address: i64) -> Self {
        self.source_address = Some(source_address);
        self
    }

    pub fn address_extension(mut self, address_extension: i64) -> Self {
        self.address_extension = Some(address_extension);
        self
    }

    /// Range-check the fields and fix the addressing type of the set
    fn to_packet_params(
        &self,
        addressing_type: AddressingType,
    ) -> AddressingResult<PacketAiParams> {
        if let Some(declared) = self.addressing_type {
            if declared != addressing_type {
                return Err(AddressingError::Inconsistent(format!(
                    "{} parameters declare addressing type {}",
                    addressing_type, declared
                )));
            }
        }

        let mut params = PacketAiParams::new(addressing_type);
        if let Some(can_id) = self.can_id {
            params = params.with_can_id(validate_can_id(can_id)?);
        }
        if let Some(value) = self.target_address {
            params = params.with_target_address(validate_raw_byte(value)?);
        }
        if let Some(value) = self.source_address {
            params = params.with_source_address(validate_raw_byte(value)?);
        }
        if let Some(value) = self.address_extension {
            params = params.with_address_extension(validate_raw_byte(value)?);
        }
        Ok(params)
    }
}

fn validate_can_id(can_id: i64) -> AddressingResult<u32> {
    u32::try_from(can_id)
        .ok()
        .filter(|id| *id <= MAX_EXTENDED_ID)
        .ok_or_else(|| {
            ValueError::OutOfRange {
                name: "can_id".to_string(),
                value: can_id,
                min: 0,
                max: MAX_EXTENDED_ID as i64,
            }
            .into()
        })
}

/// Validated addressing of a CAN node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressingInformation {
    format: CanAddressingFormat,
    rx_physical: PacketAddressingInfo,
    tx_physical: PacketAddressingInfo,
    rx_functional: PacketAddressingInfo,
    tx_functional: PacketAddressingInfo,
}

impl AddressingInformation {
    pub fn builder(format: CanAddressingFormat) -> AddressingInformationBuilder {
        AddressingInformationBuilder::new(format)
    }

    pub fn format(&self) -> CanAddressingFormat {
        self.format
    }

    pub fn rx_physical(&self) -> &PacketAddressingInfo {
        &self.rx_physical
    }

    pub fn tx_physical(&self) -> &PacketAddressingInfo {
        &self.tx_physical
    }

    pub fn rx_functional(&self) -> &PacketAddressingInfo {
        &self.rx_functional
    }

    pub fn tx_functional(&self) -> &PacketAddressingInfo {
        &self.tx_functional
    }

    /// Addressing of the communication peer: receive and transmit swapped
    pub fn get_other_end(&self) -> AddressingInformation {
        AddressingInformation {
            format: self.format,
            rx_physical: self.tx_physical,
            tx_physical: self.rx_physical,
            rx_functional: self.tx_functional,
            tx_functional: self.rx_functional,
        }
    }

    /// Receive direction a frame belongs to, if it is addressed to this node
    pub fn is_input_packet(&self, can_id: u32, frame_data: &[u8]) -> Option<AddressingType> {
        let frame = match self.format.decode_frame_ai(can_id, frame_data) {
            Ok(frame) => frame,
            Err(e) => {
                trace!(can_id = format!("0x{:X}", can_id), error = %e, "Frame not decodable");
                return None;
            }
        };

        [&self.rx_physical, &self.rx_functional]
            .into_iter()
            .find(|rx| {
                rx.can_id == can_id
                    && match self.format {
                        CanAddressingFormat::Extended => frame.target_address == rx.target_address,
                        CanAddressingFormat::Mixed11Bit | CanAddressingFormat::Mixed29Bit => {
                            frame.address_extension == rx.address_extension
                        }
                        CanAddressingFormat::Normal11Bit | CanAddressingFormat::NormalFixed => true,
                    }
            })
            .map(|rx| rx.addressing_type)
    }
}

/// Write-once assembly of [`AddressingInformation`]
#[derive(Debug, Clone)]
pub struct AddressingInformationBuilder {
    format: CanAddressingFormat,
    rx_physical: Option<PacketAddressingInfo>,
    tx_physical: Option<PacketAddressingInfo>,
    rx_functional: Option<PacketAddressingInfo>,
    tx_functional: Option<PacketAddressingInfo>,
}

impl AddressingInformationBuilder {
    pub fn new(format: CanAddressingFormat) -> Self {
        Self {
            format,
            rx_physical: None,
            tx_physical: None,
            rx_functional: None,
            tx_functional: None,
        }
    }

    pub fn rx_physical(mut self, params: &AddressingParams) -> AddressingResult<Self> {
        let info = assign(
            self.format,
            &self.rx_physical,
            "rx_physical",
            AddressingType::Physical,
            params,
        )?;
        self.rx_physical = Some(info);
        Ok(self)
    }

    pub fn tx_physical(mut self, params: &AddressingParams) -> AddressingResult<Self> {
        let info = assign(
            self.format,
            &self.tx_physical,
            "tx_physical",
            AddressingType::Physical,
            params,
        )?;
        self.tx_physical = Some(info);
        Ok(self)
    }

    pub fn rx_functional(mut self, params: &AddressingParams) -> AddressingResult<Self> {
        let info = assign(
            self.format,
            &self.rx_functional,
            "rx_functional",
            AddressingType::Functional,
            params,
        )?;
        self.rx_functional = Some(info);
        Ok(self)
    }

    pub fn tx_functional(mut self, params: &AddressingParams) -> AddressingResult<Self> {
        let info = assign(
            self.format,
            &self.tx_functional,
            "tx_functional",
            AddressingType::Functional,
            params,
        )?;
        self.tx_functional = Some(info);
        Ok(self)
    }

    pub fn build(self) -> AddressingResult<AddressingInformation> {
        let rx_physical = self.rx_physical.ok_or(AddressingError::Incomplete("rx_physical"))?;
        let tx_physical = self.tx_physical.ok_or(AddressingError::Incomplete("tx_physical"))?;
        let rx_functional = self.rx_functional.ok_or(AddressingError::Incomplete("rx_functional"))?;
        let tx_functional = self.tx_functional.ok_or(AddressingError::Incomplete("tx_functional"))?;

        for (rx, tx) in [(&rx_physical, &tx_physical), (&rx_functional, &tx_functional)] {
            if rx == tx {
                return Err(AddressingError::Inconsistent(format!(
                    "{} receive and transmit parameters are identical ({})",
                    rx.addressing_type, rx
                )));
            }
        }

        debug!(
            format = %self.format,
            rx_physical = %rx_physical,
            tx_physical = %tx_physical,
            "Built addressing information"
        );
        Ok(AddressingInformation {
            format: self.format,
            rx_physical,
            tx_physical,
            rx_functional,
            tx_functional,
        })
    }
}

fn assign(
    format: CanAddressingFormat,
    current: &Option<PacketAddressingInfo>,
    slot: &'static str,
    addressing_type: AddressingType,
    params: &AddressingParams,
) -> AddressingResult<PacketAddressingInfo> {
    if current.is_some() {
        return Err(AddressingError::AlreadySet(slot));
    }
    format.validate_packet_ai(&params.to_packet_params(addressing_type)?)
}
