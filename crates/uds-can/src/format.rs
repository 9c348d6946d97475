//! CAN addressing formats and frame-level addressing helpers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uds_core::{AddressingType, ValueError};

use crate::can_id;
use crate::error::{AddressingError, AddressingResult};
use crate::validator::{
    AddressingValidator, ExtendedValidator, Mixed11BitValidator, Mixed29BitValidator,
    Normal11BitValidator, NormalFixedValidator, PacketAddressingInfo, PacketAiParams,
};

/// ISO 15765-2 addressing format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanAddressingFormat {
    /// 11-bit identifier, no addressing bytes
    #[serde(rename = "normal_11bit")]
    Normal11Bit,
    /// 29-bit identifier carrying TA and SA
    #[serde(rename = "normal_fixed")]
    NormalFixed,
    /// Any identifier, TA in the first data byte
    #[serde(rename = "extended")]
    Extended,
    /// 11-bit identifier, AE in the first data byte
    #[serde(rename = "mixed_11bit")]
    Mixed11Bit,
    /// 29-bit identifier carrying TA and SA, AE in the first data byte
    #[serde(rename = "mixed_29bit")]
    Mixed29Bit,
}

static NORMAL_11BIT: Normal11BitValidator = Normal11BitValidator;
static NORMAL_FIXED: NormalFixedValidator = NormalFixedValidator;
static EXTENDED: ExtendedValidator = ExtendedValidator;
static MIXED_11BIT: Mixed11BitValidator = Mixed11BitValidator;
static MIXED_29BIT: Mixed29BitValidator = Mixed29BitValidator;

impl CanAddressingFormat {
    pub const ALL: [CanAddressingFormat; 5] = [
        CanAddressingFormat::Normal11Bit,
        CanAddressingFormat::NormalFixed,
        CanAddressingFormat::Extended,
        CanAddressingFormat::Mixed11Bit,
        CanAddressingFormat::Mixed29Bit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanAddressingFormat::Normal11Bit => "normal_11bit",
            CanAddressingFormat::NormalFixed => "normal_fixed",
            CanAddressingFormat::Extended => "extended",
            CanAddressingFormat::Mixed11Bit => "mixed_11bit",
            CanAddressingFormat::Mixed29Bit => "mixed_29bit",
        }
    }

    /// Number of frame data bytes used for addressing
    pub fn ai_data_bytes_number(&self) -> usize {
        match self {
            CanAddressingFormat::Normal11Bit | CanAddressingFormat::NormalFixed => 0,
            CanAddressingFormat::Extended
            | CanAddressingFormat::Mixed11Bit
            | CanAddressingFormat::Mixed29Bit => 1,
        }
    }

    /// Validator implementing this format's rules
    pub fn validator(&self) -> &'static dyn AddressingValidator {
        match self {
            CanAddressingFormat::Normal11Bit => &NORMAL_11BIT,
            CanAddressingFormat::NormalFixed => &NORMAL_FIXED,
            CanAddressingFormat::Extended => &EXTENDED,
            CanAddressingFormat::Mixed11Bit => &MIXED_11BIT,
            CanAddressingFormat::Mixed29Bit => &MIXED_29BIT,
        }
    }

    pub fn validate_packet_ai(
        &self,
        params: &PacketAiParams,
    ) -> AddressingResult<PacketAddressingInfo> {
        self.validator().validate_packet_ai(params)
    }

    /// Addressing bytes that open every frame data field of this format
    ///
    /// Extended addressing takes the target address, mixed addressing the
    /// address extension. Supplying a field the format does not carry is a
    /// usage error.
    pub fn encode_ai_data_bytes(
        &self,
        target_address: Option<u8>,
        address_extension: Option<u8>,
    ) -> AddressingResult<Vec<u8>> {
        let (used, unused) = match self {
            CanAddressingFormat::Normal11Bit | CanAddressingFormat::NormalFixed => {
                reject_field(*self, "target_address", target_address)?;
                reject_field(*self, "address_extension", address_extension)?;
                return Ok(Vec::new());
            }
            CanAddressingFormat::Extended => (
                ("target_address", target_address),
                ("address_extension", address_extension),
            ),
            CanAddressingFormat::Mixed11Bit | CanAddressingFormat::Mixed29Bit => (
                ("address_extension", address_extension),
                ("target_address", target_address),
            ),
        };
        reject_field(*self, unused.0, unused.1)?;
        let byte = used.1.ok_or_else(|| {
            AddressingError::Inconsistent(format!("{} addressing requires {}", self, used.0))
        })?;
        Ok(vec![byte])
    }

    /// Recover the addressing a received frame carries
    pub fn decode_frame_ai(
        &self,
        can_id: u32,
        frame_data: &[u8],
    ) -> AddressingResult<FrameAddressingInfo> {
        let mut info = FrameAddressingInfo::default();
        match self {
            CanAddressingFormat::Normal11Bit | CanAddressingFormat::Mixed11Bit => {
                if !can_id::is_standard_id(can_id) {
                    return Err(AddressingError::invalid_can_id(can_id, "not an 11-bit identifier"));
                }
            }
            CanAddressingFormat::Extended => {
                if !can_id::is_can_id(can_id) {
                    return Err(AddressingError::invalid_can_id(can_id, "wider than 29 bits"));
                }
            }
            CanAddressingFormat::NormalFixed | CanAddressingFormat::Mixed29Bit => {
                let fields = if *self == CanAddressingFormat::NormalFixed {
                    can_id::decode_normal_fixed(can_id)?
                } else {
                    can_id::decode_mixed_29bit(can_id)?
                };
                info.addressing_type = Some(fields.addressing_type);
                info.target_address = Some(fields.target_address);
                info.source_address = Some(fields.source_address);
                info.priority = Some(fields.priority);
            }
        }

        if self.ai_data_bytes_number() > 0 {
            let byte = *frame_data.first().ok_or_else(|| {
                AddressingError::Inconsistent(format!(
                    "{} frame carries no addressing byte",
                    self
                ))
            })?;
            if *self == CanAddressingFormat::Extended {
                info.target_address = Some(byte);
            } else {
                info.address_extension = Some(byte);
            }
        }
        Ok(info)
    }
}

fn reject_field(
    format: CanAddressingFormat,
    field: &str,
    value: Option<u8>,
) -> AddressingResult<()> {
    if value.is_some() {
        return Err(AddressingError::Usage(format!(
            "{} addressing does not use {}",
            format, field
        )));
    }
    Ok(())
}

impl fmt::Display for CanAddressingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanAddressingFormat {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| ValueError::UnknownEnumerant {
                kind: "CAN addressing format",
                value: s.to_string(),
            })
    }
}

/// Addressing fields recovered from a single frame
///
/// Formats with plain identifiers cannot tell physical from functional
/// traffic, so `addressing_type` stays `None` for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameAddressingInfo {
    pub addressing_type: Option<AddressingType>,
    pub target_address: Option<u8>,
    pub source_address: Option<u8>,
    pub address_extension: Option<u8>,
    pub priority: Option<u8>,
}
