//! Addressing information validators
//!
//! One validator per addressing format. Each reconciles the caller's
//! parameters with what the CAN identifier itself encodes: a supplied field
//! must equal the decoded one, a missing field takes the decoded value, and
//! fields the format does not carry are rejected as usage errors.

use std::fmt;

use tracing::debug;
use uds_core::AddressingType;

use crate::can_id::{self, CanIdFields};
use crate::error::{AddressingError, AddressingResult};
use crate::format::CanAddressingFormat;

/// Addressing parameters of one packet direction, as supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketAiParams {
    pub addressing_type: AddressingType,
    pub can_id: Option<u32>,
    pub target_address: Option<u8>,
    pub source_address: Option<u8>,
    pub address_extension: Option<u8>,
}

impl PacketAiParams {
    pub fn new(addressing_type: AddressingType) -> Self {
        Self {
            addressing_type,
            can_id: None,
            target_address: None,
            source_address: None,
            address_extension: None,
        }
    }

    pub fn with_can_id(mut self, can_id: u32) -> Self {
        self.can_id = Some(can_id);
        self
    }

    pub fn with_target_address(mut self, target_address: u8) -> Self {
        self.target_address = Some(target_address);
        self
    }

    pub fn with_source_address(mut self, source_address: u8) -> Self {
        self.source_address = Some(source_address);
        self
    }

    pub fn with_address_extension(mut self, address_extension: u8) -> Self {
        self.address_extension = Some(address_extension);
        self
    }
}

/// Resolved, mutually consistent addressing of one packet direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketAddressingInfo {
    pub addressing_type: AddressingType,
    pub can_id: u32,
    pub target_address: Option<u8>,
    pub source_address: Option<u8>,
    pub address_extension: Option<u8>,
}

impl fmt::Display for PacketAddressingInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} CAN ID 0x{:X}", self.addressing_type, self.can_id)?;
        if let Some(ta) = self.target_address {
            write!(f, " TA 0x{:02X}", ta)?;
        }
        if let Some(sa) = self.source_address {
            write!(f, " SA 0x{:02X}", sa)?;
        }
        if let Some(ae) = self.address_extension {
            write!(f, " AE 0x{:02X}", ae)?;
        }
        Ok(())
    }
}

/// Validation contract shared by all addressing formats
pub trait AddressingValidator: fmt::Debug + Send + Sync {
    fn format(&self) -> CanAddressingFormat;

    /// Check the parameters and return the complete addressing they describe
    fn validate_packet_ai(&self, params: &PacketAiParams)
        -> AddressingResult<PacketAddressingInfo>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normal11BitValidator;

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalFixedValidator;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedValidator;

#[derive(Debug, Clone, Copy, Default)]
pub struct Mixed11BitValidator;

#[derive(Debug, Clone, Copy, Default)]
pub struct Mixed29BitValidator;

impl AddressingValidator for Normal11BitValidator {
    fn format(&self) -> CanAddressingFormat {
        CanAddressingFormat::Normal11Bit
    }

    fn validate_packet_ai(
        &self,
        params: &PacketAiParams,
    ) -> AddressingResult<PacketAddressingInfo> {
        let format = self.format();
        reject(format, "target_address", params.target_address)?;
        reject(format, "source_address", params.source_address)?;
        reject(format, "address_extension", params.address_extension)?;
        let can_id = require(format, "can_id", params.can_id)?;
        if !can_id::is_normal_11bit_addressed(can_id) {
            return Err(AddressingError::invalid_can_id(can_id, "not an 11-bit identifier"));
        }
        Ok(resolved(format, params.addressing_type, can_id, None, None, None))
    }
}

impl AddressingValidator for NormalFixedValidator {
    fn format(&self) -> CanAddressingFormat {
        CanAddressingFormat::NormalFixed
    }

    fn validate_packet_ai(
        &self,
        params: &PacketAiParams,
    ) -> AddressingResult<PacketAddressingInfo> {
        let format = self.format();
        reject(format, "address_extension", params.address_extension)?;
        let (can_id, target, source) = reconcile_fixed(
            format,
            params,
            can_id::encode_normal_fixed,
            can_id::decode_normal_fixed,
        )?;
        Ok(resolved(
            format,
            params.addressing_type,
            can_id,
            Some(target),
            Some(source),
            None,
        ))
    }
}

impl AddressingValidator for ExtendedValidator {
    fn format(&self) -> CanAddressingFormat {
        CanAddressingFormat::Extended
    }

    fn validate_packet_ai(
        &self,
        params: &PacketAiParams,
    ) -> AddressingResult<PacketAddressingInfo> {
        let format = self.format();
        reject(format, "source_address", params.source_address)?;
        reject(format, "address_extension", params.address_extension)?;
        let can_id = require(format, "can_id", params.can_id)?;
        if !can_id::is_can_id(can_id) {
            return Err(AddressingError::invalid_can_id(can_id, "wider than 29 bits"));
        }
        let target = require(format, "target_address", params.target_address)?;
        Ok(resolved(
            format,
            params.addressing_type,
            can_id,
            Some(target),
            None,
            None,
        ))
    }
}

impl AddressingValidator for Mixed11BitValidator {
    fn format(&self) -> CanAddressingFormat {
        CanAddressingFormat::Mixed11Bit
    }

    fn validate_packet_ai(
        &self,
        params: &PacketAiParams,
    ) -> AddressingResult<PacketAddressingInfo> {
        let format = self.format();
        reject(format, "target_address", params.target_address)?;
        reject(format, "source_address", params.source_address)?;
        let can_id = require(format, "can_id", params.can_id)?;
        if !can_id::is_mixed_11bit_addressed(can_id) {
            return Err(AddressingError::invalid_can_id(can_id, "not an 11-bit identifier"));
        }
        let extension = require(format, "address_extension", params.address_extension)?;
        Ok(resolved(
            format,
            params.addressing_type,
            can_id,
            None,
            None,
            Some(extension),
        ))
    }
}

impl AddressingValidator for Mixed29BitValidator {
    fn format(&self) -> CanAddressingFormat {
        CanAddressingFormat::Mixed29Bit
    }

    fn validate_packet_ai(
        &self,
        params: &PacketAiParams,
    ) -> AddressingResult<PacketAddressingInfo> {
        let format = self.format();
        let extension = require(format, "address_extension", params.address_extension)?;
        let (can_id, target, source) = reconcile_fixed(
            format,
            params,
            can_id::encode_mixed_29bit,
            can_id::decode_mixed_29bit,
        )?;
        Ok(resolved(
            format,
            params.addressing_type,
            can_id,
            Some(target),
            Some(source),
            Some(extension),
        ))
    }
}

type EncodeFn = fn(AddressingType, u8, u8, Option<u8>) -> AddressingResult<u32>;
type DecodeFn = fn(u32) -> AddressingResult<CanIdFields>;

/// Derive the identifier from TA/SA, or check TA/SA/type against it
fn reconcile_fixed(
    format: CanAddressingFormat,
    params: &PacketAiParams,
    encode: EncodeFn,
    decode: DecodeFn,
) -> AddressingResult<(u32, u8, u8)> {
    let Some(can_id) = params.can_id else {
        let target = require(format, "target_address", params.target_address)?;
        let source = require(format, "source_address", params.source_address)?;
        let can_id = encode(params.addressing_type, target, source, None)?;
        return Ok((can_id, target, source));
    };

    let decoded = decode(can_id)?;
    if decoded.addressing_type != params.addressing_type {
        return Err(AddressingError::Inconsistent(format!(
            "CAN ID 0x{:X} is {} addressed, but {} was given",
            can_id, decoded.addressing_type, params.addressing_type
        )));
    }
    let target = agree("target_address", can_id, params.target_address, decoded.target_address)?;
    let source = agree("source_address", can_id, params.source_address, decoded.source_address)?;
    Ok((can_id, target, source))
}

/// Supplied value must equal the decoded one; a missing value takes it
fn agree(field: &str, can_id: u32, supplied: Option<u8>, decoded: u8) -> AddressingResult<u8> {
    match supplied {
        Some(value) if value != decoded => Err(AddressingError::Inconsistent(format!(
            "{} 0x{:02X} does not match 0x{:02X} encoded in CAN ID 0x{:X}",
            field, value, decoded, can_id
        ))),
        _ => Ok(decoded),
    }
}

fn reject<T>(format: CanAddressingFormat, field: &str, value: Option<T>) -> AddressingResult<()> {
    if value.is_some() {
        return Err(AddressingError::Usage(format!(
            "{} addressing does not use {}",
            format, field
        )));
    }
    Ok(())
}

fn require<T>(format: CanAddressingFormat, field: &str, value: Option<T>) -> AddressingResult<T> {
    value.ok_or_else(|| {
        AddressingError::Inconsistent(format!("{} addressing requires {}", format, field))
    })
}

fn resolved(
    format: CanAddressingFormat,
    addressing_type: AddressingType,
    can_id: u32,
    target_address: Option<u8>,
    source_address: Option<u8>,
    address_extension: Option<u8>,
) -> PacketAddressingInfo {
    let info = PacketAddressingInfo {
        addressing_type,
        can_id,
        target_address,
        source_address,
        address_extension,
    };
    debug!(format = %format, packet = %info, "Validated packet addressing");
    info
}
