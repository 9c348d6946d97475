//! uds-core - Core types shared by the UDS codec crates
//!
//! This crate provides the small leaf abstractions used by both the
//! payload codec (`uds-codec`) and the CAN addressing layer (`uds-can`):
//! byte-range validation and the addressing type enumerant.

pub mod addressing;
pub mod byte;
pub mod error;

pub use addressing::AddressingType;
pub use byte::{validate_raw_byte, validate_raw_bytes};
pub use error::{ValueError, ValueResult};
