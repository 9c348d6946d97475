//! uds-can - CAN addressing information for UDS on CAN
//!
//! Implements the ISO 15765-2 addressing formats a diagnostic node can use
//! and checks that the addressing parameters given for each direction agree
//! with each other and with the CAN identifiers involved.
//!
//! # Architecture
//!
//! ```text
//! AddressingConfig (TOML)
//!         │
//!         ▼
//! AddressingInformationBuilder ──► AddressingInformation
//!         │  write-once rx/tx, physical/functional
//!         ▼
//! CanAddressingFormat::validator()
//!         │
//!         ▼
//! can_id: 29-bit encode/decode, priority
//! ```
//!
//! # Example
//!
//! ```rust
//! use uds_can::{AddressingType, CanAddressingFormat, PacketAiParams};
//!
//! let info = CanAddressingFormat::NormalFixed
//!     .validate_packet_ai(
//!         &PacketAiParams::new(AddressingType::Physical)
//!             .with_target_address(0x10)
//!             .with_source_address(0xF1),
//!     )
//!     .unwrap();
//! assert_eq!(info.can_id, 0x18DA10F1);
//! ```

pub mod can_id;
pub mod config;
pub mod error;
pub mod format;
pub mod holder;
pub mod validator;

pub use can_id::CanIdFields;
pub use config::AddressingConfig;
pub use error::{AddressingError, AddressingResult};
pub use format::{CanAddressingFormat, FrameAddressingInfo};
pub use holder::{AddressingInformation, AddressingInformationBuilder, AddressingParams};
pub use validator::{
    AddressingValidator, ExtendedValidator, Mixed11BitValidator, Mixed29BitValidator,
    Normal11BitValidator, NormalFixedValidator, PacketAddressingInfo, PacketAiParams,
};

pub use uds_core::AddressingType;
