//! TOML addressing configuration
//!
//! ```toml
//! format = "normal_fixed"
//!
//! [rx_physical]
//! target_address = 0x10
//! source_address = 0xF1
//!
//! [tx_physical]
//! target_address = 0xF1
//! source_address = 0x10
//!
//! [rx_functional]
//! target_address = 0x33
//! source_address = 0xF1
//!
//! [tx_functional]
//! target_address = 0xF1
//! source_address = 0x33
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AddressingResult;
use crate::format::CanAddressingFormat;
use crate::holder::{AddressingInformation, AddressingParams};

/// Addressing of one node as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressingConfig {
    pub format: CanAddressingFormat,
    pub rx_physical: AddressingParams,
    pub tx_physical: AddressingParams,
    pub rx_functional: AddressingParams,
    pub tx_functional: AddressingParams,
}

impl AddressingConfig {
    pub fn from_toml(content: &str) -> AddressingResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> AddressingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), format = %config.format, "Loaded addressing configuration");
        Ok(config)
    }

    /// Validate every parameter set and assemble the addressing holder
    pub fn into_addressing_information(self) -> AddressingResult<AddressingInformation> {
        AddressingInformation::builder(self.format)
            .rx_physical(&self.rx_physical)?
            .tx_physical(&self.tx_physical)?
            .rx_functional(&self.rx_functional)?
            .tx_functional(&self.tx_functional)?
            .build()
    }
}
