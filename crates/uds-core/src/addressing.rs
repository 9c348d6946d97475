//! Addressing type shared by the codec and the CAN addressing layer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Communication model of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressingType {
    /// 1-to-1 communication
    Physical,
    /// 1-to-n communication
    Functional,
}

impl AddressingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressingType::Physical => "PHYSICAL",
            AddressingType::Functional => "FUNCTIONAL",
        }
    }
}

impl fmt::Display for AddressingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressingType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PHYSICAL" => Ok(AddressingType::Physical),
            "FUNCTIONAL" => Ok(AddressingType::Functional),
            _ => Err(ValueError::UnknownEnumerant {
                kind: "addressing type",
                value: s.to_string(),
            }),
        }
    }
}
