//! Target levels: the declaration kinds a marker may attach to

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Bitmask of declaration kinds a definition may attach to.
    ///
    /// Definitions declare a union of levels at registration; the host
    /// collaborator decides which single level an AST node represents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TargetLevel: u8 {
        /// Package / module clause
        const PACKAGE = 0b0000_0001;
        /// Struct type declaration
        const STRUCT_TYPE = 0b0000_0010;
        /// Interface type declaration
        const INTERFACE_TYPE = 0b0000_0100;
        /// Struct field
        const FIELD = 0b0000_1000;
        /// Free function
        const FUNCTION = 0b0001_0000;
        /// Method with a struct receiver
        const STRUCT_METHOD = 0b0010_0000;
        /// Method declared on an interface
        const INTERFACE_METHOD = 0b0100_0000;

        /// Any type declaration
        const TYPE = Self::STRUCT_TYPE.bits() | Self::INTERFACE_TYPE.bits();
        /// Any method declaration
        const METHOD = Self::STRUCT_METHOD.bits() | Self::INTERFACE_METHOD.bits();
        /// Every attachment point
        const ALL = Self::PACKAGE.bits()
            | Self::TYPE.bits()
            | Self::FIELD.bits()
            | Self::FUNCTION.bits()
            | Self::METHOD.bits();
    }
}

impl Default for TargetLevel {
    fn default() -> Self {
        Self::empty()
    }
}

// Manual serde implementation (bitflags 2.x + serde)
impl Serialize for TargetLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TargetLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid TargetLevel bits: {:#04x}", bits))
        })
    }
}

impl fmt::Display for TargetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}
