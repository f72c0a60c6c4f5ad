//! Go integer kinds and their value ranges.

use serde::Serialize;
use std::fmt;

/// Underlying integer representation of a Go type.
///
/// `int`, `uint` and `uintptr` are taken as 64 bits wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
}

impl IntKind {
    /// Look up a predeclared Go integer type (`byte` and `rune` included).
    pub fn from_basic(name: &str) -> Option<Self> {
        let kind = match name {
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Self::Int8 | Self::Uint8 => 8,
            Self::Int16 | Self::Uint16 => 16,
            Self::Int32 | Self::Uint32 => 32,
            Self::Int | Self::Int64 | Self::Uint | Self::Uint64 | Self::Uintptr => 64,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    pub fn min(&self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.bits() - 1))
        } else {
            0
        }
    }

    pub fn max(&self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.bits() - 1)) - 1
        } else {
            (1i128 << self.bits()) - 1
        }
    }

    /// Whether `value` is representable in this kind.
    pub fn contains(&self, value: i128) -> bool {
        (self.min()..=self.max()).contains(&value)
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a type name ultimately stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    /// Backed by a Go integer kind.
    Integer(IntKind),
    /// Declared, but backed by something else (string, float, struct,
    /// a type from another package...). Carries a description.
    Other(String),
    /// Not a type this package knows about.
    Undeclared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!(IntKind::Int8.min(), -128);
        assert_eq!(IntKind::Int8.max(), 127);
        assert_eq!(IntKind::Uint8.max(), 255);
        assert_eq!(IntKind::Uint64.max(), u64::MAX as i128);
        assert_eq!(IntKind::Int.min(), i64::MIN as i128);
        assert!(!IntKind::Uint.contains(-1));
        assert!(IntKind::Int16.contains(-32768));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(IntKind::from_basic("byte"), Some(IntKind::Uint8));
        assert_eq!(IntKind::from_basic("rune"), Some(IntKind::Int32));
        assert_eq!(IntKind::from_basic("string"), None);
    }
}
