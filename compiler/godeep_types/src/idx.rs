//! Handles into the type pool and package table.
//!
//! `Idx` is the canonical type handle. Structural types are interned, so
//! two identical types always share one `Idx`; every named declaration
//! gets its own. Type identity is therefore index equality.

use std::fmt;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    /// Sentinel for "no type".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Pre-interned index of a predeclared basic type.
    #[inline]
    pub const fn basic(kind: BasicKind) -> Self {
        Self(kind as u32)
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            write!(f, "Idx::NONE")
        } else {
            write!(f, "Idx({})", self.0)
        }
    }
}

/// Index of a named type declaration in the pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NamedId(pub(crate) u32);

impl NamedId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a package in the program.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PkgId(pub(crate) u32);

impl PkgId {
    /// The universe block holding predeclared names such as `error`.
    pub const UNIVERSE: Self = Self(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Go's predeclared basic types.
///
/// Discriminants double as the pre-interned pool indices.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BasicKind {
    Bool,
    String,
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
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Spelled `byte`; identical to `uint8` in Go but printed as written.
    Byte,
    /// Spelled `rune`; identical to `int32` in Go but printed as written.
    Rune,
}

impl BasicKind {
    pub const ALL: [BasicKind; 19] = [
        BasicKind::Bool,
        BasicKind::String,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::Byte,
        BasicKind::Rune,
    ];

    /// Go spelling.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::String => "string",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_indices_follow_declaration_order() {
        for (i, kind) in BasicKind::ALL.iter().enumerate() {
            assert_eq!(Idx::basic(*kind).raw() as usize, i);
        }
    }

    #[test]
    fn test_none_debug() {
        assert_eq!(format!("{:?}", Idx::NONE), "Idx::NONE");
        assert_eq!(format!("{:?}", Idx::from_raw(3)), "Idx(3)");
    }
}
