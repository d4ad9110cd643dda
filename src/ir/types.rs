//! IR value types.
//!
//! Every opcode declares the type of its result and of each argument slot.
//! The table lives in [`super::opcodes`]; this module only names the types
//! and decides which pairs are interchangeable.

use std::fmt;

/// Type of an IR value or argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value (instructions executed only for their effect, empty slots).
    Void,
    /// Any type. Used by pseudo-operations and `Identity`.
    Opaque,
    /// Reference to an A32 core register.
    A32Reg,
    /// Reference to an A32 extension (VFP) register.
    A32ExtReg,
    U1,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Type {
    /// Name used in block dumps and type-error annotations.
    pub const fn name(self) -> &'static str {
        match self {
            Type::Void => "Void",
            Type::Opaque => "Opaque",
            Type::A32Reg => "A32Reg",
            Type::A32ExtReg => "A32ExtReg",
            Type::U1 => "U1",
            Type::U8 => "U8",
            Type::U16 => "U16",
            Type::U32 => "U32",
            Type::U64 => "U64",
            Type::F32 => "F32",
            Type::F64 => "F64",
        }
    }

    /// Whether a value of type `self` may be passed where `other` is declared.
    pub fn is_compatible_with(self, other: Type) -> bool {
        self == other || self == Type::Opaque || other == Type::Opaque
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
