//! Guest condition codes.

use std::fmt;

/// A32 condition field, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    EQ,
    NE,
    CS,
    CC,
    MI,
    PL,
    VS,
    VC,
    HI,
    LS,
    GE,
    LT,
    GT,
    LE,
    AL,
    /// Obsolete "never" encoding.
    NV,
}

impl Cond {
    const ALL: [Cond; 16] = [
        Cond::EQ,
        Cond::NE,
        Cond::CS,
        Cond::CC,
        Cond::MI,
        Cond::PL,
        Cond::VS,
        Cond::VC,
        Cond::HI,
        Cond::LS,
        Cond::GE,
        Cond::LT,
        Cond::GT,
        Cond::LE,
        Cond::AL,
        Cond::NV,
    ];

    /// Decode the low four bits of `bits`.
    pub const fn from_bits(bits: u32) -> Cond {
        Self::ALL[(bits & 0xF) as usize]
    }

    /// Condition field of an A32 instruction word.
    pub const fn of_instruction(word: u32) -> Cond {
        Self::from_bits(word >> 28)
    }

    pub const fn bits(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Cond::EQ => "eq",
            Cond::NE => "ne",
            Cond::CS => "cs",
            Cond::CC => "cc",
            Cond::MI => "mi",
            Cond::PL => "pl",
            Cond::VS => "vs",
            Cond::VC => "vc",
            Cond::HI => "hi",
            Cond::LS => "ls",
            Cond::GE => "ge",
            Cond::LT => "lt",
            Cond::GT => "gt",
            Cond::LE => "le",
            Cond::AL => "al",
            Cond::NV => "nv",
        }
    }
}

impl Default for Cond {
    fn default() -> Self {
        Cond::AL
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
