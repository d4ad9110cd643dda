//! A32 register, shift and exception types.

use std::fmt;

/// Core register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    SP,
    LR,
    PC,
}

impl Reg {
    const ALL: [Reg; 16] = [
        Reg::R0,
        Reg::R1,
        Reg::R2,
        Reg::R3,
        Reg::R4,
        Reg::R5,
        Reg::R6,
        Reg::R7,
        Reg::R8,
        Reg::R9,
        Reg::R10,
        Reg::R11,
        Reg::R12,
        Reg::SP,
        Reg::LR,
        Reg::PC,
    ];

    /// Register named by the low four bits of `bits`.
    pub const fn from_bits(bits: u32) -> Reg {
        Self::ALL[(bits & 0xF) as usize]
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::SP => f.write_str("sp"),
            Reg::LR => f.write_str("lr"),
            Reg::PC => f.write_str("pc"),
            r => write!(f, "r{}", r.index()),
        }
    }
}

/// VFP extension register, single (`s0`..`s31`) or double (`d0`..`d31`) precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtReg {
    S(u8),
    D(u8),
}

impl ExtReg {
    /// Build a register from an encoded 4-bit field and its extra bit.
    ///
    /// Single registers put the extra bit at the bottom (`Vd:D`), double
    /// registers at the top (`D:Vd`).
    pub const fn from_fields(double: bool, base: u32, extra: u32) -> ExtReg {
        let base = (base & 0xF) as u8;
        let extra = (extra & 1) as u8;
        if double {
            ExtReg::D(extra << 4 | base)
        } else {
            ExtReg::S(base << 1 | extra)
        }
    }

    pub const fn is_single(self) -> bool {
        matches!(self, ExtReg::S(_))
    }

    pub const fn is_double(self) -> bool {
        matches!(self, ExtReg::D(_))
    }
}

impl fmt::Display for ExtReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtReg::S(n) => write!(f, "s{n}"),
            ExtReg::D(n) => write!(f, "d{n}"),
        }
    }
}

/// Barrel shifter operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftType {
    LSL,
    LSR,
    ASR,
    ROR,
}

impl ShiftType {
    pub const fn from_bits(bits: u32) -> ShiftType {
        match bits & 3 {
            0 => ShiftType::LSL,
            1 => ShiftType::LSR,
            2 => ShiftType::ASR,
            _ => ShiftType::ROR,
        }
    }
}

/// Guest exceptions surfaced through `A32ExceptionRaised`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exception {
    UndefinedInstruction,
    UnpredictableInstruction,
    Breakpoint,
    Yield,
    WaitForEvent,
    WaitForInterrupt,
    SendEvent,
}

impl Exception {
    pub const fn code(self) -> u64 {
        self as u64
    }
}
