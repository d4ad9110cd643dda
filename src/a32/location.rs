//! A32 guest location descriptor.
//!
//! Packs the program counter with the pieces of processor state that change
//! how instructions translate: the Thumb and endianness bits of CPSR and the
//! FPSCR mode bits (vector length and stride, rounding, flush-to-zero and
//! default-NaN controls). Everything else in CPSR/FPSCR is dynamic state the
//! translated code reads at run time.

use std::fmt;

use crate::ir::LocationDescriptor;

/// FPSCR bits that affect translation.
pub const FPSCR_MODE_MASK: u32 = 0x07F7_9F00;

// Low bits of the upper hash word, clear in FPSCR_MODE_MASK.
const T_BIT: u32 = 1 << 0;
const E_BIT: u32 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct A32LocationDescriptor {
    pc: u32,
    t: bool,
    e: bool,
    fpscr_mode: u32,
}

impl A32LocationDescriptor {
    /// ARM-state, little-endian descriptor at `pc` with default FPSCR mode.
    pub const fn new(pc: u32) -> Self {
        Self {
            pc,
            t: false,
            e: false,
            fpscr_mode: 0,
        }
    }

    pub const fn with_state(pc: u32, t: bool, e: bool, fpscr: u32) -> Self {
        Self {
            pc,
            t,
            e,
            fpscr_mode: fpscr & FPSCR_MODE_MASK,
        }
    }

    pub const fn pc(self) -> u32 {
        self.pc
    }

    /// CPSR.T: executing Thumb code.
    pub const fn t_flag(self) -> bool {
        self.t
    }

    /// CPSR.E: big-endian data accesses.
    pub const fn e_flag(self) -> bool {
        self.e
    }

    pub const fn fpscr_mode(self) -> u32 {
        self.fpscr_mode
    }

    /// FPSCR.Len plus one: the number of elements in a short vector.
    pub const fn fpscr_len(self) -> u32 {
        ((self.fpscr_mode >> 16) & 0b111) + 1
    }

    /// FPSCR.Stride decoded into an element distance, or `None` for the reserved encodings.
    pub const fn fpscr_stride(self) -> Option<u32> {
        match (self.fpscr_mode >> 20) & 0b11 {
            0b00 => Some(1),
            0b11 => Some(2),
            _ => None,
        }
    }

    pub const fn set_pc(self, pc: u32) -> Self {
        Self { pc, ..self }
    }

    /// Advance by `amount` bytes, wrapping at the top of the address space.
    pub const fn advance_pc(self, amount: i32) -> Self {
        self.set_pc(self.pc.wrapping_add(amount as u32))
    }

    pub const fn unique_hash(self) -> u64 {
        let mut upper = self.fpscr_mode;
        if self.t {
            upper |= T_BIT;
        }
        if self.e {
            upper |= E_BIT;
        }
        self.pc as u64 | (upper as u64) << 32
    }
}

impl From<A32LocationDescriptor> for LocationDescriptor {
    fn from(location: A32LocationDescriptor) -> Self {
        LocationDescriptor::new(location.unique_hash())
    }
}

impl From<LocationDescriptor> for A32LocationDescriptor {
    fn from(location: LocationDescriptor) -> Self {
        let value = location.value();
        let upper = (value >> 32) as u32;
        Self {
            pc: value as u32,
            t: upper & T_BIT != 0,
            e: upper & E_BIT != 0,
            fpscr_mode: upper & FPSCR_MODE_MASK,
        }
    }
}

impl fmt::Display for A32LocationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:08x},{},{},{:08x}}}",
            self.pc,
            if self.t { "T" } else { "!T" },
            if self.e { "E" } else { "!E" },
            self.fpscr_mode
        )
    }
}
