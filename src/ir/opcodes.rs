// This module is the static signature table for IR opcodes. Each opcode maps to an
// OpInfo record holding its printable name, its result type and the declared type
// of every argument slot. The table replaces any per-opcode class hierarchy: the
// block container consults it for arity checks, the dump consults it for names and
// type annotations, and the translation loop consults the side-effect properties
// (writes_to_cpsr in particular) to decide whether a conditional block may keep
// growing. The declaration macro keeps the enum and its table in a single list so
// the two cannot drift apart.

//! IR opcode enumeration and signature side table.

use super::types::Type;

/// Static description of an opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub name: &'static str,
    pub result: Type,
    pub args: &'static [Type],
}

macro_rules! opcodes {
    ($($op:ident => $result:ident, [$($arg:ident),*];)*) => {
        /// IR operation tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($op,)*
        }

        impl Opcode {
            /// Every opcode, in declaration order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$op,)*];

            pub const fn info(self) -> OpInfo {
                match self {
                    $(Opcode::$op => OpInfo {
                        name: stringify!($op),
                        result: Type::$result,
                        args: &[$(Type::$arg),*],
                    },)*
                }
            }
        }
    };
}

opcodes! {
    Void => Void, [];
    Identity => Opaque, [Opaque];
    Breakpoint => Void, [];

    // A32 context
    A32SetCheckBit => Void, [U1];
    A32GetRegister => U32, [A32Reg];
    A32GetExtendedRegister32 => F32, [A32ExtReg];
    A32GetExtendedRegister64 => F64, [A32ExtReg];
    A32SetRegister => Void, [A32Reg, U32];
    A32SetExtendedRegister32 => Void, [A32ExtReg, F32];
    A32SetExtendedRegister64 => Void, [A32ExtReg, F64];
    A32GetCpsr => U32, [];
    A32SetCpsr => Void, [U32];
    A32SetCpsrNZCV => Void, [U32];
    A32SetCpsrNZCVQ => Void, [U32];
    A32GetNFlag => U1, [];
    A32SetNFlag => Void, [U1];
    A32GetZFlag => U1, [];
    A32SetZFlag => Void, [U1];
    A32GetCFlag => U1, [];
    A32SetCFlag => Void, [U1];
    A32GetVFlag => U1, [];
    A32SetVFlag => Void, [U1];
    A32OrQFlag => Void, [U1];
    A32BranchWritePC => Void, [U32];
    A32BXWritePC => Void, [U32];
    A32CallSupervisor => Void, [U32];
    A32ExceptionRaised => Void, [U32, U64];

    // Hints
    PushRSB => Void, [U64];

    // Pseudo-operations
    GetCarryFromOp => U1, [Opaque];
    GetOverflowFromOp => U1, [Opaque];

    // Calculations
    LeastSignificantByte => U8, [U32];
    MostSignificantBit => U1, [U32];
    IsZero32 => U1, [U32];
    ZeroExtendByteToWord => U32, [U8];
    LogicalShiftLeft32 => U32, [U32, U8, U1];
    LogicalShiftRight32 => U32, [U32, U8, U1];
    ArithmeticShiftRight32 => U32, [U32, U8, U1];
    RotateRight32 => U32, [U32, U8, U1];
    RotateRightExtended => U32, [U32, U1];
    Add32 => U32, [U32, U32, U1];
    Sub32 => U32, [U32, U32, U1];
    Mul32 => U32, [U32, U32];
    And32 => U32, [U32, U32];
    Eor32 => U32, [U32, U32];
    Or32 => U32, [U32, U32];
    Not32 => U32, [U32];
    CountLeadingZeros32 => U32, [U32];

    // Memory
    A32ReadMemory8 => U8, [U32];
    A32ReadMemory32 => U32, [U32];
    A32WriteMemory8 => Void, [U32, U8];
    A32WriteMemory32 => Void, [U32, U32];

    // Floating point
    FPAbs32 => F32, [F32];
    FPAbs64 => F64, [F64];
    FPNeg32 => F32, [F32];
    FPNeg64 => F64, [F64];
    FPAdd32 => F32, [F32, F32, U1];
    FPAdd64 => F64, [F64, F64, U1];
    FPSub32 => F32, [F32, F32, U1];
    FPSub64 => F64, [F64, F64, U1];
    FPMul32 => F32, [F32, F32, U1];
    FPMul64 => F64, [F64, F64, U1];
    TransferToFP32 => F32, [U32];
    TransferFromFP32 => U32, [F32];
}

impl Opcode {
    pub const fn name(self) -> &'static str {
        self.info().name
    }

    pub const fn result_type(self) -> Type {
        self.info().result
    }

    pub const fn num_args(self) -> usize {
        self.info().args.len()
    }

    /// Declared type of argument slot `index`.
    pub fn arg_type(self, index: usize) -> Type {
        let args = self.info().args;
        assert!(index < args.len(), "{} has no argument {}", self.name(), index);
        args[index]
    }

    /// Whether executing this opcode may modify any CPSR flag.
    pub const fn writes_to_cpsr(self) -> bool {
        matches!(
            self,
            Opcode::A32SetCpsr
                | Opcode::A32SetCpsrNZCV
                | Opcode::A32SetCpsrNZCVQ
                | Opcode::A32SetNFlag
                | Opcode::A32SetZFlag
                | Opcode::A32SetCFlag
                | Opcode::A32SetVFlag
                | Opcode::A32OrQFlag
        )
    }

    pub const fn reads_from_cpsr(self) -> bool {
        matches!(
            self,
            Opcode::A32GetCpsr
                | Opcode::A32GetNFlag
                | Opcode::A32GetZFlag
                | Opcode::A32GetCFlag
                | Opcode::A32GetVFlag
        )
    }

    pub const fn writes_to_core_register(self) -> bool {
        matches!(
            self,
            Opcode::A32SetRegister
                | Opcode::A32SetExtendedRegister32
                | Opcode::A32SetExtendedRegister64
                | Opcode::A32BranchWritePC
                | Opcode::A32BXWritePC
        )
    }

    pub const fn is_memory_read(self) -> bool {
        matches!(self, Opcode::A32ReadMemory8 | Opcode::A32ReadMemory32)
    }

    pub const fn is_memory_write(self) -> bool {
        matches!(self, Opcode::A32WriteMemory8 | Opcode::A32WriteMemory32)
    }

    pub const fn causes_cpu_exception(self) -> bool {
        matches!(
            self,
            Opcode::Breakpoint | Opcode::A32CallSupervisor | Opcode::A32ExceptionRaised
        )
    }

    /// Pseudo-operations extract a secondary result from the instruction they reference.
    pub const fn is_pseudo_operation(self) -> bool {
        matches!(self, Opcode::GetCarryFromOp | Opcode::GetOverflowFromOp)
    }

    /// Conservative: anything that may not be removed even when its result is unused.
    pub const fn may_have_side_effects(self) -> bool {
        self.writes_to_cpsr()
            || self.writes_to_core_register()
            || self.is_memory_write()
            || self.causes_cpu_exception()
            || matches!(self, Opcode::A32SetCheckBit | Opcode::PushRSB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_table_matches_declarations() {
        let info = Opcode::A32SetRegister.info();
        assert_eq!(info.name, "A32SetRegister");
        assert_eq!(info.result, Type::Void);
        assert_eq!(info.args, &[Type::A32Reg, Type::U32]);

        assert_eq!(Opcode::Add32.num_args(), 3);
        assert_eq!(Opcode::Add32.arg_type(2), Type::U1);
        assert_eq!(Opcode::A32GetCpsr.num_args(), 0);
        assert_eq!(Opcode::GetCarryFromOp.arg_type(0), Type::Opaque);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Opcode::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Opcode::ALL.len());
    }

    #[test]
    fn cpsr_writers() {
        assert!(Opcode::A32SetCFlag.writes_to_cpsr());
        assert!(Opcode::A32OrQFlag.writes_to_cpsr());
        assert!(!Opcode::A32GetCFlag.writes_to_cpsr());
        assert!(Opcode::A32GetCFlag.reads_from_cpsr());
        assert!(!Opcode::A32SetRegister.writes_to_cpsr());
        assert!(Opcode::A32SetCpsrNZCV.may_have_side_effects());
        assert!(!Opcode::Add32.may_have_side_effects());
    }

    #[test]
    #[should_panic(expected = "has no argument")]
    fn arg_type_out_of_range_panics() {
        Opcode::Not32.arg_type(1);
    }
}
