//! Guest-independent IR construction helpers.
//!
//! [`IrEmitter`] wraps a mutable [`Block`] and turns typed calls into
//! instructions at the current insertion point. Operations that produce
//! secondary flag results emit the matching pseudo-operations immediately
//! after the primary instruction and hand both back together.

use super::block::Block;
use super::location::LocationDescriptor;
use super::opcodes::Opcode;
use super::terminal::Terminal;
use super::value::{
    InstRef, ResultAndCarry, ResultAndCarryAndOverflow, Value, F32, F64, U1, U16, U32, U64, U8,
};

pub struct IrEmitter<'b> {
    pub block: &'b mut Block,
    insertion_point: Option<InstRef>,
}

impl<'b> IrEmitter<'b> {
    /// Emit at the end of `block`.
    pub fn new(block: &'b mut Block) -> Self {
        Self {
            block,
            insertion_point: None,
        }
    }

    /// Emit subsequent instructions immediately before `inst`.
    pub fn set_insertion_point_before(&mut self, inst: InstRef) {
        self.insertion_point = Some(inst);
    }

    /// Emit subsequent instructions immediately after `inst`.
    pub fn set_insertion_point_after(&mut self, inst: InstRef) {
        self.insertion_point = self.block.next(inst);
    }

    /// Emit subsequent instructions at the end of the block.
    pub fn reset_insertion_point(&mut self) {
        self.insertion_point = None;
    }

    pub(crate) fn inst(&mut self, opcode: Opcode, args: &[Value]) -> Value {
        Value::Inst(
            self.block
                .prepend_new_inst(self.insertion_point, opcode, args),
        )
    }

    pub fn set_term(&mut self, terminal: Terminal) {
        self.block.set_terminal(terminal);
    }

    pub fn imm1(&self, value: bool) -> U1 {
        U1::new(Value::U1(value))
    }

    pub fn imm8(&self, value: u8) -> U8 {
        U8::new(Value::U8(value))
    }

    pub fn imm16(&self, value: u16) -> U16 {
        U16::new(Value::U16(value))
    }

    pub fn imm32(&self, value: u32) -> U32 {
        U32::new(Value::U32(value))
    }

    pub fn imm64(&self, value: u64) -> U64 {
        U64::new(Value::U64(value))
    }

    pub fn identity(&mut self, value: Value) -> Value {
        self.inst(Opcode::Identity, &[value])
    }

    pub fn breakpoint(&mut self) {
        self.inst(Opcode::Breakpoint, &[]);
    }

    /// Hint that a call returning to `return_location` was made.
    pub fn push_rsb(&mut self, return_location: impl Into<LocationDescriptor>) {
        let location = self.imm64(return_location.into().value());
        self.inst(Opcode::PushRSB, &[location.into()]);
    }

    fn carry_from(&mut self, op: Value) -> U1 {
        U1::new(self.inst(Opcode::GetCarryFromOp, &[op]))
    }

    fn overflow_from(&mut self, op: Value) -> U1 {
        U1::new(self.inst(Opcode::GetOverflowFromOp, &[op]))
    }

    // ---- Bit manipulation ------------------------------------------------------------------

    pub fn least_significant_byte(&mut self, value: U32) -> U8 {
        U8::new(self.inst(Opcode::LeastSignificantByte, &[value.into()]))
    }

    pub fn most_significant_bit(&mut self, value: U32) -> U1 {
        U1::new(self.inst(Opcode::MostSignificantBit, &[value.into()]))
    }

    pub fn is_zero(&mut self, value: U32) -> U1 {
        U1::new(self.inst(Opcode::IsZero32, &[value.into()]))
    }

    pub fn zero_extend_byte_to_word(&mut self, value: U8) -> U32 {
        U32::new(self.inst(Opcode::ZeroExtendByteToWord, &[value.into()]))
    }

    pub fn count_leading_zeros(&mut self, value: U32) -> U32 {
        U32::new(self.inst(Opcode::CountLeadingZeros32, &[value.into()]))
    }

    // ---- Shifts ----------------------------------------------------------------------------

    fn shift(&mut self, opcode: Opcode, value: U32, amount: U8, carry_in: U1) -> ResultAndCarry<U32> {
        let result = self.inst(opcode, &[value.into(), amount.into(), carry_in.into()]);
        let carry = self.carry_from(result);
        ResultAndCarry {
            result: U32::new(result),
            carry,
        }
    }

    pub fn logical_shift_left(&mut self, value: U32, amount: U8, carry_in: U1) -> ResultAndCarry<U32> {
        self.shift(Opcode::LogicalShiftLeft32, value, amount, carry_in)
    }

    pub fn logical_shift_right(&mut self, value: U32, amount: U8, carry_in: U1) -> ResultAndCarry<U32> {
        self.shift(Opcode::LogicalShiftRight32, value, amount, carry_in)
    }

    pub fn arithmetic_shift_right(
        &mut self,
        value: U32,
        amount: U8,
        carry_in: U1,
    ) -> ResultAndCarry<U32> {
        self.shift(Opcode::ArithmeticShiftRight32, value, amount, carry_in)
    }

    pub fn rotate_right(&mut self, value: U32, amount: U8, carry_in: U1) -> ResultAndCarry<U32> {
        self.shift(Opcode::RotateRight32, value, amount, carry_in)
    }

    /// Rotate right by one through the carry flag.
    pub fn rotate_right_extended(&mut self, value: U32, carry_in: U1) -> ResultAndCarry<U32> {
        let result = self.inst(Opcode::RotateRightExtended, &[value.into(), carry_in.into()]);
        let carry = self.carry_from(result);
        ResultAndCarry {
            result: U32::new(result),
            carry,
        }
    }

    // ---- Arithmetic ------------------------------------------------------------------------

    fn arith(&mut self, opcode: Opcode, a: U32, b: U32, carry_in: U1) -> ResultAndCarryAndOverflow<U32> {
        let result = self.inst(opcode, &[a.into(), b.into(), carry_in.into()]);
        let carry = self.carry_from(result);
        let overflow = self.overflow_from(result);
        ResultAndCarryAndOverflow {
            result: U32::new(result),
            carry,
            overflow,
        }
    }

    pub fn add_with_carry(&mut self, a: U32, b: U32, carry_in: U1) -> ResultAndCarryAndOverflow<U32> {
        self.arith(Opcode::Add32, a, b, carry_in)
    }

    /// `a - b - !carry_in`.
    pub fn sub_with_carry(&mut self, a: U32, b: U32, carry_in: U1) -> ResultAndCarryAndOverflow<U32> {
        self.arith(Opcode::Sub32, a, b, carry_in)
    }

    pub fn add(&mut self, a: U32, b: U32) -> U32 {
        let carry = self.imm1(false);
        U32::new(self.inst(Opcode::Add32, &[a.into(), b.into(), carry.into()]))
    }

    pub fn sub(&mut self, a: U32, b: U32) -> U32 {
        let carry = self.imm1(true);
        U32::new(self.inst(Opcode::Sub32, &[a.into(), b.into(), carry.into()]))
    }

    pub fn mul(&mut self, a: U32, b: U32) -> U32 {
        U32::new(self.inst(Opcode::Mul32, &[a.into(), b.into()]))
    }

    pub fn and(&mut self, a: U32, b: U32) -> U32 {
        U32::new(self.inst(Opcode::And32, &[a.into(), b.into()]))
    }

    pub fn eor(&mut self, a: U32, b: U32) -> U32 {
        U32::new(self.inst(Opcode::Eor32, &[a.into(), b.into()]))
    }

    pub fn or(&mut self, a: U32, b: U32) -> U32 {
        U32::new(self.inst(Opcode::Or32, &[a.into(), b.into()]))
    }

    pub fn not(&mut self, value: U32) -> U32 {
        U32::new(self.inst(Opcode::Not32, &[value.into()]))
    }

    // ---- Floating point --------------------------------------------------------------------

    pub fn fp_abs32(&mut self, value: F32) -> F32 {
        F32::new(self.inst(Opcode::FPAbs32, &[value.into()]))
    }

    pub fn fp_abs64(&mut self, value: F64) -> F64 {
        F64::new(self.inst(Opcode::FPAbs64, &[value.into()]))
    }

    pub fn fp_neg32(&mut self, value: F32) -> F32 {
        F32::new(self.inst(Opcode::FPNeg32, &[value.into()]))
    }

    pub fn fp_neg64(&mut self, value: F64) -> F64 {
        F64::new(self.inst(Opcode::FPNeg64, &[value.into()]))
    }

    /// `fpscr_controlled` selects FPSCR rounding and exception behaviour over the defaults.
    pub fn fp_add32(&mut self, a: F32, b: F32, fpscr_controlled: bool) -> F32 {
        let controlled = self.imm1(fpscr_controlled);
        F32::new(self.inst(Opcode::FPAdd32, &[a.into(), b.into(), controlled.into()]))
    }

    pub fn fp_add64(&mut self, a: F64, b: F64, fpscr_controlled: bool) -> F64 {
        let controlled = self.imm1(fpscr_controlled);
        F64::new(self.inst(Opcode::FPAdd64, &[a.into(), b.into(), controlled.into()]))
    }

    pub fn fp_sub32(&mut self, a: F32, b: F32, fpscr_controlled: bool) -> F32 {
        let controlled = self.imm1(fpscr_controlled);
        F32::new(self.inst(Opcode::FPSub32, &[a.into(), b.into(), controlled.into()]))
    }

    pub fn fp_sub64(&mut self, a: F64, b: F64, fpscr_controlled: bool) -> F64 {
        let controlled = self.imm1(fpscr_controlled);
        F64::new(self.inst(Opcode::FPSub64, &[a.into(), b.into(), controlled.into()]))
    }

    pub fn fp_mul32(&mut self, a: F32, b: F32, fpscr_controlled: bool) -> F32 {
        let controlled = self.imm1(fpscr_controlled);
        F32::new(self.inst(Opcode::FPMul32, &[a.into(), b.into(), controlled.into()]))
    }

    pub fn fp_mul64(&mut self, a: F64, b: F64, fpscr_controlled: bool) -> F64 {
        let controlled = self.imm1(fpscr_controlled);
        F64::new(self.inst(Opcode::FPMul64, &[a.into(), b.into(), controlled.into()]))
    }

    pub fn transfer_to_fp32(&mut self, value: U32) -> F32 {
        F32::new(self.inst(Opcode::TransferToFP32, &[value.into()]))
    }

    pub fn transfer_from_fp32(&mut self, value: F32) -> U32 {
        U32::new(self.inst(Opcode::TransferFromFP32, &[value.into()]))
    }
}
