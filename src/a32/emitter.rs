// This module layers A32 guest-state access on top of the generic IR emitter. The
// A32 emitter tracks the location of the guest instruction currently being
// translated; that location supplies the architectural PC value (the instruction
// address plus eight in ARM state), the return address for calls and the program
// counter reported with guest exceptions. Reads of PC are folded to immediates here
// so no handler ever emits a register read of R15, and writes of PC are split into
// the interworking and non-interworking branch forms the architecture defines.
// Everything guest-independent is reachable through Deref to IrEmitter.

//! A32 specific IR emission.

use std::ops::{Deref, DerefMut};

use super::location::A32LocationDescriptor;
use super::types::{Exception, ExtReg, Reg};
use crate::ir::value::{Value, F32, F64, U1, U32, U8};
use crate::ir::{Block, IrEmitter, Opcode};

pub struct A32IrEmitter<'b> {
    ir: IrEmitter<'b>,
    pub current_location: A32LocationDescriptor,
}

impl<'b> A32IrEmitter<'b> {
    pub fn new(block: &'b mut Block, location: A32LocationDescriptor) -> Self {
        Self {
            ir: IrEmitter::new(block),
            current_location: location,
        }
    }

    /// Architectural value of PC as read by the current instruction.
    pub fn pc(&self) -> u32 {
        self.current_location.pc().wrapping_add(8)
    }

    /// PC rounded down to a multiple of `alignment`.
    pub fn align_pc(&self, alignment: u32) -> u32 {
        self.pc() & !(alignment - 1)
    }

    pub fn get_register(&mut self, reg: Reg) -> U32 {
        if reg == Reg::PC {
            return self.imm32(self.pc());
        }
        U32::new(self.inst(Opcode::A32GetRegister, &[Value::A32Reg(reg)]))
    }

    pub fn set_register(&mut self, reg: Reg, value: U32) {
        assert!(reg != Reg::PC, "PC is written through the *_write_pc helpers");
        self.inst(Opcode::A32SetRegister, &[Value::A32Reg(reg), value.into()]);
    }

    pub fn get_extended_register32(&mut self, reg: ExtReg) -> F32 {
        assert!(reg.is_single(), "{reg} is not a single-precision register");
        F32::new(self.inst(Opcode::A32GetExtendedRegister32, &[Value::A32ExtReg(reg)]))
    }

    pub fn get_extended_register64(&mut self, reg: ExtReg) -> F64 {
        assert!(reg.is_double(), "{reg} is not a double-precision register");
        F64::new(self.inst(Opcode::A32GetExtendedRegister64, &[Value::A32ExtReg(reg)]))
    }

    pub fn set_extended_register32(&mut self, reg: ExtReg, value: F32) {
        assert!(reg.is_single(), "{reg} is not a single-precision register");
        self.inst(
            Opcode::A32SetExtendedRegister32,
            &[Value::A32ExtReg(reg), value.into()],
        );
    }

    pub fn set_extended_register64(&mut self, reg: ExtReg, value: F64) {
        assert!(reg.is_double(), "{reg} is not a double-precision register");
        self.inst(
            Opcode::A32SetExtendedRegister64,
            &[Value::A32ExtReg(reg), value.into()],
        );
    }

    /// Branch without changing instruction set state.
    pub fn branch_write_pc(&mut self, value: U32) {
        self.inst(Opcode::A32BranchWritePC, &[value.into()]);
    }

    /// Branch, selecting ARM or Thumb state from bit 0 of `value`.
    pub fn bx_write_pc(&mut self, value: U32) {
        self.inst(Opcode::A32BXWritePC, &[value.into()]);
    }

    pub fn alu_write_pc(&mut self, value: U32) {
        self.bx_write_pc(value);
    }

    pub fn load_write_pc(&mut self, value: U32) {
        self.bx_write_pc(value);
    }

    pub fn call_supervisor(&mut self, imm: U32) {
        self.inst(Opcode::A32CallSupervisor, &[imm.into()]);
    }

    /// Report `exception` at the current instruction.
    pub fn exception_raised(&mut self, exception: Exception) {
        let pc = self.imm32(self.current_location.pc());
        let code = self.imm64(exception.code());
        self.inst(Opcode::A32ExceptionRaised, &[pc.into(), code.into()]);
    }

    pub fn set_check_bit(&mut self, value: U1) {
        self.inst(Opcode::A32SetCheckBit, &[value.into()]);
    }

    // ---- Status registers ------------------------------------------------------------------

    pub fn get_cpsr(&mut self) -> U32 {
        U32::new(self.inst(Opcode::A32GetCpsr, &[]))
    }

    pub fn set_cpsr(&mut self, value: U32) {
        self.inst(Opcode::A32SetCpsr, &[value.into()]);
    }

    pub fn set_cpsr_nzcv(&mut self, value: U32) {
        self.inst(Opcode::A32SetCpsrNZCV, &[value.into()]);
    }

    pub fn set_cpsr_nzcvq(&mut self, value: U32) {
        self.inst(Opcode::A32SetCpsrNZCVQ, &[value.into()]);
    }

    pub fn get_n_flag(&mut self) -> U1 {
        U1::new(self.inst(Opcode::A32GetNFlag, &[]))
    }

    pub fn set_n_flag(&mut self, value: U1) {
        self.inst(Opcode::A32SetNFlag, &[value.into()]);
    }

    pub fn get_z_flag(&mut self) -> U1 {
        U1::new(self.inst(Opcode::A32GetZFlag, &[]))
    }

    pub fn set_z_flag(&mut self, value: U1) {
        self.inst(Opcode::A32SetZFlag, &[value.into()]);
    }

    pub fn get_c_flag(&mut self) -> U1 {
        U1::new(self.inst(Opcode::A32GetCFlag, &[]))
    }

    pub fn set_c_flag(&mut self, value: U1) {
        self.inst(Opcode::A32SetCFlag, &[value.into()]);
    }

    pub fn get_v_flag(&mut self) -> U1 {
        U1::new(self.inst(Opcode::A32GetVFlag, &[]))
    }

    pub fn set_v_flag(&mut self, value: U1) {
        self.inst(Opcode::A32SetVFlag, &[value.into()]);
    }

    pub fn or_q_flag(&mut self, value: U1) {
        self.inst(Opcode::A32OrQFlag, &[value.into()]);
    }

    // ---- Memory ----------------------------------------------------------------------------

    pub fn read_memory8(&mut self, address: U32) -> U8 {
        U8::new(self.inst(Opcode::A32ReadMemory8, &[address.into()]))
    }

    pub fn read_memory32(&mut self, address: U32) -> U32 {
        U32::new(self.inst(Opcode::A32ReadMemory32, &[address.into()]))
    }

    pub fn write_memory8(&mut self, address: U32, value: U8) {
        self.inst(Opcode::A32WriteMemory8, &[address.into(), value.into()]);
    }

    pub fn write_memory32(&mut self, address: U32, value: U32) {
        self.inst(Opcode::A32WriteMemory32, &[address.into(), value.into()]);
    }
}

impl<'b> Deref for A32IrEmitter<'b> {
    type Target = IrEmitter<'b>;

    fn deref(&self) -> &Self::Target {
        &self.ir
    }
}

impl DerefMut for A32IrEmitter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ir
    }
}
