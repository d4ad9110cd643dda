// This module holds the per-translation state every A32 handler works against: the
// A32 IR emitter positioned at the current guest instruction, the translation options,
// and the conditional-execution state machine. A32 predicates almost every instruction
// on a condition code, but the IR is branch free, so a block can carry at most one
// entry condition and only for the instructions at its very start. condition_passed
// runs before a handler emits any IR and decides whether the instruction joins the
// block: it commits an empty block to a condition (None -> Translating), extends the
// run while the same condition repeats at the expected location, switches to Trailing
// once an unconditional instruction follows, and requests a Break (ending the block at
// the current instruction with a LinkBlockFast terminal) when a mixed condition would
// otherwise be needed. The separate flags-write guard consulted by the translation loop
// lives in cond_can_continue. The module also provides the shared fallback paths
// (interpretation, unpredictable and undefined instructions, guest exceptions) and the
// barrel shifter helpers used by the data processing handlers.

//! Translator state and shared handler helpers.

use log::debug;

use super::{TranslationOptions, ARM_INSTRUCTION_WIDTH};
use crate::a32::emitter::A32IrEmitter;
use crate::a32::location::A32LocationDescriptor;
use crate::a32::types::{Exception, ShiftType};
use crate::ir::value::{ResultAndCarry, U1, U32, U8};
use crate::ir::{Block, Cond, Terminal};

/// Progress of block-level conditional execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionalState {
    /// Every instruction so far executes unconditionally.
    #[default]
    None,
    /// The block condition is fixed and the run of instructions sharing it continues.
    Translating,
    /// The conditional run has ended; further instructions are unconditional.
    Trailing,
    /// A condition conflict ended the block. The terminal is already set.
    Break,
}

pub struct ArmTranslatorVisitor<'b> {
    pub ir: A32IrEmitter<'b>,
    pub cond_state: ConditionalState,
    pub options: TranslationOptions,
    /// Appending one instruction to a caller's block: the block condition is left alone.
    single_instruction: bool,
}

impl<'b> ArmTranslatorVisitor<'b> {
    pub fn new(
        block: &'b mut Block,
        location: A32LocationDescriptor,
        options: TranslationOptions,
    ) -> Self {
        Self {
            ir: A32IrEmitter::new(block, location),
            cond_state: ConditionalState::None,
            options,
            single_instruction: false,
        }
    }

    /// Visitor that emits one instruction without touching the block's terminal or
    /// conditional state. Only the NV condition is still rejected.
    pub fn single_instruction(
        block: &'b mut Block,
        location: A32LocationDescriptor,
        options: TranslationOptions,
    ) -> Self {
        Self {
            single_instruction: true,
            ..Self::new(block, location, options)
        }
    }

    /// Decide whether the instruction at the current location, predicated on `cond`,
    /// may be translated into this block.
    pub fn condition_passed(&mut self, cond: Cond) -> bool {
        assert!(
            self.cond_state != ConditionalState::Break,
            "a break was requested but not honoured"
        );

        if cond == Cond::NV {
            debug!("{}: obsolete NV condition", self.ir.current_location);
            self.ir.exception_raised(Exception::UnpredictableInstruction);
            self.ir.set_term(Terminal::check_halt(Terminal::ReturnToDispatch));
            return false;
        }

        if self.single_instruction {
            return true;
        }

        let current = self.ir.current_location;
        let next = current.advance_pc(ARM_INSTRUCTION_WIDTH);

        if self.cond_state == ConditionalState::Translating {
            let failed = self.ir.block.condition_failed_location();
            if failed != Some(current.into()) || cond == Cond::AL {
                debug!("{current}: conditional run ends, trailing");
                self.cond_state = ConditionalState::Trailing;
            } else if cond == self.ir.block.condition() {
                self.ir.block.set_condition_failed_location(next);
                self.ir.block.increment_condition_failed_cycle_count();
                return true;
            } else {
                debug!("{current}: condition changed to {cond}, breaking");
                return self.break_block();
            }
        }

        if cond == Cond::AL {
            return true;
        }

        if !self.ir.block.is_empty() {
            debug!("{current}: {cond} after unconditional code, breaking");
            return self.break_block();
        }

        debug!("{current}: block condition {cond}");
        self.cond_state = ConditionalState::Translating;
        self.ir.block.set_condition(cond);
        self.ir.block.set_condition_failed_location(next);
        self.ir.block.set_condition_failed_cycle_count(1);
        true
    }

    fn break_block(&mut self) -> bool {
        self.cond_state = ConditionalState::Break;
        let here = self.ir.current_location;
        self.ir.set_term(Terminal::link_block_fast(here));
        false
    }

    /// Result a handler returns after `condition_passed` refused its instruction:
    /// translation continues only if the refusal left the block open.
    pub fn refused(&self) -> bool {
        !self.ir.block.has_terminal()
    }

    /// Whether the loop may translate another instruction under the current state.
    ///
    /// Conservative: once any instruction in the block writes CPSR, a conditional
    /// block stops growing.
    pub fn cond_can_continue(&self) -> bool {
        assert!(
            self.cond_state != ConditionalState::Break,
            "a break was requested but not honoured"
        );
        if self.cond_state == ConditionalState::None {
            return true;
        }
        self.ir.block.iter().all(|(_, inst)| !inst.writes_to_cpsr())
    }

    // ---- Fallback paths --------------------------------------------------------------------

    /// End the block and let the interpreter execute the current instruction.
    pub fn interpret_this_instruction(&mut self) -> bool {
        let here = self.ir.current_location;
        self.ir.set_term(Terminal::interpret(here));
        false
    }

    pub fn unpredictable_instruction(&mut self) -> bool {
        self.ir.exception_raised(Exception::UnpredictableInstruction);
        self.ir.set_term(Terminal::check_halt(Terminal::ReturnToDispatch));
        false
    }

    pub fn undefined_instruction(&mut self) -> bool {
        self.ir.exception_raised(Exception::UndefinedInstruction);
        self.ir.set_term(Terminal::check_halt(Terminal::ReturnToDispatch));
        false
    }

    /// Raise `exception` with PC pointing past the current instruction.
    pub fn raise_exception(&mut self, exception: Exception) -> bool {
        let next_pc = self.ir.current_location.advance_pc(ARM_INSTRUCTION_WIDTH).pc();
        let next_pc = self.ir.imm32(next_pc);
        self.ir.branch_write_pc(next_pc);
        self.ir.exception_raised(exception);
        self.ir.set_term(Terminal::check_halt(Terminal::ReturnToDispatch));
        false
    }

    // ---- Barrel shifter --------------------------------------------------------------------

    /// Shift by an encoded 5-bit immediate. LSR and ASR encode 32 as 0, and ROR #0
    /// encodes RRX.
    pub fn emit_imm_shift(
        &mut self,
        value: U32,
        shift: ShiftType,
        imm5: u8,
        carry_in: U1,
    ) -> ResultAndCarry<U32> {
        let ir = &mut self.ir;
        match shift {
            ShiftType::LSL => {
                let amount = ir.imm8(imm5);
                ir.logical_shift_left(value, amount, carry_in)
            }
            ShiftType::LSR => {
                let amount = ir.imm8(if imm5 == 0 { 32 } else { imm5 });
                ir.logical_shift_right(value, amount, carry_in)
            }
            ShiftType::ASR => {
                let amount = ir.imm8(if imm5 == 0 { 32 } else { imm5 });
                ir.arithmetic_shift_right(value, amount, carry_in)
            }
            ShiftType::ROR if imm5 == 0 => ir.rotate_right_extended(value, carry_in),
            ShiftType::ROR => {
                let amount = ir.imm8(imm5);
                ir.rotate_right(value, amount, carry_in)
            }
        }
    }

    /// Shift by a run-time amount, taken as is.
    pub fn emit_reg_shift(
        &mut self,
        value: U32,
        shift: ShiftType,
        amount: U8,
        carry_in: U1,
    ) -> ResultAndCarry<U32> {
        let ir = &mut self.ir;
        match shift {
            ShiftType::LSL => ir.logical_shift_left(value, amount, carry_in),
            ShiftType::LSR => ir.logical_shift_right(value, amount, carry_in),
            ShiftType::ASR => ir.arithmetic_shift_right(value, amount, carry_in),
            ShiftType::ROR => ir.rotate_right(value, amount, carry_in),
        }
    }
}
