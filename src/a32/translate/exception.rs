//! Exception generating and hint instructions.

use super::{ArmTranslatorVisitor, ARM_INSTRUCTION_WIDTH};
use crate::a32::decoder::bits;
use crate::a32::types::Exception;
use crate::ir::{Cond, Terminal};

/// `UDF #imm` and any word without a decoder entry.
pub(crate) fn udf(v: &mut ArmTranslatorVisitor<'_>, _word: u32) -> bool {
    v.undefined_instruction()
}

/// `BKPT #imm`
pub(crate) fn bkpt(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    let cond = Cond::of_instruction(word);
    if !v.condition_passed(cond) {
        return v.refused();
    }
    // With defined behaviour a conditional BKPT executes conditionally.
    if cond != Cond::AL && !v.options.define_unpredictable_behaviour {
        return v.unpredictable_instruction();
    }
    v.raise_exception(Exception::Breakpoint)
}

/// `SVC #imm`
pub(crate) fn svc(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let next = v.ir.current_location.advance_pc(ARM_INSTRUCTION_WIDTH);
    let next_pc = v.ir.imm32(next.pc());
    v.ir.branch_write_pc(next_pc);
    v.ir.push_rsb(next);
    let imm = v.ir.imm32(bits(word, 23, 0));
    v.ir.call_supervisor(imm);
    v.ir.set_term(Terminal::check_halt(Terminal::PopRSBHint));
    false
}

/// `NOP`
pub(crate) fn nop(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    true
}

/// Unhooked hints behave like `NOP`.
fn hint(v: &mut ArmTranslatorVisitor<'_>, word: u32, exception: Exception) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    if !v.options.hook_hint_instructions {
        return true;
    }
    v.raise_exception(exception)
}

/// `YIELD`
pub(crate) fn yield_(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    hint(v, word, Exception::Yield)
}

/// `WFE`
pub(crate) fn wfe(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    hint(v, word, Exception::WaitForEvent)
}

/// `WFI`
pub(crate) fn wfi(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    hint(v, word, Exception::WaitForInterrupt)
}

/// `SEV`
pub(crate) fn sev(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    hint(v, word, Exception::SendEvent)
}
