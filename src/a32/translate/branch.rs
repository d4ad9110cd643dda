//! Branch instructions.

use super::{ArmTranslatorVisitor, ARM_INSTRUCTION_WIDTH};
use crate::a32::decoder::bits;
use crate::a32::types::Reg;
use crate::ir::{Cond, Terminal};

/// Sign-extended, word-scaled branch offset from the low 24 bits.
fn branch_offset(word: u32) -> i32 {
    ((bits(word, 23, 0) << 8) as i32) >> 6
}

/// `B <label>`
pub(crate) fn b(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let target = v.ir.current_location.advance_pc(8 + branch_offset(word));
    v.ir.set_term(Terminal::link_block(target));
    false
}

/// `BL <label>`
pub(crate) fn bl(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let here = v.ir.current_location;
    let return_location = here.advance_pc(ARM_INSTRUCTION_WIDTH);
    v.ir.push_rsb(return_location);
    let link = v.ir.imm32(return_location.pc());
    v.ir.set_register(Reg::LR, link);

    let target = here.advance_pc(8 + branch_offset(word));
    v.ir.set_term(Terminal::link_block(target));
    false
}

/// `BX Rm`
pub(crate) fn bx(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let m = Reg::from_bits(bits(word, 3, 0));
    let target = v.ir.get_register(m);
    v.ir.bx_write_pc(target);
    if m == Reg::LR {
        v.ir.set_term(Terminal::PopRSBHint);
    } else {
        v.ir.set_term(Terminal::ReturnToDispatch);
    }
    false
}

/// `BLX Rm`
pub(crate) fn blx_reg(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let m = Reg::from_bits(bits(word, 3, 0));
    if m == Reg::PC {
        return v.unpredictable_instruction();
    }

    let return_location = v.ir.current_location.advance_pc(ARM_INSTRUCTION_WIDTH);
    v.ir.push_rsb(return_location);
    let target = v.ir.get_register(m);
    let link = v.ir.imm32(return_location.pc());
    v.ir.set_register(Reg::LR, link);
    v.ir.bx_write_pc(target);
    v.ir.set_term(Terminal::ReturnToDispatch);
    false
}
