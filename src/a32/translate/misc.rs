//! Wide moves, multiplies, CLZ and status register access.

use super::ArmTranslatorVisitor;
use crate::a32::decoder::{bit, bits};
use crate::a32::types::Reg;
use crate::ir::value::U32;
use crate::ir::Cond;

/// Flags of the APSR that `MSR APSR_nzcvq` writes.
const NZCVQ_MASK: u32 = 0xF800_0000;

/// `CLZ Rd, Rm`
pub(crate) fn clz(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let d = Reg::from_bits(bits(word, 15, 12));
    let m = Reg::from_bits(bits(word, 3, 0));
    if d == Reg::PC || m == Reg::PC {
        return v.unpredictable_instruction();
    }

    let rm = v.ir.get_register(m);
    let result = v.ir.count_leading_zeros(rm);
    v.ir.set_register(d, result);
    true
}

fn imm16(word: u32) -> u32 {
    bits(word, 19, 16) << 12 | bits(word, 11, 0)
}

/// `MOVW Rd, #imm16`
pub(crate) fn movw(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let d = Reg::from_bits(bits(word, 15, 12));
    if d == Reg::PC {
        return v.unpredictable_instruction();
    }

    let value = v.ir.imm32(imm16(word));
    v.ir.set_register(d, value);
    true
}

/// `MOVT Rd, #imm16`
pub(crate) fn movt(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let d = Reg::from_bits(bits(word, 15, 12));
    if d == Reg::PC {
        return v.unpredictable_instruction();
    }

    let rd = v.ir.get_register(d);
    let low_mask = v.ir.imm32(0x0000_FFFF);
    let low = v.ir.and(rd, low_mask);
    let high = v.ir.imm32(imm16(word) << 16);
    let result = v.ir.or(low, high);
    v.ir.set_register(d, result);
    true
}

/// `MRS Rd, APSR`
pub(crate) fn mrs(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let d = Reg::from_bits(bits(word, 15, 12));
    if d == Reg::PC {
        return v.unpredictable_instruction();
    }

    let cpsr = v.ir.get_cpsr();
    v.ir.set_register(d, cpsr);
    true
}

/// `MSR APSR_<fields>, Rn`
pub(crate) fn msr_reg(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let write_nzcvq = bit(word, 19);
    let write_ge = bit(word, 18);
    let n = Reg::from_bits(bits(word, 3, 0));
    if !write_nzcvq && !write_ge {
        return v.unpredictable_instruction();
    }
    if n == Reg::PC {
        return v.unpredictable_instruction();
    }
    if write_ge {
        // GE flags are not tracked by the IR.
        return v.interpret_this_instruction();
    }

    let rn = v.ir.get_register(n);
    let mask = v.ir.imm32(NZCVQ_MASK);
    let flags = v.ir.and(rn, mask);
    v.ir.set_cpsr_nzcvq(flags);
    true
}

/// `MSR <spec_reg>, #imm`
pub(crate) fn msr_imm(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    v.interpret_this_instruction()
}

fn set_nz(v: &mut ArmTranslatorVisitor<'_>, result: U32) {
    let negative = v.ir.most_significant_bit(result);
    let zero = v.ir.is_zero(result);
    v.ir.set_n_flag(negative);
    v.ir.set_z_flag(zero);
}

/// `MUL{S} Rd, Rn, Rm`
pub(crate) fn mul(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let set_flags = bit(word, 20);
    let d = Reg::from_bits(bits(word, 19, 16));
    let m = Reg::from_bits(bits(word, 11, 8));
    let n = Reg::from_bits(bits(word, 3, 0));
    if [d, n, m].contains(&Reg::PC) {
        return v.unpredictable_instruction();
    }

    let rn = v.ir.get_register(n);
    let rm = v.ir.get_register(m);
    let result = v.ir.mul(rn, rm);
    v.ir.set_register(d, result);
    if set_flags {
        set_nz(v, result);
    }
    true
}

/// `MLA{S} Rd, Rn, Rm, Ra`
pub(crate) fn mla(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let set_flags = bit(word, 20);
    let d = Reg::from_bits(bits(word, 19, 16));
    let a = Reg::from_bits(bits(word, 15, 12));
    let m = Reg::from_bits(bits(word, 11, 8));
    let n = Reg::from_bits(bits(word, 3, 0));
    if [d, a, n, m].contains(&Reg::PC) {
        return v.unpredictable_instruction();
    }

    let rn = v.ir.get_register(n);
    let rm = v.ir.get_register(m);
    let product = v.ir.mul(rn, rm);
    let ra = v.ir.get_register(a);
    let result = v.ir.add(product, ra);
    v.ir.set_register(d, result);
    if set_flags {
        set_nz(v, result);
    }
    true
}
