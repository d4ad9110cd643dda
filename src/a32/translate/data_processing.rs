//! Data processing instructions: AND through MVN in all three operand forms.

use super::ArmTranslatorVisitor;
use crate::a32::decoder::{bit, bits};
use crate::a32::types::{Reg, ShiftType};
use crate::ir::value::{U1, U32};
use crate::ir::{Cond, Terminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Eor,
    Sub,
    Rsb,
    Add,
    Adc,
    Sbc,
    Rsc,
    Tst,
    Teq,
    Cmp,
    Cmn,
    Orr,
    Mov,
    Bic,
    Mvn,
}

impl Op {
    const ALL: [Op; 16] = [
        Op::And,
        Op::Eor,
        Op::Sub,
        Op::Rsb,
        Op::Add,
        Op::Adc,
        Op::Sbc,
        Op::Rsc,
        Op::Tst,
        Op::Teq,
        Op::Cmp,
        Op::Cmn,
        Op::Orr,
        Op::Mov,
        Op::Bic,
        Op::Mvn,
    ];

    fn of_instruction(word: u32) -> Op {
        Self::ALL[bits(word, 24, 21) as usize]
    }

    /// Compares only update flags and never write Rd.
    fn is_compare(self) -> bool {
        matches!(self, Op::Tst | Op::Teq | Op::Cmp | Op::Cmn)
    }
}

/// Second operand together with the shifter carry-out.
struct Operand {
    value: U32,
    carry: U1,
}

/// `<op>{S} Rd, Rn, #imm`
pub(crate) fn imm(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    if writes_pc_with_flags(word) {
        return v.unpredictable_instruction();
    }

    let rotate = bits(word, 11, 8);
    let imm8 = bits(word, 7, 0);
    let value = imm8.rotate_right(rotate * 2);
    let carry = if rotate == 0 {
        v.ir.get_c_flag()
    } else {
        v.ir.imm1(value >> 31 != 0)
    };
    let operand = Operand {
        value: v.ir.imm32(value),
        carry,
    };
    execute(v, word, operand)
}

/// `<op>{S} Rd, Rn, Rm{, <shift> #imm}`
pub(crate) fn reg(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    if writes_pc_with_flags(word) {
        return v.unpredictable_instruction();
    }

    let imm5 = bits(word, 11, 7) as u8;
    let shift = ShiftType::from_bits(bits(word, 6, 5));
    let m = Reg::from_bits(bits(word, 3, 0));

    let rm = v.ir.get_register(m);
    let carry_in = v.ir.get_c_flag();
    let shifted = v.emit_imm_shift(rm, shift, imm5, carry_in);
    let operand = Operand {
        value: shifted.result,
        carry: shifted.carry,
    };
    execute(v, word, operand)
}

/// `<op>{S} Rd, Rn, Rm, <shift> Rs`
pub(crate) fn rsr(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    if writes_pc_with_flags(word) {
        return v.unpredictable_instruction();
    }

    let n = Reg::from_bits(bits(word, 19, 16));
    let d = Reg::from_bits(bits(word, 15, 12));
    let s = Reg::from_bits(bits(word, 11, 8));
    let shift = ShiftType::from_bits(bits(word, 6, 5));
    let m = Reg::from_bits(bits(word, 3, 0));
    if [n, d, s, m].contains(&Reg::PC) {
        return v.unpredictable_instruction();
    }

    let rs = v.ir.get_register(s);
    let amount = v.ir.least_significant_byte(rs);
    let rm = v.ir.get_register(m);
    let carry_in = v.ir.get_c_flag();
    let shifted = v.emit_reg_shift(rm, shift, amount, carry_in);
    let operand = Operand {
        value: shifted.result,
        carry: shifted.carry,
    };
    execute(v, word, operand)
}

/// `S` with Rd = PC is an exception return, which is not modelled in user mode.
fn writes_pc_with_flags(word: u32) -> bool {
    let op = Op::of_instruction(word);
    bit(word, 20) && !op.is_compare() && Reg::from_bits(bits(word, 15, 12)) == Reg::PC
}

fn execute(v: &mut ArmTranslatorVisitor<'_>, word: u32, operand: Operand) -> bool {
    let op = Op::of_instruction(word);
    let set_flags = bit(word, 20);
    let n = Reg::from_bits(bits(word, 19, 16));
    let d = Reg::from_bits(bits(word, 15, 12));

    let ir = &mut v.ir;
    let mut carry = Some(operand.carry);
    let mut overflow = None;
    let result = match op {
        Op::And | Op::Tst => {
            let rn = ir.get_register(n);
            ir.and(rn, operand.value)
        }
        Op::Eor | Op::Teq => {
            let rn = ir.get_register(n);
            ir.eor(rn, operand.value)
        }
        Op::Orr => {
            let rn = ir.get_register(n);
            ir.or(rn, operand.value)
        }
        Op::Bic => {
            let rn = ir.get_register(n);
            let inverted = ir.not(operand.value);
            ir.and(rn, inverted)
        }
        Op::Mov => operand.value,
        Op::Mvn => ir.not(operand.value),
        Op::Add | Op::Cmn | Op::Adc | Op::Sub | Op::Cmp | Op::Sbc | Op::Rsb | Op::Rsc => {
            let rn = ir.get_register(n);
            let carry_in = match op {
                Op::Add | Op::Cmn => ir.imm1(false),
                Op::Sub | Op::Cmp | Op::Rsb => ir.imm1(true),
                _ => ir.get_c_flag(),
            };
            let sum = match op {
                Op::Add | Op::Cmn | Op::Adc => ir.add_with_carry(rn, operand.value, carry_in),
                Op::Sub | Op::Cmp | Op::Sbc => ir.sub_with_carry(rn, operand.value, carry_in),
                _ => ir.sub_with_carry(operand.value, rn, carry_in),
            };
            carry = Some(sum.carry);
            overflow = Some(sum.overflow);
            sum.result
        }
    };

    if !op.is_compare() {
        if d == Reg::PC {
            ir.alu_write_pc(result);
            ir.set_term(Terminal::ReturnToDispatch);
            return false;
        }
        ir.set_register(d, result);
    }

    if set_flags {
        let negative = ir.most_significant_bit(result);
        let zero = ir.is_zero(result);
        ir.set_n_flag(negative);
        ir.set_z_flag(zero);
        if let Some(carry) = carry {
            ir.set_c_flag(carry);
        }
        if let Some(overflow) = overflow {
            ir.set_v_flag(overflow);
        }
    }
    true
}
