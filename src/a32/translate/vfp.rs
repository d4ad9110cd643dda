//! VFPv2 data processing and core register transfers.
//!
//! Arithmetic honours FPSCR rounding and exception state. Short-vector mode
//! (FPSCR.Len or FPSCR.Stride other than one) is left to the interpreter.

use super::ArmTranslatorVisitor;
use crate::a32::decoder::{bit, bits};
use crate::a32::types::{ExtReg, Reg};
use crate::ir::value::{F32, F64};
use crate::ir::Cond;

/// Operand registers of a three-register data processing encoding.
struct Operands {
    double: bool,
    d: ExtReg,
    n: ExtReg,
    m: ExtReg,
}

impl Operands {
    fn decode(word: u32) -> Self {
        let double = bit(word, 8);
        Self {
            double,
            d: ExtReg::from_fields(double, bits(word, 15, 12), bits(word, 22, 22)),
            n: ExtReg::from_fields(double, bits(word, 19, 16), bits(word, 7, 7)),
            m: ExtReg::from_fields(double, bits(word, 3, 0), bits(word, 5, 5)),
        }
    }
}

fn vector_mode(v: &ArmTranslatorVisitor<'_>) -> bool {
    let location = v.ir.current_location;
    location.fpscr_len() != 1 || location.fpscr_stride() != Some(1)
}

/// Shared prologue: returns `Some(result)` when the handler must stop early.
fn enter(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> Option<bool> {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return Some(v.refused());
    }
    if vector_mode(v) {
        return Some(v.interpret_this_instruction());
    }
    None
}

fn binary(
    v: &mut ArmTranslatorVisitor<'_>,
    word: u32,
    op32: fn(&mut ArmTranslatorVisitor<'_>, F32, F32) -> F32,
    op64: fn(&mut ArmTranslatorVisitor<'_>, F64, F64) -> F64,
) -> bool {
    if let Some(result) = enter(v, word) {
        return result;
    }

    let Operands { double, d, n, m } = Operands::decode(word);
    if double {
        let a = v.ir.get_extended_register64(n);
        let b = v.ir.get_extended_register64(m);
        let result = op64(v, a, b);
        v.ir.set_extended_register64(d, result);
    } else {
        let a = v.ir.get_extended_register32(n);
        let b = v.ir.get_extended_register32(m);
        let result = op32(v, a, b);
        v.ir.set_extended_register32(d, result);
    }
    true
}

fn unary(
    v: &mut ArmTranslatorVisitor<'_>,
    word: u32,
    op32: fn(&mut ArmTranslatorVisitor<'_>, F32) -> F32,
    op64: fn(&mut ArmTranslatorVisitor<'_>, F64) -> F64,
) -> bool {
    if let Some(result) = enter(v, word) {
        return result;
    }

    let Operands { double, d, m, .. } = Operands::decode(word);
    if double {
        let a = v.ir.get_extended_register64(m);
        let result = op64(v, a);
        v.ir.set_extended_register64(d, result);
    } else {
        let a = v.ir.get_extended_register32(m);
        let result = op32(v, a);
        v.ir.set_extended_register32(d, result);
    }
    true
}

/// `VADD.F32 Sd, Sn, Sm` and `VADD.F64 Dd, Dn, Dm`
pub(crate) fn vadd(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    binary(
        v,
        word,
        |v, a, b| v.ir.fp_add32(a, b, true),
        |v, a, b| v.ir.fp_add64(a, b, true),
    )
}

/// `VSUB.F32 Sd, Sn, Sm` and `VSUB.F64 Dd, Dn, Dm`
pub(crate) fn vsub(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    binary(
        v,
        word,
        |v, a, b| v.ir.fp_sub32(a, b, true),
        |v, a, b| v.ir.fp_sub64(a, b, true),
    )
}

/// `VMUL.F32 Sd, Sn, Sm` and `VMUL.F64 Dd, Dn, Dm`
pub(crate) fn vmul(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    binary(
        v,
        word,
        |v, a, b| v.ir.fp_mul32(a, b, true),
        |v, a, b| v.ir.fp_mul64(a, b, true),
    )
}

/// `VABS.F32 Sd, Sm` and `VABS.F64 Dd, Dm`
pub(crate) fn vabs(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    unary(v, word, |v, a| v.ir.fp_abs32(a), |v, a| v.ir.fp_abs64(a))
}

/// `VNEG.F32 Sd, Sm` and `VNEG.F64 Dd, Dm`
pub(crate) fn vneg(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    unary(v, word, |v, a| v.ir.fp_neg32(a), |v, a| v.ir.fp_neg64(a))
}

fn transfer_registers(word: u32) -> (ExtReg, Reg) {
    let n = ExtReg::from_fields(false, bits(word, 19, 16), bits(word, 7, 7));
    let t = Reg::from_bits(bits(word, 15, 12));
    (n, t)
}

/// `VMOV Sn, Rt`
pub(crate) fn vmov_to_single(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let (n, t) = transfer_registers(word);
    if t == Reg::PC {
        return v.unpredictable_instruction();
    }

    let rt = v.ir.get_register(t);
    let value = v.ir.transfer_to_fp32(rt);
    v.ir.set_extended_register32(n, value);
    true
}

/// `VMOV Rt, Sn`
pub(crate) fn vmov_from_single(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let (n, t) = transfer_registers(word);
    if t == Reg::PC {
        return v.unpredictable_instruction();
    }

    let sn = v.ir.get_extended_register32(n);
    let value = v.ir.transfer_from_fp32(sn);
    v.ir.set_register(t, value);
    true
}
