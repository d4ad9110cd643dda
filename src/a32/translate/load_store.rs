//! Word and byte loads and stores with immediate offsets.

use super::ArmTranslatorVisitor;
use crate::a32::decoder::{bit, bits};
use crate::a32::types::Reg;
use crate::ir::value::U32;
use crate::ir::{Cond, Terminal};

struct Addressing {
    n: Reg,
    t: Reg,
    /// Offset applied before the access.
    pre_index: bool,
    add: bool,
    writeback: bool,
    imm12: u32,
}

impl Addressing {
    fn decode(word: u32) -> Self {
        let pre_index = bit(word, 24);
        Self {
            n: Reg::from_bits(bits(word, 19, 16)),
            t: Reg::from_bits(bits(word, 15, 12)),
            pre_index,
            add: bit(word, 23),
            writeback: !pre_index || bit(word, 21),
            imm12: bits(word, 11, 0),
        }
    }
}

/// Compute the access address, returning it with the updated base for writeback.
fn address(v: &mut ArmTranslatorVisitor<'_>, addressing: &Addressing) -> (U32, U32) {
    let base = v.ir.get_register(addressing.n);
    let offset = v.ir.imm32(addressing.imm12);
    let offset_address = if addressing.add {
        v.ir.add(base, offset)
    } else {
        v.ir.sub(base, offset)
    };
    let address = if addressing.pre_index {
        offset_address
    } else {
        base
    };
    (address, offset_address)
}

/// Writeback to PC, or onto the transfer register, is unpredictable. The latter is
/// given a defined behaviour when the options ask for it.
fn writeback_is_unpredictable(v: &ArmTranslatorVisitor<'_>, addressing: &Addressing) -> bool {
    if !addressing.writeback {
        return false;
    }
    if addressing.n == Reg::PC {
        return true;
    }
    addressing.n == addressing.t && !v.options.define_unpredictable_behaviour
}

/// `LDRT`, `STRT`, `LDRBT` and `STRBT` need privilege checks the IR does not model.
pub(crate) fn unprivileged(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }
    v.interpret_this_instruction()
}

/// `LDR Rt, [Rn, #+/-imm]{!}` and `LDR Rt, [Rn], #+/-imm`
pub(crate) fn ldr_imm(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let addressing = Addressing::decode(word);
    if writeback_is_unpredictable(v, &addressing) {
        return v.unpredictable_instruction();
    }

    let (address, offset_address) = address(v, &addressing);
    let data = v.ir.read_memory32(address);

    // The loaded value wins when the base is also the destination.
    if addressing.writeback && addressing.n != addressing.t {
        v.ir.set_register(addressing.n, offset_address);
    }

    if addressing.t == Reg::PC {
        v.ir.load_write_pc(data);
        v.ir.set_term(Terminal::ReturnToDispatch);
        return false;
    }

    v.ir.set_register(addressing.t, data);
    true
}

/// `LDRB Rt, [Rn, #+/-imm]{!}` and `LDRB Rt, [Rn], #+/-imm`
pub(crate) fn ldrb_imm(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let addressing = Addressing::decode(word);
    if addressing.t == Reg::PC || writeback_is_unpredictable(v, &addressing) {
        return v.unpredictable_instruction();
    }

    let (address, offset_address) = address(v, &addressing);
    let byte = v.ir.read_memory8(address);
    let data = v.ir.zero_extend_byte_to_word(byte);

    if addressing.writeback && addressing.n != addressing.t {
        v.ir.set_register(addressing.n, offset_address);
    }
    v.ir.set_register(addressing.t, data);
    true
}

/// `STR Rt, [Rn, #+/-imm]{!}` and `STR Rt, [Rn], #+/-imm`
pub(crate) fn str_imm(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let addressing = Addressing::decode(word);
    if writeback_is_unpredictable(v, &addressing) {
        return v.unpredictable_instruction();
    }

    let (address, offset_address) = address(v, &addressing);
    let value = v.ir.get_register(addressing.t);
    v.ir.write_memory32(address, value);

    if addressing.writeback {
        v.ir.set_register(addressing.n, offset_address);
    }
    true
}

/// `STRB Rt, [Rn, #+/-imm]{!}` and `STRB Rt, [Rn], #+/-imm`
pub(crate) fn strb_imm(v: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
    if !v.condition_passed(Cond::of_instruction(word)) {
        return v.refused();
    }

    let addressing = Addressing::decode(word);
    if addressing.t == Reg::PC || writeback_is_unpredictable(v, &addressing) {
        return v.unpredictable_instruction();
    }

    let (address, offset_address) = address(v, &addressing);
    let value = v.ir.get_register(addressing.t);
    let byte = v.ir.least_significant_byte(value);
    v.ir.write_memory8(address, byte);

    if addressing.writeback {
        v.ir.set_register(addressing.n, offset_address);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a32::location::A32LocationDescriptor;
    use crate::a32::translate::TranslationOptions;
    use crate::ir::{Block, Opcode, Value};

    fn translate_with(
        word: u32,
        handler: fn(&mut ArmTranslatorVisitor<'_>, u32) -> bool,
        options: TranslationOptions,
    ) -> (Block, bool) {
        let location = A32LocationDescriptor::new(0x400);
        let mut block = Block::new(location);
        let mut v = ArmTranslatorVisitor::new(&mut block, location, options);
        let should_continue = handler(&mut v, word);
        drop(v);
        (block, should_continue)
    }

    fn translate(word: u32, handler: fn(&mut ArmTranslatorVisitor<'_>, u32) -> bool) -> (Block, bool) {
        translate_with(word, handler, TranslationOptions::default())
    }

    fn opcodes(block: &Block) -> Vec<Opcode> {
        block.iter().map(|(_, inst)| inst.opcode()).collect()
    }

    #[test]
    fn offset_load() {
        // ldr r0, [r1, #4]
        let (block, cont) = translate(0xE591_0004, ldr_imm);
        assert!(cont);
        assert_eq!(
            opcodes(&block),
            [
                Opcode::A32GetRegister,
                Opcode::Add32,
                Opcode::A32ReadMemory32,
                Opcode::A32SetRegister
            ]
        );
    }

    #[test]
    fn post_indexed_load_writes_back() {
        // ldr r0, [r1], #-4
        let (block, _) = translate(0xE411_0004, ldr_imm);
        let ops = opcodes(&block);
        assert_eq!(ops[1], Opcode::Sub32);
        let writes: Vec<_> = block
            .iter()
            .filter(|(_, inst)| inst.opcode() == Opcode::A32SetRegister)
            .map(|(_, inst)| inst.arg(0))
            .collect();
        assert_eq!(writes, [Value::A32Reg(Reg::R1), Value::A32Reg(Reg::R0)]);

        // The access uses the unmodified base.
        let (read, _) = block
            .iter()
            .find(|(_, inst)| inst.opcode() == Opcode::A32ReadMemory32)
            .unwrap();
        let (base, _) = block.iter().next().unwrap();
        assert_eq!(block.inst(read).arg(0), Value::Inst(base));
    }

    #[test]
    fn pc_relative_load_folds_base() {
        // ldr r0, [pc, #8]
        let (block, _) = translate(0xE59F_0008, ldr_imm);
        let (_, add) = block.iter().next().unwrap();
        assert_eq!(add.opcode(), Opcode::Add32);
        assert_eq!(add.arg(0), Value::U32(0x408));
    }

    #[test]
    fn load_to_pc_returns_to_dispatch() {
        // ldr pc, [sp], #4
        let (block, cont) = translate(0xE49D_F004, ldr_imm);
        assert!(!cont);
        assert!(opcodes(&block).contains(&Opcode::A32BXWritePC));
        assert_eq!(block.terminal(), &Terminal::ReturnToDispatch);
    }

    #[test]
    fn writeback_onto_transfer_register() {
        // ldr r0, [r0, #4]!
        let (block, cont) = translate(0xE5B0_0004, ldr_imm);
        assert!(!cont);
        assert_eq!(opcodes(&block), [Opcode::A32ExceptionRaised]);

        let options = TranslationOptions {
            define_unpredictable_behaviour: true,
            ..TranslationOptions::default()
        };
        let (block, cont) = translate_with(0xE5B0_0004, ldr_imm, options);
        assert!(cont);
        let writes = block
            .iter()
            .filter(|(_, inst)| inst.opcode() == Opcode::A32SetRegister)
            .count();
        assert_eq!(writes, 1);
    }

    #[test]
    fn byte_store_truncates() {
        // strb r0, [r1]
        let (block, cont) = translate(0xE5C1_0000, strb_imm);
        assert!(cont);
        let ops = opcodes(&block);
        assert!(ops.contains(&Opcode::LeastSignificantByte));
        assert_eq!(ops.last(), Some(&Opcode::A32WriteMemory8));
    }

    #[test]
    fn byte_load_extends() {
        // ldrb r2, [r3, #1]
        let (block, _) = translate(0xE5D3_2001, ldrb_imm);
        let ops = opcodes(&block);
        assert!(ops.contains(&Opcode::A32ReadMemory8));
        assert!(ops.contains(&Opcode::ZeroExtendByteToWord));
    }

    #[test]
    fn word_store_with_pre_index_writeback() {
        // str r0, [sp, #-4]!
        let (block, cont) = translate(0xE52D_0004, str_imm);
        assert!(cont);
        assert_eq!(
            opcodes(&block),
            [
                Opcode::A32GetRegister,
                Opcode::Sub32,
                Opcode::A32GetRegister,
                Opcode::A32WriteMemory32,
                Opcode::A32SetRegister
            ]
        );
    }
}
