//! Test how predicated A32 instructions fold into block-level conditions.
//!
//! Every scenario translates a short guest sequence and checks the block's
//! entry condition, its condition-failed bookkeeping, the cycle count and
//! the terminal that ends it.

use std::num::NonZeroUsize;

use dynarec_frontend::a32::{translate_arm, A32LocationDescriptor, Exception, Reg, TranslationOptions};
use dynarec_frontend::ir::{Block, Cond, LocationDescriptor, Opcode, Terminal, Value};

const BASE: u32 = 0x1000;

const MOV_R0_1: u32 = 0xE3A0_0001;
const MOV_R1_2: u32 = 0xE3A0_1002;
const MOV_R2_3: u32 = 0xE3A0_2003;
const MOVEQ_R0_1: u32 = 0x03A0_0001;
const MOVEQ_R1_2: u32 = 0x03A0_1002;
const MOVEQ_R2_3: u32 = 0x03A0_2003;
const MOVNE_R1_2: u32 = 0x13A0_1002;
const ADDSEQ_R1_R1_1: u32 = 0x0291_1001;
const ADDS_R1_R0_1: u32 = 0xE290_1001;
const CMP_R0_0: u32 = 0xE350_0000;
/// `mov r0, #1` with the never-valid condition.
const MOVNV_R0_1: u32 = 0xF3A0_0001;
/// `nop` and `yield` with the never-valid condition.
const NOPNV: u32 = 0xF320_F000;
const YIELDNV: u32 = 0xF320_F001;
/// `ldrne r0, [r0, #4]!`: writeback into the loaded register.
const LDRNE_R0_PRE_WB: u32 = 0x15B0_0004;

/// Translate `code` placed at `BASE`, never reading past its end.
fn translate(code: &[u32]) -> Block {
    let _ = env_logger::builder().is_test(true).try_init();

    let options = TranslationOptions {
        max_instructions: NonZeroUsize::new(code.len()),
        ..TranslationOptions::default()
    };
    let reader = |pc: u32| {
        let index = (pc - BASE) as usize / 4;
        match code.get(index) {
            Some(&word) => word,
            None => panic!("read past the end of the test code at {pc:08x}"),
        }
    };
    translate_arm(A32LocationDescriptor::new(BASE), reader, options)
}

fn at(offset: u32) -> LocationDescriptor {
    A32LocationDescriptor::new(BASE + offset).into()
}

fn register_writes(block: &Block) -> Vec<Value> {
    block
        .iter()
        .filter(|(_, inst)| inst.opcode() == Opcode::A32SetRegister)
        .map(|(_, inst)| inst.arg(0))
        .collect()
}

#[test]
fn unconditional_stream_has_no_failure_location() {
    let block = translate(&[MOV_R0_1, MOV_R1_2, MOV_R2_3]);

    assert_eq!(block.condition(), Cond::AL);
    assert_eq!(block.condition_failed_location(), None);
    assert!(!block.has_condition_failed_location());
    assert_eq!(block.cycle_count(), 3);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(12)));
    assert_eq!(block.end_location(), at(12));
}

#[test]
fn first_conditional_instruction_sets_block_condition() {
    let block = translate(&[MOVEQ_R0_1]);

    assert_eq!(block.condition(), Cond::EQ);
    assert_eq!(block.condition_failed_location(), Some(at(4)));
    assert_eq!(block.condition_failed_cycle_count(), 1);
    assert_eq!(block.cycle_count(), 1);
}

#[test]
fn same_condition_extends_the_run() {
    let block = translate(&[MOVEQ_R0_1, MOVEQ_R1_2, MOVEQ_R2_3]);

    assert_eq!(block.condition(), Cond::EQ);
    assert_eq!(block.condition_failed_location(), Some(at(12)));
    assert_eq!(block.condition_failed_cycle_count(), 3);
    assert_eq!(block.cycle_count(), 3);
    assert_eq!(
        register_writes(&block),
        [Value::A32Reg(Reg::R0), Value::A32Reg(Reg::R1), Value::A32Reg(Reg::R2)]
    );
}

#[test]
fn conflicting_condition_ends_block_before_instruction() {
    let block = translate(&[MOVEQ_R0_1, MOVNE_R1_2, MOV_R2_3]);

    assert_eq!(block.condition(), Cond::EQ);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(4)));
    // The refused instruction is neither translated nor counted.
    assert_eq!(block.cycle_count(), 1);
    assert_eq!(block.condition_failed_cycle_count(), 1);
    assert_eq!(register_writes(&block), [Value::A32Reg(Reg::R0)]);
    assert_eq!(block.end_location(), at(4));
}

#[test]
fn unconditional_instruction_starts_trailing_code() {
    let block = translate(&[MOVEQ_R0_1, MOV_R1_2, MOV_R2_3]);

    assert_eq!(block.condition(), Cond::EQ);
    assert_eq!(block.condition_failed_location(), Some(at(4)));
    assert_eq!(block.condition_failed_cycle_count(), 1);
    assert_eq!(block.cycle_count(), 3);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(12)));
}

#[test]
fn conditional_after_unconditional_code_breaks() {
    let block = translate(&[MOV_R0_1, MOVEQ_R1_2]);

    assert_eq!(block.condition(), Cond::AL);
    assert_eq!(block.cycle_count(), 1);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(4)));
    assert_eq!(register_writes(&block), [Value::A32Reg(Reg::R0)]);
}

#[test]
fn never_condition_is_unpredictable() {
    for code in [&[MOVNV_R0_1][..], &[MOVEQ_R0_1, MOVNV_R0_1][..]] {
        let block = translate(code);

        assert_eq!(
            block.terminal(),
            &Terminal::check_halt(Terminal::ReturnToDispatch)
        );
        let (_, last) = block.iter().last().unwrap();
        assert_eq!(last.opcode(), Opcode::A32ExceptionRaised);
        assert_eq!(
            last.arg(1),
            Value::U64(Exception::UnpredictableInstruction.code())
        );
    }
}

#[test]
fn never_condition_hints_are_unpredictable() {
    for code in [&[NOPNV][..], &[MOVEQ_R0_1, YIELDNV][..]] {
        let block = translate(code);

        assert_eq!(
            block.terminal(),
            &Terminal::check_halt(Terminal::ReturnToDispatch)
        );
        let (_, last) = block.iter().last().unwrap();
        assert_eq!(last.opcode(), Opcode::A32ExceptionRaised);
        assert_eq!(
            last.arg(1),
            Value::U64(Exception::UnpredictableInstruction.code())
        );
    }
}

#[test]
fn condition_is_committed_before_unpredictable_decode() {
    let block = translate(&[LDRNE_R0_PRE_WB]);

    assert_eq!(block.condition(), Cond::NE);
    assert_eq!(block.condition_failed_location(), Some(at(4)));
    assert_eq!(block.condition_failed_cycle_count(), 1);
    assert_eq!(
        block.terminal(),
        &Terminal::check_halt(Terminal::ReturnToDispatch)
    );
    let opcodes: Vec<_> = block.iter().map(|(_, inst)| inst.opcode()).collect();
    assert_eq!(opcodes, [Opcode::A32ExceptionRaised]);
}

#[test]
fn conflicting_load_breaks_before_unpredictable_decode() {
    // The refused load leaves no trace; it starts the next block.
    let block = translate(&[MOVEQ_R0_1, LDRNE_R0_PRE_WB]);

    assert_eq!(block.condition(), Cond::EQ);
    assert_eq!(block.cycle_count(), 1);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(4)));
    assert!(block
        .iter()
        .all(|(_, inst)| inst.opcode() != Opcode::A32ExceptionRaised));
}

#[test]
fn flag_write_stops_conditional_merging() {
    let block = translate(&[MOVEQ_R0_1, ADDSEQ_R1_R1_1, MOVEQ_R2_3]);

    assert_eq!(block.condition(), Cond::EQ);
    assert_eq!(block.cycle_count(), 2);
    assert_eq!(block.condition_failed_cycle_count(), 2);
    assert_eq!(block.condition_failed_location(), Some(at(8)));
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(8)));
}

#[test]
fn flag_guard_also_stops_trailing_code() {
    // The guard scans the whole block, so even unconditional trailing code stops
    // once any instruction has written flags.
    let block = translate(&[MOVEQ_R0_1, CMP_R0_0, MOV_R2_3]);

    assert_eq!(block.cycle_count(), 2);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(8)));
}

#[test]
fn unconditional_flag_writer_does_not_stop_block() {
    let block = translate(&[MOV_R0_1, ADDS_R1_R0_1]);

    assert_eq!(block.condition(), Cond::AL);
    assert_eq!(block.cycle_count(), 2);
    assert_eq!(block.terminal(), &Terminal::link_block_fast(at(8)));
    assert!(block
        .iter()
        .any(|(_, inst)| inst.opcode() == Opcode::A32SetZFlag));
}
