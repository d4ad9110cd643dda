//! Test the IR block container, terminals, the dump and the shift helpers
//! through the public API.

use bumpalo::Bump;
use dynarec_frontend::a32::translate::ArmTranslatorVisitor;
use dynarec_frontend::a32::{A32LocationDescriptor, Reg, ShiftType, TranslationOptions};
use dynarec_frontend::ir::{
    dump_block, dump_block_in, Block, Cond, LocationDescriptor, Opcode, Terminal, Type, Value,
};

fn loc(value: u64) -> LocationDescriptor {
    LocationDescriptor::new(value)
}

#[test]
fn use_counts_follow_references() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut block = Block::new(loc(0));
    let source = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);

    let mut users = Vec::new();
    for _ in 0..3 {
        users.push(block.append_new_inst(
            Opcode::Add32,
            &[Value::Inst(source), Value::U32(1), Value::U1(false)],
        ));
    }
    assert_eq!(block.inst(source).use_count(), 3);

    // Removing a user drops its reference.
    block.remove(users.pop().unwrap());
    assert_eq!(block.inst(source).use_count(), 2);

    // Overwriting a reference with an immediate drops it as well.
    block.set_arg(users[0], 0, Value::U32(7));
    assert_eq!(block.inst(source).use_count(), 1);

    // One instruction may use another several times.
    block.set_arg(users[1], 1, Value::Inst(source));
    assert_eq!(block.inst(source).use_count(), 2);
}

#[test]
fn replaced_instruction_forwards_value() {
    let mut block = Block::new(loc(0));
    let original = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R1)]);
    let replacement = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R2)]);
    let user = block.append_new_inst(Opcode::Not32, &[Value::Inst(original)]);

    block.replace_uses_with(original, Value::Inst(replacement));
    assert_eq!(block.inst(original).opcode(), Opcode::Identity);
    assert_eq!(block.inst(replacement).use_count(), 1);
    assert_eq!(block.type_of(block.inst(user).arg(0)), Type::U32);
}

#[test]
#[should_panic(expected = "remaining uses")]
fn removing_used_instruction_panics() {
    let mut block = Block::new(loc(0));
    let source = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
    block.append_new_inst(Opcode::Not32, &[Value::Inst(source)]);
    block.remove(source);
}

#[test]
#[should_panic(expected = "takes 1 arguments, got 2")]
fn arity_mismatch_panics() {
    let mut block = Block::new(loc(0));
    block.append_new_inst(Opcode::Not32, &[Value::U32(0), Value::U32(1)]);
}

#[test]
fn insertion_keeps_order() {
    let mut block = Block::new(loc(0));
    let last = block.append_new_inst(Opcode::Breakpoint, &[]);
    let first = block.prepend_new_inst(Some(last), Opcode::A32GetCpsr, &[]);
    let middle = block.insert_new_inst_after(first, Opcode::A32GetCFlag, &[]);

    let order: Vec<_> = block.iter().map(|(inst_ref, _)| inst_ref).collect();
    assert_eq!(order, [first, middle, last]);
    assert_eq!(block.first(), Some(first));
    assert_eq!(block.last(), Some(last));
}

#[test]
fn terminal_is_set_once() {
    let mut block = Block::new(loc(0x10));
    assert!(!block.has_terminal());

    block.set_terminal(Terminal::ReturnToDispatch);
    assert!(block.has_terminal());

    block.replace_terminal(Terminal::link_block(loc(0x20)));
    assert_eq!(block.terminal(), &Terminal::link_block(loc(0x20)));
}

#[test]
#[should_panic(expected = "Terminal has already been set.")]
fn second_terminal_is_rejected() {
    let mut block = Block::new(loc(0));
    block.set_terminal(Terminal::ReturnToDispatch);
    block.set_terminal(Terminal::PopRSBHint);
}

#[test]
#[should_panic(expected = "Terminal has not been set.")]
fn reading_unset_terminal_panics() {
    let block = Block::new(loc(0));
    let _ = block.terminal();
}

#[test]
fn nested_terminals_render_as_tree() {
    let terminal = Terminal::if_then_else(
        Cond::NE,
        Terminal::link_block(loc(0x40)),
        Terminal::check_halt(Terminal::interpret(loc(0x44))),
    );
    assert_eq!(
        terminal.to_string(),
        "If{ne, LinkBlock{{0000000000000040}}, CheckHalt{Interpret{{0000000000000044}}}}"
    );
    assert!(terminal.interprets());
    assert!(!Terminal::check_bit(Terminal::PopRSBHint, Terminal::ReturnToDispatch).interprets());
}

#[test]
fn dump_resolves_references_to_ordinals() {
    let mut block = Block::new(loc(0));
    let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R3)]);
    let b = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R4)]);
    let sum = block.append_new_inst(
        Opcode::Add32,
        &[Value::Inst(b), Value::Inst(a), Value::U1(false)],
    );
    block.append_new_inst(Opcode::A32SetRegister, &[Value::A32Reg(Reg::R5), Value::Inst(sum)]);
    block.set_cycle_count(1);
    block.set_terminal(Terminal::ReturnToDispatch);

    let text = dump_block(&block);
    assert!(text.contains("[0002] %2     = Add32 %1, %0, #0 (uses: 1)"), "{text}");
    assert!(text.contains("A32SetRegister r5, %2 (uses: 0)"), "{text}");
    assert!(text.ends_with("terminal = ReturnToDispatch{}\n"));

    // Removing an instruction renumbers ordinals but keeps pool slots.
    let arena = Bump::new();
    let first = block.first().unwrap();
    block.set_arg(sum, 1, Value::U32(0));
    block.remove(first);
    let text = dump_block_in(&block, &arena);
    assert!(text.contains("[0001] %0     = A32GetRegister r4"), "{text}");
    assert!(text.contains("[0002] %1     = Add32 %0, #0x0, #0"), "{text}");
}

#[test]
fn dump_is_deterministic_and_reports_type_errors() {
    let build = || {
        let mut block = Block::new(loc(0x100));
        block.set_condition(Cond::EQ);
        block.set_condition_failed_location(loc(0x104));
        let flag = block.append_new_inst(Opcode::A32GetCFlag, &[]);
        block.append_new_inst(Opcode::Not32, &[Value::Inst(flag)]);
        block
    };

    let text = dump_block(&build());
    assert_eq!(text, dump_block(&build()));
    assert!(text.contains("entry_cond=eq, cond_fail={0000000000000104}"));
    assert!(text.contains("Not32 %0 <type error: U1 != U32>"), "{text}");
    assert!(text.ends_with("terminal = <invalid terminal>\n"));
}

fn visitor_block() -> Block {
    Block::new(A32LocationDescriptor::new(0))
}

#[test]
fn zero_immediate_right_shifts_mean_32() {
    for shift in [ShiftType::LSR, ShiftType::ASR] {
        let mut encoded = visitor_block();
        let mut v = ArmTranslatorVisitor::new(
            &mut encoded,
            A32LocationDescriptor::new(0),
            TranslationOptions::default(),
        );
        let value = v.ir.imm32(0x8000_0000);
        let carry = v.ir.imm1(false);
        v.emit_imm_shift(value, shift, 0, carry);
        drop(v);

        let mut explicit = visitor_block();
        let mut v = ArmTranslatorVisitor::new(
            &mut explicit,
            A32LocationDescriptor::new(0),
            TranslationOptions::default(),
        );
        let value = v.ir.imm32(0x8000_0000);
        let carry = v.ir.imm1(false);
        let amount = v.ir.imm8(32);
        v.emit_reg_shift(value, shift, amount, carry);
        drop(v);

        assert_eq!(dump_block(&encoded), dump_block(&explicit));
    }
}

#[test]
fn zero_rotate_is_rotate_with_extend() {
    let mut block = visitor_block();
    let mut v = ArmTranslatorVisitor::new(
        &mut block,
        A32LocationDescriptor::new(0),
        TranslationOptions::default(),
    );
    let value = v.ir.imm32(1);
    let carry = v.ir.imm1(true);
    let shifted = v.emit_imm_shift(value, ShiftType::ROR, 0, carry);
    drop(v);

    let (first, inst) = block.iter().next().unwrap();
    assert_eq!(inst.opcode(), Opcode::RotateRightExtended);
    assert_eq!(inst.arg(1), Value::U1(true));
    assert_eq!(shifted.result.value(), Value::Inst(first));
    let (_, carry_out) = block.iter().nth(1).unwrap();
    assert_eq!(carry_out.opcode(), Opcode::GetCarryFromOp);
}

#[test]
fn register_shift_amount_is_used_verbatim() {
    let mut block = visitor_block();
    let mut v = ArmTranslatorVisitor::new(
        &mut block,
        A32LocationDescriptor::new(0),
        TranslationOptions::default(),
    );
    let value = v.ir.get_register(Reg::R0);
    let carry = v.ir.get_c_flag();
    let amount = v.ir.imm8(0);
    v.emit_reg_shift(value, ShiftType::ROR, amount, carry);
    let amount = v.ir.imm8(40);
    v.emit_reg_shift(value, ShiftType::LSR, amount, carry);
    drop(v);

    let shifts: Vec<_> = block
        .iter()
        .filter(|(_, inst)| !inst.opcode().is_pseudo_operation())
        .skip(2)
        .map(|(_, inst)| (inst.opcode(), inst.arg(1)))
        .collect();
    assert_eq!(
        shifts,
        [
            (Opcode::RotateRight32, Value::U8(0)),
            (Opcode::LogicalShiftRight32, Value::U8(40))
        ]
    );
}
