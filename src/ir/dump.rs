// This module renders a block as deterministic text for debugging and golden tests.
// Each linked instruction is listed in order with its pool slot, the ordinal other
// lines use to refer to it, its opcode name, its arguments and its use count.
// Arguments that reference another instruction print that instruction's ordinal;
// immediates print in a fixed format per type. When an argument's actual type is
// not compatible with the type the opcode declares for that slot, the line carries
// a type-error annotation instead of failing: the dump is a diagnostic and must
// never assert, which is also why an unset terminal renders as a marker. The
// instruction-to-ordinal map is scratch data built in a bump arena supplied by the
// caller so repeated dumps inside a session do not touch the global allocator.

//! Textual block dump.

use std::fmt::Write as _;

use bumpalo::Bump;
use hashbrown::{DefaultHashBuilder, HashMap};

use super::block::Block;
use super::inst::Inst;
use super::types::Type;
use super::value::{InstRef, Value};

type Ordinals<'a> = HashMap<InstRef, usize, DefaultHashBuilder, &'a Bump>;

/// Dump `block` using a private scratch arena.
pub fn dump_block(block: &Block) -> String {
    let arena = Bump::new();
    dump_block_in(block, &arena)
}

/// Dump `block`, allocating scratch data in `arena`.
pub fn dump_block_in(block: &Block, arena: &Bump) -> String {
    let mut ordinals: Ordinals<'_> = HashMap::with_capacity_in(block.len(), arena);
    for (ordinal, (inst_ref, _)) in block.iter().enumerate() {
        ordinals.insert(inst_ref, ordinal);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Block: location={}", block.location());
    let _ = write!(
        out,
        "cycles={}, entry_cond={}",
        block.cycle_count(),
        block.condition()
    );
    if let Some(fail) = block.condition_failed_location() {
        let _ = write!(out, ", cond_fail={fail}");
    }
    out.push('\n');

    for (inst_ref, inst) in block.iter() {
        let _ = write!(out, "[{:04}] ", inst_ref.slot());
        if inst.opcode().result_type() == Type::Void {
            out.push_str("         ");
        } else {
            let _ = write!(out, "%{:<5} = ", ordinals[&inst_ref]);
        }
        out.push_str(inst.opcode().name());
        write_args(&mut out, block, inst, &ordinals);
        let _ = writeln!(out, " (uses: {})", inst.use_count());
    }

    match block.try_terminal() {
        Some(terminal) => {
            let _ = writeln!(out, "terminal = {terminal}");
        }
        None => out.push_str("terminal = <invalid terminal>\n"),
    }
    out
}

fn write_args(
    out: &mut String,
    block: &Block,
    inst: &Inst,
    ordinals: &Ordinals<'_>,
) {
    for (index, &arg) in inst.args().iter().enumerate() {
        out.push_str(if index == 0 { " " } else { ", " });
        match arg {
            Value::Inst(used) => match ordinals.get(&used) {
                Some(ordinal) => {
                    let _ = write!(out, "%{ordinal}");
                }
                None => out.push_str("<unlinked>"),
            },
            imm => write_immediate(out, imm),
        }

        let actual = block.type_of(arg);
        let expected = inst.opcode().arg_type(index);
        if !actual.is_compatible_with(expected) {
            let _ = write!(out, " <type error: {actual} != {expected}>");
        }
    }
}

fn write_immediate(out: &mut String, value: Value) {
    let _ = match value {
        Value::Empty => write!(out, "<null>"),
        Value::Inst(_) => unreachable!("references are resolved by the caller"),
        Value::U1(v) => write!(out, "#{}", u8::from(v)),
        Value::U8(v) => write!(out, "#{v}"),
        Value::U16(v) => write!(out, "#{v:#x}"),
        Value::U32(v) => write!(out, "#{v:#x}"),
        Value::U64(v) => write!(out, "#{v:#x}"),
        Value::A32Reg(reg) => write!(out, "{reg}"),
        Value::A32ExtReg(reg) => write!(out, "{reg}"),
    };
}
