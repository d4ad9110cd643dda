// This module defines the IR instruction node stored in a block's instruction pool.
// An Inst carries its opcode, a fixed array of argument slots (only the first
// num_args() are meaningful), the number of live references other instructions hold
// to it, and the prev/next links that thread it into the block's ordered list.
// Use counting follows a strict add/remove discipline: writing a Value::Inst into
// an argument slot adds one use, overwriting or clearing a reference removes one,
// and underflow is a defect.
// Argument mutation goes through Block so the referenced node's counter can be
// updated in the same pool; this module only exposes the read side publicly.

//! IR instruction nodes.

use super::opcodes::Opcode;
use super::value::{InstRef, Value};

/// Largest arity of any opcode in the signature table.
pub const MAX_ARGS: usize = 4;

#[derive(Debug, Clone)]
pub struct Inst {
    opcode: Opcode,
    args: [Value; MAX_ARGS],
    use_count: u32,
    pub(super) prev: Option<InstRef>,
    pub(super) next: Option<InstRef>,
    pub(super) linked: bool,
}

impl Inst {
    pub(super) fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            args: [Value::Empty; MAX_ARGS],
            use_count: 0,
            prev: None,
            next: None,
            linked: false,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub(super) fn set_opcode(&mut self, opcode: Opcode) {
        self.opcode = opcode;
    }

    pub fn num_args(&self) -> usize {
        self.opcode.num_args()
    }

    /// Argument slot `index`.
    pub fn arg(&self, index: usize) -> Value {
        assert!(
            index < self.num_args(),
            "{} has {} arguments, asked for {}",
            self.opcode.name(),
            self.num_args(),
            index
        );
        self.args[index]
    }

    /// The meaningful argument slots, in order.
    pub fn args(&self) -> &[Value] {
        &self.args[..self.num_args()]
    }

    /// Replace slot `index`, returning the previous value. The caller owns use-count updates.
    pub(super) fn swap_arg(&mut self, index: usize, value: Value) -> Value {
        assert!(
            index < self.num_args(),
            "{} has {} arguments, cannot set {}",
            self.opcode.name(),
            self.num_args(),
            index
        );
        std::mem::replace(&mut self.args[index], value)
    }

    /// Clear every slot, returning what was there.
    pub(super) fn take_args(&mut self) -> [Value; MAX_ARGS] {
        std::mem::replace(&mut self.args, [Value::Empty; MAX_ARGS])
    }

    /// Number of argument slots elsewhere in the block referencing this instruction.
    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    pub fn has_uses(&self) -> bool {
        self.use_count > 0
    }

    pub(super) fn add_use(&mut self) {
        self.use_count += 1;
    }

    pub(super) fn remove_use(&mut self) {
        assert!(self.use_count > 0, "use count underflow on {}", self.opcode.name());
        self.use_count -= 1;
    }

    /// Whether the instruction is still part of its block's list.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn writes_to_cpsr(&self) -> bool {
        self.opcode.writes_to_cpsr()
    }

    pub fn reads_from_cpsr(&self) -> bool {
        self.opcode.reads_from_cpsr()
    }

    pub fn may_have_side_effects(&self) -> bool {
        self.opcode.may_have_side_effects()
    }
}
