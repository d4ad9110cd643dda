// This module implements the IR block: an ordered, insertion-stable list of
// instructions plus the metadata a later pipeline stage needs to emit it. The
// instructions live in a block-owned pool indexed by InstRef; the list order is a
// doubly linked chain threaded through the pool, so inserting before or after any
// instruction is O(1) and dropping the block reclaims every instruction in a
// single deallocation. Pool slots are never reused: an InstRef stays valid (and
// keeps naming the same node) for the whole life of the block, even after the
// instruction is unlinked. The block also owns the conditional-execution metadata
// (entry condition, failure location and cycle charge), the cycle count, and the
// terminal, which is set exactly once through set_terminal and only changed
// afterwards through an explicit replace_terminal.

//! IR basic block container.

use std::fmt;

use super::cond::Cond;
use super::inst::{Inst, MAX_ARGS};
use super::location::LocationDescriptor;
use super::opcodes::Opcode;
use super::terminal::Terminal;
use super::types::Type;
use super::value::{InstRef, Value};

/// Single-entry block of IR instructions with exactly one terminal.
#[derive(Debug, Clone)]
pub struct Block {
    location: LocationDescriptor,
    end_location: LocationDescriptor,

    cond: Cond,
    cond_failed: Option<LocationDescriptor>,
    cond_failed_cycle_count: usize,

    cycle_count: usize,
    terminal: Option<Terminal>,

    pool: Vec<Inst>,
    head: Option<InstRef>,
    tail: Option<InstRef>,
    len: usize,
}

impl Block {
    /// Create an empty, always-executed block starting at `location`.
    pub fn new(location: impl Into<LocationDescriptor>) -> Self {
        let location = location.into();
        Self {
            location,
            end_location: location,
            cond: Cond::AL,
            cond_failed: None,
            cond_failed_cycle_count: 0,
            cycle_count: 0,
            terminal: None,
            pool: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // ---- Instruction list ------------------------------------------------------------------

    /// Append a new instruction at the end of the block.
    pub fn append_new_inst(&mut self, opcode: Opcode, args: &[Value]) -> InstRef {
        self.prepend_new_inst(None, opcode, args)
    }

    /// Insert a new instruction before `insertion_point`, or at the end when it is `None`.
    pub fn prepend_new_inst(
        &mut self,
        insertion_point: Option<InstRef>,
        opcode: Opcode,
        args: &[Value],
    ) -> InstRef {
        let inst = self.alloc(opcode, args);
        match insertion_point {
            Some(before) => self.link_before(before, inst),
            None => self.link_at_end(inst),
        }
        inst
    }

    /// Insert a new instruction immediately after `position`.
    pub fn insert_new_inst_after(
        &mut self,
        position: InstRef,
        opcode: Opcode,
        args: &[Value],
    ) -> InstRef {
        self.assert_linked(position);
        let next = self.pool[position.slot()].next;
        self.prepend_new_inst(next, opcode, args)
    }

    fn alloc(&mut self, opcode: Opcode, args: &[Value]) -> InstRef {
        assert_eq!(
            args.len(),
            opcode.num_args(),
            "{} takes {} arguments, got {}",
            opcode.name(),
            opcode.num_args(),
            args.len()
        );
        let inst = InstRef::new(self.pool.len());
        self.pool.push(Inst::new(opcode));
        for (index, &arg) in args.iter().enumerate() {
            self.set_arg(inst, index, arg);
        }
        inst
    }

    fn link_at_end(&mut self, inst: InstRef) {
        let prev = self.tail;
        {
            let node = &mut self.pool[inst.slot()];
            node.prev = prev;
            node.next = None;
            node.linked = true;
        }
        match prev {
            Some(prev) => self.pool[prev.slot()].next = Some(inst),
            None => self.head = Some(inst),
        }
        self.tail = Some(inst);
        self.len += 1;
    }

    fn link_before(&mut self, before: InstRef, inst: InstRef) {
        self.assert_linked(before);
        let prev = self.pool[before.slot()].prev;
        {
            let node = &mut self.pool[inst.slot()];
            node.prev = prev;
            node.next = Some(before);
            node.linked = true;
        }
        self.pool[before.slot()].prev = Some(inst);
        match prev {
            Some(prev) => self.pool[prev.slot()].next = Some(inst),
            None => self.head = Some(inst),
        }
        self.len += 1;
    }

    fn unlink(&mut self, inst: InstRef) {
        let (prev, next) = {
            let node = &mut self.pool[inst.slot()];
            node.linked = false;
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.pool[prev.slot()].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.pool[next.slot()].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    fn assert_linked(&self, inst: InstRef) {
        assert!(
            self.pool.get(inst.slot()).is_some_and(Inst::is_linked),
            "instruction {} is not part of this block",
            inst.slot()
        );
    }

    /// Store `value` into argument slot `index` of `inst`, keeping use counts exact.
    pub fn set_arg(&mut self, inst: InstRef, index: usize, value: Value) {
        if let Value::Inst(used) = value {
            self.pool[used.slot()].add_use();
        }
        let old = self.pool[inst.slot()].swap_arg(index, value);
        if let Value::Inst(used) = old {
            self.pool[used.slot()].remove_use();
        }
    }

    /// Drop every argument of `inst` and turn it into a `Void` instruction.
    pub fn invalidate(&mut self, inst: InstRef) {
        self.release_args(inst);
        self.pool[inst.slot()].set_opcode(Opcode::Void);
    }

    /// Make `inst` forward `replacement`. Existing users keep their reference and now see
    /// `Identity(replacement)`.
    pub fn replace_uses_with(&mut self, inst: InstRef, replacement: Value) {
        let mut current = replacement;
        while let Value::Inst(forwarded) = current {
            assert!(
                forwarded != inst,
                "forwarding {} would create an Identity cycle",
                self.pool[inst.slot()].opcode().name()
            );
            let node = &self.pool[forwarded.slot()];
            if node.opcode() != Opcode::Identity {
                break;
            }
            current = node.arg(0);
        }
        self.release_args(inst);
        self.pool[inst.slot()].set_opcode(Opcode::Identity);
        self.set_arg(inst, 0, replacement);
    }

    /// Unlink `inst` from the list. It must have no remaining uses.
    pub fn remove(&mut self, inst: InstRef) {
        self.assert_linked(inst);
        let node = &self.pool[inst.slot()];
        assert!(
            !node.has_uses(),
            "cannot remove {} with {} remaining uses",
            node.opcode().name(),
            node.use_count()
        );
        self.release_args(inst);
        self.unlink(inst);
    }

    fn release_args(&mut self, inst: InstRef) {
        let old: [Value; MAX_ARGS] = self.pool[inst.slot()].take_args();
        for arg in old {
            if let Value::Inst(used) = arg {
                self.pool[used.slot()].remove_use();
            }
        }
    }

    /// Instruction behind `inst`. Unlinked instructions remain readable.
    pub fn inst(&self, inst: InstRef) -> &Inst {
        &self.pool[inst.slot()]
    }

    pub fn first(&self) -> Option<InstRef> {
        self.head
    }

    pub fn last(&self) -> Option<InstRef> {
        self.tail
    }

    pub fn next(&self, inst: InstRef) -> Option<InstRef> {
        self.pool[inst.slot()].next
    }

    pub fn prev(&self, inst: InstRef) -> Option<InstRef> {
        self.pool[inst.slot()].prev
    }

    /// Instructions in list order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            block: self,
            cursor: self.head,
        }
    }

    /// Number of linked instructions.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Type of `value`, looking through `Identity` chains.
    pub fn type_of(&self, value: Value) -> Type {
        let mut current = value;
        loop {
            match current {
                Value::Inst(inst) => {
                    let node = &self.pool[inst.slot()];
                    if node.opcode() == Opcode::Identity {
                        current = node.arg(0);
                    } else {
                        return node.opcode().result_type();
                    }
                }
                imm => return imm.immediate_type().unwrap_or(Type::Void),
            }
        }
    }

    // ---- Metadata --------------------------------------------------------------------------

    pub fn location(&self) -> LocationDescriptor {
        self.location
    }

    /// Exclusive upper bound of the guest code this block covers.
    pub fn end_location(&self) -> LocationDescriptor {
        self.end_location
    }

    pub fn set_end_location(&mut self, location: impl Into<LocationDescriptor>) {
        self.end_location = location.into();
    }

    /// Condition gating execution of the whole block.
    pub fn condition(&self) -> Cond {
        self.cond
    }

    pub fn set_condition(&mut self, cond: Cond) {
        self.cond = cond;
    }

    /// Where execution resumes when the block condition fails.
    pub fn condition_failed_location(&self) -> Option<LocationDescriptor> {
        self.cond_failed
    }

    pub fn has_condition_failed_location(&self) -> bool {
        self.cond_failed.is_some()
    }

    pub fn set_condition_failed_location(&mut self, location: impl Into<LocationDescriptor>) {
        self.cond_failed = Some(location.into());
    }

    /// Cycles charged when the block condition fails.
    pub fn condition_failed_cycle_count(&self) -> usize {
        self.cond_failed_cycle_count
    }

    pub fn set_condition_failed_cycle_count(&mut self, cycles: usize) {
        self.cond_failed_cycle_count = cycles;
    }

    pub fn increment_condition_failed_cycle_count(&mut self) {
        self.cond_failed_cycle_count += 1;
    }

    pub fn cycle_count(&self) -> usize {
        self.cycle_count
    }

    pub fn set_cycle_count(&mut self, cycles: usize) {
        self.cycle_count = cycles;
    }

    pub fn increment_cycle_count(&mut self) {
        self.cycle_count += 1;
    }

    // ---- Terminal --------------------------------------------------------------------------

    pub fn has_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// The block terminal. Reading it before it is set is a defect in the translator.
    pub fn terminal(&self) -> &Terminal {
        match &self.terminal {
            Some(terminal) => terminal,
            None => panic!("Terminal has not been set."),
        }
    }

    /// Terminal if one has been set, for diagnostics that must not assert.
    pub fn try_terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    /// Set the terminal. It must not have been set before.
    pub fn set_terminal(&mut self, terminal: Terminal) {
        assert!(!self.has_terminal(), "Terminal has already been set.");
        self.terminal = Some(terminal);
    }

    /// Replace an existing terminal.
    pub fn replace_terminal(&mut self, terminal: Terminal) {
        assert!(self.has_terminal(), "Terminal has not been set.");
        self.terminal = Some(terminal);
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::dump::dump_block(self))
    }
}

impl<'a> IntoIterator for &'a Block {
    type Item = (InstRef, &'a Inst);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a block's instructions in list order.
pub struct Iter<'a> {
    block: &'a Block,
    cursor: Option<InstRef>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (InstRef, &'a Inst);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        let inst = &self.block.pool[current.slot()];
        self.cursor = inst.next;
        Some((current, inst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a32::types::Reg;

    fn opcodes(block: &Block) -> Vec<Opcode> {
        block.iter().map(|(_, inst)| inst.opcode()).collect()
    }

    #[test]
    fn append_preserves_order() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        let b = block.append_new_inst(Opcode::Not32, &[Value::Inst(a)]);
        block.append_new_inst(Opcode::A32SetRegister, &[Value::A32Reg(Reg::R1), Value::Inst(b)]);

        assert_eq!(block.len(), 3);
        assert_eq!(
            opcodes(&block),
            [Opcode::A32GetRegister, Opcode::Not32, Opcode::A32SetRegister]
        );
        assert_eq!(block.first(), Some(a));
        assert_eq!(block.next(a), Some(b));
        assert_eq!(block.prev(b), Some(a));
    }

    #[test]
    fn insert_before_and_after() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let first = block.append_new_inst(Opcode::A32GetCFlag, &[]);
        let last = block.append_new_inst(Opcode::A32GetNFlag, &[]);

        let head = block.prepend_new_inst(Some(first), Opcode::A32GetCpsr, &[]);
        let middle = block.insert_new_inst_after(first, Opcode::A32GetZFlag, &[]);
        block.insert_new_inst_after(last, Opcode::A32GetVFlag, &[]);

        assert_eq!(
            opcodes(&block),
            [
                Opcode::A32GetCpsr,
                Opcode::A32GetCFlag,
                Opcode::A32GetZFlag,
                Opcode::A32GetNFlag,
                Opcode::A32GetVFlag,
            ]
        );
        assert_eq!(block.first(), Some(head));
        assert_eq!(block.next(first), Some(middle));
        assert_eq!(block.len(), 5);
    }

    #[test]
    fn use_counts_track_references() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let value = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R2)]);
        let users: Vec<_> = (0..3)
            .map(|_| block.append_new_inst(Opcode::Not32, &[Value::Inst(value)]))
            .collect();
        assert_eq!(block.inst(value).use_count(), 3);

        block.set_arg(users[0], 0, Value::U32(0));
        assert_eq!(block.inst(value).use_count(), 2);

        block.remove(users[1]);
        assert_eq!(block.inst(value).use_count(), 1);
        assert_eq!(block.len(), 3);
    }

    #[test]
    fn replace_uses_with_forwards_through_identity() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        let b = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R1)]);
        let user = block.append_new_inst(Opcode::Not32, &[Value::Inst(b)]);

        block.replace_uses_with(b, Value::Inst(a));
        assert_eq!(block.inst(b).opcode(), Opcode::Identity);
        assert_eq!(block.inst(a).use_count(), 1);
        assert_eq!(block.inst(b).use_count(), 1);
        assert_eq!(block.inst(user).arg(0), Value::Inst(b));
        assert_eq!(block.type_of(Value::Inst(b)), Type::U32);
    }

    #[test]
    #[should_panic(expected = "would create an Identity cycle")]
    fn forwarding_to_itself_panics() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        block.replace_uses_with(a, Value::Inst(a));
    }

    #[test]
    #[should_panic(expected = "would create an Identity cycle")]
    fn forwarding_into_own_identity_chain_panics() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        let b = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R1)]);
        let c = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R2)]);
        block.replace_uses_with(b, Value::Inst(a));
        block.replace_uses_with(c, Value::Inst(b));
        // c -> b -> a, so a may not forward to c.
        block.replace_uses_with(a, Value::Inst(c));
    }

    #[test]
    fn forwarding_along_a_chain_is_allowed() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        let b = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R1)]);
        let c = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R2)]);
        block.replace_uses_with(b, Value::Inst(a));
        block.replace_uses_with(c, Value::Inst(b));
        assert_eq!(block.type_of(Value::Inst(c)), Type::U32);
        assert_eq!(block.inst(b).use_count(), 1);
    }

    #[test]
    fn invalidate_releases_arguments() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        let user = block.append_new_inst(Opcode::Mul32, &[Value::Inst(a), Value::Inst(a)]);
        assert_eq!(block.inst(a).use_count(), 2);

        block.invalidate(user);
        assert_eq!(block.inst(a).use_count(), 0);
        assert_eq!(block.inst(user).opcode(), Opcode::Void);
        assert!(block.inst(user).args().is_empty());
    }

    #[test]
    fn remove_head_and_tail() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetCFlag, &[]);
        let b = block.append_new_inst(Opcode::A32GetZFlag, &[]);
        let c = block.append_new_inst(Opcode::A32GetNFlag, &[]);

        block.remove(a);
        block.remove(c);
        assert_eq!(block.first(), Some(b));
        assert_eq!(block.last(), Some(b));
        assert!(!block.inst(a).is_linked());

        block.remove(b);
        assert!(block.is_empty());
        assert_eq!(block.first(), None);
    }

    #[test]
    #[should_panic(expected = "remaining uses")]
    fn removing_used_instruction_panics() {
        let mut block = Block::new(LocationDescriptor::new(0));
        let a = block.append_new_inst(Opcode::A32GetRegister, &[Value::A32Reg(Reg::R0)]);
        block.append_new_inst(Opcode::Not32, &[Value::Inst(a)]);
        block.remove(a);
    }

    #[test]
    #[should_panic(expected = "takes 2 arguments, got 1")]
    fn arity_mismatch_panics() {
        let mut block = Block::new(LocationDescriptor::new(0));
        block.append_new_inst(Opcode::A32SetRegister, &[Value::A32Reg(Reg::R0)]);
    }

    #[test]
    fn terminal_is_set_once() {
        let mut block = Block::new(LocationDescriptor::new(0));
        assert!(!block.has_terminal());
        assert!(block.try_terminal().is_none());

        block.set_terminal(Terminal::ReturnToDispatch);
        assert!(block.has_terminal());
        assert_eq!(block.terminal(), &Terminal::ReturnToDispatch);

        block.replace_terminal(Terminal::PopRSBHint);
        assert_eq!(block.terminal(), &Terminal::PopRSBHint);
    }

    #[test]
    #[should_panic(expected = "Terminal has already been set.")]
    fn second_set_terminal_panics() {
        let mut block = Block::new(LocationDescriptor::new(0));
        block.set_terminal(Terminal::ReturnToDispatch);
        block.set_terminal(Terminal::ReturnToDispatch);
    }

    #[test]
    #[should_panic(expected = "Terminal has not been set.")]
    fn replace_without_terminal_panics() {
        let mut block = Block::new(LocationDescriptor::new(0));
        block.replace_terminal(Terminal::ReturnToDispatch);
    }

    #[test]
    #[should_panic(expected = "Terminal has not been set.")]
    fn reading_unset_terminal_panics() {
        let block = Block::new(LocationDescriptor::new(0));
        let _ = block.terminal();
    }

    #[test]
    fn condition_metadata_defaults() {
        let mut block = Block::new(LocationDescriptor::new(0x40));
        assert_eq!(block.condition(), Cond::AL);
        assert!(!block.has_condition_failed_location());
        assert_eq!(block.end_location(), LocationDescriptor::new(0x40));

        block.set_condition(Cond::NE);
        block.set_condition_failed_location(LocationDescriptor::new(0x44));
        block.set_condition_failed_cycle_count(1);
        block.increment_condition_failed_cycle_count();
        block.increment_cycle_count();

        assert_eq!(block.condition_failed_location(), Some(LocationDescriptor::new(0x44)));
        assert_eq!(block.condition_failed_cycle_count(), 2);
        assert_eq!(block.cycle_count(), 1);
    }

    #[test]
    fn block_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Block>();
    }
}
