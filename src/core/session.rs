// This module provides arena-based translation session management using the bumpalo
// crate. A TranslationSession borrows an arena for its whole lifetime, carries the
// TranslationOptions every translation through it uses, and accumulates statistics
// across calls. Blocks themselves own their instruction pools and outlive the session
// freely; the arena only backs scratch data such as the instruction ordinal maps built
// while dumping a block, so repeated dumps never touch the global allocator for their
// bookkeeping. SessionStats tracks how many blocks and guest instructions were
// translated, how much IR they produced broken down by opcode, and how the blocks
// ended: conditionally, through the interpreter fallback, or by raising a guest
// exception.

//! Arena-backed translation session and statistics.

use bumpalo::Bump;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::a32::location::A32LocationDescriptor;
use crate::a32::translate::{translate_arm, translate_single_arm_instruction, CodeReader};
use crate::a32::TranslationOptions;
use crate::ir::{dump_block_in, Block, Cond};

/// Translation session sharing one arena and one set of options.
pub struct TranslationSession<'arena> {
    /// Scratch arena for dumps.
    arena: &'arena Bump,

    options: TranslationOptions,

    stats: RefCell<SessionStats>,
}

impl<'arena> TranslationSession<'arena> {
    /// Create a session with default translation options.
    pub fn new(arena: &'arena Bump) -> Self {
        Self::with_options(arena, TranslationOptions::default())
    }

    pub fn with_options(arena: &'arena Bump, options: TranslationOptions) -> Self {
        Self {
            arena,
            options,
            stats: RefCell::new(SessionStats::default()),
        }
    }

    pub fn arena(&self) -> &'arena Bump {
        self.arena
    }

    pub fn options(&self) -> TranslationOptions {
        self.options
    }

    /// Translate one block starting at `location`.
    pub fn translate_block<R: CodeReader>(
        &self,
        location: A32LocationDescriptor,
        reader: R,
    ) -> Block {
        let block = translate_arm(location, reader, self.options);
        self.record_block(&block);
        block
    }

    /// Append one instruction to `block`, returning whether translation may continue.
    ///
    /// Only the guest instruction count is recorded; the block is accounted for
    /// once the caller hands it to [`Self::record_block`].
    pub fn translate_single(
        &self,
        block: &mut Block,
        location: A32LocationDescriptor,
        word: u32,
    ) -> bool {
        let should_continue = translate_single_arm_instruction(block, location, word, self.options);
        self.stats.borrow_mut().guest_instructions += 1;
        should_continue
    }

    /// Render `block` using the session arena for scratch space.
    pub fn dump(&self, block: &Block) -> String {
        dump_block_in(block, self.arena)
    }

    /// Account for a finished block.
    pub fn record_block(&self, block: &Block) {
        let mut stats = self.stats.borrow_mut();
        stats.blocks_translated += 1;
        stats.guest_instructions += block.cycle_count();
        stats.ir_instructions += block.len();

        let mut raises = false;
        for (_, inst) in block {
            *stats.opcode_counts.entry(inst.opcode().name()).or_insert(0) += 1;
            raises |= inst.opcode().causes_cpu_exception();
        }

        if block.condition() != Cond::AL {
            stats.conditional_blocks += 1;
        }
        if block.try_terminal().is_some_and(|terminal| terminal.interprets()) {
            stats.interpreted_blocks += 1;
        }
        if raises {
            stats.exception_blocks += 1;
        }

        debug!(
            "session: block {} recorded ({} blocks so far)",
            block.location(),
            stats.blocks_translated
        );
    }

    /// Get translation statistics.
    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }

    pub fn reset_stats(&self) {
        *self.stats.borrow_mut() = SessionStats::default();
    }
}

/// Translation session statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub blocks_translated: usize,

    /// Guest instructions covered, including refused and trailing ones.
    pub guest_instructions: usize,

    pub ir_instructions: usize,

    /// IR instructions emitted per opcode name.
    pub opcode_counts: HashMap<&'static str, usize>,

    /// Blocks whose entry condition is not `al`.
    pub conditional_blocks: usize,

    /// Blocks whose terminal falls back to the interpreter.
    pub interpreted_blocks: usize,

    /// Blocks containing an exception-raising instruction.
    pub exception_blocks: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Translation Session Statistics:")?;
        writeln!(f, "  Blocks translated: {}", self.blocks_translated)?;
        writeln!(f, "  Guest instructions: {}", self.guest_instructions)?;
        writeln!(f, "  IR instructions: {}", self.ir_instructions)?;
        writeln!(f, "  Conditional blocks: {}", self.conditional_blocks)?;
        writeln!(f, "  Interpreted blocks: {}", self.interpreted_blocks)?;
        writeln!(f, "  Exception blocks: {}", self.exception_blocks)?;

        if !self.opcode_counts.is_empty() {
            writeln!(f, "  Opcode breakdown:")?;
            let mut sorted: Vec<_> = self.opcode_counts.iter().collect();
            sorted.sort_by(|(a_name, a_count), (b_name, b_count)| {
                b_count.cmp(a_count).then(a_name.cmp(b_name))
            });

            for (opcode, count) in sorted.into_iter().take(10) {
                writeln!(f, "    {}: {}", opcode, count)?;
            }
        }

        Ok(())
    }
}
