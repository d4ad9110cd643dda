// This module drives A32 translation. translate_arm builds one IR block starting at a
// guest location: it repeatedly fetches an instruction word through the caller's code
// reader, decodes it (VFP tables first, then the general ARM tables, falling back to
// undefined-instruction handling), and runs the handler, which emits IR and reports
// whether translation may continue. After each instruction the location advances by
// one instruction width and the block's cycle count grows, unless the conditional
// state machine asked for a Break, in which case the block ends at the current
// instruction with the terminal the break already installed. The loop also stops when
// the conservative flags-write guard forbids growing a conditional block, or when the
// optional instruction budget is spent; such fall-through exits link directly to the
// next location. translate_single_arm_instruction appends exactly one instruction to
// an existing block for callers that do not translate in block units. Its visitor
// still rejects the NV condition, but never commits the block to a condition or
// breaks it.

//! A32 translation loop.

pub(crate) mod branch;
pub(crate) mod data_processing;
pub(crate) mod exception;
pub(crate) mod load_store;
pub(crate) mod misc;
pub(crate) mod vfp;
mod visitor;

use std::num::NonZeroUsize;

use log::{debug, trace};

pub use visitor::{ArmTranslatorVisitor, ConditionalState};

use super::decoder::{ArmDecoder, InstructionDecoder};
use super::location::A32LocationDescriptor;
use crate::ir::{Block, Terminal};

/// Size of an A32 instruction in bytes.
pub const ARM_INSTRUCTION_WIDTH: i32 = 4;

/// Knobs that change how guest instructions are translated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Give some architecturally UNPREDICTABLE encodings a defined behaviour
    /// instead of raising an exception.
    pub define_unpredictable_behaviour: bool,
    /// Raise guest exceptions for YIELD, WFE, WFI and SEV instead of treating
    /// them as no-ops.
    pub hook_hint_instructions: bool,
    /// Upper bound on guest instructions per block.
    pub max_instructions: Option<NonZeroUsize>,
}

/// Source of guest instruction words. Reads are assumed not to fault.
pub trait CodeReader {
    fn read_code(&mut self, pc: u32) -> u32;
}

impl<F> CodeReader for F
where
    F: FnMut(u32) -> u32,
{
    fn read_code(&mut self, pc: u32) -> u32 {
        self(pc)
    }
}

/// Translate a block starting at `location` with the built-in decoder.
pub fn translate_arm<R: CodeReader>(
    location: A32LocationDescriptor,
    mut reader: R,
    options: TranslationOptions,
) -> Block {
    translate_arm_with(location, &mut reader, options, &ArmDecoder)
}

/// Translate a block starting at `location` using `decoder` for instruction lookup.
pub fn translate_arm_with<R, D>(
    location: A32LocationDescriptor,
    reader: &mut R,
    options: TranslationOptions,
    decoder: &D,
) -> Block
where
    R: CodeReader + ?Sized,
    D: InstructionDecoder + ?Sized,
{
    let mut block = Block::new(location);
    let mut visitor = ArmTranslatorVisitor::new(&mut block, location, options);
    let budget = options.max_instructions.map_or(usize::MAX, NonZeroUsize::get);

    let mut translated = 0usize;
    let mut should_continue = true;
    while should_continue && visitor.cond_can_continue() && translated < budget {
        let pc = visitor.ir.current_location.pc();
        let word = reader.read_code(pc);
        trace!("{pc:08x}: {word:08x}");

        should_continue = translate_word(&mut visitor, decoder, word);

        if visitor.cond_state == ConditionalState::Break {
            break;
        }

        visitor.ir.current_location = visitor.ir.current_location.advance_pc(ARM_INSTRUCTION_WIDTH);
        visitor.ir.block.increment_cycle_count();
        translated += 1;
    }

    let end = visitor.ir.current_location;
    if should_continue && !visitor.ir.block.has_terminal() {
        visitor.ir.set_term(Terminal::link_block_fast(end));
    }
    drop(visitor);

    assert!(block.has_terminal(), "Terminal has not been set");
    block.set_end_location(end);

    debug!(
        "translated {location}: {} guest instructions, {} IR instructions, terminal {}",
        block.cycle_count(),
        block.len(),
        block.terminal()
    );
    block
}

/// Append the IR for a single instruction word to `block`.
///
/// Predicated words are emitted unconditionally; the caller owns the block's
/// condition and terminal. Returns whether translation could continue with the
/// following instruction.
pub fn translate_single_arm_instruction(
    block: &mut Block,
    location: A32LocationDescriptor,
    word: u32,
    options: TranslationOptions,
) -> bool {
    let mut visitor = ArmTranslatorVisitor::single_instruction(block, location, options);
    let should_continue = translate_word(&mut visitor, &ArmDecoder, word);

    let end = visitor.ir.current_location.advance_pc(ARM_INSTRUCTION_WIDTH);
    drop(visitor);

    block.increment_cycle_count();
    block.set_end_location(end);
    should_continue
}

/// Name of the decode table entry matching `word`, if any.
pub fn get_name_of_instruction(word: u32) -> Option<&'static str> {
    ArmDecoder.decode_any(word).map(|matcher| matcher.name())
}

fn translate_word<D>(visitor: &mut ArmTranslatorVisitor<'_>, decoder: &D, word: u32) -> bool
where
    D: InstructionDecoder + ?Sized,
{
    match decoder.decode_any(word) {
        Some(matcher) => matcher.call(visitor, word),
        None => {
            trace!("{word:08x}: no decoder entry");
            visitor.undefined_instruction()
        }
    }
}
