// The A32 front end turns a run of 32-bit ARM instruction words into one IR Block.
// Decoding is table driven: each entry pairs a bit pattern with a handler, and the
// first entry whose fixed bits match wins. Handlers receive the translator visitor,
// which owns the IR emitter for the block under construction and the state machine
// that folds a run of identically-conditioned instructions into a single
// conditional block. The location descriptor records the guest state that affects
// decoding and so becomes part of the block's identity.

//! ARM (A32) guest front end.

pub mod decoder;
pub mod emitter;
pub mod location;
pub mod translate;
pub mod types;

pub use decoder::{ArmDecoder, InstructionDecoder, Matcher};
pub use emitter::A32IrEmitter;
pub use location::A32LocationDescriptor;
pub use translate::{
    get_name_of_instruction, translate_arm, translate_arm_with, translate_single_arm_instruction,
    CodeReader, TranslationOptions,
};
pub use types::{Exception, ExtReg, Reg, ShiftType};
