//! Dynamic recompiler front end.
//!
//! Translates ARM (A32) guest code into single-entry, single-exit IR blocks for
//! later optimisation and host code emission. Predicated guest instructions are
//! folded into a block-level entry condition, and every block ends in exactly one
//! terminal describing how control leaves it.
//!
//! # Primary Usage
//!
//! ```
//! use dynarec_frontend::a32::{translate_arm, A32LocationDescriptor, TranslationOptions};
//! use dynarec_frontend::ir::dump_block;
//!
//! // mov r1, #5 ; b .
//! let code = [0xE3A0_1005u32, 0xEAFF_FFFE];
//! let block = translate_arm(
//!     A32LocationDescriptor::new(0),
//!     |pc: u32| code[pc as usize / 4],
//!     TranslationOptions::default(),
//! );
//! assert_eq!(block.cycle_count(), 2);
//! println!("{}", dump_block(&block));
//! ```
//!
//! # Architecture
//!
//! - [`ir`] - Host-agnostic IR: block container, opcodes, terminals, dump
//! - [`a32`] - A32 decoder, conditional execution and translation loop
//! - [`core`] - Shared infrastructure (errors, session, statistics)

pub mod a32;
pub mod core;
pub mod ir;

pub use crate::core::{FrontendError, FrontendResult, SessionStats, TranslationSession};
pub use a32::{translate_arm, translate_single_arm_instruction, A32LocationDescriptor, TranslationOptions};
pub use ir::{dump_block, Block, Terminal};
