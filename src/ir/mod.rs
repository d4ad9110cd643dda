// This module is the host-agnostic intermediate representation produced by the guest
// front ends. A Block holds an ordered list of instructions drawn from a block-local
// pool, the conditional-execution metadata that lets the emitted code skip the whole
// block cheaply, a guest cycle count, and exactly one Terminal describing how control
// leaves the block. Instructions are opcode tags plus argument slots whose arity and
// types come from the static signature table in opcodes; operands are Values that are
// either immediates or references to earlier instructions, with exact use counts kept
// by the block. IrEmitter offers typed construction helpers on top of the raw block
// API, and dump renders a block as deterministic text for debugging and golden tests.

//! Intermediate representation shared by all guest front ends.

pub mod block;
pub mod cond;
pub mod dump;
pub mod emitter;
pub mod inst;
pub mod location;
pub mod opcodes;
pub mod terminal;
pub mod types;
pub mod value;

pub use block::Block;
pub use cond::Cond;
pub use dump::{dump_block, dump_block_in};
pub use emitter::IrEmitter;
pub use inst::Inst;
pub use location::LocationDescriptor;
pub use opcodes::{OpInfo, Opcode};
pub use terminal::Terminal;
pub use types::Type;
pub use value::{InstRef, ResultAndCarry, ResultAndCarryAndOverflow, Value};
