// This module gathers the infrastructure shared by the IR and the guest front ends
// that is not itself part of translation: the caller-facing error types and the
// parsers that turn user text into instruction words and addresses, the arena-backed
// translation session that carries options and statistics across many translations,
// and the fixtures unit tests use to translate short instruction sequences.

//! Core front end infrastructure
//!
//! # Key Components
//!
//! ## Session Management (`session`)
//! - Arena scratch space for block dumps using `bumpalo`
//! - Translation statistics
//!
//! ## Errors (`error`)
//! - `thiserror` based error enum for malformed inputs

pub mod error;
pub mod session;
pub mod test_utils;

pub use error::{parse_address, parse_instruction_word, FrontendError, FrontendResult};
pub use session::{SessionStats, TranslationSession};
