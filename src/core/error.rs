// This module defines the caller-facing error types of the front end using the thiserror
// crate. Guest-level faults (undefined or unpredictable instructions, never-valid
// conditions) are not errors here: the translator turns them into IR exception markers
// and a terminal that returns to the dispatcher. What remains are failures in turning
// user-supplied text into translator inputs: instruction words given as hexadecimal
// text that is malformed or wider than 32 bits, and guest addresses that do not parse.
// FrontendResult<T> is the convenience alias used throughout the session and the CLI.

//! Error types for the translation front end.

use thiserror::Error;

/// Errors raised while preparing translator inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontendError {
    #[error("Invalid hexadecimal instruction word: {text:?}")]
    InvalidHex { text: String },

    #[error("Instruction word too long: {text:?} has {digits} hex digits, at most 8 allowed")]
    HexTooLong { text: String, digits: usize },

    #[error("Invalid guest address: {text:?}")]
    InvalidAddress { text: String },
}

/// Result type alias for front end operations.
pub type FrontendResult<T> = Result<T, FrontendError>;

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Parse a 32-bit instruction word written in hexadecimal, with or without `0x`.
pub fn parse_instruction_word(text: &str) -> FrontendResult<u32> {
    let digits = strip_hex_prefix(text.trim());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FrontendError::InvalidHex {
            text: text.to_string(),
        });
    }
    if digits.len() > 8 {
        return Err(FrontendError::HexTooLong {
            text: text.to_string(),
            digits: digits.len(),
        });
    }
    u32::from_str_radix(digits, 16).map_err(|_| FrontendError::InvalidHex {
        text: text.to_string(),
    })
}

/// Parse a guest address written in hexadecimal, with or without `0x`.
pub fn parse_address(text: &str) -> FrontendResult<u32> {
    let digits = strip_hex_prefix(text.trim());
    u32::from_str_radix(digits, 16).map_err(|_| FrontendError::InvalidAddress {
        text: text.to_string(),
    })
}
