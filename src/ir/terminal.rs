//! Block exit descriptors.
//!
//! Every completed block carries exactly one [`Terminal`]. Terminals nest:
//! `If`, `CheckBit` and `CheckHalt` wrap other terminals to form a small
//! decision tree that the dispatcher evaluates at run time.

use std::fmt;

use super::cond::Cond;
use super::location::LocationDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    /// Hand the instruction at `next` to the interpreter fallback.
    Interpret { next: LocationDescriptor },
    /// Return to the dispatcher, which looks up the next block by guest state.
    ReturnToDispatch,
    /// Jump to the block at `next`, checking remaining cycles first.
    LinkBlock { next: LocationDescriptor },
    /// Jump to the block at `next` without checking remaining cycles.
    LinkBlockFast { next: LocationDescriptor },
    /// Predict the return address from the return stack buffer.
    PopRSBHint,
    /// Take `then_` if `cond` holds at run time, `else_` otherwise.
    If {
        cond: Cond,
        then_: Box<Terminal>,
        else_: Box<Terminal>,
    },
    /// Take `then_` if the block's check bit is set, `else_` otherwise.
    CheckBit {
        then_: Box<Terminal>,
        else_: Box<Terminal>,
    },
    /// Return to the dispatcher if a halt was requested, else take `else_`.
    CheckHalt { else_: Box<Terminal> },
}

impl Terminal {
    pub fn interpret(next: impl Into<LocationDescriptor>) -> Self {
        Terminal::Interpret { next: next.into() }
    }

    pub fn link_block(next: impl Into<LocationDescriptor>) -> Self {
        Terminal::LinkBlock { next: next.into() }
    }

    pub fn link_block_fast(next: impl Into<LocationDescriptor>) -> Self {
        Terminal::LinkBlockFast { next: next.into() }
    }

    pub fn if_then_else(cond: Cond, then_: Terminal, else_: Terminal) -> Self {
        Terminal::If {
            cond,
            then_: Box::new(then_),
            else_: Box::new(else_),
        }
    }

    pub fn check_bit(then_: Terminal, else_: Terminal) -> Self {
        Terminal::CheckBit {
            then_: Box::new(then_),
            else_: Box::new(else_),
        }
    }

    pub fn check_halt(else_: Terminal) -> Self {
        Terminal::CheckHalt {
            else_: Box::new(else_),
        }
    }

    /// Whether any leaf of this tree falls back to the interpreter.
    pub fn interprets(&self) -> bool {
        match self {
            Terminal::Interpret { .. } => true,
            Terminal::ReturnToDispatch
            | Terminal::LinkBlock { .. }
            | Terminal::LinkBlockFast { .. }
            | Terminal::PopRSBHint => false,
            Terminal::If { then_, else_, .. } | Terminal::CheckBit { then_, else_ } => {
                then_.interprets() || else_.interprets()
            }
            Terminal::CheckHalt { else_ } => else_.interprets(),
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Interpret { next } => write!(f, "Interpret{{{next}}}"),
            Terminal::ReturnToDispatch => f.write_str("ReturnToDispatch{}"),
            Terminal::LinkBlock { next } => write!(f, "LinkBlock{{{next}}}"),
            Terminal::LinkBlockFast { next } => write!(f, "LinkBlockFast{{{next}}}"),
            Terminal::PopRSBHint => f.write_str("PopRSBHint{}"),
            Terminal::If { cond, then_, else_ } => write!(f, "If{{{cond}, {then_}, {else_}}}"),
            Terminal::CheckBit { then_, else_ } => write!(f, "CheckBit{{{then_}, {else_}}}"),
            Terminal::CheckHalt { else_ } => write!(f, "CheckHalt{{{else_}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_rendering() {
        let loc = LocationDescriptor::new(0x1000);
        assert_eq!(
            Terminal::interpret(loc).to_string(),
            "Interpret{{0000000000001000}}"
        );
        assert_eq!(Terminal::ReturnToDispatch.to_string(), "ReturnToDispatch{}");
        assert_eq!(Terminal::PopRSBHint.to_string(), "PopRSBHint{}");
        assert_eq!(
            Terminal::link_block_fast(loc).to_string(),
            "LinkBlockFast{{0000000000001000}}"
        );
    }

    #[test]
    fn nested_rendering() {
        let a = LocationDescriptor::new(4);
        let b = LocationDescriptor::new(8);
        let term = Terminal::check_halt(Terminal::if_then_else(
            Cond::NE,
            Terminal::link_block(a),
            Terminal::check_bit(Terminal::PopRSBHint, Terminal::link_block_fast(b)),
        ));
        assert_eq!(
            term.to_string(),
            "CheckHalt{If{ne, LinkBlock{{0000000000000004}}, \
             CheckBit{PopRSBHint{}, LinkBlockFast{{0000000000000008}}}}}"
        );
    }

    #[test]
    fn interpret_detection_walks_the_tree() {
        let loc = LocationDescriptor::new(0);
        assert!(Terminal::check_halt(Terminal::interpret(loc)).interprets());
        assert!(!Terminal::check_halt(Terminal::ReturnToDispatch).interprets());
        assert!(Terminal::check_bit(Terminal::ReturnToDispatch, Terminal::interpret(loc)).interprets());
    }
}
