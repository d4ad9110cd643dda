// This module maps raw A32 instruction words to translation handlers. Each table entry
// is a Matcher built from a 32-character bit pattern, most significant bit first: '0'
// and '1' are fixed bits, any other character names a field and matches anything. The
// pattern is folded into a mask/expected pair by a const fn, so a malformed pattern is
// a compile-time error rather than a run-time surprise. Lookup is a linear first-match
// scan, which makes table order significant: more specific encodings are listed before
// the general forms they overlap. Handlers receive the whole instruction word and
// extract their own fields with the bit helpers defined here.

//! A32 instruction decode tables.

pub mod arm;
pub mod vfp2;

use std::fmt;

use super::translate::ArmTranslatorVisitor;

/// Translation handler: emits IR for one instruction and reports whether
/// translation may continue with the next one.
pub type Handler = fn(&mut ArmTranslatorVisitor<'_>, u32) -> bool;

pub struct Matcher {
    name: &'static str,
    mask: u32,
    expected: u32,
    handler: Handler,
}

impl Matcher {
    pub const fn new(name: &'static str, pattern: &str, handler: Handler) -> Self {
        let bytes = pattern.as_bytes();
        assert!(bytes.len() == 32, "decode patterns are 32 characters long");

        let mut mask = 0u32;
        let mut expected = 0u32;
        let mut i = 0;
        while i < 32 {
            let bit = 1u32 << (31 - i);
            match bytes[i] {
                b'0' => mask |= bit,
                b'1' => {
                    mask |= bit;
                    expected |= bit;
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            name,
            mask,
            expected,
            handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    pub fn matches(&self, word: u32) -> bool {
        word & self.mask == self.expected
    }

    /// Run the handler. `word` must match this entry.
    pub fn call(&self, visitor: &mut ArmTranslatorVisitor<'_>, word: u32) -> bool {
        debug_assert!(self.matches(word), "{word:08x} does not match {}", self.name);
        (self.handler)(visitor, word)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.name)
            .field("mask", &format_args!("{:#010x}", self.mask))
            .field("expected", &format_args!("{:#010x}", self.expected))
            .finish()
    }
}

/// First entry in `table` matching `word`.
pub fn lookup(table: &'static [Matcher], word: u32) -> Option<&'static Matcher> {
    table.iter().find(|matcher| matcher.matches(word))
}

/// Abstract instruction lookup used by the translation loop.
pub trait InstructionDecoder {
    /// Decode against the specialised (floating point) tables.
    fn decode_specialized(&self, word: u32) -> Option<&'static Matcher>;

    /// Decode against the general instruction tables.
    fn decode(&self, word: u32) -> Option<&'static Matcher>;

    /// Specialised tables first, then the general ones.
    fn decode_any(&self, word: u32) -> Option<&'static Matcher> {
        self.decode_specialized(word).or_else(|| self.decode(word))
    }
}

/// The built-in ARM and VFPv2 tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArmDecoder;

impl InstructionDecoder for ArmDecoder {
    fn decode_specialized(&self, word: u32) -> Option<&'static Matcher> {
        vfp2::decode(word)
    }

    fn decode(&self, word: u32) -> Option<&'static Matcher> {
        arm::decode(word)
    }
}

/// Bits `hi..=lo` of `word`, shifted down.
pub(crate) const fn bits(word: u32, hi: u32, lo: u32) -> u32 {
    (word >> lo) & (u32::MAX >> (31 - (hi - lo)))
}

pub(crate) const fn bit(word: u32, n: u32) -> bool {
    (word >> n) & 1 != 0
}
