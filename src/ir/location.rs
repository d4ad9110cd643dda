//! Opaque location descriptor shared by every guest front end.
//!
//! The IR does not know how a front end packs PC and mode bits; it only
//! needs a hashable key to name block entry points and exits.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationDescriptor(u64);

impl LocationDescriptor {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:016x}}}", self.0)
    }
}
