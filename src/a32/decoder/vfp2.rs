//! VFPv2 instruction table.
//!
//! Only conditional encodings live here; the unconditional space
//! (`cond == 0b1111`) never decodes as VFP.

use super::{lookup, Matcher};
use crate::a32::translate::vfp;

static VFP2_TABLE: &[Matcher] = &[
    // Data processing
    Matcher::new("VADD", "cccc11100D11nnnndddd101zN0M0mmmm", vfp::vadd),
    Matcher::new("VSUB", "cccc11100D11nnnndddd101zN1M0mmmm", vfp::vsub),
    Matcher::new("VMUL", "cccc11100D10nnnndddd101zN0M0mmmm", vfp::vmul),
    Matcher::new("VABS", "cccc11101D110000dddd101z11M0mmmm", vfp::vabs),
    Matcher::new("VNEG", "cccc11101D110001dddd101z01M0mmmm", vfp::vneg),

    // Register transfer
    Matcher::new("VMOV (core to single)", "cccc11100000nnnntttt1010N0010000", vfp::vmov_to_single),
    Matcher::new("VMOV (single to core)", "cccc11100001nnnntttt1010N0010000", vfp::vmov_from_single),
];

/// Look up `word` in the VFP tables.
pub fn decode(word: u32) -> Option<&'static Matcher> {
    if word >> 28 == 0b1111 {
        return None;
    }
    lookup(VFP2_TABLE, word)
}
