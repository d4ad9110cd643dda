//! ARM (A32) instruction table.

use super::{lookup, Matcher};
use crate::a32::translate::{branch, data_processing, exception, load_store, misc};

macro_rules! data_processing_forms {
    ($($name:literal => $op:literal, $s:literal;)*) => {
        [
            $(
                Matcher::new(concat!($name, " (imm)"), concat!("cccc001", $op, $s, "nnnnddddrrrrvvvvvvvv"), data_processing::imm),
                Matcher::new(concat!($name, " (reg)"), concat!("cccc000", $op, $s, "nnnnddddvvvvvrr0mmmm"), data_processing::reg),
                Matcher::new(concat!($name, " (rsr)"), concat!("cccc000", $op, $s, "nnnnddddssss0rr1mmmm"), data_processing::rsr),
            )*
        ]
    };
}

static DATA_PROCESSING: [Matcher; 48] = data_processing_forms! {
    "AND" => "0000", "S";
    "EOR" => "0001", "S";
    "SUB" => "0010", "S";
    "RSB" => "0011", "S";
    "ADD" => "0100", "S";
    "ADC" => "0101", "S";
    "SBC" => "0110", "S";
    "RSC" => "0111", "S";
    "TST" => "1000", "1";
    "TEQ" => "1001", "1";
    "CMP" => "1010", "1";
    "CMN" => "1011", "1";
    "ORR" => "1100", "S";
    "MOV" => "1101", "S";
    "BIC" => "1110", "S";
    "MVN" => "1111", "S";
};

static ARM_TABLE: &[Matcher] = &[
    // Hints
    Matcher::new("NOP", "cccc0011001000001111000000000000", exception::nop),
    Matcher::new("YIELD", "cccc0011001000001111000000000001", exception::yield_),
    Matcher::new("WFE", "cccc0011001000001111000000000010", exception::wfe),
    Matcher::new("WFI", "cccc0011001000001111000000000011", exception::wfi),
    Matcher::new("SEV", "cccc0011001000001111000000000100", exception::sev),

    // Exception generating
    Matcher::new("UDF", "111001111111------------1111----", exception::udf),
    Matcher::new("BKPT", "cccc00010010vvvvvvvvvvvv0111vvvv", exception::bkpt),
    Matcher::new("SVC", "cccc1111vvvvvvvvvvvvvvvvvvvvvvvv", exception::svc),

    // Branch
    Matcher::new("B", "cccc1010vvvvvvvvvvvvvvvvvvvvvvvv", branch::b),
    Matcher::new("BL", "cccc1011vvvvvvvvvvvvvvvvvvvvvvvv", branch::bl),
    Matcher::new("BX", "cccc000100101111111111110001mmmm", branch::bx),
    Matcher::new("BLX (reg)", "cccc000100101111111111110011mmmm", branch::blx_reg),

    // Miscellaneous
    Matcher::new("CLZ", "cccc000101101111dddd11110001mmmm", misc::clz),
    Matcher::new("MOVW", "cccc00110000vvvvddddvvvvvvvvvvvv", misc::movw),
    Matcher::new("MOVT", "cccc00110100vvvvddddvvvvvvvvvvvv", misc::movt),
    Matcher::new("MRS", "cccc000100001111dddd000000000000", misc::mrs),
    Matcher::new("MSR (reg)", "cccc00010010mm00111100000000nnnn", misc::msr_reg),
    Matcher::new("MSR (imm)", "cccc00110r10mmmm1111rrrrvvvvvvvv", misc::msr_imm),

    // Multiply
    Matcher::new("MUL", "cccc0000000Sdddd0000mmmm1001nnnn", misc::mul),
    Matcher::new("MLA", "cccc0000001Sddddaaaammmm1001nnnn", misc::mla),

    // Load/store with unprivileged access
    Matcher::new("LDRT", "cccc0100u011nnnnttttvvvvvvvvvvvv", load_store::unprivileged),
    Matcher::new("STRT", "cccc0100u010nnnnttttvvvvvvvvvvvv", load_store::unprivileged),
    Matcher::new("LDRBT", "cccc0100u111nnnnttttvvvvvvvvvvvv", load_store::unprivileged),
    Matcher::new("STRBT", "cccc0100u110nnnnttttvvvvvvvvvvvv", load_store::unprivileged),

    // Load/store immediate
    Matcher::new("LDR (imm)", "cccc010pu0w1nnnnttttvvvvvvvvvvvv", load_store::ldr_imm),
    Matcher::new("STR (imm)", "cccc010pu0w0nnnnttttvvvvvvvvvvvv", load_store::str_imm),
    Matcher::new("LDRB (imm)", "cccc010pu1w1nnnnttttvvvvvvvvvvvv", load_store::ldrb_imm),
    Matcher::new("STRB (imm)", "cccc010pu1w0nnnnttttvvvvvvvvvvvv", load_store::strb_imm),
];

/// Look up `word` in the ARM tables.
pub fn decode(word: u32) -> Option<&'static Matcher> {
    lookup(ARM_TABLE, word).or_else(|| lookup(&DATA_PROCESSING, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(word: u32) -> Option<&'static str> {
        decode(word).map(Matcher::name)
    }

    #[test]
    fn data_processing_forms() {
        assert_eq!(name(0xE3A0_1005), Some("MOV (imm)")); // mov r1, #5
        assert_eq!(name(0xE080_2001), Some("ADD (reg)")); // add r2, r0, r1
        assert_eq!(name(0xE090_2311), Some("ADD (rsr)")); // adds r2, r0, r1, lsl r3
        assert_eq!(name(0xE350_0000), Some("CMP (imm)")); // cmp r0, #0
        assert_eq!(name(0x01A0_0001), Some("MOV (reg)")); // moveq r0, r1
    }

    #[test]
    fn compare_without_s_is_not_data_processing() {
        assert_eq!(name(0xE10F_0000), Some("MRS")); // mrs r0, apsr
        assert_eq!(name(0xE12F_FF1E), Some("BX")); // bx lr
        assert_eq!(name(0xE16F_0F11), Some("CLZ")); // clz r0, r1
        assert_eq!(name(0xE340_1234), Some("MOVT")); // movt r1, #0x234
        assert_eq!(name(0xE320_F000), Some("NOP"));
        assert_eq!(name(0xE320_F003), Some("WFI"));
    }

    #[test]
    fn multiply_precedes_register_shifted_forms() {
        assert_eq!(name(0xE000_0291), Some("MUL")); // mul r0, r1, r2
        assert_eq!(name(0xE021_3291), Some("MLA")); // mla r1, r1, r2, r3
    }

    #[test]
    fn loads_and_branches() {
        assert_eq!(name(0xE591_0004), Some("LDR (imm)")); // ldr r0, [r1, #4]
        assert_eq!(name(0xE5C1_0000), Some("STRB (imm)")); // strb r0, [r1]
        assert_eq!(name(0xE4B1_0004), Some("LDRT"));
        assert_eq!(name(0xEAFF_FFFE), Some("B"));
        assert_eq!(name(0xEB00_0000), Some("BL"));
        assert_eq!(name(0xEF00_0000), Some("SVC"));
        assert_eq!(name(0xE7F0_00F0), Some("UDF"));
        assert_eq!(name(0xE120_0070), Some("BKPT"));
    }

    #[test]
    fn unallocated_words_do_not_decode() {
        assert_eq!(name(0xE6A0_0010), None); // media space
        assert_eq!(name(0xE800_0000), None); // block transfer
    }
}
