//! Print decoder and IR information for A32 instruction words.

use std::num::NonZeroUsize;
use std::process;

use bumpalo::Bump;
use clap::Parser;
use dynarec_frontend::a32::{get_name_of_instruction, A32LocationDescriptor, TranslationOptions};
use dynarec_frontend::core::{parse_address, parse_instruction_word, FrontendResult, TranslationSession};
use dynarec_frontend::ir::Block;

#[derive(Parser, Debug)]
#[command(
    name = "print_info",
    about = "Decode A32 instruction words and print the IR they translate to."
)]
struct Args {
    /// Instruction words in hexadecimal
    #[arg(value_name = "HEX", required = true)]
    words: Vec<String>,

    /// Guest address of the first word
    #[arg(long, value_name = "HEX", default_value = "0")]
    pc: String,

    /// Raise guest exceptions for YIELD, WFE, WFI and SEV
    #[arg(long, action = clap::ArgAction::SetTrue)]
    hook_hints: bool,

    /// Give some unpredictable encodings a defined behaviour
    #[arg(long, action = clap::ArgAction::SetTrue)]
    define_unpredictable: bool,

    /// Translate the words as one block even if there is only one
    #[arg(long, action = clap::ArgAction::SetTrue)]
    block: bool,

    /// Print translation statistics at the end
    #[arg(long, action = clap::ArgAction::SetTrue)]
    stats: bool,
}

fn run(args: &Args) -> FrontendResult<()> {
    let words = args
        .words
        .iter()
        .map(|text| parse_instruction_word(text))
        .collect::<FrontendResult<Vec<u32>>>()?;
    let location = A32LocationDescriptor::new(parse_address(&args.pc)?);

    let options = TranslationOptions {
        define_unpredictable_behaviour: args.define_unpredictable,
        hook_hint_instructions: args.hook_hints,
        max_instructions: NonZeroUsize::new(words.len()),
    };
    let arena = Bump::new();
    let session = TranslationSession::with_options(&arena, options);

    if words.len() == 1 && !args.block {
        let word = words[0];
        println!("Instruction: 0x{word:08x}");
        println!("Name: {}", get_name_of_instruction(word).unwrap_or("<null>"));

        let mut block = Block::new(location);
        let should_continue = session.translate_single(&mut block, location, word);
        println!("should_continue: {should_continue}");
        println!();
        print!("{}", session.dump(&block));
    } else {
        for (offset, &word) in words.iter().enumerate() {
            let pc = location.pc().wrapping_add(4 * offset as u32);
            println!(
                "{pc:08x}: 0x{word:08x} {}",
                get_name_of_instruction(word).unwrap_or("<null>")
            );
        }
        println!();

        let base = location.pc();
        let reader = |pc: u32| {
            let index = pc.wrapping_sub(base) as usize / 4;
            words.get(index).copied().unwrap_or(0)
        };
        let block = session.translate_block(location, reader);
        print!("{}", session.dump(&block));
    }

    if args.stats {
        println!();
        print!("{}", session.stats());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
