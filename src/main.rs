use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ls8::bytecode::{disassemble, read_program};
use ls8::logging::setup_logger;
use ls8::Processor;

/// Runs an LS-8 program image.
#[derive(Parser, Debug)]
#[command(name = "ls8", version, about)]
struct Args {
  /// Program image: one byte per line in base 2, `#` starts a comment.
  program: PathBuf,

  /// Log the processor state before every instruction. Needs the `trace_execution` feature
  /// (on by default); without it this only prints a warning.
  #[arg(long)]
  trace: bool,

  /// Print the program listing and final machine state to stderr.
  #[arg(long)]
  dump: bool,
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  setup_logger(args.trace);

  let program = read_program(&args.program)?;

  let mut processor = Processor::new();
  let size = processor.load(&program);
  let result = processor.run();

  if args.dump {
    for (address, instruction) in disassemble(processor.memory(), 0, size) {
      eprintln!("{:02X}: {}", address, instruction);
    }
    eprintln!("{}", processor);
  }

  result.with_context(|| {
    format!("{} aborted at {:#04X}", args.program.display(), processor.pc())
  })
}
