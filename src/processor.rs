//! Structures and functions for the LS-8 processor: memory, the register file, flags, and the
//! fetch-decode-execute loop.

use std::fmt::{Display, Formatter};
use std::io::{self, Stdout, Write};

use prettytable::{format as TableFormat, Table};
use tracing::{debug, warn};

use crate::address::*;
use crate::bytecode::{self, Operation};
use crate::error::{ProcessorError, Result};

// Flag format: 0b00000LGE
pub const FLAG_EQUAL   : u8 = 0b0000_0001;
pub const FLAG_GREATER : u8 = 0b0000_0010;
pub const FLAG_LESS    : u8 = 0b0000_0100;

/**
  An LS-8 processor. The processor owns its memory and its output sink; `PRN` writes to the
  sink, which is standard output unless the processor was built with `with_output`.

  The processor is either stopped or running. `run` starts it and only `HLT` stops it. The
  program counter and memory persist across runs, so calling `run` again after a halt resumes
  at the instruction following the `HLT`.
*/
pub struct Processor<W: Write = Stdout> {
  // Memory Stores
  memory    : [u8; MEMORY_SIZE],
  registers : [u8; REGISTER_COUNT],

  // Special purpose registers
  pc : usize, // Program counter
  ir : u8,    // Instruction register, the opcode most recently fetched
  fl : u8,    // Flags, set by CMP

  working : bool,
  output  : W,
}

impl Processor<Stdout> {
  pub fn new() -> Processor<Stdout> {
    Processor::with_output(io::stdout())
  }
}

impl Default for Processor<Stdout> {
  fn default() -> Self {
    Processor::new()
  }
}

impl<W: Write> Processor<W> {

  // region Display methods

  fn make_cell_table(
      name      : &str,
      cells     : &[u8],
      highlight : Option<usize>,
      start     : usize
    ) -> Table
  {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in cells.iter().enumerate() {
      match highlight == Some(i) {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{:02X}] =", name, i + start), format!("{:#04X}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{:02X}] =", name, i + start), format!("{:#04X}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  fn make_status_table(&self) -> Table {
    let state = match self.working {
      true  => "Running",
      false => "Stopped"
    };
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![r->"PC =", format!("{:#04X}", self.pc)]);
    table.add_row(row![r->"IR =", format!("{:#010b}", self.ir)]);
    table.add_row(row![r->"FL =", format!("{:#010b}", self.fl)]);
    table.add_row(row![r->"State =", state]);
    table
  }

  /**
    Renders the program counter, the three bytes starting at the program counter, and every
    register, all in hexadecimal. Bytes past the end of memory are shown as `--`.

    ```
    use ls8::Processor;

    let mut processor = Processor::with_output(Vec::new());
    processor.load(&[0b10000010, 0b00000001, 0b00001001]);
    assert_eq!(processor.trace(), "TRACE: 00 | 82 01 09 | 00 00 00 00 00 00 00 F4");
    ```
  */
  pub fn trace(&self) -> String {
    let byte_at = |address: usize| match self.memory.get(address) {
      Some(byte) => format!("{:02X}", byte),
      None => "--".to_string()
    };
    let registers =
      self.registers
          .iter()
          .map(|r| format!("{:02X}", r))
          .collect::<Vec<String>>()
          .join(" ");

    format!(
      "TRACE: {:02X} | {} {} {} | {}",
      self.pc,
      byte_at(self.pc),
      byte_at(self.pc + 1),
      byte_at(self.pc + 2),
      registers
    )
  }

  // endregion

  // region Low-level utility methods

  pub fn with_output(output: W) -> Processor<W> {
    let mut registers = [0; REGISTER_COUNT];
    registers[STACK_POINTER as usize] = STACK_START;

    Processor {
      memory    : [0; MEMORY_SIZE],
      registers,
      pc        : 0,
      ir        : 0,
      fl        : 0,
      working   : false,
      output,
    }
  }

  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn ir(&self) -> u8 {
    self.ir
  }

  pub fn flags(&self) -> u8 {
    self.fl
  }

  pub fn is_running(&self) -> bool {
    self.working
  }

  pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
    &self.registers
  }

  pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
    &self.memory
  }

  pub fn stack_pointer(&self) -> u8 {
    self.registers[STACK_POINTER as usize]
  }

  fn set_stack_pointer(&mut self, value: u8) {
    self.registers[STACK_POINTER as usize] = value;
  }

  pub fn output(&self) -> &W {
    &self.output
  }

  pub fn into_output(self) -> W {
    self.output
  }

  /// Converts the address to an index into its store, or fails if it is past the end.
  fn checked_idx(address: Address) -> Result<AddressNumberType> {
    match address.is_in_bounds() {
      true  => Ok(address.idx()),
      false => Err(ProcessorError::OutOfBounds(address))
    }
  }

  pub fn ram_read(&self, address: usize) -> Result<u8> {
    let idx = Self::checked_idx(Address::Memory(address))?;
    Ok(self.memory[idx])
  }

  pub fn ram_write(&mut self, address: usize, value: u8) -> Result<()> {
    let idx = Self::checked_idx(Address::Memory(address))?;
    self.memory[idx] = value;
    Ok(())
  }

  pub fn reg_read(&self, index: u8) -> Result<u8> {
    let idx = Self::checked_idx(Address::Register(index as usize))?;
    Ok(self.registers[idx])
  }

  pub fn reg_write(&mut self, index: u8, value: u8) -> Result<()> {
    let idx = Self::checked_idx(Address::Register(index as usize))?;
    self.registers[idx] = value;
    Ok(())
  }

  /// Reads the `k`th byte after the opcode at the program counter.
  fn operand(&self, k: usize) -> Result<u8> {
    self.ram_read(self.pc + k)
  }

  fn require_register(&self, index: u8) -> Result<()> {
    self.reg_read(index).map(|_| ())
  }

  /**
    Copies `program` into memory starting at address 0 and returns the number of bytes copied.

    A program larger than memory is not an error. A warning is logged and only the first
    `MEMORY_SIZE` bytes are loaded.
  */
  pub fn load(&mut self, program: &[u8]) -> usize {
    if program.len() > MEMORY_SIZE {
      warn!(
        "The program is too large: {} bytes will not fit in {} bytes of memory. Truncating.",
        program.len(),
        MEMORY_SIZE
      );
    }

    let size = program.len().min(MEMORY_SIZE);
    self.memory[..size].copy_from_slice(&program[..size]);
    debug!("Loaded {} bytes.", size);
    size
  }

  // endregion

  // region Execution

  /// Runs until `HLT`. Any error is fatal and aborts the loop immediately.
  pub fn run(&mut self) -> Result<()> {
    self.working = true;
    debug!("Running from {:#04X}.", self.pc);

    while self.working {
      self.step()?;
    }

    debug!("Halted at {:#04X}.", self.pc);
    Ok(())
  }

  /**
    Performs one fetch-decode-execute cycle.

    Bit 4 of the opcode tells whether the handler sets the program counter itself. When it is
    clear, the program counter is advanced past the opcode and the number of operands given by
    bits 6-7.
  */
  pub fn step(&mut self) -> Result<()> {
    self.ir = self.ram_read(self.pc)?;

    let operation =
      Operation::try_from(self.ir)
        .map_err(|_e| ProcessorError::UnsupportedOperation(self.ir))?;

    #[cfg(feature = "trace_execution")]
    tracing::trace!("{}", self.trace());

    self.execute(operation)?;

    if !bytecode::sets_pc(self.ir) {
      self.pc += bytecode::instruction_size(self.ir);
    }
    Ok(())
  }

  fn execute(&mut self, operation: Operation) -> Result<()> {
    match operation {
      Operation::Ldi  => self.ldi(),
      Operation::Hlt  => self.hlt(),
      Operation::Prn  => self.prn(),
      Operation::Mul  => self.mul(),
      Operation::Add  => self.add(),
      Operation::Push => self.push(),
      Operation::Pop  => self.pop(),
      Operation::Call => self.call(),
      Operation::Ret  => self.ret(),
      Operation::Cmp  => self.cmp(),
      Operation::Jeq  => self.jeq(),
      Operation::Jne  => self.jne(),
      Operation::Jmp  => self.jmp(),
    }
  }

  /**
    Arithmetic and comparison on two registers. Arithmetic wraps at 8 bits and stores the result
    in `reg_a`. Comparison sets exactly one flag.
  */
  pub fn alu(&mut self, operation: Operation, reg_a: u8, reg_b: u8) -> Result<()> {
    if !operation.is_alu() {
      return Err(ProcessorError::UnsupportedAluOperation(operation));
    }
    let a = self.reg_read(reg_a)?;
    let b = self.reg_read(reg_b)?;

    match operation {
      Operation::Add => self.reg_write(reg_a, a.wrapping_add(b)),
      Operation::Mul => self.reg_write(reg_a, a.wrapping_mul(b)),
      Operation::Cmp => {
        self.fl =
          if a > b {
            FLAG_GREATER
          } else if a < b {
            FLAG_LESS
          } else {
            FLAG_EQUAL
          };
        Ok(())
      }
      _ => Err(ProcessorError::UnsupportedAluOperation(operation))
    }
  }

  // endregion

  // region Instruction handlers

  /// Set the value of a register to an immediate.
  fn ldi(&mut self) -> Result<()> {
    let register = self.operand(1)?;
    let value = self.operand(2)?;
    self.reg_write(register, value)
  }

  fn hlt(&mut self) -> Result<()> {
    self.working = false;
    Ok(())
  }

  /// Print the numeric value stored in the given register.
  fn prn(&mut self) -> Result<()> {
    let value = self.reg_read(self.operand(1)?)?;
    writeln!(self.output, "{}", value)?;
    Ok(())
  }

  fn mul(&mut self) -> Result<()> {
    let reg_a = self.operand(1)?;
    let reg_b = self.operand(2)?;
    self.alu(Operation::Mul, reg_a, reg_b)
  }

  fn add(&mut self) -> Result<()> {
    let reg_a = self.operand(1)?;
    let reg_b = self.operand(2)?;
    self.alu(Operation::Add, reg_a, reg_b)
  }

  fn cmp(&mut self) -> Result<()> {
    let reg_a = self.operand(1)?;
    let reg_b = self.operand(2)?;
    self.alu(Operation::Cmp, reg_a, reg_b)
  }

  /**
    Decrements the stack pointer, then copies the register onto the top of the stack.

    Note: Pushing `R7` pushes the already decremented stack pointer.
  */
  fn push(&mut self) -> Result<()> {
    let register = self.operand(1)?;
    let top = self.stack_pointer().wrapping_sub(1);
    let value = match register == STACK_POINTER {
      true  => top,
      false => self.reg_read(register)?
    };

    self.set_stack_pointer(top);
    self.ram_write(top as usize, value)
  }

  /// Copies the top of the stack into the register, then increments the stack pointer.
  fn pop(&mut self) -> Result<()> {
    let register = self.operand(1)?;
    let value = self.ram_read(self.stack_pointer() as usize)?;

    self.reg_write(register, value)?;
    self.set_stack_pointer(self.stack_pointer().wrapping_add(1));
    Ok(())
  }

  /// Pushes the address of the next instruction and jumps to the address in the register.
  fn call(&mut self) -> Result<()> {
    let register = self.operand(1)?;
    self.require_register(register)?;

    let return_address = self.pc + 2;
    if return_address >= MEMORY_SIZE {
      return Err(ProcessorError::OutOfBounds(Address::Memory(return_address)));
    }

    let top = self.stack_pointer().wrapping_sub(1);
    self.set_stack_pointer(top);
    self.ram_write(top as usize, return_address as u8)?;

    self.pc = self.reg_read(register)? as usize;
    Ok(())
  }

  fn ret(&mut self) -> Result<()> {
    let return_address = self.ram_read(self.stack_pointer() as usize)?;
    self.set_stack_pointer(self.stack_pointer().wrapping_add(1));

    self.pc = return_address as usize;
    Ok(())
  }

  fn jmp(&mut self) -> Result<()> {
    let register = self.operand(1)?;
    self.pc = self.reg_read(register)? as usize;
    Ok(())
  }

  /**
    Jumps if the last comparison found the operands equal. The test is on the greater and less
    bits, `fl >> 1`, rather than on the equal bit.

    JEQ and JNE always own the program counter, so the branch not taken steps over the operand
    itself.
  */
  fn jeq(&mut self) -> Result<()> {
    match self.fl >> 1 == 0 {
      true  => self.jmp(),
      false => {
        self.pc += 2;
        Ok(())
      }
    }
  }

  /// Jumps if the last comparison found the operands unequal. See `jeq`.
  fn jne(&mut self) -> Result<()> {
    match self.fl >> 1 != 0 {
      true  => self.jmp(),
      false => {
        self.pc += 2;
        Ok(())
      }
    }
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl<W: Write> Display for Processor<W> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = Processor::<W>::make_cell_table("R", &self.registers, None, 0);

    // The stack occupies `sp..STACK_START`. It is empty once popped past its start.
    let sp = self.stack_pointer() as usize;
    let stack: &[u8] = match sp < STACK_START as usize {
      true  => &self.memory[sp..STACK_START as usize],
      false => &[]
    };
    let s_table = Processor::<W>::make_cell_table("RAM", stack, Some(0), sp);

    let mut combined_table = table!([r_table, s_table, self.make_status_table()]);

    combined_table.set_titles(row![ub->"Registers", ub->"Stack", ub->"Status"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}
