/*!
  This module is responsible for the decoding of binary instructions. Every LS-8 instruction is
  one opcode byte followed by zero, one, or two operand bytes:

  ```text
  [OpCode:8]
  [OpCode:8][Operand:8]
  [OpCode:8][Operand:8][Operand:8]
  ```

  Because the opcode carries its own operand count, raw bytes can be sized without consulting
  the instruction table.
*/

use super::{Operation, Instruction};
use super::instruction::{OPERAND_COUNT_SHIFT, SETS_PC_BIT};

/// Bits 6-7 of an opcode byte.
pub fn operand_count(opcode: u8) -> u8 {
  opcode >> OPERAND_COUNT_SHIFT
}

/// Bit 4 of an opcode byte.
pub fn sets_pc(opcode: u8) -> bool {
  (opcode >> SETS_PC_BIT) & 1 == 1
}

/// Returns the size in BYTES of an instruction with the given opcode byte.
pub fn instruction_size(opcode: u8) -> usize {
  operand_count(opcode) as usize + 1
}

/**
  Decodes the instruction starting at `address`. Returns `None` if `address` is past the end of
  `memory`. An unrecognized opcode, or an instruction whose operands run off the end of memory,
  decodes as a single `Instruction::Data` byte.
*/
pub fn try_decode_instruction(memory: &[u8], address: usize) -> Option<Instruction> {
  let byte = *memory.get(address)?;
  let opcode = match Operation::try_from(byte) {
    Ok(opcode) => opcode,
    Err(_e) => return Some(Instruction::Data(byte))
  };

  let operand = |k: usize| memory.get(address + k).copied();
  let instruction =
    match opcode.arity() {
      0 => Instruction::Nullary(opcode),
      1 => match operand(1) {
        Some(operand) => Instruction::Unary { opcode, operand },
        None => Instruction::Data(byte)
      },
      _ => match (operand(1), operand(2)) {
        (Some(operand1), Some(operand2)) => Instruction::Binary { opcode, operand1, operand2 },
        _ => Instruction::Data(byte)
      }
    };

  Some(instruction)
}

/// Linear sweep disassembly of `memory[start..end]`, yielding each instruction with its address.
pub fn disassemble(memory: &[u8], start: usize, end: usize) -> Vec<(usize, Instruction)> {
  let end = end.min(memory.len());
  let mut listing = Vec::new();
  let mut address = start;

  while address < end {
    match try_decode_instruction(memory, address) {
      Some(instruction) => {
        listing.push((address, instruction));
        address += instruction.size();
      }
      None => break
    }
  }

  listing
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  // LDI R0,8; LDI R1,9; MUL R0,R1; PRN R0; HLT
  const MULT: [u8; 14] = [
    0b10000010, 0b00000000, 0b00001000,
    0b10000010, 0b00000001, 0b00001001,
    0b10100010, 0b00000000, 0b00000001,
    0b01000111, 0b00000000,
    0b00000001,
    0b00000000, 0b11111111,
  ];

  #[test]
  fn raw_bits_agree_with_operations(){
    for operation in Operation::iter() {
      assert_eq!(operand_count(operation.code()), operation.arity());
      assert_eq!(sets_pc(operation.code()), operation.sets_pc());
      assert_eq!(instruction_size(operation.code()), operation.arity() as usize + 1);
    }
  }

  #[test]
  fn decode(){
    assert_eq!(
      try_decode_instruction(&MULT, 0),
      Some(Instruction::Binary { opcode: Operation::Ldi, operand1: 0, operand2: 8 })
    );
    assert_eq!(
      try_decode_instruction(&MULT, 9),
      Some(Instruction::Unary { opcode: Operation::Prn, operand: 0 })
    );
    assert_eq!(try_decode_instruction(&MULT, 11), Some(Instruction::Nullary(Operation::Hlt)));
    assert_eq!(try_decode_instruction(&MULT, 13), Some(Instruction::Data(0xFF)));
    assert_eq!(try_decode_instruction(&MULT, 14), None);
  }

  #[test]
  fn truncated_instruction_is_data(){
    let memory = [Operation::Ldi.code(), 0];
    assert_eq!(try_decode_instruction(&memory, 0), Some(Instruction::Data(Operation::Ldi.code())));
  }

  #[test]
  fn disassemble_program(){
    let text: Vec<String> =
      disassemble(&MULT, 0, MULT.len())
        .iter()
        .map(|(address, instruction)| format!("{:02X}: {}", address, instruction))
        .collect();
    assert_eq!(
      text,
      vec![
        "00: LDI R0, 8".to_string(),
        "03: LDI R1, 9".to_string(),
        "06: MUL R0, R1".to_string(),
        "09: PRN R0".to_string(),
        "0B: HLT".to_string(),
        "0C: DB 0b00000000".to_string(),
        "0D: DB 0b11111111".to_string(),
      ]
    );
  }
}
