use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

/**
  Opcodes of the processor.

  Unlike an enum whose discriminants are consecutive naturals, each variant here is pinned to
  its machine encoding. The opcode byte itself describes the instruction format:

  ```text
  AABCDDDD
  AA   - number of operands that follow the opcode
  B    - 1 if the instruction sets the program counter itself
  C    - 1 if the instruction is carried out by the ALU
  DDDD - instruction identifier
  ```

  Consequently the bit patterns below are significant.
  Bit-dependencies:

  ```text
  Operation::arity()
  Operation::sets_pc()
  Operation::is_alu()
  binary::instruction_size()
  Processor::step()
  Processor::alu()
  ```
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Operation {
  // No operands //
  Hlt  = 0b0000_0001, // HLT
  Ret  = 0b0001_0001, // RET

  // One operand //
  Push = 0b0100_0101, // PUSH register
  Pop  = 0b0100_0110, // POP register
  Prn  = 0b0100_0111, // PRN register
  Call = 0b0101_0000, // CALL register
  Jmp  = 0b0101_0100, // JMP register
  Jeq  = 0b0101_0101, // JEQ register
  Jne  = 0b0101_0110, // JNE register

  // Two operands //
  Ldi  = 0b1000_0010, // LDI register, immediate
  Add  = 0b1010_0000, // ADD register, register
  Mul  = 0b1010_0010, // MUL register, register
  Cmp  = 0b1010_0111, // CMP register, register
}

pub const OPERAND_COUNT_SHIFT: u8 = 6;
pub const SETS_PC_BIT: u8 = 4;
pub const ALU_BIT: u8 = 5;

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The number of operand bytes following the opcode.
  pub fn arity(&self) -> u8 {
    self.code() >> OPERAND_COUNT_SHIFT
  }

  /// Whether the handler is responsible for the program counter, in which case the execution
  /// loop must not advance it.
  pub fn sets_pc(&self) -> bool {
    (self.code() >> SETS_PC_BIT) & 1 == 1
  }

  pub fn is_alu(&self) -> bool {
    (self.code() >> ALU_BIT) & 1 == 1
  }

  /// Whether the second operand is an immediate value rather than a register index.
  pub fn has_immediate(&self) -> bool {
    *self == Operation::Ldi
  }
}

/// Holds the decoded components of an instruction. As such, it enumerates the possible
/// operand combinations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [OpCode:8][Register:8][Register or Immediate:8]
  Binary {
    opcode   : Operation,
    operand1 : u8,
    operand2 : u8
  },
  /// [OpCode:8][Register:8]
  Unary {
    opcode  : Operation,
    operand : u8
  },
  /// [OpCode:8]
  Nullary(Operation),
  /// A byte that is not an opcode.
  Data(u8),
}

impl Instruction {
  /// Size in bytes, including the opcode.
  pub fn size(&self) -> usize {
    match self {
      Instruction::Binary { .. } => 3,
      Instruction::Unary { .. } => 2,
      | Instruction::Nullary(_)
      | Instruction::Data(_) => 1,
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::Binary { opcode, operand1, operand2 } if opcode.has_immediate() => {
        write!(f, "{} R{}, {}", opcode, operand1, operand2)
      }

      Instruction::Binary { opcode, operand1, operand2 } => {
        write!(f, "{} R{}, R{}", opcode, operand1, operand2)
      }

      Instruction::Unary { opcode, operand } => {
        write!(f, "{} R{}", opcode, operand)
      }

      Instruction::Nullary(opcode) => {
        write!(f, "{}", opcode)
      }

      Instruction::Data(byte) => {
        write!(f, "DB {:#010b}", byte)
      }

    }
  }
}
