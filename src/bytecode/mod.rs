/*!

  The LS-8 uses an 8 bit word size. Memory is 256 bytes, and every address, register value, and
  operand is a single byte. Instructions are one, two, or three bytes long: the opcode followed
  by its operands. The sizes of instruction components are as follows:

  ```text
  Opcode:    8 bits
  Register:  8 bits (only 0-7 are valid)
  Immediate: 8 bits
  ```

  The opcode is self-describing. Its high bits give the operand count and whether the
  instruction sets the program counter, so the execution loop can advance the program counter
  without knowing anything else about the instruction.

  Programs are distributed as text, one byte per line in base 2. See `assembly`.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{parse_program, read_program};
pub use binary::{disassemble, instruction_size, operand_count, sets_pc, try_decode_instruction};
pub use instruction::{Instruction, Operation};
