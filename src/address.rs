//! An `Either` type that holds the address of either a memory cell or a register, together with
//! the fixed dimensions of the machine.

use std::fmt::{Display, Formatter};

/// Memory is a flat store of bytes addressed `0..MEMORY_SIZE`.
pub const MEMORY_SIZE: usize = 256;
/// General purpose registers `R0` through `R7`.
pub const REGISTER_COUNT: usize = 8;
/// `R7` holds the address of the top of the stack by convention.
pub const STACK_POINTER: u8 = 7;
/// The stack grows down from here. The bytes above it are reserved.
pub const STACK_START: u8 = 0xF4;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Address {
  /// An index into RAM.
  Memory(AddressNumberType),
  /// An index into the register file.
  Register(AddressNumberType),
}

impl Address {
  /// Converts the address to an index into the corresponding store.
  pub fn idx(&self) -> AddressNumberType {
    match self {
      | Address::Memory(i)
      | Address::Register(i) => *i,
    }
  }

  /// The number of cells in the store this address points into.
  pub fn limit(&self) -> AddressNumberType {
    match self {
      Address::Memory(_) => MEMORY_SIZE,
      Address::Register(_) => REGISTER_COUNT,
    }
  }

  pub fn is_in_bounds(&self) -> bool {
    self.idx() < self.limit()
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Address::Memory(i) => {
        write!(f, "RAM[{:#04X}]", i)
      },
      Address::Register(i) => {
        write!(f, "R{}", i)
      }
    }
  }
}
