//! An emulator for the LS-8, a small 8-bit processor with eight registers, a downward growing
//! stack, and a self-describing instruction encoding.

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod error;
pub mod logging;
pub mod processor;

pub use error::{LoadError, ProcessorError};
pub use processor::Processor;
