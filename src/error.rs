use std::path::PathBuf;

use thiserror::Error;

use crate::address::Address;
use crate::bytecode::Operation;

pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Fatal conditions raised while executing a program. None of them are recoverable.
#[derive(Debug, Error)]
pub enum ProcessorError {
  #[error("Unsupported operation: {0:08b}")]
  UnsupportedOperation(u8),
  #[error("Unsupported ALU operation: {0}")]
  UnsupportedAluOperation(Operation),
  #[error("Access out of bounds: {0}")]
  OutOfBounds(Address),
  #[error("could not write output")]
  Output(#[from] std::io::Error),
}

/// Problems turning a program image into bytes. Raised before anything executes.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("could not read {}", .path.display())]
  Io {
    path   : PathBuf,
    #[source]
    source : std::io::Error,
  },
  #[error("line {line}: `{text}` is not a binary literal")]
  InvalidLiteral {
    line : usize,
    text : String,
  },
  #[error("line {line}: {text} does not fit in a byte")]
  ValueOutOfRange {
    line : usize,
    text : String,
  },
}
