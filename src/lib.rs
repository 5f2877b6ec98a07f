//! Simpletron: a tiny accumulator machine with a hundred words of memory.
//!
//! Instructions are signed words of the form `opcode * 100 + operand`.

pub mod dump;
pub mod error;
pub mod io;
pub mod machine;
pub mod memory;
pub mod processor;
pub mod program;
pub mod validate;

pub use error::{Fault, RunError, ValidationError};
pub use machine::{Simpletron, StdSimpletron};
pub use processor::Termination;
pub use program::Program;
