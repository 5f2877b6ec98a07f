use std::{error, fmt, io};

use crate::memory::Word;

/// Reasons a program is rejected before it is executed.
///
/// Produced by [`crate::validate::validate`] and [`crate::memory::Memory::load`].
/// Only the first failure found is ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    ProgramTooLarge { len: usize, capacity: usize },
    InvalidInstructionZero { address: usize },
    UnknownOpcode { address: usize, op_code: Word },
    UnimplementedOpcode { address: usize, op_code: Word },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ProgramTooLarge { len, capacity } => write!(
                f,
                "program too large to fit in memory ({} words, capacity {})",
                len, capacity
            ),
            ValidationError::InvalidInstructionZero { address } => {
                write!(f, "invalid instruction `0` at address {:02}", address)
            }
            ValidationError::UnknownOpcode { address, op_code } => write!(
                f,
                "invalid instruction at address {:02}: unknown opcode `{}`",
                address, op_code
            ),
            ValidationError::UnimplementedOpcode { address, op_code } => write!(
                f,
                "instruction at address {:02} not implemented yet: opcode `{}`",
                address, op_code
            ),
        }
    }
}

impl error::Error for ValidationError {}

/// Runtime errors which stop the fetch-decode-execute loop.
///
/// The engine stays usable after a fault; the next `execute` or `run` resets
/// the registers.
#[derive(Debug)]
pub enum Fault {
    DivisionByZero { address: Word },
    UnknownOpcode { address: usize, instruction: Word, op_code: Word },
    UnimplementedOpcode { address: usize, op_code: Word },
    AddressOutOfRange { address: Word },
    Input(io::Error),
    Output(io::Error),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::DivisionByZero { address } => {
                write!(f, "attempt to divide by zero at address {:02}", address)
            }
            Fault::UnknownOpcode {
                address,
                instruction,
                op_code,
            } => write!(
                f,
                "unknown opcode `{}` in instruction `{:+05}` at address {:02}",
                op_code, instruction, address
            ),
            Fault::UnimplementedOpcode { address, op_code } => write!(
                f,
                "opcode `{}` at address {:02} is not implemented",
                op_code, address
            ),
            Fault::AddressOutOfRange { address } => {
                write!(f, "memory has no address `{}`", address)
            }
            Fault::Input(err) => write!(f, "failed to read from input: {}", err),
            Fault::Output(err) => write!(f, "failed to write to output: {}", err),
        }
    }
}

impl error::Error for Fault {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Fault::Input(err) | Fault::Output(err) => Some(err),
            _ => None,
        }
    }
}

/// Anything that can go wrong while loading and executing a program.
#[derive(Debug)]
pub enum RunError {
    Validation(ValidationError),
    Fault(Fault),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Validation(err) => write!(f, "failed to load program: {}", err),
            RunError::Fault(err) => write!(f, "execution faulted: {}", err),
        }
    }
}

impl error::Error for RunError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            RunError::Validation(err) => Some(err),
            RunError::Fault(err) => Some(err),
        }
    }
}

impl From<ValidationError> for RunError {
    fn from(err: ValidationError) -> Self {
        RunError::Validation(err)
    }
}

impl From<Fault> for RunError {
    fn from(err: Fault) -> Self {
        RunError::Fault(err)
    }
}
