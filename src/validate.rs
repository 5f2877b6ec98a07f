//! Static check run on a program before it is loaded.
//!
//! Only the instruction encoding is checked. Operands are not inspected and
//! control flow is not followed, so a program which passes may still fault
//! at runtime.

use crate::error::ValidationError;
use crate::memory::Word;
use crate::processor::{decode, Opcode};

/// Checks every word of `program` and reports the first invalid one.
pub fn validate<const S: usize>(program: &[Word]) -> Result<(), ValidationError> {
    log::info!("Parsing {} words", program.len());

    if program.len() > S {
        let err = ValidationError::ProgramTooLarge {
            len: program.len(),
            capacity: S,
        };
        log::warn!("{}", err);
        return Err(err);
    }

    for (address, &instruction) in program.iter().enumerate() {
        check_instruction(address, instruction).map_err(|err| {
            log::warn!("{}", err);
            err
        })?;
    }

    log::info!("Program is valid");
    Ok(())
}

fn check_instruction(address: usize, instruction: Word) -> Result<(), ValidationError> {
    if instruction == 0 {
        return Err(ValidationError::InvalidInstructionZero { address });
    }

    let (op_code, _) = decode(instruction);
    match Opcode::lookup(op_code) {
        Some(Opcode::Implemented(_)) => Ok(()),
        Some(Opcode::Reserved(_)) => Err(ValidationError::UnimplementedOpcode { address, op_code }),
        None => Err(ValidationError::UnknownOpcode { address, op_code }),
    }
}
