//! Text dumps of the machine state for human inspection

use std::fmt;

use crate::memory::Memory;
use crate::processor::Processor;

const WORDS_PER_ROW: usize = 10;

/// Displays all registers, one per line
#[derive(Debug, Clone, Copy)]
pub struct RegisterDump<'a>(pub &'a Processor);

impl fmt::Display for RegisterDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.0;

        writeln!(f, "Registers:")?;
        writeln!(f, "  accumulator         : {:+05}", reg.accumulator)?;
        writeln!(f, "  instructionCounter  : {:>5}", reg.counter)?;
        writeln!(f, "  instructionRegister : {:+05}", reg.instruction)?;
        writeln!(f, "  operationCode       : {:>5}", reg.op_code)?;
        writeln!(f, "  operand             : {:>5}", reg.operand)
    }
}

/// Displays the memory as a table of ten words per row
#[derive(Debug, Clone, Copy)]
pub struct MemoryDump<'a, const S: usize>(pub &'a Memory<S>);

impl<const S: usize> fmt::Display for MemoryDump<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory\n  ")?;
        for column in 0..WORDS_PER_ROW.min(S) {
            write!(f, " {:>5}", column)?;
        }
        writeln!(f)?;

        for (row, words) in self.0.data.chunks(WORDS_PER_ROW).enumerate() {
            write!(f, "{:>2} ", row * WORDS_PER_ROW)?;
            for word in words {
                write!(f, "{:+05} ", word)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
