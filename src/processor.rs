use std::convert::TryFrom;

use crate::error::Fault;
use crate::io::{InputPort, OutputPort};
use crate::memory::{Memory, Word};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

/// Why the fetch-decode-execute loop stopped without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// A `HALT` instruction was executed
    Halted,
    /// The counter ran past the last memory address
    EndOfMemory,
}

/// Splits an instruction word into its opcode and operand.
///
/// Division truncates toward zero, so negative words yield a negative opcode
/// (and never match an opcode table entry).
pub fn decode(instruction: Word) -> (Word, Word) {
    (instruction / 100, instruction % 100)
}

/// The register set of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Result of arithmetic operations
    pub accumulator: Word,
    /// Address of the instruction executed last. Incremented before every fetch.
    pub counter: isize,
    /// Raw word fetched last
    pub instruction: Word,
    /// High-order digits of `instruction`
    pub op_code: Word,
    /// Low-order digits of `instruction`, used as an address
    pub operand: Word,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            accumulator: 0,
            counter: -1,
            instruction: 0,
            op_code: 0,
            operand: 0,
        }
    }
}

impl Processor {
    /// Resets all registers. The first fetch afterwards reads address 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn operand_address<const S: usize>(&self) -> Result<usize, Fault> {
        usize::try_from(self.operand)
            .ok()
            .filter(|address| *address < S)
            .ok_or(Fault::AddressOutOfRange {
                address: self.operand,
            })
    }

    fn load_operand<const S: usize>(&self, memory: &Memory<S>) -> Result<Word, Fault> {
        let address = self.operand_address::<S>()?;
        memory.read(address).ok_or(Fault::AddressOutOfRange {
            address: self.operand,
        })
    }

    fn store_operand<const S: usize>(&self, memory: &mut Memory<S>, value: Word) -> Result<(), Fault> {
        let address = self.operand_address::<S>()?;
        memory.write(address, value).ok_or(Fault::AddressOutOfRange {
            address: self.operand,
        })
    }

    /// Jumps so that the next fetch reads `operand`
    fn branch(&mut self) {
        self.counter = self.operand as isize - 1;
    }

    /// Executes a single decoded instruction.
    ///
    /// Returns `Ok(true)` if the loop should continue and `Ok(false)` after
    /// `HALT`.
    pub fn execute_instruction<const S: usize, I, O>(
        &mut self,
        instruction: Instruction,
        memory: &mut Memory<S>,
        input: &mut I,
        output: &mut O,
    ) -> Result<bool, Fault>
    where
        I: InputPort,
        O: OutputPort,
    {
        let operand = self.operand;

        match instruction {
            Instruction::READ => {
                let value = input.read_word().map_err(Fault::Input)?;
                self.store_operand(memory, value)?;

                debug!("READ {:02}: {}", operand, value);
            }
            Instruction::WRITE => {
                let value = self.load_operand(memory)?;
                output.write_word(value).map_err(Fault::Output)?;

                debug!("WRITE {:02}: {}", operand, value);
            }
            Instruction::LOAD => {
                self.accumulator = self.load_operand(memory)?;

                debug!("LOAD {:02}: {}", operand, self.accumulator);
            }
            Instruction::STORE => {
                self.store_operand(memory, self.accumulator)?;

                debug!("STORE {:02}: {}", operand, self.accumulator);
            }
            Instruction::ADD => {
                let value = self.load_operand(memory)?;
                let result = self.accumulator.wrapping_add(value);

                debug!("ADD {:02}: {} + {} = {}", operand, self.accumulator, value, result);
                self.accumulator = result;
            }
            Instruction::SUBTRACT => {
                let value = self.load_operand(memory)?;
                let result = self.accumulator.wrapping_sub(value);

                debug!("SUBTRACT {:02}: {} - {} = {}", operand, self.accumulator, value, result);
                self.accumulator = result;
            }
            Instruction::DIVIDE => {
                let value = self.load_operand(memory)?;
                if value == 0 {
                    return Err(Fault::DivisionByZero { address: operand });
                }
                let result = self.accumulator.wrapping_div(value);

                debug!("DIVIDE {:02}: {} / {} = {}", operand, self.accumulator, value, result);
                self.accumulator = result;
            }
            Instruction::MULTIPLY => {
                let value = self.load_operand(memory)?;
                let result = self.accumulator.wrapping_mul(value);

                debug!("MULTIPLY {:02}: {} * {} = {}", operand, self.accumulator, value, result);
                self.accumulator = result;
            }
            Instruction::BRANCH => {
                self.branch();

                debug!("BRANCH {:02}", operand);
            }
            Instruction::BRANCHNEG => {
                let taken = self.accumulator < 0;
                if taken {
                    self.branch();
                }

                debug!("BRANCHNEG {:02}: {} (taken: {})", operand, self.accumulator, taken);
            }
            Instruction::BRANCHZERO => {
                let taken = self.accumulator == 0;
                if taken {
                    self.branch();
                }

                debug!("BRANCHZERO {:02}: {} (taken: {})", operand, self.accumulator, taken);
            }
            Instruction::HALT => {
                self.counter = S as isize; // forces the bound check to fail

                debug!("HALT");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Runs one fetch-decode-execute cycle.
    ///
    /// Returns `Some` once the loop has to stop.
    pub fn execute<const S: usize, I, O>(
        &mut self,
        memory: &mut Memory<S>,
        input: &mut I,
        output: &mut O,
    ) -> Result<Option<Termination>, Fault>
    where
        I: InputPort,
        O: OutputPort,
    {
        self.counter += 1;
        let address = match usize::try_from(self.counter) {
            Ok(address) if address < S => address,
            _ => return Ok(Some(Termination::EndOfMemory)),
        };

        // 1. fetch
        self.instruction = memory.read(address).ok_or(Fault::AddressOutOfRange {
            address: self.counter as Word,
        })?;

        // 2. decode
        let (op_code, operand) = decode(self.instruction);
        self.op_code = op_code;
        self.operand = operand;

        let instruction = match Opcode::lookup(op_code) {
            Some(Opcode::Implemented(instruction)) => instruction,
            Some(Opcode::Reserved(_)) => {
                return Err(Fault::UnimplementedOpcode { address, op_code });
            }
            None => {
                return Err(Fault::UnknownOpcode {
                    address,
                    instruction: self.instruction,
                    op_code,
                });
            }
        };

        // 3. execute
        if self.execute_instruction(instruction, memory, input, output)? {
            Ok(None)
        } else {
            Ok(Some(Termination::Halted))
        }
    }

    /// Run program until a termination condition is met
    pub fn execute_until_halt<const S: usize, I, O>(
        &mut self,
        memory: &mut Memory<S>,
        input: &mut I,
        output: &mut O,
    ) -> Result<Termination, Fault>
    where
        I: InputPort,
        O: OutputPort,
    {
        loop {
            if let Some(termination) = self.execute(memory, input, output)? {
                info!(
                    "Program terminated ({:?}). Accumulator: {:+05}",
                    termination, self.accumulator
                );
                return Ok(termination);
            }
        }
    }
}

macro_rules! opcodes {
    (
        $( #[doc = $enum_doc:expr] )+
        $enum:ident {
            $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+
        }
    ) => {
        $( #[doc = $enum_doc] )+
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum $enum {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl $enum {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for $enum {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

opcodes! {
    /// Instructions the machine can execute.
    /// Every instruction takes a memory address as operand.
    Instruction {
        /// Read a word from the input into memory
        READ = 10,
        /// Write a word from memory to the output
        WRITE = 11,
        /// Load a word from memory into the accumulator
        LOAD = 20,
        /// Store the accumulator into memory
        STORE = 21,
        /// Add a word from memory to the accumulator
        ADD = 30,
        /// Subtract a word from memory from the accumulator
        SUBTRACT = 31,
        /// Divide the accumulator by a word from memory
        DIVIDE = 32,
        /// Multiply the accumulator by a word from memory
        MULTIPLY = 33,
        /// Jump to an address
        BRANCH = 40,
        /// Jump to an address if the accumulator is negative
        BRANCHNEG = 41,
        /// Jump to an address if the accumulator is zero
        BRANCHZERO = 42,
        /// Stop the execution of the program
        HALT = 43,
    }
}

opcodes! {
    /// Opcodes which are part of the instruction set but not implemented.
    Reserved {
        /// Print a line break
        NEWLINE = 12,
        /// Remainder of the accumulator divided by a word from memory
        REMAINDER = 34,
        /// Raise the accumulator to the power of a word from memory
        EXPONENT = 35,
    }
}

/// Result of looking up an opcode in the opcode table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Implemented(Instruction),
    Reserved(Reserved),
}

impl Opcode {
    /// Looks up `op_code`. `None` means the opcode does not exist at all.
    pub fn lookup(op_code: Word) -> Option<Self> {
        let byte = u8::try_from(op_code).ok()?;

        if let Ok(instruction) = Instruction::try_from(byte) {
            Some(Opcode::Implemented(instruction))
        } else {
            Reserved::try_from(byte).ok().map(Opcode::Reserved)
        }
    }
}
