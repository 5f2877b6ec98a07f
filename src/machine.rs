use crate::dump::{MemoryDump, RegisterDump};
use crate::error::{Fault, RunError, ValidationError};
use crate::io::{InputPort, OutputPort};
use crate::memory::{Memory, Word, MEM_SIZE};
use crate::processor::{Processor, Termination};
use crate::validate;

/// Machine with the canonical memory size
pub type StdSimpletron = Simpletron<MEM_SIZE>;

/// The execution engine. Owns the memory image and the register set.
///
/// Instances are independent of each other and can be reused after a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simpletron<const S: usize> {
    processor: Processor,
    memory: Memory<S>,
}

impl<const S: usize> Default for Simpletron<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const S: usize> Simpletron<S> {
    /// Creates a machine with zeroed memory and reset registers
    pub fn new() -> Self {
        Self {
            processor: Processor::default(),
            memory: Memory::default(),
        }
    }

    /// Checks `program` without touching the machine. See [`validate::validate`].
    pub fn parse(&self, program: &[Word]) -> Result<(), ValidationError> {
        validate::validate::<S>(program)
    }

    /// Copies `program` into memory starting at address 0
    pub fn load(&mut self, program: &[Word]) -> Result<(), ValidationError> {
        log::info!("Loading program into memory");
        self.memory.load(program)
    }

    /// Puts the registers into their canonical state. Memory is left as is.
    pub fn reset(&mut self) {
        self.processor.reset();
    }

    /// Resets the registers and runs whatever is in memory until it halts,
    /// faults or runs past the end of memory.
    pub fn execute<I, O>(&mut self, mut input: I, mut output: O) -> Result<Termination, Fault>
    where
        I: InputPort,
        O: OutputPort,
    {
        self.reset();
        log::info!("Running");

        self.processor
            .execute_until_halt(&mut self.memory, &mut input, &mut output)
            .map_err(|fault| {
                log::error!("Execution faulted at {:02}: {}", self.processor.counter, fault);
                fault
            })
    }

    /// Loads `program` and executes it
    pub fn run<I, O>(&mut self, program: &[Word], input: I, output: O) -> Result<Termination, RunError>
    where
        I: InputPort,
        O: OutputPort,
    {
        self.load(program)?;
        Ok(self.execute(input, output)?)
    }

    pub fn registers(&self) -> &Processor {
        &self.processor
    }

    pub fn memory(&self) -> &Memory<S> {
        &self.memory
    }

    /// Human readable dump of registers and memory
    pub fn dump(&self) -> String {
        format!("{}\n{}", RegisterDump(&self.processor), MemoryDump(&self.memory))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;

    use super::*;
    use crate::io::ConsoleInput;
    use color_eyre::eyre::Result;

    const ADD_PROGRAM: [Word; 7] = [1007, 1008, 2007, 3008, 2109, 1109, 4300];

    thread_local! {
        static ERRORS: Cell<usize> = Cell::new(0);
    }

    /// Counts error records logged on the current thread
    struct ErrorCounter;

    impl log::Log for ErrorCounter {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Error
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                ERRORS.with(|errors| errors.set(errors.get() + 1));
            }
        }

        fn flush(&self) {}
    }

    static COUNTER: ErrorCounter = ErrorCounter;

    fn count_errors<F: FnOnce()>(f: F) -> usize {
        let _ = log::set_logger(&COUNTER);
        log::set_max_level(log::LevelFilter::Error);
        ERRORS.with(|errors| errors.set(0));
        f();
        ERRORS.with(|errors| errors.get())
    }

    #[test]
    fn adds_two_numbers() -> Result<()> {
        let mut machine = StdSimpletron::default();
        let mut output = Vec::new();

        machine.parse(&ADD_PROGRAM)?;
        let termination = machine.run(&ADD_PROGRAM, VecDeque::from(vec![5, 3]), &mut output)?;

        assert_eq!(termination, Termination::Halted);
        assert_eq!(output, vec![8]);
        assert_eq!(machine.registers().counter, MEM_SIZE as isize);
        assert_eq!(machine.registers().accumulator, 8);
        assert_eq!(&machine.memory().data[7..10], &[5, 3, 8]);

        Ok(())
    }

    #[test]
    fn console_input_takes_both_numbers_from_one_line() -> Result<()> {
        let mut machine = StdSimpletron::default();
        let mut output = Vec::new();
        let input = ConsoleInput::new("5 3\n".as_bytes(), std::io::sink());

        let termination = machine.run(&ADD_PROGRAM, input, &mut output)?;

        assert_eq!(termination, Termination::Halted);
        assert_eq!(output, vec![8]);

        Ok(())
    }

    #[test]
    fn load_round_trip() -> Result<()> {
        let mut machine = StdSimpletron::new();
        machine.load(&ADD_PROGRAM)?;

        assert_eq!(&machine.memory().data[..ADD_PROGRAM.len()], &ADD_PROGRAM);
        assert!(machine.memory().data[ADD_PROGRAM.len()..].iter().all(|&word| word == 0));

        Ok(())
    }

    #[test]
    fn too_large_program_is_never_executed() {
        let mut machine = StdSimpletron::new();
        let program = [1000; MEM_SIZE + 1];
        let mut input = VecDeque::from(vec![1]);

        assert!(machine.parse(&program).is_err());
        assert!(matches!(
            machine.run(&program, &mut input, Vec::new()),
            Err(RunError::Validation(ValidationError::ProgramTooLarge { .. }))
        ));
        assert_eq!(input.len(), 1);
        assert_eq!(machine, StdSimpletron::new());
    }

    #[test]
    fn falls_off_end_of_memory() -> Result<()> {
        let mut machine = StdSimpletron::new();
        // jump to the last address, which loads from 0
        let mut program = vec![4099];
        program.resize(MEM_SIZE, 0);
        program[MEM_SIZE - 1] = 2000;

        let termination = machine.run(&program, VecDeque::new(), Vec::new())?;

        assert_eq!(termination, Termination::EndOfMemory);
        assert_eq!(machine.registers().accumulator, 4099);
        assert_eq!(machine.registers().counter, MEM_SIZE as isize);

        Ok(())
    }

    #[test]
    fn divide_by_zero_faults_and_machine_is_reusable() -> Result<()> {
        let mut machine = StdSimpletron::new();
        // acc = mem[5]; acc /= mem[6]; halt
        let program = [2005, 3206, 4300, 0, 0, 12, 0];

        assert!(matches!(
            machine.run(&program, VecDeque::new(), Vec::new()),
            Err(RunError::Fault(Fault::DivisionByZero { address: 6 }))
        ));
        assert_eq!(machine.registers().accumulator, 12);
        assert_eq!(machine.registers().counter, 1);

        let program = [2005, 3206, 4300, 0, 0, 12, 4];
        assert_eq!(
            machine.run(&program, VecDeque::new(), Vec::new())?,
            Termination::Halted
        );
        assert_eq!(machine.registers().accumulator, 3);

        Ok(())
    }

    #[test]
    fn faults_are_logged_once() {
        let mut machine = StdSimpletron::new();

        let errors = count_errors(|| {
            assert!(matches!(
                machine.run(&[3205, 4300], VecDeque::new(), Vec::new()),
                Err(RunError::Fault(Fault::DivisionByZero { address: 5 }))
            ));
        });
        assert_eq!(errors, 1);

        let errors = count_errors(|| {
            assert!(matches!(
                machine.run(&[9900], VecDeque::new(), Vec::new()),
                Err(RunError::Fault(Fault::UnknownOpcode { op_code: 99, .. }))
            ));
        });
        assert_eq!(errors, 1);
    }

    #[test]
    fn counts_down_with_branches() -> Result<()> {
        let mut machine = StdSimpletron::new();
        let mut output = Vec::new();
        let mut program = vec![
            1120, // 00: write mem[20]
            2020, // 01: acc = mem[20]
            3121, // 02: acc -= mem[21]
            2120, // 03: mem[20] = acc
            4206, // 04: if acc == 0 goto 06
            4000, // 05: goto 00
            4300, // 06: halt
        ];
        program.resize(22, 0);
        program[20] = 3;
        program[21] = 1;
        machine.load(&program)?;

        assert_eq!(machine.execute(VecDeque::new(), &mut output)?, Termination::Halted);
        assert_eq!(output, vec![3, 2, 1]);
        assert_eq!(machine.memory().data[20], 0);

        Ok(())
    }

    #[test]
    fn unvalidated_program_faults_on_reserved_opcode() {
        let mut machine = StdSimpletron::new();
        let program = [3505];

        assert!(matches!(
            machine.parse(&program),
            Err(ValidationError::UnimplementedOpcode { address: 0, op_code: 35 })
        ));
        assert!(matches!(
            machine.run(&program, VecDeque::new(), Vec::new()),
            Err(RunError::Fault(Fault::UnimplementedOpcode { address: 0, op_code: 35 }))
        ));
    }

    #[test]
    fn independent_instances() -> Result<()> {
        let mut first = StdSimpletron::new();
        let second = StdSimpletron::new();

        first.run(&ADD_PROGRAM, VecDeque::from(vec![1, 2]), Vec::new())?;

        assert_ne!(&first, &second);
        assert_eq!(second, StdSimpletron::new());

        Ok(())
    }
}
