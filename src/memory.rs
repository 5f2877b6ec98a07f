use crate::error::ValidationError;

/// One signed machine word, the unit of memory and registers
pub type Word = i16;

/// Number of words in the canonical memory image
pub const MEM_SIZE: usize = 100;

/// Default memory
pub type StdMem = Memory<MEM_SIZE>;

/// Emulates the word-addressable memory holding both code and data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Word; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory with zeroes
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a word from the memory. Returns `None` if `address` is outside
    /// of the memory.
    pub fn read(&self, address: usize) -> Option<Word> {
        self.data.get(address).copied()
    }

    /// Writes a word to the memory. Returns `None` if `address` is outside
    /// of the memory.
    pub fn write(&mut self, address: usize, value: Word) -> Option<()> {
        let cell = self.data.get_mut(address)?;
        *cell = value;
        Some(())
    }

    /// Writes an array of words to the memory starting at `position`.
    ///
    /// Panics if the words do not fit.
    pub fn write_array(&mut self, position: usize, data: &[Word]) {
        self.data[position..position + data.len()].copy_from_slice(data);
    }

    /// Copies `program` into memory starting at address 0. Words past the end
    /// of the program keep their previous value.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ProgramTooLarge`] if the program has more words than
    /// the memory. Nothing is written in that case.
    pub fn load(&mut self, program: &[Word]) -> Result<(), ValidationError> {
        if program.len() > S {
            return Err(ValidationError::ProgramTooLarge {
                len: program.len(),
                capacity: S,
            });
        }

        self.write_array(0, program);
        log::debug!("Loaded {} words into memory", program.len());

        Ok(())
    }
}

/// Writes a block of words directly into the memory
#[macro_export]
macro_rules! write_words {
    ( $mem:ident : $pos:expr => $( $word:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $word as $crate::memory::Word,
            )+
        ]);
    };
}
