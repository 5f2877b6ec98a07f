use std::convert::TryFrom;
use std::fs;
use std::io::{BufRead, Write};
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::io::read_token;
use crate::memory::Word;

pub mod parse;

use parse::{parse_number, ParseErrors, Parser};

/// Ends interactive program entry. Lies outside of the word range, so it can
/// never be mistaken for a program word.
pub const SENTINEL: i64 = -99999;

const BANNER: &str = "\
*** ------------------------------------------------------------------- ***
***                      Welcome to Simpletron!                         ***
*** ------------------------------------------------------------------- ***
*** Please enter your program one instruction (or data word) at a time. ***
*** I will type the location number and a question mark (?).            ***
*** You then type the word for that location.                           ***
*** Type the sentinel -99999 to stop entering your program.             ***
*** ------------------------------------------------------------------- ***
";

/// An ordered list of words, ready to be validated and loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program(pub Vec<Word>);

impl Deref for Program {
    type Target = [Word];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Word>> for Program {
    fn from(words: Vec<Word>) -> Self {
        Program(words)
    }
}

impl FromStr for Program {
    type Err = ParseErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse().map(Program)
    }
}

impl Program {
    /// Reads and parses a program file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Reading program from {}", path.display());

        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not open file '{}'", path.display()))?;

        data.parse::<Program>()
            .wrap_err_with(|| format!("Could not parse file '{}'", path.display()))
    }

    /// Prompts for one word per location on `output` and reads them from
    /// `input` until the [`SENTINEL`] is entered or the input ends.
    ///
    /// Words are whitespace delimited, so several may be typed on one line.
    /// Anything after the sentinel stays in `input` for the running program.
    pub fn read_interactive<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Self> {
        output.write_all(BANNER.as_bytes())?;

        let mut words = Vec::new();
        loop {
            write!(output, "   {:04} ? ", words.len())?;
            output.flush()?;

            let token = match read_token(input)? {
                Some(token) => token,
                None => {
                    log::debug!("Input closed, ending program entry");
                    break;
                }
            };

            let value = parse_number(&token)
                .map_err(|radix| eyre!("`{}` is not a number (radix {})", token, radix))?;
            if value == SENTINEL {
                break;
            }

            let word = Word::try_from(value).wrap_err_with(|| {
                format!("`{}` at location {:04} does not fit into a word", value, words.len())
            })?;
            words.push(word);
        }

        log::info!("Read {} words", words.len());
        Ok(Program(words))
    }
}
