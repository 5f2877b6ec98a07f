//! Ports through which a running program talks to the outside world.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::memory::Word;

/// Blocking source of words, consumed by `READ`
pub trait InputPort {
    fn read_word(&mut self) -> io::Result<Word>;
}

/// Sink of words, written by `WRITE`
pub trait OutputPort {
    fn write_word(&mut self, word: Word) -> io::Result<()>;
}

impl InputPort for VecDeque<Word> {
    fn read_word(&mut self) -> io::Result<Word> {
        self.pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input is exhausted"))
    }
}

impl OutputPort for Vec<Word> {
    fn write_word(&mut self, word: Word) -> io::Result<()> {
        self.push(word);
        Ok(())
    }
}

impl<T: InputPort + ?Sized> InputPort for &mut T {
    fn read_word(&mut self) -> io::Result<Word> {
        (**self).read_word()
    }
}

impl<T: OutputPort + ?Sized> OutputPort for &mut T {
    fn write_word(&mut self, word: Word) -> io::Result<()> {
        (**self).write_word(word)
    }
}

/// Reads the next whitespace delimited token from `reader`.
///
/// Leading whitespace, line breaks included, is skipped. The whitespace which
/// ends the token is left in the reader, so the rest of a line stays
/// available for the next call. Returns `None` at the end of input.
pub fn read_token<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    let mut token = Vec::new();

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }

        let mut used = 0;
        let mut complete = false;
        for &byte in buf {
            if byte.is_ascii_whitespace() {
                if !token.is_empty() {
                    complete = true;
                    break;
                }
            } else {
                token.push(byte);
            }
            used += 1;
        }
        reader.consume(used);

        if complete {
            break;
        }
    }

    if token.is_empty() {
        return Ok(None);
    }

    String::from_utf8(token)
        .map(Some)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Terminal style input. Prompts with `> ` and reads one whitespace delimited
/// word per call, so several words may be typed on one line.
#[derive(Debug)]
pub struct ConsoleInput<R, W> {
    reader: R,
    prompt: W,
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, prompt: W) -> Self {
        Self { reader, prompt }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.prompt)
    }
}

impl<R: BufRead, W: Write> InputPort for ConsoleInput<R, W> {
    fn read_word(&mut self) -> io::Result<Word> {
        write!(self.prompt, "> ")?;
        self.prompt.flush()?;

        let token = read_token(&mut self.reader)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a word",
            )
        })?;

        token.parse::<Word>().map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("`{}` is not a word: {}", token, err),
            )
        })
    }
}

/// Terminal style output. Prints every word as `Output: +0008`.
#[derive(Debug)]
pub struct ConsoleOutput<W> {
    writer: W,
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputPort for ConsoleOutput<W> {
    fn write_word(&mut self, word: Word) -> io::Result<()> {
        writeln!(self.writer, "Output: {:+05}", word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn queue_runs_dry() {
        let mut input = VecDeque::from(vec![5]);
        assert_eq!(input.read_word().ok(), Some(5));
        assert_eq!(
            input.read_word().map_err(|err| err.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn console_reads_words() -> Result<()> {
        let mut console = ConsoleInput::new("\n  -42 \n17\n".as_bytes(), Vec::new());

        assert_eq!(console.read_word()?, -42);
        assert_eq!(console.read_word()?, 17);
        assert_eq!(
            console.read_word().map_err(|err| err.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );

        let (_, written) = console.into_inner();
        assert_eq!(String::from_utf8(written)?, "> > > ");

        Ok(())
    }

    #[test]
    fn console_reads_several_words_per_line() -> Result<()> {
        let mut console = ConsoleInput::new("5 3\n\t-7\n".as_bytes(), Vec::new());

        assert_eq!(console.read_word()?, 5);
        assert_eq!(console.read_word()?, 3);
        assert_eq!(console.read_word()?, -7);

        let (_, written) = console.into_inner();
        assert_eq!(String::from_utf8(written)?, "> > > ");

        Ok(())
    }

    #[test]
    fn tokens_leave_rest_of_line() -> Result<()> {
        let mut reader = "  1007 1008\n\n 4300".as_bytes();

        assert_eq!(read_token(&mut reader)?.as_deref(), Some("1007"));
        assert_eq!(reader, " 1008\n\n 4300".as_bytes());
        assert_eq!(read_token(&mut reader)?.as_deref(), Some("1008"));
        assert_eq!(read_token(&mut reader)?.as_deref(), Some("4300"));
        assert_eq!(read_token(&mut reader)?, None);

        Ok(())
    }

    #[test]
    fn console_rejects_garbage() {
        let mut console = ConsoleInput::new("abc\n".as_bytes(), io::sink());
        assert_eq!(
            console.read_word().map_err(|err| err.kind()),
            Err(io::ErrorKind::InvalidData)
        );

        let mut console = ConsoleInput::new("40000\n".as_bytes(), io::sink());
        assert!(console.read_word().is_err());
    }

    #[test]
    fn console_writes_words() -> Result<()> {
        let mut console = ConsoleOutput::new(Vec::new());
        console.write_word(8)?;
        console.write_word(-123)?;

        let written = console.into_inner();
        assert_eq!(String::from_utf8(written)?, "Output: +0008\nOutput: -0123\n");

        Ok(())
    }
}
