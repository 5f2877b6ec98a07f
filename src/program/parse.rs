//! Parses the plain text program format.
//!
//! A program is a sequence of words separated by whitespace. Words may be
//! spread over any number of lines, `#` starts a comment.
//!
//! ```text
//! # 7 + 8
//! 1007 1008   # read two numbers
//! 2007 3008
//! 2109 1109
//! 4300
//! ```

use std::borrow::Cow;
use std::convert::TryFrom;
use std::error;
use std::{fmt, str::Lines};

use crate::memory::Word;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidWord { radix: u32 },
    WordOutOfRange { value: i64 },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidWord { radix } => {
                write!(f, "failed to parse word with radix `{}`", radix)
            }
            ParseErrorKind::WordOutOfRange { value } => write!(
                f,
                "`{}` does not fit into a word ({}..={})",
                value,
                Word::MIN,
                Word::MAX
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

/// Every error found while parsing a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) while parsing program", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  {}", err)?;
        }
        Ok(())
    }
}

impl error::Error for ParseErrors {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Parses a signed integer with an optional `0b`, `0o` or `0x` prefix.
/// On failure the radix that was tried is returned.
pub(crate) fn parse_number(token: &str) -> std::result::Result<i64, u32> {
    let (negative, digits) = match token.as_bytes() {
        [b'-', ..] => (true, &token[1..]),
        [b'+', ..] => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, offset) = match digits.as_bytes() {
        [b'0', b'b', ..] => (2, 2),
        [b'0', b'o', ..] => (8, 2),
        [b'0', b'x', ..] => (16, 2),
        _ => (10, 0),
    };

    let digits = &digits[offset..];
    // `from_str_radix` would accept a second sign
    if digits.starts_with(&['+', '-'][..]) {
        return Err(radix);
    }

    let value = i64::from_str_radix(digits, radix).map_err(|_| radix)?;
    Ok(if negative { -value } else { value })
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    words: Vec<Word>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data`.
    pub fn new(data: &'a str) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            words: Vec::new(),
        }
    }

    /// Consumes `self` and tries to parse all words of the input.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Vec<Word>, ParseErrors> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(mut line_errors) = res {
                for err in &line_errors {
                    log::error!("{}", err);
                }
                errors.append(&mut line_errors);
            }
        }

        if errors.is_empty() {
            Ok(self.words)
        } else {
            Err(ParseErrors(errors))
        }
    }

    /// Tries to parse every word on the next line.
    fn parse_next_line(&mut self) -> Option<Result<(), Vec<ParseError>>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let code = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        };

        let mut errors = Vec::new();
        for token in code.split_whitespace() {
            match self.parse_word(token) {
                Ok(word) => self.words.push(word),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Some(Ok(()))
        } else {
            Some(Err(errors))
        }
    }

    /// Tries to parse a single whitespace delimited token.
    ///
    /// # Examples
    ///
    /// - `1007`
    /// - `-42`
    /// - `0x1a`
    fn parse_word(&self, token: &str) -> Result<Word> {
        let value = parse_number(token).map_err(|radix| {
            ParseError::new(
                ParseErrorKind::InvalidWord { radix },
                format!("`{}` is not a number", token),
                self.line_nr,
            )
        })?;

        log::trace!("[{}] Found word {}", self.line_nr, value);

        Word::try_from(value).map_err(|_| {
            ParseError::new::<_, &'static str>(
                ParseErrorKind::WordOutOfRange { value },
                None,
                self.line_nr,
            )
        })
    }
}
