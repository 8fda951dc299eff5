use crate::errors::{CssError, CssResult};
use serde::Serialize;
use std::char::REPLACEMENT_CHARACTER;
use std::fmt;
use std::fmt::{Debug, Formatter};

pub const CHAR_LF: char = '\u{000A}';
pub const CHAR_CR: char = '\u{000D}';
pub const CHAR_FF: char = '\u{000C}';
pub const CHAR_NULL: char = '\u{0000}';

/// Encoding defines the way the byte buffer is read, as what defines a "character". Only UTF-8 is
/// supported, the others exist so a host can say what it detected and get a proper error back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Stream is of UTF8 characters
    #[default]
    UTF8,
    /// Stream is of single byte ASCII chars (0-255)
    ASCII,
    // Stream consists of 16-bit UTF characters (Little Endian)
    UTF16LE,
    // Stream consists of 16-bit UTF characters (Big Endian)
    UTF16BE,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::UTF8 => "utf-8",
            Encoding::ASCII => "ascii",
            Encoding::UTF16LE => "utf-16le",
            Encoding::UTF16BE => "utf-16be",
        };
        write!(f, "{name}")
    }
}

/// Defines a single element in the code point stream. This is either a unicode scalar value, or
/// the end of the stream. Eof never equals any valid scalar value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodePoint {
    /// Standard unicode scalar value
    Ch(char),
    /// Stream buffer empty
    Eof,
}

use CodePoint::{Ch, Eof};

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ch(ch) => write!(f, "{ch}"),
            Eof => write!(f, "EOF"),
        }
    }
}

impl CodePoint {
    /// Returns true when the code point is a newline. CR and FF never reach this point since
    /// they are converted during preprocessing.
    pub fn is_newline(&self) -> bool {
        matches!(self, Ch(CHAR_LF))
    }

    /// Returns true for newline, tab or space
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Ch(CHAR_LF | '\t' | ' '))
    }

    pub fn is_digit(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_digit())
    }

    pub fn is_hex_digit(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_hexdigit())
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Eof)
    }

    /// Returns true when the code point is exactly the given char
    pub fn is(&self, c: char) -> bool {
        *self == Ch(c)
    }
}

/// Decodes the given bytes into preprocessed code points.
///
/// Decoding is strict: the first invalid UTF-8 sequence aborts the operation. Any encoding other
/// than UTF-8 is rejected.
pub fn decode(bytes: &[u8], encoding: Encoding) -> CssResult<Vec<char>> {
    if encoding != Encoding::UTF8 {
        return Err(CssError::UnsupportedEncoding(encoding.to_string()));
    }

    let text = std::str::from_utf8(bytes).map_err(|e| CssError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;

    Ok(preprocess(text.chars()))
}

/// [Input preprocessing](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)
///
/// CR, FF and CR LF pairs become a single LF. NUL becomes U+FFFD. Surrogates cannot be
/// represented by `char`, so any that were in the source have already been rejected or
/// replaced by the decoder.
pub fn preprocess(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut out = Vec::new();
    let mut chars = chars.peekable();

    while let Some(c) = chars.next() {
        match c {
            CHAR_CR => {
                if chars.peek() == Some(&CHAR_LF) {
                    chars.next();
                }
                out.push(CHAR_LF);
            }
            CHAR_FF => out.push(CHAR_LF),
            CHAR_NULL => out.push(REPLACEMENT_CHARACTER),
            c => out.push(c),
        }
    }

    out
}

/// A fully decoded sequence of code points with a read position. Looking past the end of the
/// stream returns `Eof`.
pub struct CodePointStream {
    /// Preprocessed code points
    chars: Vec<char>,
    /// Position of the next code point to read
    position: usize,
    /// Positions where each line starts. The first line always starts at 0.
    line_starts: Vec<usize>,
    /// Start position of the stream (this does not have to be 1/1)
    start_location: Location,
}

impl CodePointStream {
    /// Creates a new stream from already preprocessed code points
    #[must_use]
    pub fn new(chars: Vec<char>, start_location: Location) -> Self {
        let mut line_starts = vec![0];
        for (idx, c) in chars.iter().enumerate() {
            if *c == CHAR_LF {
                line_starts.push(idx + 1);
            }
        }

        Self {
            chars,
            position: 0,
            line_starts,
            start_location,
        }
    }

    /// Decodes and preprocesses the bytes and returns a stream over the result
    pub fn from_bytes(bytes: &[u8], encoding: Encoding, start_location: Location) -> CssResult<Self> {
        let chars = decode(bytes, encoding)?;
        log::trace!("decoded {} bytes into {} code points", bytes.len(), chars.len());

        Ok(Self::new(chars, start_location))
    }

    /// Read current code point
    pub fn read(&self) -> CodePoint {
        self.look_ahead(0)
    }

    /// Looks ahead in the stream. `look_ahead(0)` is the code point that the next read returns.
    pub fn look_ahead(&self, offset: usize) -> CodePoint {
        match self.chars.get(self.position + offset) {
            Some(c) => Ch(*c),
            None => Eof,
        }
    }

    /// Read the current code point and advance to the next
    pub fn read_and_next(&mut self) -> CodePoint {
        let c = self.read();
        if !c.is_eof() {
            self.position += 1;
        }
        c
    }

    /// Advance with 1 code point
    pub fn next(&mut self) {
        self.next_n(1);
    }

    /// Advance with n code points, stopping at the end of the stream
    pub fn next_n(&mut self, n: usize) {
        self.position = (self.position + n).min(self.chars.len());
    }

    /// Unread the last read code point
    pub fn prev(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Retrieves the code points between start (inclusive) and end (exclusive) as a string
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }

        self.chars[start..end].iter().collect()
    }

    /// Returns the location of the given code point position, relative to the start location
    pub fn location(&self, pos: usize) -> Location {
        let line_idx = self.line_starts.partition_point(|&start| start <= pos).max(1) - 1;
        let mut column = pos - self.line_starts[line_idx] + 1;
        if line_idx == 0 {
            column += self.start_location.column.saturating_sub(1);
        }

        Location::new(
            self.start_location.line.max(1) + line_idx,
            column,
            self.start_location.offset + pos,
        )
    }

    /// Returns the location of the next code point to read
    pub fn current_location(&self) -> Location {
        self.location(self.position)
    }
}

/// Location holds the start position of the given element in the data source
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Code point offset, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("a\r\nb", "a\nb"; "crlf pair")]
    #[test_case("a\rb", "a\nb"; "lone cr")]
    #[test_case("a\r\r\nb", "a\n\nb"; "cr before crlf")]
    #[test_case("a\u{000C}b", "a\nb"; "form feed")]
    #[test_case("a\u{0000}b", "a\u{FFFD}b"; "null")]
    #[test_case("plain", "plain"; "untouched")]
    fn test_preprocess(input: &str, expected: &str) {
        let chars = decode(input.as_bytes(), Encoding::UTF8).unwrap();
        assert_eq!(chars.iter().collect::<String>(), expected);
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let bytes = b"a { b: c\xFF }";
        assert_eq!(
            decode(bytes, Encoding::UTF8),
            Err(CssError::InvalidUtf8 { offset: 8 })
        );

        assert!(CodePointStream::from_bytes(b"\xC3", Encoding::UTF8, Location::default()).is_err());
    }

    #[test_case(Encoding::ASCII)]
    #[test_case(Encoding::UTF16LE)]
    #[test_case(Encoding::UTF16BE)]
    fn test_other_encodings_are_unsupported(encoding: Encoding) {
        assert!(matches!(
            decode(b"a{}", encoding),
            Err(CssError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_stream() {
        let mut stream = CodePointStream::from_bytes("f\u{1F47D}f".as_bytes(), Encoding::UTF8, Location::default()).unwrap();
        assert!(!stream.read().is_eof());
        assert_eq!(stream.look_ahead(1), Ch('\u{1F47D}'));
        assert_eq!(stream.look_ahead(10), Eof);
        assert_eq!(stream.read_and_next(), Ch('f'));
        assert_eq!(stream.read_and_next(), Ch('\u{1F47D}'));
        stream.prev();
        assert_eq!(stream.read(), Ch('\u{1F47D}'));
        stream.next_n(10);
        assert!(stream.read().is_eof());
        assert_eq!(stream.read_and_next(), Eof);
        assert_eq!(stream.current_location().offset, 3);
        assert_eq!(stream.slice(1, 2), "\u{1F47D}");
        assert_eq!(stream.slice(2, 100), "f");
    }

    #[test]
    fn test_locations() {
        let stream = CodePointStream::new("ab\ncd\n\ne".chars().collect(), Location::default());
        assert_eq!(stream.location(0), Location::new(1, 1, 0));
        assert_eq!(stream.location(2), Location::new(1, 3, 2));
        assert_eq!(stream.location(3), Location::new(2, 1, 3));
        assert_eq!(stream.location(4), Location::new(2, 2, 4));
        assert_eq!(stream.location(6), Location::new(3, 1, 6));
        assert_eq!(stream.location(7), Location::new(4, 1, 7));
        // end of stream
        assert_eq!(stream.location(8), Location::new(4, 2, 8));
    }

    #[test]
    fn test_locations_with_start_offset() {
        let stream = CodePointStream::new("ab\ncd".chars().collect(), Location::new(10, 5, 100));
        assert_eq!(stream.location(1), Location::new(10, 6, 101));
        assert_eq!(stream.location(4), Location::new(11, 2, 104));
    }
}
