use cssyntax_shared::byte_stream::{Encoding, Location};

/// Defines when the input is turned into tokens. Both produce the same results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tokenization {
    /// Tokens are produced as the parser asks for them
    #[default]
    Lazy,
    /// All tokens are produced before parsing starts
    Eager,
}

/// ParserConfig holds the configuration for the parser
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Location holds the start position of the given element in the data source
    pub location: Location,
    /// Optional source filename or url
    pub source: Option<String>,
    /// Don't collect recoverable errors, only log them
    pub ignore_errors: bool,
    /// Encoding of the input. Only UTF-8 can be decoded.
    pub encoding: Encoding,
    pub tokenization: Tokenization,
    /// The host wants unicode-range tokens. These are not supported, so encountering one aborts.
    pub unicode_range: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            location: Location::default(),
            source: None,
            ignore_errors: false,
            encoding: Encoding::UTF8,
            tokenization: Tokenization::Lazy,
            unicode_range: false,
        }
    }
}
