//! Recoverable parse errors and the logger that collects them
use cssyntax_shared::byte_stream::Location;
use serde::Serialize;
use std::fmt;

/// Possible parse errors enumerated. None of them stop the parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    EofInString,
    NewlineInString,
    EofInEscape,
    InvalidEscape,
    BadUrl,
    EofInUrl,
    EofInBlock,
    EofInFunction,
    EofInRule,
    UnexpectedCloseCurly,
    UnexpectedStopToken,
    InvalidDeclaration,
    InvalidRule,
}

// Parse errors as string representation
impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::EofInString => "eof-in-string",
            ParseErrorKind::NewlineInString => "newline-in-string",
            ParseErrorKind::EofInEscape => "eof-in-escape",
            ParseErrorKind::InvalidEscape => "invalid-escape",
            ParseErrorKind::BadUrl => "bad-url",
            ParseErrorKind::EofInUrl => "eof-in-url",
            ParseErrorKind::EofInBlock => "eof-in-block",
            ParseErrorKind::EofInFunction => "eof-in-function",
            ParseErrorKind::EofInRule => "eof-in-rule",
            ParseErrorKind::UnexpectedCloseCurly => "unexpected-close-curly",
            ParseErrorKind::UnexpectedStopToken => "unexpected-stop-token",
            ParseErrorKind::InvalidDeclaration => "invalid-declaration",
            ParseErrorKind::InvalidRule => "invalid-rule",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stage that raised the error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorOrigin {
    Tokenizer,
    Parser,
}

/// Parse error that defines an error (message) on the given position
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Parse error message, mostly naming the offending construct
    pub message: String,
    pub location: Location,
    pub origin: ErrorOrigin,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.location, self.message)
    }
}

/// Collects the parse errors of a single parse operation.
///
/// Errors raised by the parser can be rolled back to a checkpoint when a speculative parse is
/// abandoned. Tokenizer errors always survive a rollback: every token is produced exactly once,
/// whether or not the parser later backtracks over it.
#[derive(Clone, Default)]
pub struct ErrorLogger {
    /// List of errors that occurred during parsing
    errors: Vec<ParseError>,
    /// When set, errors are only logged, never collected
    suppress: bool,
}

impl ErrorLogger {
    // Creates a new error logger
    pub fn new(suppress: bool) -> Self {
        ErrorLogger {
            errors: Vec::new(),
            suppress,
        }
    }

    /// Returns the errors in source order. At the same offset, tokenizer errors come first.
    ///
    /// Errors are recorded in the order tokens are produced and parsed, which differs between
    /// lazy and eager tokenization. Sorting makes the result independent of that.
    pub fn get_errors(&self) -> Vec<ParseError> {
        let mut errors = self.errors.clone();
        errors.sort_by_key(|err| (err.location.offset, err.origin == ErrorOrigin::Parser));
        errors
    }

    // Adds a new error to the error logger
    pub fn add_error(&mut self, origin: ErrorOrigin, kind: ParseErrorKind, location: Location, message: &str) {
        if self.suppress {
            log::debug!("suppressed parse error {} at {}: {}", kind, location, message);
            return;
        }

        // Check if the error already exists, if so, don't add it again
        if self
            .errors
            .iter()
            .any(|err| err.kind == kind && err.location == location && err.message == message)
        {
            return;
        }

        log::debug!("parse error {} at {}: {}", kind, location, message);

        self.errors.push(ParseError {
            kind,
            message: message.to_string(),
            location,
            origin,
        });
    }

    /// Returns a checkpoint that can later be passed to `rollback()`
    pub fn checkpoint(&self) -> usize {
        self.errors.len()
    }

    /// Drops all parser errors that were added after the checkpoint
    pub fn rollback(&mut self, checkpoint: usize) {
        let mut idx = 0;
        self.errors.retain(|err| {
            let keep = idx < checkpoint || err.origin == ErrorOrigin::Tokenizer;
            idx += 1;
            keep
        });
    }
}
