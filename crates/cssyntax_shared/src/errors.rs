//! Fatal errors that abort a whole decode/tokenize/parse operation
use crate::byte_stream::Location;
use thiserror::Error;

/// Serious errors. When one of these is returned, no partial result is available.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CssError {
    #[error("invalid utf-8 sequence at byte offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unicode-range tokens are not supported (at {0})")]
    UnsupportedUnicodeRange(Location),

    #[error("unterminated comment starting at {0}")]
    UnterminatedComment(Location),

    #[error("blocks and functions nested too deep at {0}")]
    NestingTooDeep(Location),

    #[error("internal error: {message} at {location}")]
    Internal { message: String, location: Location },
}

impl CssError {
    #[must_use]
    pub fn internal(message: &str, location: Location) -> Self {
        CssError::Internal {
            message: message.to_string(),
            location,
        }
    }
}

pub type CssResult<T> = Result<T, CssError>;
