use crate::errors::{ErrorOrigin, ParseErrorKind};
use crate::tokenizer::{Token, TokenType};
use crate::{Css3, MAX_NESTING_DEPTH};
use cssyntax_shared::byte_stream::Location;
use cssyntax_shared::errors::{CssError, CssResult};

mod at_rule;
mod block;
mod declaration;
mod function;
mod rule;
mod stylesheet;
mod value;

impl Css3<'_> {
    /// Returns the next token without consuming it
    pub(crate) fn peek(&mut self) -> CssResult<Token> {
        self.cursor.next_token()
    }

    /// Consumes any token
    pub(crate) fn consume_any(&mut self) -> CssResult<Token> {
        self.cursor.consume_token()
    }

    /// Returns true when the next token is the given stop token. `Eof` as stop token means there
    /// is no stop token besides the end of input.
    pub(crate) fn at_stop(token: &Token, stop: &TokenType) -> bool {
        *stop != TokenType::Eof && token.token_type == *stop
    }

    /// Records a recoverable error raised by the parser
    pub(crate) fn parse_error(&self, kind: ParseErrorKind, location: Location, message: &str) {
        self.errors
            .borrow_mut()
            .add_error(ErrorOrigin::Parser, kind, location, message);
    }

    /// Runs `f` one nesting level deeper. Fails once the input nests more than
    /// `MAX_NESTING_DEPTH` blocks and functions.
    pub(crate) fn nested<T>(&mut self, location: Location, f: impl FnOnce(&mut Self) -> CssResult<T>) -> CssResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            log::warn!("nesting deeper than {MAX_NESTING_DEPTH} at {location}");
            return Err(CssError::NestingTooDeep(location));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Returns the source text between two token locations
    pub(crate) fn source_between(&self, start: Location, end: Location) -> String {
        let base = self.config.location.offset;
        self.cursor
            .slice(start.offset.saturating_sub(base), end.offset.saturating_sub(base))
    }
}
