//! CSS syntax level 3: tokenizer and parser
//!
//! Turns CSS source bytes into a tree of rules, declarations and component values. Nothing is
//! interpreted: selectors, properties and at-rule preludes are kept as component values for a
//! semantic layer to pick up.
use crate::cursor::TokenCursor;
use crate::errors::{ErrorLogger, ParseError, ParseErrorKind};
use crate::hooks::{DefaultHooks, SyntaxHooks};
use crate::node::{BlockContents, ComponentValue, Stylesheet};
use crate::parser_config::{ParserConfig, Tokenization};
use crate::tokenizer::{Token, TokenType, Tokenizer};
use cssyntax_shared::byte_stream::CodePointStream;
use cssyntax_shared::errors::CssResult;
use std::cell::RefCell;
use std::rc::Rc;

pub mod cursor;
pub mod errors;
pub mod hooks;
pub mod node;
mod parser;
pub mod parser_config;
pub mod tokenizer;
mod unicode;

/// Result of a parse that got to the end of the input, together with the recoverable errors
/// found on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub errors: Vec<ParseError>,
}

/// Deepest nesting of blocks and functions the parser descends into
pub const MAX_NESTING_DEPTH: usize = 128;

pub struct Css3<'h> {
    /// Tokens as produced by the tokenizer
    cursor: TokenCursor,
    /// The parser configuration as given
    config: ParserConfig,
    /// Shared with the tokenizer
    errors: Rc<RefCell<ErrorLogger>>,
    hooks: &'h dyn SyntaxHooks,
    /// Number of blocks and functions currently open
    depth: usize,
}

impl<'h> Css3<'h> {
    /// Decodes the bytes and sets up the tokenizer. Nothing is parsed yet.
    fn new(bytes: &[u8], config: ParserConfig, hooks: &'h dyn SyntaxHooks) -> CssResult<Self> {
        let stream = CodePointStream::from_bytes(bytes, config.encoding, config.location)?;
        let errors = Rc::new(RefCell::new(ErrorLogger::new(config.ignore_errors)));
        let tokenizer = Tokenizer::new(stream, errors.clone()).with_unicode_range(config.unicode_range);

        let cursor = match config.tokenization {
            Tokenization::Lazy => TokenCursor::new(tokenizer),
            Tokenization::Eager => TokenCursor::eager(tokenizer)?,
        };

        Ok(Self {
            cursor,
            config,
            errors,
            hooks,
            depth: 0,
        })
    }

    /// Parses a complete style sheet
    pub fn parse_bytes(bytes: &[u8], config: ParserConfig) -> CssResult<Parsed<Stylesheet>> {
        Self::parse_bytes_with_hooks(bytes, config, &DefaultHooks)
    }

    /// Parses a complete style sheet from a string
    pub fn parse_str(data: &str, config: ParserConfig) -> CssResult<Parsed<Stylesheet>> {
        Self::parse_bytes(data.as_bytes(), config)
    }

    /// Parses a complete style sheet, letting the hooks decide which rules and declarations
    /// are kept
    pub fn parse_bytes_with_hooks(
        bytes: &[u8],
        config: ParserConfig,
        hooks: &'h dyn SyntaxHooks,
    ) -> CssResult<Parsed<Stylesheet>> {
        log::trace!("parsing {}", config.source.as_deref().unwrap_or("<input>"));

        let mut parser = Css3::new(bytes, config, hooks)?;
        let stylesheet = parser.parse_stylesheet()?;
        Ok(parser.finish(stylesheet))
    }

    /// Parses the contents of a block without the surrounding braces, like a `style` attribute
    pub fn parse_block_contents(bytes: &[u8], config: ParserConfig) -> CssResult<Parsed<BlockContents>> {
        let mut parser = Css3::new(bytes, config, &DefaultHooks)?;
        let mut contents = parser.consume_block_contents()?;

        // A stray `}` ends the block contents early. There is no enclosing block here, so
        // report it and keep going.
        loop {
            let t = parser.peek()?;
            if t.token_type != TokenType::RCurly {
                break;
            }

            parser.parse_error(ParseErrorKind::UnexpectedCloseCurly, t.location, "unexpected }");
            parser.cursor.discard_token()?;

            let more = parser.consume_block_contents()?;
            contents.declarations.extend(more.declarations);
            contents.rules.extend(more.rules);
        }

        Ok(parser.finish(contents))
    }

    /// Parses the input as a list of component values
    pub fn parse_component_values(bytes: &[u8], config: ParserConfig) -> CssResult<Parsed<Vec<ComponentValue>>> {
        let mut parser = Css3::new(bytes, config, &DefaultHooks)?;
        let values = parser.parse_component_value_list(false, &TokenType::Eof)?;
        Ok(parser.finish(values))
    }

    /// Returns all tokens of the input, without the final EOF token
    pub fn tokenize(bytes: &[u8], config: ParserConfig) -> CssResult<Parsed<Vec<Token>>> {
        let mut parser = Css3::new(bytes, config, &DefaultHooks)?;
        let tokens = parser.cursor.consume_all()?;
        Ok(parser.finish(tokens))
    }

    fn finish<T>(self, value: T) -> Parsed<T> {
        let errors = self.errors.borrow().get_errors();
        Parsed { value, errors }
    }
}
