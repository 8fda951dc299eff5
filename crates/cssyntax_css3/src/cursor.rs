use crate::tokenizer::{Token, TokenType, Tokenizer};
use cssyntax_shared::errors::CssResult;

/// Sequential view over the tokens produced by the tokenizer.
///
/// Tokens are pulled from the tokenizer on demand and kept, so the parser can move back to any
/// position it has marked. Marks form a stack: each `mark()` must be matched by exactly one
/// `restore_mark()` (go back) or `discard_mark()` (commit).
pub struct TokenCursor {
    tokenizer: Tokenizer,
    /// Every token produced so far, without the final EOF
    tokens: Vec<Token>,
    /// Index of the next token to consume. If it's outside the tokens list, it will return EOF
    position: usize,
    /// Saved positions
    marks: Vec<usize>,
    /// The EOF token, once the tokenizer has produced it
    eof: Option<Token>,
}

impl TokenCursor {
    /// Creates a cursor that tokenizes lazily, one token at a time
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            tokens: Vec::new(),
            position: 0,
            marks: Vec::new(),
            eof: None,
        }
    }

    /// Creates a cursor that tokenizes the whole input before returning
    pub fn eager(tokenizer: Tokenizer) -> CssResult<Self> {
        let mut cursor = Self::new(tokenizer);
        while cursor.eof.is_none() {
            cursor.pull()?;
        }

        log::trace!("tokenized {} tokens upfront", cursor.tokens.len());
        Ok(cursor)
    }

    /// Fetches one more token from the tokenizer
    fn pull(&mut self) -> CssResult<()> {
        let token = self.tokenizer.next_token()?;
        if token.is_eof() {
            self.eof = Some(token);
        } else {
            self.tokens.push(token);
        }

        Ok(())
    }

    /// Makes sure the token at the given index is buffered, unless the input ends before it
    fn fill(&mut self, index: usize) -> CssResult<()> {
        while self.tokens.len() <= index && self.eof.is_none() {
            self.pull()?;
        }

        Ok(())
    }

    /// Returns the next token without consuming it. Past the end, this is the EOF token.
    pub fn next_token(&mut self) -> CssResult<Token> {
        self.fill(self.position)?;

        if let Some(token) = self.tokens.get(self.position) {
            return Ok(token.clone());
        }

        Ok(match &self.eof {
            Some(eof) => eof.clone(),
            None => Token::new(TokenType::Eof, self.tokenizer.current_location()),
        })
    }

    /// Returns true when there are no more tokens before EOF
    pub fn empty(&mut self) -> CssResult<bool> {
        self.fill(self.position)?;
        Ok(self.position >= self.tokens.len())
    }

    /// Returns the next token and advances past it. At the end, EOF is returned and the
    /// position does not change.
    pub fn consume_token(&mut self) -> CssResult<Token> {
        let token = self.next_token()?;
        if !token.is_eof() {
            self.position += 1;
        }

        Ok(token)
    }

    /// Advances past the next token, if there is one
    pub fn discard_token(&mut self) -> CssResult<()> {
        if !self.empty()? {
            self.position += 1;
        }

        Ok(())
    }

    /// Saves the current position on the mark stack
    pub fn mark(&mut self) {
        self.marks.push(self.position);
    }

    /// Pops the last mark and moves back to it. Without any mark this does nothing.
    pub fn restore_mark(&mut self) {
        if let Some(position) = self.marks.pop() {
            self.position = position;
        }
    }

    /// Pops the last mark and keeps the current position
    pub fn discard_mark(&mut self) {
        self.marks.pop();
    }

    /// Advances past a run of whitespace tokens
    pub fn discard_whitespace(&mut self) -> CssResult<()> {
        while self.next_token()?.is_whitespace() {
            self.position += 1;
        }

        Ok(())
    }

    /// Returns the source text between two code point offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.tokenizer.slice(start, end)
    }

    /// Returns all tokens up to, but not including, EOF and leaves the cursor at the end
    pub fn consume_all(&mut self) -> CssResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while !self.empty()? {
            tokens.push(self.consume_token()?);
        }

        Ok(tokens)
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorLogger;
    use cssyntax_shared::byte_stream::{CodePointStream, Encoding, Location};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cursor(input: &str) -> TokenCursor {
        let errors = Rc::new(RefCell::new(ErrorLogger::new(false)));
        let stream = CodePointStream::from_bytes(input.as_bytes(), Encoding::UTF8, Location::default()).unwrap();
        TokenCursor::new(Tokenizer::new(stream, errors))
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut c = cursor("a b");
        assert_eq!(c.next_token().unwrap().token_type, TokenType::Ident("a".into()));
        assert_eq!(c.next_token().unwrap().token_type, TokenType::Ident("a".into()));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_consume_and_eof() {
        let mut c = cursor("a b");
        assert_eq!(c.consume_token().unwrap().token_type, TokenType::Ident("a".into()));
        assert_eq!(c.consume_token().unwrap().token_type, TokenType::Whitespace);
        assert!(!c.empty().unwrap());
        assert_eq!(c.consume_token().unwrap().token_type, TokenType::Ident("b".into()));
        assert!(c.empty().unwrap());
        assert!(c.consume_token().unwrap().is_eof());
        assert!(c.next_token().unwrap().is_eof());
        assert_eq!(c.position(), 3);

        c.discard_token().unwrap();
        assert_eq!(c.position(), 3);
    }

    #[test]
    fn test_mark_restore_is_noop() {
        let mut c = cursor("a b c");
        c.discard_token().unwrap();

        c.mark();
        c.restore_mark();
        assert_eq!(c.position(), 1);

        c.mark();
        c.discard_mark();
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn test_restore_moves_back() {
        let mut c = cursor("a b c");
        c.mark();
        c.consume_token().unwrap();
        c.consume_token().unwrap();
        c.restore_mark();

        assert_eq!(c.position(), 0);
        assert_eq!(c.next_token().unwrap().token_type, TokenType::Ident("a".into()));
    }

    #[test]
    fn test_nested_marks_are_lifo() {
        let mut c = cursor("a b c d");
        c.mark(); // 0
        c.discard_token().unwrap();
        c.mark(); // 1
        c.discard_token().unwrap();
        c.discard_token().unwrap();

        c.restore_mark();
        assert_eq!(c.position(), 1);

        c.discard_token().unwrap();
        c.restore_mark();
        assert_eq!(c.position(), 0);

        // nothing left on the stack
        c.discard_token().unwrap();
        c.restore_mark();
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn test_discard_mark_commits() {
        let mut c = cursor("a b c");
        c.mark();
        c.discard_token().unwrap();
        c.mark();
        c.discard_token().unwrap();
        c.discard_mark();
        c.restore_mark();
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_discard_whitespace() {
        let mut c = cursor("  \n a");
        c.discard_whitespace().unwrap();
        assert_eq!(c.next_token().unwrap().token_type, TokenType::Ident("a".into()));

        // no whitespace: no movement
        c.discard_whitespace().unwrap();
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn test_eager_matches_lazy() {
        let input = "a { color: red !important; } @media (x) { b {} }";

        let mut lazy = cursor(input);
        let errors = Rc::new(RefCell::new(ErrorLogger::new(false)));
        let stream = CodePointStream::from_bytes(input.as_bytes(), Encoding::UTF8, Location::default()).unwrap();
        let mut eager = TokenCursor::eager(Tokenizer::new(stream, errors)).unwrap();

        assert_eq!(lazy.consume_all().unwrap(), eager.consume_all().unwrap());
    }

    #[test]
    fn test_fatal_error_propagates() {
        let mut c = cursor("a /* open");
        c.discard_token().unwrap();
        c.discard_token().unwrap();
        assert!(c.next_token().is_err());

        let errors = Rc::new(RefCell::new(ErrorLogger::new(false)));
        let stream = CodePointStream::from_bytes(b"a /* open", Encoding::UTF8, Location::default()).unwrap();
        assert!(TokenCursor::eager(Tokenizer::new(stream, errors)).is_err());
    }
}
