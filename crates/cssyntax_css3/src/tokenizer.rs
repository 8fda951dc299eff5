use crate::errors::{ErrorLogger, ErrorOrigin, ParseErrorKind};
use crate::unicode::{is_ident_char, is_ident_start, is_non_printable, is_surrogate, UnicodeChar};
use cssyntax_shared::byte_stream::CodePoint::{Ch, Eof};
use cssyntax_shared::byte_stream::{CodePoint, CodePointStream, Location};
use cssyntax_shared::errors::{CssError, CssResult};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type Number = f64;

/// Type flag of a numeric token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericKind {
    /// Only digits (and an optional sign) were present
    Integer,
    /// A fraction or exponent was present
    Number,
}

/// Payload of the `<number-token>`, `<percentage-token>` and `<dimension-token>`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Numeric {
    pub value: Number,
    /// True when the source started with an explicit `+` or `-`
    pub signed: bool,
    pub kind: NumericKind,
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signed && self.value.is_sign_positive() {
            write!(f, "+")?;
        }
        write!(f, "{}", self.value)
    }
}

/// Type flag of a hash token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HashType {
    /// Hash that is a valid ID selector
    Id,
    Unrestricted,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum TokenType {
    /// A [`<ident-token>`](https://drafts.csswg.org/css-syntax/#ident-token-diagram)
    Ident(String),
    /// A [`<function-token>`](https://drafts.csswg.org/css-syntax/#function-token-diagram)
    ///
    /// The value does not include the `(` marker.
    Function(String),
    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(String),
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram)
    ///
    /// The value does not include the `#` marker.
    Hash { value: String, hash_type: HashType },
    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(String),
    /// A `<bad-string-token>`
    ///
    /// This token always indicates a parse error.
    BadString,
    /// A [`<url-token>`](https://drafts.csswg.org/css-syntax/#url-token-diagram)
    Url(String),
    /// A `<bad-url-token>`
    BadUrl,
    /// A `<delim-token>`
    Delim(char),
    Number(Numeric),
    Percentage(Numeric),
    Dimension { value: Numeric, unit: String },
    /// A [`<whitespace-token>`](https://drafts.csswg.org/css-syntax/#whitespace-token-diagram)
    Whitespace,
    /// A `<!--` `<CDO-token>`
    Cdo,
    /// A `-->` `<CDC-token>`
    Cdc,
    /// A `:` `<colon-token>`
    Colon,
    /// A `;` `<semicolon-token>`
    Semicolon,
    /// A `<comma-token>`
    Comma,
    /// A `<[-token>`
    LBracket,
    /// A `<]-token>`
    RBracket,
    /// A `<(-token>`
    LParen,
    /// A `<)-token>`
    RParen,
    /// A `<{-token>`
    LCurly,
    /// A `<}-token>`
    RCurly,
    /// A `<EOF-token>`
    Eof,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Location of the start of the token in the stream
    pub location: Location,
}

impl Token {
    /// Returns a new token for the given type on the given location
    pub fn new(token_type: TokenType, location: Location) -> Token {
        Token { token_type, location }
    }

    pub(crate) fn new_delim(c: char, location: Location) -> Token {
        Token::new(TokenType::Delim(c), location)
    }

    pub(crate) fn new_hash(value: &str, hash_type: HashType, location: Location) -> Token {
        Token::new(
            TokenType::Hash {
                value: value.to_string(),
                hash_type,
            },
            location,
        )
    }

    pub(crate) fn new_atkeyword(keyword: &str, location: Location) -> Token {
        Token::new(TokenType::AtKeyword(keyword.to_string()), location)
    }

    pub(crate) fn new_ident(value: &str, location: Location) -> Token {
        Token::new(TokenType::Ident(value.to_string()), location)
    }

    pub(crate) fn new_function(value: &str, location: Location) -> Token {
        Token::new(TokenType::Function(value.to_string()), location)
    }

    pub(crate) fn new_quoted_string(value: &str, location: Location) -> Token {
        Token::new(TokenType::QuotedString(value.to_string()), location)
    }

    pub(crate) fn new_url(value: &str, location: Location) -> Token {
        Token::new(TokenType::Url(value.to_string()), location)
    }
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }

    pub fn is_delim(&self, delim: char) -> bool {
        matches!(self.token_type, TokenType::Delim(c) if c == delim)
    }

    /// Returns true for an ident token matching the given value ASCII case-insensitively
    pub fn is_ident_ci(&self, ident: &str) -> bool {
        matches!(&self.token_type, TokenType::Ident(s) if s.eq_ignore_ascii_case(ident))
    }

    /// Returns the token type that closes a block opened by this token
    pub fn mirror(&self) -> Option<TokenType> {
        match self.token_type {
            TokenType::LCurly => Some(TokenType::RCurly),
            TokenType::LBracket => Some(TokenType::RBracket),
            TokenType::LParen => Some(TokenType::RParen),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::Ident(val) => write!(f, "{val}"),
            TokenType::Function(val) => write!(f, "{val}("),
            TokenType::AtKeyword(val) => write!(f, "@{val}"),
            TokenType::Hash { value, .. } => write!(f, "#{value}"),
            TokenType::QuotedString(val) => write!(f, "\"{val}\""),
            TokenType::BadString => write!(f, "<bad-string>"),
            TokenType::Url(val) => write!(f, "url({val})"),
            TokenType::BadUrl => write!(f, "<bad-url>"),
            TokenType::Delim(val) => write!(f, "{val}"),
            TokenType::Number(val) => write!(f, "{val}"),
            TokenType::Percentage(val) => write!(f, "{val}%"),
            TokenType::Dimension { value, unit } => write!(f, "{value}{unit}"),
            TokenType::Whitespace => write!(f, " "),
            TokenType::Cdo => write!(f, "<!--"),
            TokenType::Cdc => write!(f, "-->"),
            TokenType::Colon => write!(f, ":"),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::Comma => write!(f, ","),
            TokenType::LBracket => write!(f, "["),
            TokenType::RBracket => write!(f, "]"),
            TokenType::LParen => write!(f, "("),
            TokenType::RParen => write!(f, ")"),
            TokenType::LCurly => write!(f, "{{"),
            TokenType::RCurly => write!(f, "}}"),
            TokenType::Eof => write!(f, "eof"),
        }
    }
}

/// CSS Tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization)
///
/// Tokens are produced one at a time through `next_token()`. Buffering, lookahead and
/// backtracking over tokens is the job of the `TokenCursor`.
pub struct Tokenizer {
    stream: CodePointStream,
    /// Shared with the parser so errors end up in a single list, in the order they occur
    errors: Rc<RefCell<ErrorLogger>>,
    /// When true, the host asked for unicode-range tokens, which we cannot produce
    unicode_range: bool,
}

impl Tokenizer {
    pub fn new(stream: CodePointStream, errors: Rc<RefCell<ErrorLogger>>) -> Self {
        Self {
            stream,
            errors,
            unicode_range: false,
        }
    }

    #[must_use]
    pub fn with_unicode_range(mut self, unicode_range: bool) -> Self {
        self.unicode_range = unicode_range;
        self
    }

    /// Returns the location of the next code point to consume
    pub fn current_location(&self) -> Location {
        self.stream.current_location()
    }

    /// Returns the source text between two code point offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.stream.slice(start, end)
    }

    /// Consumes and returns the next token. Once the stream is exhausted, every call returns EOF.
    pub fn next_token(&mut self) -> CssResult<Token> {
        self.consume_comments()?;
        let token = self.consume_token()?;

        log::trace!("{:?}", token);
        Ok(token)
    }

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> CssResult<Token> {
        let loc = self.current_location();

        let t = match self.peek(0) {
            Eof => Token::new(TokenType::Eof, loc),
            c if c.is_whitespace() => {
                self.consume_whitespace();
                Token::new(TokenType::Whitespace, loc)
            }
            Ch(quote @ ('"' | '\'')) => {
                // consume the opening quote
                self.stream.next();
                self.consume_string_token(quote, loc)
            }
            Ch('#') => {
                if matches!(self.peek(1), Ch(c) if is_ident_char(c)) || self.is_valid_escape(1) {
                    // consume '#'
                    self.stream.next();

                    let hash_type = if self.starts_ident_sequence(0) {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    Token::new_hash(&self.consume_ident_sequence(), hash_type, loc)
                } else {
                    self.stream.next();
                    Token::new_delim('#', loc)
                }
            }
            Ch(c @ ('+' | '.')) => {
                if self.starts_number(0) {
                    return self.consume_numeric_token(loc);
                }

                self.stream.next();
                Token::new_delim(c, loc)
            }
            Ch('-') => {
                if self.starts_number(0) {
                    return self.consume_numeric_token(loc);
                }

                if self.peek(1).is('-') && self.peek(2).is('>') {
                    // consume '-->'
                    self.stream.next_n(3);
                    return Ok(Token::new(TokenType::Cdc, loc));
                }

                if self.starts_ident_sequence(0) {
                    return Ok(self.consume_ident_like_token(loc));
                }

                self.stream.next();
                Token::new_delim('-', loc)
            }
            Ch('<') => {
                if self.peek(1).is('!') && self.peek(2).is('-') && self.peek(3).is('-') {
                    // consume "<!--"
                    self.stream.next_n(4);
                    return Ok(Token::new(TokenType::Cdo, loc));
                }

                self.stream.next();
                Token::new_delim('<', loc)
            }
            Ch('@') => {
                // consume '@'
                self.stream.next();

                if self.starts_ident_sequence(0) {
                    Token::new_atkeyword(&self.consume_ident_sequence(), loc)
                } else {
                    Token::new_delim('@', loc)
                }
            }
            Ch('\\') => {
                if self.is_valid_escape(0) {
                    return Ok(self.consume_ident_like_token(loc));
                }

                self.parse_error(ParseErrorKind::InvalidEscape, loc, "backslash followed by a newline");
                self.stream.next();
                Token::new_delim('\\', loc)
            }
            Ch('(') => self.single(TokenType::LParen, loc),
            Ch(')') => self.single(TokenType::RParen, loc),
            Ch('[') => self.single(TokenType::LBracket, loc),
            Ch(']') => self.single(TokenType::RBracket, loc),
            Ch('{') => self.single(TokenType::LCurly, loc),
            Ch('}') => self.single(TokenType::RCurly, loc),
            Ch(',') => self.single(TokenType::Comma, loc),
            Ch(':') => self.single(TokenType::Colon, loc),
            Ch(';') => self.single(TokenType::Semicolon, loc),
            Ch(c) if c.is_ascii_digit() => return self.consume_numeric_token(loc),
            Ch('u' | 'U') => {
                if self.unicode_range && self.would_start_unicode_range() {
                    return Err(CssError::UnsupportedUnicodeRange(loc));
                }

                self.consume_ident_like_token(loc)
            }
            Ch(c) if is_ident_start(c) => self.consume_ident_like_token(loc),
            Ch(c) => {
                self.stream.next();
                Token::new_delim(c, loc)
            }
        };

        Ok(t)
    }

    /// Consumes a single code point and returns the given token type
    fn single(&mut self, token_type: TokenType, loc: Location) -> Token {
        self.stream.next();
        Token::new(token_type, loc)
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// An unterminated comment is fatal.
    fn consume_comments(&mut self) -> CssResult<()> {
        while self.peek(0).is('/') && self.peek(1).is('*') {
            let loc = self.current_location();

            // consume '/*'
            self.stream.next_n(2);

            loop {
                match self.stream.read_and_next() {
                    Ch('*') if self.peek(0).is('/') => {
                        self.stream.next();
                        break;
                    }
                    Eof => return Err(CssError::UnterminatedComment(loc)),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    ///
    /// Returns either a `<number-token>`, `<percentage-token>`, or `<dimension-token>`.
    fn consume_numeric_token(&mut self, loc: Location) -> CssResult<Token> {
        let number = self.consume_number(loc)?;

        if self.starts_ident_sequence(0) {
            let unit = self.consume_ident_sequence();
            return Ok(Token::new(TokenType::Dimension { value: number, unit }, loc));
        }

        if self.peek(0).is('%') {
            // consume '%'
            self.stream.next();
            return Ok(Token::new(TokenType::Percentage(number), loc));
        }

        Ok(Token::new(TokenType::Number(number), loc))
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// Returns: `<ident-token>`, `<function-token>`, `<url-token>`, or `<bad-url-token>`.
    fn consume_ident_like_token(&mut self, loc: Location) -> Token {
        let value = self.consume_ident_sequence();

        if value.eq_ignore_ascii_case("url") && self.peek(0).is('(') {
            // consume '('
            self.stream.next();

            while self.peek(0).is_whitespace() && self.peek(1).is_whitespace() {
                self.stream.next();
            }

            let is_quote = |c: CodePoint| c.is('"') || c.is('\'');
            if is_quote(self.peek(0)) || (self.peek(0).is_whitespace() && is_quote(self.peek(1))) {
                // quoted urls are regular function calls
                return Token::new_function(&value, loc);
            }

            return self.consume_url_token(loc);
        }

        if self.peek(0).is('(') {
            // consume '('
            self.stream.next();
            return Token::new_function(&value, loc);
        }

        Token::new_ident(&value, loc)
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// The opening quote must already be consumed. Returns either a `<string-token>` or
    /// `<bad-string-token>`.
    fn consume_string_token(&mut self, ending: char, loc: Location) -> Token {
        let mut value = String::new();

        loop {
            match self.stream.read_and_next() {
                Ch(c) if c == ending => return Token::new_quoted_string(&value, loc),
                Eof => {
                    self.parse_error(ParseErrorKind::EofInString, loc, "unterminated string");
                    return Token::new_quoted_string(&value, loc);
                }
                Ch('\n') => {
                    // note: the newline is not part of the bad string
                    self.stream.prev();
                    self.parse_error(
                        ParseErrorKind::NewlineInString,
                        self.current_location(),
                        "unescaped newline in string",
                    );
                    return Token::new(TokenType::BadString, loc);
                }
                Ch('\\') => match self.peek(0) {
                    Eof => {}
                    Ch('\n') => self.stream.next(),
                    _ => value.push(self.consume_escaped()),
                },
                Ch(c) => value.push(c),
            }
        }
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-a-url-token)
    ///
    /// Returns either a `<url-token>` or a `<bad-url-token>`
    fn consume_url_token(&mut self, loc: Location) -> Token {
        let mut url = String::new();

        self.consume_whitespace();

        loop {
            match self.stream.read_and_next() {
                Ch(')') => break,
                Eof => {
                    self.parse_error(ParseErrorKind::EofInUrl, loc, "unterminated url");
                    break;
                }
                c if c.is_whitespace() => {
                    self.consume_whitespace();
                    match self.peek(0) {
                        Ch(')') => {
                            self.stream.next();
                            break;
                        }
                        Eof => {
                            self.parse_error(ParseErrorKind::EofInUrl, loc, "unterminated url");
                            break;
                        }
                        _ => return self.bad_url(loc, "whitespace inside url"),
                    }
                }
                Ch('"' | '\'' | '(') => return self.bad_url(loc, "unexpected character in url"),
                Ch(c) if is_non_printable(c) => return self.bad_url(loc, "non-printable character in url"),
                Ch('\\') => {
                    if self.peek(0).is_newline() {
                        return self.bad_url(loc, "invalid escape in url");
                    }
                    url.push(self.consume_escaped());
                }
                Ch(c) => url.push(c),
            }
        }

        Token::new_url(&url, loc)
    }

    fn bad_url(&mut self, loc: Location, message: &str) -> Token {
        self.parse_error(ParseErrorKind::BadUrl, loc, message);
        self.consume_remnants_of_bad_url();

        Token::new(TokenType::BadUrl, loc)
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Used is to consume enough of the input stream to reach a recovery point where normal tokenizing can resume.
    fn consume_remnants_of_bad_url(&mut self) {
        loop {
            match self.stream.read_and_next() {
                Ch(')') | Eof => return,
                // an escaped ')' does not end the url
                Ch('\\') if !self.peek(0).is_newline() => {
                    self.consume_escaped();
                }
                _ => {}
            }
        }
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-an-escaped-code-point)
    ///
    /// The backslash must already be consumed.
    fn consume_escaped(&mut self) -> char {
        let loc = self.current_location();

        match self.stream.read_and_next() {
            Ch(c) if c.is_ascii_hexdigit() => {
                let mut value = c.to_digit(16).unwrap_or_default();

                // at most 6 hex digits in total
                for _ in 1..6 {
                    match self.peek(0) {
                        Ch(h) if h.is_ascii_hexdigit() => {
                            value = value * 16 + h.to_digit(16).unwrap_or_default();
                            self.stream.next();
                        }
                        _ => break,
                    }
                }

                if self.peek(0).is_whitespace() {
                    self.stream.next();
                }

                if value == 0 || is_surrogate(value) || value > UnicodeChar::MAX_ALLOWED {
                    return UnicodeChar::REPLACEMENT_CHARACTER;
                }

                char::from_u32(value).unwrap_or(UnicodeChar::REPLACEMENT_CHARACTER)
            }
            Eof => {
                self.parse_error(ParseErrorKind::EofInEscape, loc, "escape at end of input");
                UnicodeChar::REPLACEMENT_CHARACTER
            }
            Ch(c) => c,
        }
    }

    /// 4.3.11. [Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Note: that algorithm does not do the verification that are necessary to
    /// ensure the returned code points would constitute an <ident-token>.
    fn consume_ident_sequence(&mut self) -> String {
        let mut value = String::new();

        loop {
            match self.peek(0) {
                Ch(c) if is_ident_char(c) => {
                    value.push(c);
                    self.stream.next();
                }
                Ch('\\') if self.is_valid_escape(0) => {
                    // consume '\'
                    self.stream.next();
                    value.push(self.consume_escaped());
                }
                _ => return value,
            }
        }
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self, loc: Location) -> CssResult<Numeric> {
        let mut repr = String::new();
        let mut kind = NumericKind::Integer;
        let mut signed = false;

        if let Ch(c @ ('+' | '-')) = self.peek(0) {
            repr.push(c);
            signed = true;
            self.stream.next();
        }

        self.consume_digits(&mut repr);

        if self.peek(0).is('.') && self.peek(1).is_digit() {
            repr.push('.');
            self.stream.next();
            self.consume_digits(&mut repr);
            kind = NumericKind::Number;
        }

        let exponent_follows = self.peek(1).is_digit()
            || (matches!(self.peek(1), Ch('+' | '-')) && self.peek(2).is_digit());
        if matches!(self.peek(0), Ch('e' | 'E')) && exponent_follows {
            repr.push('e');
            self.stream.next();

            if let Ch(c @ ('+' | '-')) = self.peek(0) {
                repr.push(c);
                self.stream.next();
            }

            self.consume_digits(&mut repr);
            kind = NumericKind::Number;
        }

        let value = repr
            .parse::<Number>()
            .map_err(|_| CssError::internal(&format!("cannot convert '{repr}' to a number"), loc))?;

        Ok(Numeric { value, signed, kind })
    }

    fn consume_digits(&mut self, value: &mut String) {
        while let Ch(c) = self.peek(0) {
            if !c.is_ascii_digit() {
                break;
            }
            value.push(c);
            self.stream.next();
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek(0).is_whitespace() {
            self.stream.next();
        }
    }

    /// 4.3.8. [Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_valid_escape(&self, start: usize) -> bool {
        self.peek(start).is('\\') && !self.peek(start + 1).is_newline()
    }

    /// 4.3.9. [Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
    fn starts_ident_sequence(&self, start: usize) -> bool {
        match self.peek(start) {
            Ch('-') => {
                let second = self.peek(start + 1);
                matches!(second, Ch(c) if is_ident_start(c))
                    || second.is('-')
                    || self.is_valid_escape(start + 1)
            }
            Ch('\\') => self.is_valid_escape(start),
            Ch(c) => is_ident_start(c),
            Eof => false,
        }
    }

    /// 4.3.10. [Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn starts_number(&self, start: usize) -> bool {
        match self.peek(start) {
            // e.g. +1, -1, +.1, -0.01
            Ch('+' | '-') => {
                self.peek(start + 1).is_digit()
                    || (self.peek(start + 1).is('.') && self.peek(start + 2).is_digit())
            }
            Ch('.') => self.peek(start + 1).is_digit(),
            c => c.is_digit(),
        }
    }

    /// `u+` followed by a hex digit or a question mark
    fn would_start_unicode_range(&self) -> bool {
        matches!(self.peek(0), Ch('u' | 'U'))
            && self.peek(1).is('+')
            && (self.peek(2).is('?') || self.peek(2).is_hex_digit())
    }

    fn peek(&self, offset: usize) -> CodePoint {
        self.stream.look_ahead(offset)
    }

    fn parse_error(&self, kind: ParseErrorKind, location: Location, message: &str) {
        self.errors
            .borrow_mut()
            .add_error(ErrorOrigin::Tokenizer, kind, location, message);
    }
}
