use crate::errors::ParseErrorKind;
use crate::node::BlockContents;
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::{CssError, CssResult};

impl Css3<'_> {
    /// Consumes a `{}` block holding declarations and rules. The cursor must be positioned on
    /// the opening `{`.
    pub(crate) fn parse_block(&mut self) -> CssResult<BlockContents> {
        log::trace!("parse_block");

        let t = self.consume_any()?;
        if t.token_type != TokenType::LCurly {
            return Err(CssError::internal(&format!("expected {{, got {t}"), t.location));
        }

        let contents = self.nested(t.location, |parser| parser.consume_block_contents())?;

        let t = self.peek()?;
        if t.is_eof() {
            self.parse_error(ParseErrorKind::EofInBlock, t.location, "unexpected end of input, expected }");
        } else {
            self.cursor.discard_token()?;
        }

        Ok(contents)
    }

    /// Consumes declarations and nested rules up to the closing `}` or EOF, which is left for
    /// the caller.
    pub(crate) fn consume_block_contents(&mut self) -> CssResult<BlockContents> {
        log::trace!("consume_block_contents");

        let mut contents = BlockContents::default();

        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Whitespace | TokenType::Semicolon => {
                    self.cursor.discard_token()?;
                }
                TokenType::Eof | TokenType::RCurly => return Ok(contents),
                TokenType::AtKeyword(_) => {
                    if let Some(rule) = self.parse_at_rule(true)? {
                        contents.rules.push(rule);
                    }
                }
                _ => {
                    // A declaration and a nested rule can start the same way. Try the
                    // declaration first and fall back to a rule over the same tokens.
                    self.cursor.mark();
                    let checkpoint = self.errors.borrow().checkpoint();

                    if let Some(declaration) = self.parse_declaration(true)? {
                        self.cursor.discard_mark();
                        contents.declarations.push(declaration);
                        continue;
                    }

                    self.cursor.restore_mark();
                    self.errors.borrow_mut().rollback(checkpoint);

                    if let Some(rule) = self.parse_qualified_rule(true, &TokenType::Semicolon)? {
                        contents.rules.push(rule);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::ParseErrorKind;
    use crate::hooks::DefaultHooks;
    use crate::parser::tests::{decl_names, ident, shape, ws};
    use crate::parser_config::ParserConfig;
    use crate::tokenizer::TokenType;
    use crate::Css3;
    use test_case::test_case;

    #[test]
    fn test_unclosed_block() {
        let parsed = Css3::parse_str("a { color: red", ParserConfig::default()).unwrap();
        assert_eq!(parsed.value.rules.len(), 1);
        assert_eq!(decl_names(parsed.value.rules[0].declarations()), vec!["color"]);
        assert_eq!(
            parsed.errors.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![ParseErrorKind::EofInBlock]
        );
    }

    #[test_case("a { ;; color: red;;; }" ; "extra semicolons")]
    #[test_case("a{color:red}" ; "no whitespace")]
    #[test_case("a {\n\tcolor : red ;\n}" ; "whitespace everywhere")]
    fn test_declaration_separators(input: &str) {
        let parsed = Css3::parse_str(input, ParserConfig::default()).unwrap();
        assert!(parsed.errors.is_empty());
        let decls = parsed.value.rules[0].declarations();
        assert_eq!(decl_names(decls), vec!["color"]);
        assert_eq!(shape(&decls[0].value), vec![ident("red")]);
    }

    #[test]
    fn test_invalid_declaration_is_skipped() {
        // `color red` is neither a declaration nor a rule
        let parsed = Css3::parse_str("a { color red; top: 0 }", ParserConfig::default()).unwrap();
        let rule = &parsed.value.rules[0];
        assert_eq!(decl_names(rule.declarations()), vec!["top"]);
        assert!(rule.children().is_empty());
        assert_eq!(
            parsed.errors.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![ParseErrorKind::UnexpectedStopToken]
        );
    }

    #[test]
    fn test_backtracking_discards_declaration_errors() {
        // The declaration attempt fails on the `{}` block after raising errors inside it. Only
        // the errors of the rule parsed from the same tokens remain.
        let parsed = Css3::parse_str("a { b:hover { (", ParserConfig::default()).unwrap();
        let kinds = parsed.errors.iter().map(|e| e.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![ParseErrorKind::EofInBlock, ParseErrorKind::EofInRule, ParseErrorKind::EofInBlock]
        );
        assert_eq!(parsed.value.rules[0].children().len(), 1);
    }

    #[test]
    fn test_parse_block_contents_entry_point() {
        let parsed = Css3::parse_block_contents(b"color: red; &:hover { color: blue }; margin: 0", ParserConfig::default()).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(decl_names(&parsed.value.declarations), vec!["color", "margin"]);
        assert_eq!(parsed.value.rules.len(), 1);
        assert_eq!(
            shape(parsed.value.rules[0].prelude()),
            vec![
                format!("{:?}", TokenType::Delim('&')),
                format!("{:?}", TokenType::Colon),
                ident("hover"),
                ws(),
            ]
        );
    }

    #[test]
    fn test_block_contents_leave_the_close_curly() {
        let mut parser = Css3::new(b"color: red; b {} } top: 0", ParserConfig::default(), &DefaultHooks).unwrap();
        let contents = parser.consume_block_contents().unwrap();
        assert_eq!(decl_names(&contents.declarations), vec!["color"]);
        assert_eq!(contents.rules.len(), 1);
        assert_eq!(parser.peek().unwrap().token_type, TokenType::RCurly);

        // the entry point reports the stray `}` and carries on
        let parsed = Css3::parse_block_contents(b"color: red; b {} } top: 0", ParserConfig::default()).unwrap();
        assert_eq!(decl_names(&parsed.value.declarations), vec!["color", "top"]);
        assert_eq!(parsed.value.rules.len(), 1);
    }
}
