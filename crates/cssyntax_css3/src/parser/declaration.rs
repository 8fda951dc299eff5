use crate::errors::ParseErrorKind;
use crate::node::{ComponentValue, Declaration};
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::CssResult;
use itertools::Itertools;

impl Css3<'_> {
    /// Consumes a declaration. Returns `None` when the tokens do not form a (valid) declaration.
    /// Callers inside a block rewind the cursor in that case.
    pub(crate) fn parse_declaration(&mut self, nested: bool) -> CssResult<Option<Declaration>> {
        log::trace!("parse_declaration");

        let t = self.peek()?;
        let TokenType::Ident(name) = t.token_type else {
            self.parse_error(
                ParseErrorKind::InvalidDeclaration,
                t.location,
                &format!("expected property name, got {t}"),
            );
            self.parse_bad_declaration_remnants(nested)?;
            return Ok(None);
        };
        self.cursor.discard_token()?;

        self.cursor.discard_whitespace()?;

        let t = self.peek()?;
        if t.token_type != TokenType::Colon {
            self.parse_error(
                ParseErrorKind::InvalidDeclaration,
                t.location,
                &format!("expected : after {name}, got {t}"),
            );
            self.parse_bad_declaration_remnants(nested)?;
            return Ok(None);
        }
        self.cursor.discard_token()?;

        self.cursor.discard_whitespace()?;

        let start = self.peek()?.location;
        let mut value = self.parse_component_value_list(nested, &TokenType::Semicolon)?;
        let end = self.peek()?.location;

        let important = Self::strip_important(&mut value);

        while value.last().is_some_and(ComponentValue::is_whitespace) {
            value.pop();
        }

        let custom_property = self.hooks.is_custom_property_name(&name);

        let original_text = if custom_property {
            Some(self.source_between(start, end))
        } else {
            let has_curly_block = value.iter().any(ComponentValue::is_curly_block);
            let has_other = value.iter().any(|v| !v.is_whitespace() && !v.is_curly_block());
            if has_curly_block && has_other {
                self.parse_error(
                    ParseErrorKind::InvalidDeclaration,
                    start,
                    &format!("{{}}-block mixed with other values in {name}"),
                );
                return Ok(None);
            }
            None
        };

        let declaration = Declaration {
            name,
            value,
            important,
            original_text,
        };

        if !self.hooks.is_valid_declaration(&declaration) {
            log::warn!("dropping declaration rejected by validity hook: {}", declaration.name);
            return Ok(None);
        }

        Ok(Some(declaration))
    }

    /// Removes a trailing `! important` from the value. Only done when at least one other value
    /// precedes it, so a value of just `!important` is kept as is.
    fn strip_important(value: &mut Vec<ComponentValue>) -> bool {
        let significant = value.iter().positions(|v| !v.is_whitespace()).collect::<Vec<_>>();
        let [.., _, bang, last] = significant[..] else {
            return false;
        };

        let is_bang = value[bang].as_token().is_some_and(|t| t.is_delim('!'));
        let is_important = value[last].as_token().is_some_and(|t| t.is_ident_ci("important"));
        if !(is_bang && is_important) {
            return false;
        }

        value.truncate(bang);
        true
    }

    /// Skips the rest of a malformed declaration. Inside a block, a `}` is left for the caller.
    pub(crate) fn parse_bad_declaration_remnants(&mut self, nested: bool) -> CssResult<()> {
        log::trace!("parse_bad_declaration_remnants");

        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Semicolon => {
                    self.cursor.discard_token()?;
                    return Ok(());
                }
                TokenType::Eof => return Ok(()),
                TokenType::RCurly => {
                    if !nested {
                        self.cursor.discard_token()?;
                    }
                    return Ok(());
                }
                _ => {
                    self.parse_component_value()?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::hooks::{DefaultHooks, SyntaxHooks};
    use crate::node::{Declaration, Rule};
    use crate::parser::tests::{decl_names, ident, shape, ws};
    use crate::parser_config::ParserConfig;
    use crate::tokenizer::TokenType;
    use crate::Css3;
    use test_case::test_case;

    fn declarations(body: &str) -> Vec<Declaration> {
        let parsed = Css3::parse_block_contents(body.as_bytes(), ParserConfig::default()).unwrap();
        parsed.value.declarations
    }

    #[test_case("color: red !important", true, 1 ; "important")]
    #[test_case("color: red ! important", true, 1 ; "space after bang")]
    #[test_case("color: red !IMPORTANT  ", true, 1 ; "case insensitive with trailing whitespace")]
    #[test_case("color: red blue!important", true, 3 ; "no space before bang")]
    #[test_case("color: red important", false, 3 ; "missing bang")]
    #[test_case("color: red !important x", false, 6 ; "not at the end")]
    fn test_important(body: &str, important: bool, value_len: usize) {
        let decls = declarations(body);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].important, important);
        assert_eq!(decls[0].value.len(), value_len, "{:?}", shape(&decls[0].value));
    }

    #[test_case("color: !important" ; "bang and ident only")]
    #[test_case("color: ! important" ; "separated")]
    fn test_lone_important_is_kept(body: &str) {
        let decls = declarations(body);
        assert_eq!(decls.len(), 1);
        assert!(!decls[0].important);

        let value = &decls[0].value;
        assert!(value.first().is_some_and(|v| v.is_token(&TokenType::Delim('!'))));
        assert!(value.last().is_some_and(|v| v.is_token(&TokenType::Ident("important".into()))));
    }

    #[test]
    fn test_trailing_whitespace_is_stripped() {
        let decls = declarations("margin: 1px  2px \n ; top: 0");
        assert_eq!(decl_names(&decls), vec!["margin", "top"]);
        assert_eq!(shape(&decls[0].value).len(), 3);
        assert_eq!(shape(&decls[0].value)[1], ws());
    }

    #[test]
    fn test_empty_value() {
        let decls = declarations("color:;");
        assert_eq!(decl_names(&decls), vec!["color"]);
        assert!(decls[0].value.is_empty());
    }

    #[test]
    fn test_curly_block_alone_is_accepted() {
        let decls = declarations("foo: {a b}");
        assert_eq!(decl_names(&decls), vec!["foo"]);
        assert!(decls[0].value[0].is_curly_block());
    }

    #[test]
    fn test_curly_block_with_other_values_is_a_rule() {
        let parsed = Css3::parse_block_contents(b"foo: x {a: b}", ParserConfig::default()).unwrap();
        assert!(parsed.value.declarations.is_empty());
        assert_eq!(parsed.value.rules.len(), 1);
        let Rule::QualifiedRule { prelude, declarations, .. } = &parsed.value.rules[0] else {
            panic!("expected a qualified rule");
        };
        assert_eq!(shape(prelude)[0], ident("foo"));
        assert_eq!(decl_names(declarations), vec!["a"]);
    }

    struct CustomProperties;

    impl SyntaxHooks for CustomProperties {
        fn is_custom_property_name(&self, name: &str) -> bool {
            name.starts_with("--")
        }

        fn is_valid_declaration(&self, declaration: &Declaration) -> bool {
            declaration.name != "bogus"
        }
    }

    #[test]
    fn test_custom_property_keeps_blocks_and_text() {
        let parsed = Css3::parse_bytes_with_hooks(
            b"a { --x: foo {a b} ; bogus: 1; color: red }",
            ParserConfig::default(),
            &CustomProperties,
        )
        .unwrap();

        let decls = parsed.value.rules[0].declarations();
        assert_eq!(decl_names(decls), vec!["--x", "color"]);
        assert_eq!(decls[0].original_text.as_deref(), Some("foo {a b} "));
        assert_eq!(decls[0].value.len(), 3);
        assert!(decls[0].value[2].is_curly_block());
        assert_eq!(decls[1].original_text, None);
    }

    #[test_case(false, TokenType::Whitespace ; "top level consumes the curly")]
    #[test_case(true, TokenType::RCurly ; "nested leaves the curly")]
    fn test_bad_declaration_remnants(nested: bool, next: TokenType) {
        let mut parser = Css3::new(b"1px (a; b) } color: red", ParserConfig::default(), &DefaultHooks).unwrap();
        assert!(parser.parse_declaration(nested).unwrap().is_none());
        assert_eq!(parser.peek().unwrap().token_type, next);
    }

    #[test]
    fn test_bad_declaration_remnants_stop_at_semicolon() {
        let mut parser = Css3::new(b"a b; c: d", ParserConfig::default(), &DefaultHooks).unwrap();
        assert!(parser.parse_declaration(false).unwrap().is_none());
        parser.cursor.discard_whitespace().unwrap();

        let declaration = parser.parse_declaration(false).unwrap().unwrap();
        assert_eq!(declaration.name, "c");
        assert_eq!(shape(&declaration.value), vec![ident("d")]);
    }
}
