use crate::errors::ParseErrorKind;
use crate::node::ComponentValue;
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::{CssError, CssResult};

impl Css3<'_> {
    /// Consumes component values until EOF or the stop token. Inside a block, a `}` ends the list
    /// as well and is left for the caller.
    pub(crate) fn parse_component_value_list(&mut self, nested: bool, stop: &TokenType) -> CssResult<Vec<ComponentValue>> {
        log::trace!("parse_component_value_list");

        let mut values = Vec::new();
        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Eof => return Ok(values),
                _ if Self::at_stop(&t, stop) => return Ok(values),
                TokenType::RCurly => {
                    if nested {
                        return Ok(values);
                    }

                    self.parse_error(ParseErrorKind::UnexpectedCloseCurly, t.location, "unexpected }");
                    self.cursor.discard_token()?;
                    values.push(ComponentValue::PreservedToken(t));
                }
                _ => values.push(self.parse_component_value()?),
            }
        }
    }

    pub(crate) fn parse_component_value(&mut self) -> CssResult<ComponentValue> {
        let t = self.peek()?;
        match t.token_type {
            TokenType::LCurly | TokenType::LBracket | TokenType::LParen => {
                self.nested(t.location, |parser| parser.parse_simple_block())
            }
            TokenType::Function(_) => self.nested(t.location, |parser| parser.parse_function()),
            _ => {
                self.cursor.discard_token()?;
                Ok(ComponentValue::PreservedToken(t))
            }
        }
    }

    /// Consumes a block opened by `{`, `[` or `(` up to its matching closer
    pub(crate) fn parse_simple_block(&mut self) -> CssResult<ComponentValue> {
        let opener = self.consume_any()?;
        let Some(ending) = opener.mirror() else {
            return Err(CssError::internal(
                &format!("expected an opening bracket, got {opener}"),
                opener.location,
            ));
        };

        let mut items = Vec::new();
        loop {
            let t = self.peek()?;
            if t.is_eof() {
                self.parse_error(
                    ParseErrorKind::EofInBlock,
                    t.location,
                    &format!("unexpected end of input, expected {}", Self::closer_text(&ending)),
                );
                break;
            }

            if t.token_type == ending {
                self.cursor.discard_token()?;
                break;
            }

            items.push(self.parse_component_value()?);
        }

        Ok(ComponentValue::SimpleBlock { opener, items })
    }

    fn closer_text(ending: &TokenType) -> &'static str {
        match ending {
            TokenType::RCurly => "}",
            TokenType::RBracket => "]",
            _ => ")",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::ParseErrorKind;
    use crate::node::ComponentValue;
    use crate::parser::tests::{ident, int, shape, ws};
    use crate::parser_config::ParserConfig;
    use crate::Css3;
    use test_case::test_case;

    fn values(input: &str) -> (Vec<ComponentValue>, Vec<ParseErrorKind>) {
        let parsed = Css3::parse_component_values(input.as_bytes(), ParserConfig::default()).unwrap();
        (parsed.value, parsed.errors.iter().map(|e| e.kind).collect())
    }

    #[test]
    fn test_blocks_nest() {
        let (v, errors) = values("[a (1)] {b}");
        assert!(errors.is_empty());
        assert_eq!(v.len(), 3);
        assert_eq!(
            shape(&v),
            vec![
                format!("[{} {} ({})]", ident("a"), ws(), int(1.0)),
                ws(),
                format!("{{{}}}", ident("b")),
            ]
        );
    }

    #[test_case("(a ]", "(" ; "paren")]
    #[test_case("[a )", "[" ; "bracket")]
    #[test_case("{a ]", "{" ; "curly")]
    fn test_mismatched_closer_is_not_a_closer(input: &str, opener: &str) {
        let (v, errors) = values(input);
        assert_eq!(v.len(), 1);
        let ComponentValue::SimpleBlock { opener: o, items } = &v[0] else {
            panic!("expected a block");
        };
        assert_eq!(o.to_string(), opener);
        // the wrong closer stays inside the block as a preserved token
        assert_eq!(items.len(), 3);
        assert_eq!(errors, vec![ParseErrorKind::EofInBlock]);
    }

    #[test]
    fn test_stray_close_curly_at_top_level() {
        let (v, errors) = values("a } b");
        assert_eq!(v.len(), 5);
        assert_eq!(errors, vec![ParseErrorKind::UnexpectedCloseCurly]);
    }

    #[test]
    fn test_function_in_block() {
        let (v, errors) = values("(calc(1 + 2))");
        assert!(errors.is_empty());
        let ComponentValue::SimpleBlock { items, .. } = &v[0] else {
            panic!("expected a block");
        };
        assert!(matches!(&items[0], ComponentValue::Function { name, items } if name == "calc" && items.len() == 5));
    }
}
