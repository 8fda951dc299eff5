use crate::errors::ParseErrorKind;
use crate::node::{ComponentValue, Rule};
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::CssResult;

impl Css3<'_> {
    /// Consumes a qualified rule. Returns `None` when the rule is invalid and has been dropped.
    ///
    /// `stop` is the token that aborts the rule besides EOF (`;` inside blocks, `Eof` for none).
    pub(crate) fn parse_qualified_rule(&mut self, nested: bool, stop: &TokenType) -> CssResult<Option<Rule>> {
        log::trace!("parse_qualified_rule");

        let mut prelude = Vec::new();

        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Eof => {
                    self.parse_error(ParseErrorKind::EofInRule, t.location, "unexpected end of input in rule prelude");
                    return Ok(None);
                }
                _ if Self::at_stop(&t, stop) => {
                    self.parse_error(
                        ParseErrorKind::UnexpectedStopToken,
                        t.location,
                        &format!("unexpected {t} in rule prelude"),
                    );
                    return Ok(None);
                }
                TokenType::RCurly => {
                    self.parse_error(ParseErrorKind::UnexpectedCloseCurly, t.location, "unexpected }");
                    if nested {
                        return Ok(None);
                    }

                    self.cursor.discard_token()?;
                    prelude.push(ComponentValue::PreservedToken(t));
                }
                TokenType::LCurly => {
                    if Self::looks_like_custom_property(&prelude) {
                        // `--foo: {...}` is a declaration that ended up here, not a rule
                        self.parse_component_value()?;
                        self.parse_error(
                            ParseErrorKind::InvalidRule,
                            t.location,
                            "custom property where a rule was expected",
                        );
                        return Ok(None);
                    }

                    let contents = self.parse_block()?;
                    let rule = Rule::QualifiedRule {
                        prelude,
                        declarations: contents.declarations,
                        children: contents.rules,
                    };

                    return Ok(self.validate_rule(rule));
                }
                _ => prelude.push(self.parse_component_value()?),
            }
        }
    }

    /// Returns true when the prelude starts with `--ident` followed by a colon
    fn looks_like_custom_property(prelude: &[ComponentValue]) -> bool {
        let mut tokens = prelude.iter().filter(|v| !v.is_whitespace());

        let starts_with_dashed_ident = tokens
            .next()
            .and_then(ComponentValue::as_token)
            .is_some_and(|t| matches!(&t.token_type, TokenType::Ident(name) if name.starts_with("--")));

        starts_with_dashed_ident && tokens.next().is_some_and(|v| v.is_token(&TokenType::Colon))
    }
}
