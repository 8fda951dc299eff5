use crate::errors::ParseErrorKind;
use crate::node::{ComponentValue, Rule};
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::{CssError, CssResult};

impl Css3<'_> {
    /// Consumes an at-rule. Returns `None` when the rule is dropped by the validity hook.
    pub(crate) fn parse_at_rule(&mut self, nested: bool) -> CssResult<Option<Rule>> {
        log::trace!("parse_at_rule");

        let t = self.consume_any()?;
        let TokenType::AtKeyword(name) = t.token_type else {
            return Err(CssError::internal(&format!("expected at-keyword, got {t}"), t.location));
        };

        let mut prelude = Vec::new();
        let mut declarations = Vec::new();
        let mut children = Vec::new();

        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Semicolon => {
                    self.cursor.discard_token()?;
                    break;
                }
                TokenType::Eof => {
                    self.parse_error(
                        ParseErrorKind::EofInRule,
                        t.location,
                        &format!("unexpected end of input in @{name}"),
                    );
                    break;
                }
                TokenType::RCurly => {
                    if nested {
                        break;
                    }

                    self.parse_error(ParseErrorKind::UnexpectedCloseCurly, t.location, "unexpected }");
                    self.cursor.discard_token()?;
                    prelude.push(ComponentValue::PreservedToken(t));
                }
                TokenType::LCurly => {
                    let contents = self.parse_block()?;
                    declarations = contents.declarations;
                    children = contents.rules;
                    break;
                }
                _ => prelude.push(self.parse_component_value()?),
            }
        }

        let rule = Rule::AtRule {
            name,
            prelude,
            declarations,
            children,
        };

        Ok(self.validate_rule(rule))
    }

    /// Runs the validity hook on a completed rule
    pub(crate) fn validate_rule(&self, rule: Rule) -> Option<Rule> {
        if self.hooks.is_valid_rule(&rule) {
            return Some(rule);
        }

        log::warn!("dropping rule rejected by validity hook: {:?}", rule.prelude());
        None
    }
}
