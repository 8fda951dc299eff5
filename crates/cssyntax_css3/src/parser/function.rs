use crate::errors::ParseErrorKind;
use crate::node::ComponentValue;
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::{CssError, CssResult};

impl Css3<'_> {
    pub(crate) fn parse_function(&mut self) -> CssResult<ComponentValue> {
        log::trace!("parse_function");

        let t = self.consume_any()?;
        let TokenType::Function(name) = t.token_type else {
            return Err(CssError::internal(&format!("expected function, got {t}"), t.location));
        };

        let mut items = Vec::new();
        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Eof => {
                    self.parse_error(
                        ParseErrorKind::EofInFunction,
                        t.location,
                        &format!("unexpected end of input in {name}()"),
                    );
                    break;
                }
                TokenType::RParen => {
                    self.cursor.discard_token()?;
                    break;
                }
                _ => items.push(self.parse_component_value()?),
            }
        }

        Ok(ComponentValue::Function { name, items })
    }
}
