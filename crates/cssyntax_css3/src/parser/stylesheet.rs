use crate::node::Stylesheet;
use crate::tokenizer::TokenType;
use crate::Css3;
use cssyntax_shared::errors::CssResult;

impl Css3<'_> {
    pub(crate) fn parse_stylesheet(&mut self) -> CssResult<Stylesheet> {
        log::trace!("parse_stylesheet");

        let mut rules = Vec::new();

        loop {
            let t = self.peek()?;
            match t.token_type {
                TokenType::Whitespace | TokenType::Cdo | TokenType::Cdc => {
                    self.cursor.discard_token()?;
                }
                TokenType::Eof => break,
                TokenType::AtKeyword(_) => {
                    if let Some(rule) = self.parse_at_rule(false)? {
                        rules.push(rule);
                    }
                }
                _ => {
                    if let Some(rule) = self.parse_qualified_rule(false, &TokenType::Eof)? {
                        rules.push(rule);
                    }
                }
            }
        }

        log::debug!(
            "parsed {} rules from {}",
            rules.len(),
            self.config.source.as_deref().unwrap_or("<input>")
        );

        Ok(Stylesheet { rules })
    }
}

#[cfg(test)]
mod tests {
    use crate::node::Rule;
    use crate::parser::tests::{ident, shape, ws};
    use crate::parser_config::ParserConfig;
    use crate::Css3;

    #[test]
    fn test_cdo_cdc_are_skipped() {
        let parsed = Css3::parse_str("<!-- a {} --> b {}", ParserConfig::default()).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.value.rules.len(), 2);
        assert_eq!(shape(parsed.value.rules[0].prelude()), vec![ident("a"), ws()]);
        assert_eq!(shape(parsed.value.rules[1].prelude()), vec![ident("b"), ws()]);
    }

    #[test]
    fn test_empty_stylesheet() {
        let parsed = Css3::parse_str("  \n ", ParserConfig::default()).unwrap();
        assert!(parsed.value.rules.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_rules_in_source_order() {
        let parsed = Css3::parse_str("@import 'x'; a {} @media print {}", ParserConfig::default()).unwrap();
        let rules = &parsed.value.rules;
        assert_eq!(rules.len(), 3);
        assert!(matches!(&rules[0], Rule::AtRule { name, .. } if name == "import"));
        assert!(matches!(&rules[1], Rule::QualifiedRule { .. }));
        assert!(matches!(&rules[2], Rule::AtRule { name, .. } if name == "media"));
    }
}
