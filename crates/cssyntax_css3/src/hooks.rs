//! Extension points for a semantic layer on top of the syntax parser
use crate::node::{Declaration, Rule};

/// Decides which parsed constructs are kept. The syntax parser itself has no notion of valid
/// rules or properties, so every method defaults to accepting everything and recognizing no
/// custom properties.
pub trait SyntaxHooks {
    /// Rules for which this returns false are dropped
    fn is_valid_rule(&self, _rule: &Rule) -> bool {
        true
    }

    /// Declarations for which this returns false are dropped (inside a block, the tokens are
    /// then reparsed as a nested rule)
    fn is_valid_declaration(&self, _declaration: &Declaration) -> bool {
        true
    }

    /// Custom properties keep `{}` blocks in their value and their original text
    fn is_custom_property_name(&self, _name: &str) -> bool {
        false
    }
}

/// Hooks with the default behaviour
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl SyntaxHooks for DefaultHooks {}
