use crate::tokenizer::{Token, TokenType};
use serde::Serialize;

/// A token, a function call, or a bracketed block
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum ComponentValue {
    /// Any token that is not a function or an opening bracket
    PreservedToken(Token),
    Function {
        name: String,
        items: Vec<ComponentValue>,
    },
    SimpleBlock {
        /// The `(`, `[` or `{` token that opened the block
        opener: Token,
        items: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, ComponentValue::PreservedToken(t) if t.is_whitespace())
    }

    /// Returns the preserved token, if this is one
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            ComponentValue::PreservedToken(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_token(&self, token_type: &TokenType) -> bool {
        matches!(self, ComponentValue::PreservedToken(t) if t.token_type == *token_type)
    }

    /// Returns true for a `{}` block
    pub fn is_curly_block(&self) -> bool {
        matches!(self, ComponentValue::SimpleBlock { opener, .. } if opener.token_type == TokenType::LCurly)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Declaration {
    pub name: String,
    /// Value without the `!important` marker and without trailing whitespace
    pub value: Vec<ComponentValue>,
    pub important: bool,
    /// Source text of the value, only kept for custom properties
    pub original_text: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Rule {
    AtRule {
        name: String,
        prelude: Vec<ComponentValue>,
        declarations: Vec<Declaration>,
        children: Vec<Rule>,
    },
    QualifiedRule {
        prelude: Vec<ComponentValue>,
        declarations: Vec<Declaration>,
        children: Vec<Rule>,
    },
}

impl Rule {
    pub fn prelude(&self) -> &[ComponentValue] {
        match self {
            Rule::AtRule { prelude, .. } | Rule::QualifiedRule { prelude, .. } => prelude,
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        match self {
            Rule::AtRule { declarations, .. } | Rule::QualifiedRule { declarations, .. } => declarations,
        }
    }

    pub fn children(&self) -> &[Rule] {
        match self {
            Rule::AtRule { children, .. } | Rule::QualifiedRule { children, .. } => children,
        }
    }
}

/// Contents of a `{}` block: the declarations and nested rules, each in source order
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct BlockContents {
    pub declarations: Vec<Declaration>,
    pub rules: Vec<Rule>,
}

/// The parse result: every top level rule in source order
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}
