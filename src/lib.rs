//! CSS syntax tokenizer and parser
//!
//! Re-exports the workspace crates so hosts only depend on `cssyntax`.
pub use cssyntax_css3 as css3;
pub use cssyntax_shared as shared;

pub use cssyntax_css3::node::{BlockContents, ComponentValue, Declaration, Rule, Stylesheet};
pub use cssyntax_css3::parser_config::{ParserConfig, Tokenization};
pub use cssyntax_css3::{Css3, Parsed};
pub use cssyntax_shared::errors::{CssError, CssResult};
