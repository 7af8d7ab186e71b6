//! CSS engine: tokenizer, parser, specificity, selector matching and
//! compiled design stylesheets.

pub mod matcher;
pub mod model;
pub mod parser;
pub mod properties;
pub mod sheet;
pub mod specificity;
pub mod tokenizer;

pub use parser::{parse_css, ParseError};
pub use sheet::{CssStyle, CssStyleSheet, IncludedCss, IncludedCssStyleSheet};
pub use specificity::Specificity;
