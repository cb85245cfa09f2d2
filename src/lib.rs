//! Lexer, parser and bracket validator for the macro scripting language (MSL)
//!
//! MSL describes input sequences such as `Shift[2000]+(W,A,S,D)` or
//! `wheel_up*3`. [`tokenize`] turns text into tokens, [`parse`] builds a
//! [`Node`] tree from them, and [`validate_brackets`] reports every bracket
//! or unknown-character problem in one pass.

pub mod ast;
pub mod check;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;
pub mod validate;
pub mod visit;

#[cfg(test)]
mod property_tests;

pub use ast::{Node, NodeKind, WheelDirection};
pub use check::{SyntaxReport, check, check_with};
pub use config::{Config, LimitsConfig, ParserConfig};
pub use error::{ConfigError, Location, ParseError, ParseErrorKind};
pub use lexer::tokenize;
pub use parser::{parse, parse_with};
pub use printer::{to_msl, tree_string};
pub use token::{Position, Token, TokenKind, token_statistics};
pub use validate::{Diagnostic, DiagnosticKind, validate_brackets};
pub use visit::{Stats, Visitor, walk_post_order};
