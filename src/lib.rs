pub mod ast;
pub mod cursor;
pub mod eval;
pub mod parse;

pub use ast::{Node, render};
pub use cursor::Cursor;
pub use eval::evaluate;
pub use parse::{ParseError, Parser};

/// Parses `text` into an expression tree.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    Parser::new(None, text).parse_expression()
}
