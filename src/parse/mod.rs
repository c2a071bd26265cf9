pub mod ast;
mod error;
pub mod lexer;
mod parser;
pub mod visit;

use crate::config::Limits;

pub use error::InvalidToken;
pub use parser::Parser;

/// Parses an equation with the default [Limits].
pub fn parse(s: &str) -> Result<ast::Expression, InvalidToken> {
    Parser::new(s).parse()
}

pub fn parse_with_limits(s: &str, limits: Limits) -> Result<ast::Expression, InvalidToken> {
    Parser::with_limits(s, limits).parse()
}
