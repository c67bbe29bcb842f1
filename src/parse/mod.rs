pub mod ast;
mod error;
mod lexer;
mod parser;
pub mod visit;

pub use error::{LexError, ParseError, ParseErrorKind};
pub use lexer::{tokenize, Keyword, Token, TokenKind};
pub use parser::Parser;

use crate::common::NonEmpty;

/// Builds the syntax tree for an already tokenized expression.
pub fn parse_tokens(tokens: &NonEmpty<Token>) -> Result<ast::Node, ParseError> {
    Parser::new(tokens).parse()
}
