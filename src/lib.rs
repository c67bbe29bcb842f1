//! Dice notation parsing and evaluation.
//!
//! ```
//! use dice_eval::{evaluate_with, Limits, Replay};
//!
//! let result = evaluate_with("4d6kh3 + 2", Replay::new(vec![1, 6, 3, 2]), Limits::default()).unwrap();
//! assert_eq!(result.total, 13);
//! assert_eq!(result.to_string(), "4d6kh3 [~~1~~, 6, 3, 2] + 2 = 13");
//! ```

pub mod common;
pub mod dist;
mod error;
pub mod ops;
pub mod parse;
pub mod roll;

pub use dist::{DistError, Distribution};
pub use error::Error;
pub use parse::{ast::Node, tokenize, LexError, ParseError, Token, TokenKind};
pub use roll::{
    DieRoll, DieSource, DieStatus, GroupRolls, Limits, MarkdownStringifier, Replay, RollContext,
    RollError, RollResult, Roller, SimpleStringifier, Stringify,
};

use log::debug;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Tokenizes and parses `s` into a syntax tree.
pub fn parse(s: &str) -> Result<Node> {
    let tokens = tokenize(s)?;
    Ok(parse::parse_tokens(&tokens)?)
}

/// Rolls `s` with the thread-local generator and default limits.
pub fn evaluate(s: &str) -> Result<RollResult> {
    evaluate_with(s, rand::thread_rng(), Limits::default())
}

pub fn evaluate_with<R: Roller>(s: &str, roller: R, limits: Limits) -> Result<RollResult> {
    let ast = parse(s)?;
    debug!("evaluating {}", ast);
    let result = roll::eval(&ast, roller, limits)?;
    Ok(result.with_breakdown(&ast, &mut SimpleStringifier))
}

/// Exact distribution of `s` under default limits.
pub fn distribution(s: &str) -> Result<Distribution> {
    distribution_with(s, Limits::default())
}

pub fn distribution_with(s: &str, limits: Limits) -> Result<Distribution> {
    let ast = parse(s)?;
    debug!("computing distribution of {}", ast);
    Ok(dist::Distributor::new(limits).eval(&ast)?)
}
