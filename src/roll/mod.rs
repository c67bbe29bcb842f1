mod ctx;
mod dice;
mod error;
mod limits;
mod result;
mod roller;
mod stringify;

use crate::parse::ast;

pub type RResult<T> = Result<T, RollError>;

pub use ctx::{DefaultRoller, Evaluated, RollContext};
pub use dice::{Dice, DieRoll, DieSource, DieStatus};
pub use error::RollError;
pub use limits::Limits;
pub use result::{build, GroupRolls, RollResult};
pub use roller::{Replay, Roller};
pub use stringify::{render, MarkdownStringifier, SimpleStringifier, Stringify};

/// Evaluates `node` with a fresh context and groups the dice it rolled.
pub fn eval<R: Roller>(node: &ast::Node, roller: R, limits: Limits) -> RResult<RollResult> {
    let mut ctx = RollContext::new(limits, roller);
    let Evaluated { value, trace } = ctx.eval(node)?;
    Ok(build(value, trace))
}
