use crate::common::{ArithmeticError, Int};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollError {
    #[error("invalid roll range: {min} is greater than {max}")]
    InvalidRange { min: Int, max: Int },
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("reroll did not settle after {limit} attempts")]
    RerollLoopExceeded { limit: usize },
    #[error("exploding dice chained more than {limit} times")]
    ExplodeLoopExceeded { limit: usize },
    #[error("too many dice rolled (limit is {limit})")]
    TooManyRolls { limit: usize },
    #[error("integer overflow")]
    Overflow,
}

impl From<ArithmeticError> for RollError {
    fn from(e: ArithmeticError) -> Self {
        match e {
            ArithmeticError::DivisionByZero => Self::DivisionByZero,
            ArithmeticError::Overflow => Self::Overflow,
        }
    }
}
