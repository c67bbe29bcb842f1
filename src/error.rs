use crate::dist::DistError;
use crate::parse::{LexError, ParseError};
use crate::roll::RollError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Roll(#[from] RollError),
    #[error("{0}")]
    Distribution(#[from] DistError),
}

impl Error {
    /// Byte offset into the expression, for errors found before evaluation.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex(e) => Some(e.position()),
            Self::Parse(e) => Some(e.position),
            Self::Roll(_) | Self::Distribution(_) => None,
        }
    }
}
