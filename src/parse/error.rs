use super::lexer::TokenKind;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("error at position {position}: unexpected character {found:?}")]
    UnexpectedChar { position: usize, found: char },
    #[error("error at position {position}: number {slice:?} is too large")]
    NumberTooLarge { position: usize, slice: String },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedChar { position, .. } | Self::NumberTooLarge { position, .. } => {
                *position
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error at position {position} (found {found}): {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset of the offending token.
    pub position: usize,
    /// Description of the offending token.
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: Vec<TokenKind> },
    /// A dice group with no dice, or dice with no sides.
    InvalidDice,
    /// A modifier following something other than a dice group.
    ModifierWithoutDice,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { expected } => {
                write!(f, "unexpected token; expected ")?;
                fmt_expected(expected, f)
            }
            Self::InvalidDice => {
                write!(f, "dice need a count and a number of sides of at least 1")
            }
            Self::ModifierWithoutDice => write!(f, "modifiers can only follow dice"),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let len = expected.len();

    if expected.is_empty() {
        Ok(())
    } else if len == 1 {
        f.write_str(expected[0].as_str())
    } else if len == 2 {
        write!(f, "{} or {}", expected[0].as_str(), expected[1].as_str())
    } else {
        for exp in &expected[..len - 1] {
            write!(f, "{}, ", exp.as_str())?;
        }
        write!(f, "or {}", expected[len - 1].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_expected() {
        let err = ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                expected: vec![TokenKind::NUMBER, TokenKind::Percent],
            },
            position: 2,
            found: "end of input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error at position 2 (found end of input): unexpected token; expected <number> or '%'"
        );

        let kind = ParseErrorKind::UnexpectedToken {
            expected: vec![TokenKind::LeftParen, TokenKind::Minus, TokenKind::Dice],
        };
        assert_eq!(kind.to_string(), "unexpected token; expected '(', '-', or 'd'");
    }
}
