use super::error::LexError;
use crate::common::*;
use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
enum RawToken {
    #[regex(r"[0-9]+")]
    Number,
    #[regex(r"[dD]")]
    Dice,
    #[token("%")]
    Percent,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("k", |_| Keyword::Keep)]
    #[token("kh", |_| Keyword::KeepHighest)]
    #[token("kl", |_| Keyword::KeepLowest)]
    #[token("dh", |_| Keyword::DropHighest)]
    #[token("dl", |_| Keyword::DropLowest)]
    #[token("r", |_| Keyword::Reroll)]
    #[token("rr", |_| Keyword::RerollUntil)]
    #[token("!", |_| Keyword::Explode)]
    #[token("!o", |_| Keyword::ExplodeOnce)]
    #[token("mi", |_| Keyword::Minimum)]
    #[token("ma", |_| Keyword::Maximum)]
    #[token("cs", |_| Keyword::CountSuccesses)]
    Modifier(Keyword),

    #[token("=", |_| Comparison::Equal)]
    #[token("<", |_| Comparison::Less)]
    #[token(">", |_| Comparison::Greater)]
    #[token("<=", |_| Comparison::LessEqual)]
    #[token(">=", |_| Comparison::GreaterEqual)]
    Compare(Comparison),

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[error]
    Error,
}

/// Modifier keywords that may follow a dice group.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Keyword {
    Keep,
    KeepHighest,
    KeepLowest,
    DropHighest,
    DropLowest,
    Reroll,
    RerollUntil,
    Explode,
    ExplodeOnce,
    Minimum,
    Maximum,
    CountSuccesses,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "k",
            Self::KeepHighest => "kh",
            Self::KeepLowest => "kl",
            Self::DropHighest => "dh",
            Self::DropLowest => "dl",
            Self::Reroll => "r",
            Self::RerollUntil => "rr",
            Self::Explode => "!",
            Self::ExplodeOnce => "!o",
            Self::Minimum => "mi",
            Self::Maximum => "ma",
            Self::CountSuccesses => "cs",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Number(Int),
    Dice,
    Percent,
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Modifier(Keyword),
    Compare(Comparison),
    /// Always the last token, positioned at the end of the input.
    End,
}

impl TokenKind {
    /// Stands in for any number in lists of expected tokens.
    pub const NUMBER: Self = Self::Number(0);

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Number(_) => "<number>",
            Dice => "'d'",
            Percent => "'%'",
            LeftParen => "'('",
            RightParen => "')'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Modifier(_) => "<modifier>",
            Compare(_) => "<comparison>",
            End => "end of input",
        }
    }

    /// Like `as_str`, but shows the actual number, keyword or comparison.
    pub fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Modifier(kw) => format!("'{}'", kw.as_str()),
            Self::Compare(cmp) => format!("'{}'", cmp),
            other => other.as_str().to_string(),
        }
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range of the token in the input.
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Splits `s` into tokens, always ending with a [`TokenKind::End`].
pub fn tokenize(s: &str) -> Result<NonEmpty<Token>, LexError> {
    let mut tokens = Vec::new();

    for (raw, span) in RawToken::lexer(s).spanned() {
        let slice = &s[span.clone()];
        let kind = match raw {
            RawToken::Number => match slice.parse() {
                Ok(n) => TokenKind::Number(n),
                Err(_) => {
                    return Err(LexError::NumberTooLarge {
                        position: span.start,
                        slice: slice.to_string(),
                    })
                }
            },
            RawToken::Dice => TokenKind::Dice,
            RawToken::Percent => TokenKind::Percent,
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Modifier(kw) => TokenKind::Modifier(kw),
            RawToken::Compare(cmp) => TokenKind::Compare(cmp),
            RawToken::Error => {
                return Err(LexError::UnexpectedChar {
                    position: span.start,
                    found: slice.chars().next().unwrap_or_default(),
                })
            }
        };
        tokens.push(Token::new(kind, span));
    }

    let end = Token::new(TokenKind::End, s.len()..s.len());
    Ok(NonEmpty::from_vec_push(tokens, end))
}
