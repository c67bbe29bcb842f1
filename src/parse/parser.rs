use super::ast::*;
use super::error::{ParseError, ParseErrorKind};
use super::lexer::{Keyword, Token, TokenKind};
use crate::common::*;
use crate::ops::*;

type PResult<T = Node> = Result<T, ParseError>;

/// Recursive descent over a token list that ends in [`TokenKind::End`].
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := '-' factor | dice | number | '(' expr ')'
/// dice   := number? 'd' (number | '%')? modifier*
/// ```
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MULTIPLICATION_OPS: &'static [TokenKind] = &[TokenKind::Star, TokenKind::Slash];

    const FACTOR_START: &'static [TokenKind] = &[
        TokenKind::LeftParen,
        TokenKind::Minus,
        TokenKind::NUMBER,
        TokenKind::Dice,
    ];

    pub fn new(tokens: &'t NonEmpty<Token>) -> Self {
        Self {
            tokens: tokens.as_slice(),
            pos: 0,
        }
    }

    pub fn parse(mut self) -> PResult {
        let node = self.parse_expression()?;
        if self.matches(TokenKind::End) {
            Ok(node)
        } else {
            let mut expected = Self::ADDITION_OPS.to_vec();
            expected.extend_from_slice(Self::MULTIPLICATION_OPS);
            expected.push(TokenKind::End);
            self.unexpected_token(expected)
        }
    }

    fn peek(&self) -> &'t Token {
        let tokens = self.tokens;
        // the trailing `End` is never consumed
        &tokens[self.pos.min(tokens.len() - 1)]
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        options.contains(&self.peek().kind)
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<&'t Token> {
        if self.matches(expected) {
            Ok(self.advance())
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    fn error<T>(&self, kind: ParseErrorKind, token: &Token) -> PResult<T> {
        Err(ParseError {
            kind,
            position: token.span.start,
            found: token.kind.describe(),
        })
    }

    fn unexpected_token<T>(&self, expected: Vec<TokenKind>) -> PResult<T> {
        self.error(ParseErrorKind::UnexpectedToken { expected }, self.peek())
    }

    /// Consumes the next token if it is one of `options`.
    fn binary_op(&mut self, options: &[TokenKind]) -> Option<BinaryOperator> {
        if self.matches_any(options) {
            self.advance().kind.as_binary_op()
        } else {
            None
        }
    }

    fn parse_expression(&mut self) -> PResult {
        let mut lhs = self.parse_term()?;
        while let Some(op) = self.binary_op(Self::ADDITION_OPS) {
            let rhs = self.parse_term()?;
            lhs = Node::new_binary(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> PResult {
        let mut lhs = self.parse_factor()?;
        while let Some(op) = self.binary_op(Self::MULTIPLICATION_OPS) {
            let rhs = self.parse_factor()?;
            lhs = Node::new_binary(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> PResult {
        let token = self.peek();
        match token.kind {
            TokenKind::Minus => {
                self.advance();
                let value = self.parse_factor()?;
                Ok(Node::new_unary(UnaryOperator::Neg, value))
            }
            TokenKind::Number(n) => {
                self.advance();
                if self.matches(TokenKind::Dice) {
                    self.parse_dice(Some((n, token)))
                } else {
                    self.reject_modifier()?;
                    Ok(Node::Literal(n))
                }
            }
            TokenKind::Dice => self.parse_dice(None),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                self.reject_modifier()?;
                Ok(inner)
            }
            _ => self.unexpected_token(Self::FACTOR_START.to_vec()),
        }
    }

    /// Modifiers are only meaningful right after a dice group.
    fn reject_modifier(&self) -> PResult<()> {
        let token = self.peek();
        if let TokenKind::Modifier(_) = token.kind {
            self.error(ParseErrorKind::ModifierWithoutDice, token)
        } else {
            Ok(())
        }
    }

    fn parse_dice(&mut self, count: Option<(Int, &'t Token)>) -> PResult {
        self.consume(TokenKind::Dice)?;

        let count = match count {
            Some((n, token)) => match usize::try_from(n).ok().and_then(Num::new) {
                Some(count) => count,
                None => return self.error(ParseErrorKind::InvalidDice, token),
            },
            None => Num::MIN,
        };

        let token = self.peek();
        let sides = match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                match u32::try_from(n).ok().and_then(Sides::new) {
                    Some(sides) => sides,
                    None => return self.error(ParseErrorKind::InvalidDice, token),
                }
            }
            TokenKind::Percent => {
                self.advance();
                PERCENTILE
            }
            _ => DEFAULT_SIDES,
        };

        let modifiers = self.parse_modifiers(sides)?;
        Ok(Node::Dice(DiceGroup::new(count, sides, modifiers)))
    }

    fn parse_modifiers(&mut self, sides: Sides) -> PResult<Vec<Modifier>> {
        let mut ret = Vec::new();
        while let TokenKind::Modifier(keyword) = self.peek().kind {
            self.advance();
            ret.push(self.parse_modifier(keyword, sides)?);
        }
        Ok(ret)
    }

    fn parse_modifier(&mut self, keyword: Keyword, sides: Sides) -> PResult<Modifier> {
        let max_face = Int::from(sides.get());

        Ok(match keyword {
            Keyword::Keep | Keyword::KeepHighest => KeepHighest(self.parse_count()?).into(),
            Keyword::KeepLowest => KeepLowest(self.parse_count()?).into(),
            Keyword::DropHighest => DropHighest(self.parse_count()?).into(),
            Keyword::DropLowest => DropLowest(self.parse_count()?).into(),
            Keyword::Reroll => Reroll::once(self.parse_condition(Condition::equal_to(1))?).into(),
            Keyword::RerollUntil => {
                Reroll::until(self.parse_condition(Condition::equal_to(1))?).into()
            }
            Keyword::Explode => {
                Explode::recursive(self.parse_condition(Condition::equal_to(max_face))?).into()
            }
            Keyword::ExplodeOnce => {
                Explode::once(self.parse_condition(Condition::equal_to(max_face))?).into()
            }
            Keyword::Minimum => Minimum(self.parse_number()?).into(),
            Keyword::Maximum => Maximum(self.parse_number()?).into(),
            Keyword::CountSuccesses => {
                CountSuccesses(self.parse_condition(Condition::equal_to(max_face))?).into()
            }
        })
    }

    /// Keep/drop counts default to 1.
    fn parse_count(&mut self) -> PResult<usize> {
        match self.peek().kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(usize::try_from(n).unwrap_or(usize::MAX))
            }
            _ => Ok(1),
        }
    }

    fn parse_number(&mut self) -> PResult<Int> {
        match self.peek().kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(n)
            }
            _ => self.unexpected_token(vec![TokenKind::NUMBER]),
        }
    }

    fn parse_condition(&mut self, default: Condition) -> PResult<Condition> {
        match self.peek().kind {
            TokenKind::Compare(cmp) => {
                self.advance();
                let value = self.parse_number()?;
                Ok(Condition::new(cmp, value))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Condition::equal_to(n))
            }
            _ => Ok(default),
        }
    }
}
