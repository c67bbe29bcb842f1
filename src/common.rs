use std::fmt::{self, Write};
use std::num::{NonZeroU32, NonZeroUsize};
pub use vec1::vec1;

/// Integer type every expression is evaluated in.
pub type Int = i64;
pub type UInt = u32;

/// Number of faces on a die.
pub type Sides = NonZeroU32;

/// Number of dice in a group.
pub type Num = NonZeroUsize;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Sides used for `d%`.
pub const PERCENTILE: Sides = match Sides::new(100) {
    Some(sides) => sides,
    None => unreachable!(),
};

/// Sides used when a dice group leaves them out, as in `3d`.
pub const DEFAULT_SIDES: Sides = match Sides::new(6) {
    Some(sides) => sides,
    None => unreachable!(),
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Neg,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neg => f.write_char('-'),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    /// Binding strength; higher binds tighter.
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }
}

/// Failure of a single integer operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArithmeticError {
    DivisionByZero,
    Overflow,
}

impl BinaryOperator {
    /// Checked integer arithmetic; division truncates toward zero.
    pub fn apply(&self, l: Int, r: Int) -> Result<Int, ArithmeticError> {
        let result = match self {
            Self::Add => l.checked_add(r),
            Self::Sub => l.checked_sub(r),
            Self::Mul => l.checked_mul(r),
            Self::Div if r == 0 => return Err(ArithmeticError::DivisionByZero),
            Self::Div => l.checked_div(r),
        };
        result.ok_or(ArithmeticError::Overflow)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        };
        f.write_char(c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Comparison {
    Equal,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
        };
        f.write_str(s)
    }
}

/// Test applied to a single die face by rerolls, explosions and success counts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Condition {
    pub cmp: Comparison,
    pub value: Int,
}

impl Condition {
    pub const fn new(cmp: Comparison, value: Int) -> Self {
        Self { cmp, value }
    }

    pub const fn equal_to(value: Int) -> Self {
        Self::new(Comparison::Equal, value)
    }

    pub fn matches(&self, face: Int) -> bool {
        match self.cmp {
            Comparison::Equal => face == self.value,
            Comparison::Less => face < self.value,
            Comparison::Greater => face > self.value,
            Comparison::LessEqual => face <= self.value,
            Comparison::GreaterEqual => face >= self.value,
        }
    }
}

impl fmt::Display for Condition {
    // `=` is implied when written without a comparison
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cmp {
            Comparison::Equal => write!(f, "{}", self.value),
            cmp => write!(f, "{}{}", cmp, self.value),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    pub use super::*;
    pub(crate) use crate::ops::*;
    pub(crate) use crate::parse::ast::{DiceGroup, Node};
    pub use BinaryOperator::*;

    pub trait NodeExt: Sized {
        fn int(x: Int) -> Self;

        fn dice(num: usize, sides: UInt) -> Self;

        fn op_dice(num: usize, sides: UInt, ops: Vec<Modifier>) -> Self;

        fn neg(x: Self) -> Self;

        fn bin(l: Self, op: BinaryOperator, r: Self) -> Self;
    }

    impl NodeExt for Node {
        fn int(x: Int) -> Self {
            Self::Literal(x)
        }

        fn dice(num: usize, sides: UInt) -> Self {
            Self::op_dice(num, sides, vec![])
        }

        fn op_dice(num: usize, sides: UInt, ops: Vec<Modifier>) -> Self {
            let num = Num::new(num).unwrap();
            let sides = Sides::new(sides).unwrap();
            Self::Dice(DiceGroup::new(num, sides, ops))
        }

        fn neg(x: Self) -> Self {
            Self::Unary(UnaryOperator::Neg, Box::new(x))
        }

        fn bin(l: Self, op: BinaryOperator, r: Self) -> Self {
            Self::Binary(Box::new(l), op, Box::new(r))
        }
    }
}
