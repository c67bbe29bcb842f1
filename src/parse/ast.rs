use crate::common::*;
use crate::ops::Modifier;
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node {
    Literal(Int),
    Dice(DiceGroup),
    Unary(UnaryOperator, Box<Node>),
    Binary(Box<Node>, BinaryOperator, Box<Node>),
}

/// Negation binds tighter than any binary operator.
pub const UNARY_PRECEDENCE: u8 = 3;

impl Node {
    /// Literals and dice bind tightest, then negation, then the binary operators.
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Literal(_) | Self::Dice(_) => UNARY_PRECEDENCE + 1,
            Self::Unary(..) => UNARY_PRECEDENCE,
            Self::Binary(_, op, _) => op.precedence(),
        }
    }

    pub(crate) fn new_unary(op: UnaryOperator, value: Node) -> Self {
        Self::Unary(op, Box::new(value))
    }

    pub(crate) fn new_binary(l: Node, op: BinaryOperator, r: Node) -> Self {
        Self::Binary(Box::new(l), op, Box::new(r))
    }

    /// Number of dice groups in the tree.
    pub fn dice_groups(&self) -> usize {
        match self {
            Self::Literal(_) => 0,
            Self::Dice(_) => 1,
            Self::Unary(_, x) => x.dice_groups(),
            Self::Binary(l, _, r) => l.dice_groups() + r.dice_groups(),
        }
    }
}

/// Wraps `s` in parentheses when `child` binds looser than `min` allows.
pub(crate) fn parenthesize(child: &Node, s: String, min: u8) -> String {
    if child.precedence() < min {
        format!("({})", s)
    } else {
        s
    }
}

/// Writes the expression back out with as few parentheses as needed.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(x) => write!(f, "{}", x),
            Self::Dice(dice) => write!(f, "{}", dice),
            Self::Unary(op, x) => {
                let inner = parenthesize(x, x.to_string(), UNARY_PRECEDENCE);
                write!(f, "{}{}", op, inner)
            }
            Self::Binary(l, op, r) => {
                let left = parenthesize(l, l.to_string(), op.precedence());
                let right = parenthesize(r, r.to_string(), op.precedence() + 1);
                write!(f, "{} {} {}", left, op, right)
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiceGroup {
    pub count: Num,
    pub sides: Sides,
    pub modifiers: Vec<Modifier>,
}

impl DiceGroup {
    pub fn new(count: Num, sides: Sides, modifiers: Vec<Modifier>) -> Self {
        Self {
            count,
            sides,
            modifiers,
        }
    }
}

impl fmt::Display for DiceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        for op in &self.modifiers {
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::common::test_utils::*;

    #[test]
    fn test_display_minimal_parens() {
        let node = Node::bin(Node::bin(Node::int(1), Add, Node::int(2)), Mul, Node::int(3));
        assert_eq!(node.to_string(), "(1 + 2) * 3");

        let node = Node::bin(Node::int(1), Sub, Node::bin(Node::int(2), Sub, Node::int(3)));
        assert_eq!(node.to_string(), "1 - (2 - 3)");

        let node = Node::bin(Node::bin(Node::int(1), Sub, Node::int(2)), Sub, Node::int(3));
        assert_eq!(node.to_string(), "1 - 2 - 3");

        let node = Node::neg(Node::bin(Node::dice(1, 6), Add, Node::int(1)));
        assert_eq!(node.to_string(), "-(1d6 + 1)");

        let node = Node::neg(Node::neg(Node::int(2)));
        assert_eq!(node.to_string(), "--2");
    }

    #[test]
    fn test_display_dice() {
        let ops = vec![
            KeepHighest(3).into(),
            Reroll::once(Condition::equal_to(1)).into(),
        ];
        assert_eq!(Node::op_dice(4, 6, ops).to_string(), "4d6kh3r1");
    }

    #[test]
    fn test_dice_groups() {
        let node = Node::bin(Node::dice(1, 6), Add, Node::neg(Node::dice(2, 4)));
        assert_eq!(node.dice_groups(), 2);
        assert_eq!(Node::int(3).dice_groups(), 0);
    }
}
