use super::{dice::DieRoll, error::RollError, stringify::Stringify, RResult};
use crate::common::*;
use crate::parse::{
    ast,
    visit::{self, Accept},
};
use std::fmt;

/// Every die rolled by one dice group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupRolls {
    /// Position of the group in evaluation order.
    pub index: usize,
    /// Sum of the kept dice.
    pub subtotal: Int,
    pub rolls: NonEmpty<DieRoll>,
}

impl GroupRolls {
    fn new(first: DieRoll) -> Self {
        Self {
            index: first.group,
            subtotal: first.total(),
            rolls: vec1![first],
        }
    }

    fn push(&mut self, die: DieRoll) {
        // the evaluator already summed these without overflowing
        self.subtotal += die.total();
        self.rolls.push(die);
    }

    pub fn kept(&self) -> impl Iterator<Item = &DieRoll> + '_ {
        self.rolls.iter().filter(|d| d.is_kept())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RollResult {
    pub total: Int,
    pub rolls: Vec<GroupRolls>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub breakdown: Option<String>,
}

/// Groups an evaluation trace by dice group, keeping roll order inside each group.
pub fn build(total: Int, trace: Vec<DieRoll>) -> RollResult {
    let mut rolls: Vec<GroupRolls> = Vec::new();
    for die in trace {
        match rolls.iter_mut().find(|g| g.index == die.group) {
            Some(group) => group.push(die),
            None => rolls.push(GroupRolls::new(die)),
        }
    }

    RollResult {
        total,
        rolls,
        breakdown: None,
    }
}

impl RollResult {
    /// Renders `node` with this result's dice using `style`.
    pub fn with_breakdown<S: Stringify + ?Sized>(mut self, node: &ast::Node, style: &mut S) -> Self {
        self.breakdown = Some(style.breakdown(node, &self.rolls));
        self
    }

    pub fn group(&self, index: usize) -> Option<&GroupRolls> {
        self.rolls.iter().find(|g| g.index == index)
    }

    /// Every die rolled, across all groups.
    pub fn dice(&self) -> impl Iterator<Item = &DieRoll> + '_ {
        self.rolls.iter().flat_map(|g| g.rolls.iter())
    }

    /// Recomputes the total from `node` and the recorded group subtotals.
    pub fn refold(&self, node: &ast::Node) -> RResult<Int> {
        let mut refold = Refold {
            groups: &self.rolls,
            next: 0,
        };
        node.accept(&mut refold)
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.breakdown {
            Some(breakdown) => write!(f, "{} = {}", breakdown, self.total),
            None => write!(f, "{}", self.total),
        }
    }
}

struct Refold<'r> {
    groups: &'r [GroupRolls],
    next: usize,
}

impl visit::AstVisitor for Refold<'_> {
    type Output = RResult<Int>;

    fn visit_literal(&mut self, x: Int) -> Self::Output {
        Ok(x)
    }

    fn visit_dice(&mut self, _: &ast::DiceGroup) -> Self::Output {
        let index = self.next;
        self.next += 1;
        Ok(self
            .groups
            .iter()
            .find(|g| g.index == index)
            .map_or(0, |g| g.subtotal))
    }

    fn visit_unary(&mut self, op: UnaryOperator, r: &ast::Node) -> Self::Output {
        let value = r.accept(self)?;
        match op {
            UnaryOperator::Neg => value.checked_neg().ok_or(RollError::Overflow),
        }
    }

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output {
        let left = l.accept(self)?;
        let right = r.accept(self)?;
        Ok(op.apply(left, right)?)
    }
}
