//! Exact outcome distributions, computed without rolling.

mod space;

use crate::common::*;
use crate::ops::{CountSuccesses, Maximum, Minimum, Modifier};
use crate::parse::{
    ast,
    visit::{self, Accept},
};
use crate::roll::Limits;
use log::debug;
use space::PossibilitySpace;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistError {
    #[error("'{0}' has no exact distribution")]
    Unsupported(Modifier),
    #[error("more than {limit} distinct outcomes")]
    TooManyOutcomes { limit: usize },
    #[error("more than {limit} dice in one group")]
    TooManyDice { limit: usize },
    #[error("divisor can be zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
}

impl From<ArithmeticError> for DistError {
    fn from(e: ArithmeticError) -> Self {
        match e {
            ArithmeticError::DivisionByZero => Self::DivisionByZero,
            ArithmeticError::Overflow => Self::Overflow,
        }
    }
}

pub type DResult<T> = Result<T, DistError>;

/// Maps each outcome to the number of equally likely ways it can happen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Distribution(pub BTreeMap<Int, u64>);

impl Distribution {
    pub fn constant(x: Int) -> Self {
        Self(BTreeMap::from([(x, 1)]))
    }

    /// One fair die.
    pub fn die(sides: Sides) -> Self {
        Self((1..=Int::from(sides.get())).map(|face| (face, 1)).collect())
    }

    /// Outcomes in ascending order with their weights.
    pub fn iter(&self) -> impl Iterator<Item = (Int, u64)> + '_ {
        self.0.iter().map(|(&x, &w)| (x, w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn weight(&self, x: Int) -> u64 {
        self.0.get(&x).copied().unwrap_or(0)
    }

    pub fn total_weight(&self) -> u128 {
        self.0.values().map(|&w| u128::from(w)).sum()
    }

    pub fn probability(&self, x: Int) -> f64 {
        let total = self.total_weight();
        if total == 0 {
            0.0
        } else {
            self.weight(x) as f64 / total as f64
        }
    }

    pub fn mean(&self) -> f64 {
        let total = self.total_weight() as f64;
        self.iter().map(|(x, w)| x as f64 * w as f64).sum::<f64>() / total
    }

    pub fn min(&self) -> Option<Int> {
        self.0.keys().next().copied()
    }

    pub fn max(&self) -> Option<Int> {
        self.0.keys().next_back().copied()
    }

    pub(crate) fn add_weight(&mut self, x: Int, weight: u64) -> DResult<()> {
        let entry = self.0.entry(x).or_insert(0);
        *entry = entry.checked_add(weight).ok_or(DistError::Overflow)?;
        Ok(())
    }

    fn try_map(&self, f: impl Fn(Int) -> Result<Int, ArithmeticError>) -> DResult<Self> {
        let mut ret = Self::default();
        for (x, w) in self.iter() {
            ret.add_weight(f(x)?, w)?;
        }
        Ok(ret)
    }

    /// Distribution of `f(a, b)` over every pair of outcomes.
    fn combine(
        &self,
        other: &Self,
        limit: usize,
        f: impl Fn(Int, Int) -> Result<Int, ArithmeticError>,
    ) -> DResult<Self> {
        if self.len().saturating_mul(other.len()) > limit {
            return Err(DistError::TooManyOutcomes { limit });
        }

        let mut ret = Self::default();
        for (a, wa) in self.iter() {
            for (b, wb) in other.iter() {
                let weight = wa.checked_mul(wb).ok_or(DistError::Overflow)?;
                ret.add_weight(f(a, b)?, weight)?;
            }
        }
        Ok(ret)
    }

    /// Sum of `count` independent draws.
    fn repeat_sum(&self, count: usize, limit: usize) -> DResult<Self> {
        let add = |a, b| BinaryOperator::Add.apply(a, b);
        let mut ret = self.clone();
        for _ in 1..count {
            ret = ret.combine(self, limit, add)?;
        }
        Ok(ret)
    }
}

pub(crate) struct Distributor {
    limits: Limits,
}

impl Distributor {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn eval(&mut self, node: &ast::Node) -> DResult<Distribution> {
        node.accept(self)
    }
}

impl visit::AstVisitor for Distributor {
    type Output = DResult<Distribution>;

    fn visit_literal(&mut self, x: Int) -> Self::Output {
        Ok(Distribution::constant(x))
    }

    fn visit_dice(&mut self, group: &ast::DiceGroup) -> Self::Output {
        let count = group.count.get();
        if let Some(limit) = self.limits.max_rolls {
            if count > limit {
                return Err(DistError::TooManyDice { limit });
            }
        }
        let limit = self.limits.max_outcomes;
        if usize::try_from(group.sides.get()).map_or(true, |sides| sides > limit) {
            return Err(DistError::TooManyOutcomes { limit });
        }

        // clamps are monotone, so applying them to every face before
        // selecting gives the same sums as applying them to the kept dice
        let mut die = Distribution::die(group.sides);
        let mut selections = Vec::new();
        let mut successes = None;
        for op in &group.modifiers {
            match op {
                Modifier::Minimum(Minimum(min)) => die = die.try_map(|x| Ok(x.max(*min)))?,
                Modifier::Maximum(Maximum(max)) => die = die.try_map(|x| Ok(x.min(*max)))?,
                Modifier::CountSuccesses(CountSuccesses(condition)) => successes = Some(*condition),
                Modifier::Reroll(_) | Modifier::Explode(_) => {
                    return Err(DistError::Unsupported(*op))
                }
                _ => selections.push(op),
            }
        }

        let ret = match (selections.is_empty(), successes) {
            (true, None) => die.repeat_sum(count, limit)?,
            (true, Some(condition)) => die
                .try_map(|x| Ok(Int::from(condition.matches(x))))?
                .repeat_sum(count, limit)?,
            (false, _) => {
                let mut space = PossibilitySpace::roll(&die, count, limit)?;
                for op in selections {
                    space = space.select(op)?;
                }
                if let Some(condition) = successes {
                    space = space.count_successes(condition)?;
                }
                space.into_distribution()?
            }
        };
        debug!("{}: {} outcomes", group, ret.len());
        Ok(ret)
    }

    fn visit_unary(&mut self, op: UnaryOperator, r: &ast::Node) -> Self::Output {
        let value = r.accept(self)?;
        match op {
            UnaryOperator::Neg => value.try_map(|x| x.checked_neg().ok_or(ArithmeticError::Overflow)),
        }
    }

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output {
        let left = l.accept(self)?;
        let right = r.accept(self)?;
        left.combine(&right, self.limits.max_outcomes, |a, b| op.apply(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(s: &str) -> DResult<Distribution> {
        let ast = crate::parse(s).unwrap();
        Distributor::new(Limits::default()).eval(&ast)
    }

    fn weights(s: &str) -> Vec<(Int, u64)> {
        dist(s).unwrap().iter().collect()
    }

    #[test]
    fn test_constant() {
        assert_eq!(weights("3 + 4"), vec![(7, 1)]);
        assert_eq!(weights("-2"), vec![(-2, 1)]);
    }

    #[test]
    fn test_single_die() {
        let d6 = dist("1d6").unwrap();
        assert_eq!(d6.total_weight(), 6);
        assert_eq!(d6.min(), Some(1));
        assert_eq!(d6.max(), Some(6));
        assert!((d6.mean() - 3.5).abs() < 1e-9);
        assert!((d6.probability(4) - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(d6.probability(7), 0.0);
    }

    #[test]
    fn test_sum_of_dice() {
        assert_eq!(
            weights("2d6"),
            vec![
                (2, 1),
                (3, 2),
                (4, 3),
                (5, 4),
                (6, 5),
                (7, 6),
                (8, 5),
                (9, 4),
                (10, 3),
                (11, 2),
                (12, 1)
            ]
        );

        let d = dist("3d6").unwrap();
        assert_eq!(d.total_weight(), 216);
        assert_eq!(d.weight(3), 1);
        assert_eq!(d.weight(10), 27);
        assert_eq!(d.weight(18), 1);
        assert!((d.mean() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_keep_drop() {
        assert_eq!(
            weights("2d6kh1"),
            vec![(1, 1), (2, 3), (3, 5), (4, 7), (5, 9), (6, 11)]
        );
        assert_eq!(
            weights("2d6kl1"),
            vec![(1, 11), (2, 9), (3, 7), (4, 5), (5, 3), (6, 1)]
        );
        assert_eq!(dist("4d6dl1"), dist("4d6kh3"));

        let d = dist("4d6kh3").unwrap();
        assert_eq!(d.total_weight(), 1296);
        assert_eq!(d.weight(18), 21);
        assert_eq!(d.weight(3), 1);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(weights("1d6mi3"), vec![(3, 3), (4, 1), (5, 1), (6, 1)]);
        assert_eq!(weights("1d6ma2"), vec![(1, 1), (2, 5)]);
        assert_eq!(dist("2d6kh1mi4"), dist("2d6mi4kh1"));
    }

    #[test]
    fn test_count_successes() {
        // each d10 succeeds on 7 or more with weight 4 of 10
        assert_eq!(weights("1d10cs>=7"), vec![(0, 6), (1, 4)]);
        assert_eq!(weights("2d10cs>=7"), vec![(0, 36), (1, 48), (2, 16)]);
        assert_eq!(weights("3d6cs"), vec![(0, 125), (1, 75), (2, 15), (3, 1)]);

        // counted after selection, so only the kept die can succeed
        assert_eq!(weights("2d6kh1cs6"), vec![(0, 25), (1, 11)]);
        assert_eq!(dist("2d6cs6kh1"), dist("2d6kh1cs6"));
        assert_eq!(weights("2d6mi6cs6"), vec![(2, 36)]);
    }

    #[test]
    fn test_arithmetic() {
        let d = dist("1d4 - 1d4").unwrap();
        assert_eq!(d.min(), Some(-3));
        assert_eq!(d.max(), Some(3));
        assert_eq!(d.weight(0), 4);

        assert_eq!(weights("-1d3"), vec![(-3, 1), (-2, 1), (-1, 1)]);
        assert_eq!(weights("2 * 1d3"), vec![(2, 1), (4, 1), (6, 1)]);
        assert_eq!(weights("6 / 1d2"), vec![(3, 1), (6, 1)]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(dist("1d6 / (1d2 - 1)"), Err(DistError::DivisionByZero));
        assert!(matches!(dist("1d6r1"), Err(DistError::Unsupported(Modifier::Reroll(_)))));
        assert!(matches!(dist("3d6!"), Err(DistError::Unsupported(Modifier::Explode(_)))));

        let ast = crate::parse("20d20kh1").unwrap();
        let res = Distributor::new(Limits::default().max_outcomes(1000)).eval(&ast);
        assert_eq!(res, Err(DistError::TooManyOutcomes { limit: 1000 }));

        let ast = crate::parse("50d6").unwrap();
        let res = Distributor::new(Limits::default().max_rolls(10)).eval(&ast);
        assert_eq!(res, Err(DistError::TooManyDice { limit: 10 }));
    }

    #[test]
    fn test_outcome_limit_checked_before_work() {
        let limit = Limits::DEFAULT_MAX_OUTCOMES;
        assert_eq!(dist("1d2000000"), Err(DistError::TooManyOutcomes { limit }));
        assert_eq!(dist("1d4000000000"), Err(DistError::TooManyOutcomes { limit }));
        assert_eq!(dist("3d1000kh1"), Err(DistError::TooManyOutcomes { limit }));

        let ast = crate::parse("1d20").unwrap();
        let res = Distributor::new(Limits::default().max_outcomes(10)).eval(&ast);
        assert_eq!(res, Err(DistError::TooManyOutcomes { limit: 10 }));
    }
}
