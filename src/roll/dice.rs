use super::{ctx::RollContext, roller::Roller, RResult, RollError};
use crate::common::{Condition, Int, Num, Sides};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "snake_case")
)]
pub enum DieStatus {
    /// Counts toward its group's subtotal.
    Kept,
    /// Removed by a keep or drop modifier.
    Dropped,
    /// Replaced by a later reroll.
    Rerolled,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "snake_case")
)]
pub enum DieSource {
    Initial,
    Reroll,
    Explosion,
}

/// One physical die roll and what became of it.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DieRoll {
    /// Index of the dice group that rolled it, in evaluation order.
    pub group: usize,
    /// Face as rolled.
    pub rolled: Int,
    /// Face after minimum/maximum clamps.
    pub value: Int,
    pub status: DieStatus,
    pub source: DieSource,
    /// Set once this die has triggered an extra roll.
    pub exploded: bool,
    /// Whether the die counts as a success, for groups that count successes.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub success: Option<bool>,
}

impl DieRoll {
    pub fn new(group: usize, rolled: Int, source: DieSource) -> Self {
        Self {
            group,
            rolled,
            value: rolled,
            status: DieStatus::Kept,
            source,
            exploded: false,
            success: None,
        }
    }

    pub fn is_kept(&self) -> bool {
        self.status == DieStatus::Kept
    }

    /// Contribution to the group subtotal.
    pub fn total(&self) -> Int {
        match (self.is_kept(), self.success) {
            (false, _) => 0,
            (true, None) => self.value,
            (true, Some(success)) => Int::from(success),
        }
    }
}

/// The working set of one dice group while its modifiers run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dice {
    pub index: usize,
    pub sides: Sides,
    pub values: Vec<DieRoll>,
    /// Set by `cs`; the group is then worth its number of successes.
    pub successes: Option<Condition>,
}

impl Dice {
    pub fn roll_new<R: Roller>(
        ctx: &mut RollContext<R>,
        index: usize,
        num: Num,
        sides: Sides,
    ) -> RResult<Self> {
        let num = num.get();
        ctx.check_rolls(num)?;

        let mut ret = Self {
            index,
            sides,
            values: Vec::with_capacity(num),
            successes: None,
        };
        for _ in 0..num {
            ret.roll_another(ctx, DieSource::Initial)?;
        }
        Ok(ret)
    }

    /// Rolls one more die into the group, returning its position in `values`.
    pub fn roll_another<R: Roller>(
        &mut self,
        ctx: &mut RollContext<R>,
        source: DieSource,
    ) -> RResult<usize> {
        let rolled = ctx.roll_one(self.sides)?;
        self.values.push(DieRoll::new(self.index, rolled, source));
        Ok(self.values.len() - 1)
    }

    /// Positions of every die still kept, in roll order.
    pub fn kept_set(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, die)| die.is_kept())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn subtotal(&self) -> RResult<Int> {
        self.values
            .iter()
            .try_fold(0 as Int, |acc, die| acc.checked_add(die.total()))
            .ok_or(RollError::Overflow)
    }

    /// Marks successes once every modifier has run and returns the group's value.
    pub fn resolve(&mut self) -> RResult<Int> {
        if let Some(condition) = self.successes {
            for die in &mut self.values {
                die.success = Some(condition.matches(die.value));
            }
        }
        self.subtotal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{Limits, Replay};

    #[test]
    fn test_roll_new() {
        let mut ctx = RollContext::new(Limits::default(), Replay::new(vec![2, 5, 3]));
        let dice = Dice::roll_new(&mut ctx, 4, Num::new(3).unwrap(), Sides::new(6).unwrap()).unwrap();
        assert_eq!(dice.values.len(), 3);
        assert!(dice.values.iter().all(|d| d.group == 4 && d.source == DieSource::Initial));
        assert_eq!(dice.kept_set(), vec![0, 1, 2]);
        assert_eq!(dice.subtotal(), Ok(10));
        assert_eq!(ctx.rolls(), 3);
    }

    #[test]
    fn test_subtotal_skips_discarded() {
        let mut ctx = RollContext::new(Limits::default(), Replay::new(vec![2, 5, 3]));
        let mut dice = Dice::roll_new(&mut ctx, 0, Num::new(3).unwrap(), Sides::new(6).unwrap()).unwrap();
        dice.values[0].status = DieStatus::Dropped;
        dice.values[2].status = DieStatus::Rerolled;
        assert_eq!(dice.kept_set(), vec![1]);
        assert_eq!(dice.subtotal(), Ok(5));
    }

    #[test]
    fn test_resolve_counts_kept_successes() {
        let mut ctx = RollContext::new(Limits::default(), Replay::new(vec![6, 5, 6]));
        let mut dice = Dice::roll_new(&mut ctx, 0, Num::new(3).unwrap(), Sides::new(6).unwrap()).unwrap();
        assert_eq!(dice.resolve(), Ok(17));
        assert!(dice.values.iter().all(|d| d.success.is_none()));

        dice.successes = Some(Condition::equal_to(6));
        dice.values[2].status = DieStatus::Dropped;
        assert_eq!(dice.resolve(), Ok(1));
        assert_eq!(dice.values[2].success, Some(true));
        assert_eq!(dice.values[2].total(), 0);
    }

    #[test]
    fn test_too_many_rolls_up_front() {
        let limits = Limits::default().max_rolls(5);
        let mut ctx = RollContext::new(limits, Replay::constant(1));
        let res = Dice::roll_new(&mut ctx, 0, Num::new(6).unwrap(), Sides::new(6).unwrap());
        assert_eq!(res, Err(RollError::TooManyRolls { limit: 5 }));
        assert_eq!(ctx.rolls(), 0);
    }
}
