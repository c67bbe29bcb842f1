use crate::common::*;
use crate::roll::{Dice, DieSource, DieStatus, RResult, RollContext, RollError, Roller};
use log::{trace, warn};
use std::cmp::Reverse;
use std::fmt;

/// A post-roll operation attached to a dice group, applied in the order written.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[enum_dispatch::enum_dispatch(Modify)]
pub enum Modifier {
    KeepHighest(KeepHighest),
    KeepLowest(KeepLowest),
    DropHighest(DropHighest),
    DropLowest(DropLowest),
    Reroll(Reroll),
    Explode(Explode),
    Minimum(Minimum),
    Maximum(Maximum),
    CountSuccesses(CountSuccesses),
}

impl Modifier {
    /// Whether the modifier only changes which dice are kept.
    pub const fn is_selection(&self) -> bool {
        matches!(
            self,
            Self::KeepHighest(_) | Self::KeepLowest(_) | Self::DropHighest(_) | Self::DropLowest(_)
        )
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepHighest(x) => fmt::Display::fmt(x, f),
            Self::KeepLowest(x) => fmt::Display::fmt(x, f),
            Self::DropHighest(x) => fmt::Display::fmt(x, f),
            Self::DropLowest(x) => fmt::Display::fmt(x, f),
            Self::Reroll(x) => fmt::Display::fmt(x, f),
            Self::Explode(x) => fmt::Display::fmt(x, f),
            Self::Minimum(x) => fmt::Display::fmt(x, f),
            Self::Maximum(x) => fmt::Display::fmt(x, f),
            Self::CountSuccesses(x) => fmt::Display::fmt(x, f),
        }
    }
}

#[enum_dispatch::enum_dispatch]
pub trait Modify {
    fn modify<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Rank {
    Highest,
    Lowest,
}

impl Rank {
    /// Indices of the kept dice, best-ranked first. Ties go to the earlier roll.
    fn rank(self, dice: &Dice) -> Vec<usize> {
        let mut kept = dice.kept_set();
        match self {
            Self::Highest => kept.sort_by_key(|&i| (Reverse(dice.values[i].value), i)),
            Self::Lowest => kept.sort_by_key(|&i| (dice.values[i].value, i)),
        }
        kept
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Action {
    Keep,
    Drop,
}

fn select(dice: &mut Dice, ranked: Vec<usize>, n: usize, action: Action) {
    let n = n.min(ranked.len());
    let dropped = match action {
        Action::Keep => &ranked[n..],
        Action::Drop => &ranked[..n],
    };
    for &i in dropped {
        dice.values[i].status = DieStatus::Dropped;
    }
}

macro_rules! selection_op_impl {
    ($(($name:ident, $disp:literal, $rank:ident, $action:ident)),+ $(,)?) => {
        $(
            #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
            pub struct $name(pub usize);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}{}", $disp, self.0)
                }
            }

            impl Modify for $name {
                fn modify<R: Roller>(&self, dice: &mut Dice, _: &mut RollContext<R>) -> RResult<()> {
                    let ranked = Rank::$rank.rank(dice);
                    select(dice, ranked, self.0, Action::$action);
                    trace!("{}: {:?}", self, dice.values);
                    Ok(())
                }
            }
        )+
    };
}

selection_op_impl!(
    (KeepHighest, "kh", Highest, Keep),
    (KeepLowest, "kl", Lowest, Keep),
    (DropHighest, "dh", Highest, Drop),
    (DropLowest, "dl", Lowest, Drop),
);

/// How often a reroll or explosion may fire for a single die.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Repeat {
    Once,
    Recursive,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Reroll {
    pub condition: Condition,
    pub repeat: Repeat,
}

impl Reroll {
    pub const fn once(condition: Condition) -> Self {
        Self {
            condition,
            repeat: Repeat::Once,
        }
    }

    pub const fn until(condition: Condition) -> Self {
        Self {
            condition,
            repeat: Repeat::Recursive,
        }
    }
}

impl fmt::Display for Reroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.repeat {
            Repeat::Once => "r",
            Repeat::Recursive => "rr",
        };
        write!(f, "{}{}", op, self.condition)
    }
}

impl Modify for Reroll {
    fn modify<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        let limit = ctx.limits().max_iterations;
        let targets: Vec<_> = dice
            .kept_set()
            .into_iter()
            .filter(|&i| self.condition.matches(dice.values[i].value))
            .collect();

        for i in targets {
            let mut current = i;
            let mut rerolls = 0;
            loop {
                dice.values[current].status = DieStatus::Rerolled;
                current = dice.roll_another(ctx, DieSource::Reroll)?;
                rerolls += 1;

                let again = self.condition.matches(dice.values[current].value);
                if self.repeat == Repeat::Once || !again {
                    break;
                }
                if rerolls >= limit {
                    warn!("{}: die {} still matches after {} rerolls", self, i, rerolls);
                    return Err(RollError::RerollLoopExceeded { limit });
                }
            }
        }
        trace!("{}: {:?}", self, dice.values);
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Explode {
    pub condition: Condition,
    pub repeat: Repeat,
}

impl Explode {
    pub const fn once(condition: Condition) -> Self {
        Self {
            condition,
            repeat: Repeat::Once,
        }
    }

    pub const fn recursive(condition: Condition) -> Self {
        Self {
            condition,
            repeat: Repeat::Recursive,
        }
    }
}

impl fmt::Display for Explode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.repeat {
            Repeat::Once => "!o",
            Repeat::Recursive => "!",
        };
        write!(f, "{}{}", op, self.condition)
    }
}

impl Modify for Explode {
    fn modify<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        let limit = ctx.limits().max_iterations;
        let initial = dice.values.len();
        // chain depth of every record, parallel to `dice.values`
        let mut depth = vec![0; initial];

        let mut i = 0;
        while i < dice.values.len() {
            if self.repeat == Repeat::Once && i >= initial {
                break;
            }

            let die = &dice.values[i];
            if die.is_kept() && !die.exploded && self.condition.matches(die.value) {
                let chain = depth[i] + 1;
                if self.repeat == Repeat::Recursive && chain > limit {
                    warn!("{}: explosion chain exceeded {} dice", self, limit);
                    return Err(RollError::ExplodeLoopExceeded { limit });
                }
                dice.values[i].exploded = true;
                dice.roll_another(ctx, DieSource::Explosion)?;
                depth.push(chain);
            }
            i += 1;
        }
        trace!("{}: {:?}", self, dice.values);
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Minimum(pub Int);

impl fmt::Display for Minimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mi{}", self.0)
    }
}

impl Modify for Minimum {
    fn modify<R: Roller>(&self, dice: &mut Dice, _: &mut RollContext<R>) -> RResult<()> {
        for i in dice.kept_set() {
            let die = &mut dice.values[i];
            die.value = die.value.max(self.0);
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Maximum(pub Int);

impl fmt::Display for Maximum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ma{}", self.0)
    }
}

impl Modify for Maximum {
    fn modify<R: Roller>(&self, dice: &mut Dice, _: &mut RollContext<R>) -> RResult<()> {
        for i in dice.kept_set() {
            let die = &mut dice.values[i];
            die.value = die.value.min(self.0);
        }
        Ok(())
    }
}

/// Makes the group worth the number of kept dice matching the condition
/// instead of their sum. Counting happens after every other modifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CountSuccesses(pub Condition);

impl fmt::Display for CountSuccesses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cs{}", self.0)
    }
}

impl Modify for CountSuccesses {
    fn modify<R: Roller>(&self, dice: &mut Dice, _: &mut RollContext<R>) -> RResult<()> {
        if let Some(previous) = dice.successes.replace(self.0) {
            trace!("{}: replaces cs{}", self, previous);
        }
        Ok(())
    }
}
