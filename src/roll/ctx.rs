use super::{
    dice::{Dice, DieRoll},
    error::RollError,
    limits::Limits,
    roller::Roller,
    RResult,
};
use crate::common::*;
use crate::ops::Modify;
use crate::parse::{
    ast,
    visit::{self, Accept},
};
use log::{debug, trace, warn};

pub type DefaultRoller = rand::rngs::ThreadRng;

/// Value of a (sub)expression together with every die rolled for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluated {
    pub value: Int,
    pub trace: Vec<DieRoll>,
}

pub struct RollContext<R = DefaultRoller> {
    limits: Limits,
    rolls: usize,
    groups: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(limits: Limits, roller: R) -> Self {
        Self {
            limits,
            rolls: 0,
            groups: 0,
            roller,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Dice rolled by the current evaluation.
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    /// Fails if rolling `n` more dice would pass `max_rolls`.
    pub(crate) fn check_rolls(&self, n: usize) -> RResult<()> {
        match self.limits.max_rolls {
            Some(max) if self.rolls.saturating_add(n) > max => {
                warn!("refusing to roll {} more dice, {} of {} used", n, self.rolls, max);
                Err(RollError::TooManyRolls { limit: max })
            }
            _ => Ok(()),
        }
    }

    pub fn roll_one(&mut self, sides: Sides) -> RResult<Int> {
        self.check_rolls(1)?;
        self.rolls += 1;
        let value = self.roller.roll(1, Int::from(sides.get()))?;
        trace!("d{} -> {}", sides, value);
        Ok(value)
    }

    /// Evaluates a whole expression. Group indices and the roll count restart at 0.
    pub fn eval(&mut self, node: &ast::Node) -> RResult<Evaluated> {
        self.groups = 0;
        self.rolls = 0;
        node.accept(self)
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::new(Limits::default(), rand::thread_rng())
    }
}

impl<R: Roller> visit::AstVisitor for RollContext<R> {
    type Output = RResult<Evaluated>;

    fn visit_literal(&mut self, x: Int) -> Self::Output {
        Ok(Evaluated {
            value: x,
            trace: Vec::new(),
        })
    }

    fn visit_dice(&mut self, group: &ast::DiceGroup) -> Self::Output {
        let index = self.groups;
        self.groups += 1;

        let mut dice = Dice::roll_new(self, index, group.count, group.sides)?;
        for op in &group.modifiers {
            op.modify(&mut dice, self)?;
        }
        let value = dice.resolve()?;
        debug!("group {} ({}) = {}", index, group, value);

        Ok(Evaluated {
            value,
            trace: dice.values,
        })
    }

    fn visit_unary(&mut self, op: UnaryOperator, r: &ast::Node) -> Self::Output {
        let mut ret = r.accept(self)?;
        ret.value = match op {
            UnaryOperator::Neg => ret.value.checked_neg().ok_or(RollError::Overflow)?,
        };
        Ok(ret)
    }

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output {
        let left = l.accept(self)?;
        let right = r.accept(self)?;
        let value = op.apply(left.value, right.value)?;

        let mut trace = left.trace;
        trace.extend(right.trace);
        Ok(Evaluated { value, trace })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{roller::StepRoller, Replay};
    use rand::{rngs::StdRng, SeedableRng};

    fn mock_roller() -> StepRoller {
        StepRoller::new(10, 1)
    }

    fn eval_with<R: Roller>(s: &str, roller: R, limits: Limits) -> RResult<Evaluated> {
        let ast = crate::parse(s).unwrap();
        RollContext::new(limits, roller).eval(&ast)
    }

    fn check(s: &str, expected: Int) {
        let actual = eval_with(s, mock_roller(), Limits::default()).unwrap();
        assert_eq!(expected, actual.value);
    }

    fn check_err(s: &str, expected: RollError) {
        let actual = eval_with(s, mock_roller(), Limits::default());
        assert_eq!(expected, actual.unwrap_err());
    }

    #[test]
    fn test_eval_number() {
        check("2", 2);
        check("0", 0);
    }

    #[test]
    fn test_eval_unary() {
        check("-2", -2);
        check("--2", 2);
        check("---2", -2);
    }

    #[test]
    fn test_eval_binary() {
        check("2 + 3", 5);
        check("2 + 3 * 4", 14);
        check("2 * (1 - 3)", -4);
        check("7 / 2", 3);
        check("-7 / 2", -3);
    }

    #[test]
    fn test_eval_dice() {
        check("1d20 + 4", 10 + 4);
        check("2d4", 2 + 3);
        check("8d6", 4 + 5 + 6 + 1 + 2 + 3 + 4 + 5);
    }

    #[test]
    fn test_eval_op_dice() {
        check("2d20kh1", 11);
        check("8d6rr1", 4 + 5 + 6 + 2 + 3 + 4 + 5 + 6);
        check("8d6!", 4 + 5 + 6 + 1 + 2 + 3 + 4 + 5 + 6 + 1);
        check("8d6mi3", 4 + 5 + 6 + 3 + 3 + 3 + 4 + 5);
        check("8d6dh1dl1", 4 + 5 + 2 + 3 + 4 + 5);
        check("1d6 + 2 * 8d6r>3", 4 + 2 * (1 + 2 + 3 + 1 + 2 + 3 + 4 + 5));
    }

    #[test]
    fn test_eval_modifier_order() {
        use crate::roll::DieStatus::{Dropped, Kept, Rerolled};

        let statuses = |res: &Evaluated| res.trace.iter().map(|d| d.status).collect::<Vec<_>>();

        // the rerolled 1 comes back as a 5, which then outranks the 2
        let res = eval_with("4d6r1kh3", Replay::new(vec![1, 6, 3, 2, 5]), Limits::default()).unwrap();
        assert_eq!(res.value, 14);
        assert_eq!(statuses(&res), vec![Rerolled, Kept, Kept, Dropped, Kept]);

        // the 1 is already dropped when the reroll looks for targets
        let res = eval_with("4d6kh3r1", Replay::new(vec![1, 6, 3, 2, 5]), Limits::default()).unwrap();
        assert_eq!(res.value, 11);
        assert_eq!(statuses(&res), vec![Dropped, Kept, Kept, Kept]);
    }

    #[test]
    fn test_eval_count_successes() {
        let res = eval_with("5d10cs>=7 + 1", Replay::new(vec![7, 10, 2, 6, 3]), Limits::default()).unwrap();
        assert_eq!(res.value, 3);
        let successes: Vec<_> = res.trace.iter().map(|d| d.success).collect();
        assert_eq!(
            successes,
            vec![Some(true), Some(true), Some(false), Some(false), Some(false)]
        );

        let res = eval_with("3d6!cs", Replay::new(vec![6, 2, 6, 1, 4]), Limits::default()).unwrap();
        assert_eq!(res.trace.len(), 5);
        assert_eq!(res.value, 2);
    }

    #[test]
    fn test_eval_trace() {
        let ast = crate::parse("1d20 + 2d6kh1").unwrap();
        let mut ctx = RollContext::new(Limits::default(), Replay::new(vec![15, 2, 5]));
        let res = ctx.eval(&ast).unwrap();
        assert_eq!(res.value, 20);

        let groups: Vec<_> = res.trace.iter().map(|d| d.group).collect();
        assert_eq!(groups, vec![0, 1, 1]);
        let faces: Vec<_> = res.trace.iter().map(|d| d.rolled).collect();
        assert_eq!(faces, vec![15, 2, 5]);
        assert!(!res.trace[1].is_kept());
        assert_eq!(ctx.rolls(), 3);
    }

    #[test]
    fn test_eval_fixed_die() {
        let res = eval_with("1d20", Replay::constant(15), Limits::default()).unwrap();
        assert_eq!(res.value, 15);
        let res = eval_with("4d6kh3", Replay::new(vec![1, 6, 3, 2]), Limits::default()).unwrap();
        assert_eq!(res.value, 11);
    }

    #[test]
    fn test_eval_faces_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let res = eval_with("10d8", &mut rng, Limits::default()).unwrap();
            assert_eq!(res.trace.len(), 10);
            assert!(res.trace.iter().all(|d| (1..=8).contains(&d.rolled)));
            assert!((10..=80).contains(&res.value));
        }
    }

    #[test]
    fn test_eval_errors() {
        check_err("1d6 / 0", RollError::DivisionByZero);
        check_err("5 / (2 - 2)", RollError::DivisionByZero);
        check_err("9223372036854775807 + 1", RollError::Overflow);
        check_err("2d20rr>0", RollError::RerollLoopExceeded { limit: 100 });

        let res = eval_with("1d1!", Replay::constant(1), Limits::default());
        assert_eq!(res, Err(RollError::ExplodeLoopExceeded { limit: 100 }));
    }

    #[test]
    fn test_eval_too_many_rolls() {
        let limits = Limits::default().max_rolls(10);
        let res = eval_with("6d6 + 5d6", mock_roller(), limits);
        assert_eq!(res, Err(RollError::TooManyRolls { limit: 10 }));

        let res = eval_with("6d6 + 4d6", mock_roller(), limits);
        assert!(res.is_ok());

        let res = eval_with("20000d6", mock_roller(), Limits::default().max_rolls(None));
        assert_eq!(res.unwrap().trace.len(), 20_000);
    }

    #[test]
    fn test_eval_roll_cap_is_per_evaluation() {
        let ast = crate::parse("3d6").unwrap();
        let mut ctx = RollContext::new(Limits::default().max_rolls(5), mock_roller());
        for _ in 0..3 {
            assert!(ctx.eval(&ast).is_ok());
            assert_eq!(ctx.rolls(), 3);
        }
    }
}
