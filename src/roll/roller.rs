use super::{RResult, RollError};
use crate::common::Int;
use rand::Rng;

/// Source of uniformly distributed integers.
pub trait Roller {
    /// Returns an integer in `min..=max`, or [`RollError::InvalidRange`] if `min > max`.
    fn roll(&mut self, min: Int, max: Int) -> RResult<Int>;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, min: Int, max: Int) -> RResult<Int> {
        check_range(min, max)?;
        Ok(self.gen_range(min..=max))
    }
}

fn check_range(min: Int, max: Int) -> RResult<()> {
    if min > max {
        Err(RollError::InvalidRange { min, max })
    } else {
        Ok(())
    }
}

/// Folds `value` into `min..=max`, leaving values already in range untouched.
fn wrap_into(value: Int, min: Int, max: Int) -> Int {
    if (min..=max).contains(&value) {
        return value;
    }
    let span = max as i128 - min as i128 + 1;
    let offset = (value as i128 - min as i128).rem_euclid(span);
    (min as i128 + offset) as Int
}

/// Deterministic source that plays back a fixed list of values.
///
/// Values are handed out in order and the list starts over once exhausted.
/// A value outside the requested range is wrapped into it, so a list of
/// in-range faces is replayed exactly. An empty list always yields `min`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replay {
    values: Vec<Int>,
    next: usize,
}

impl Replay {
    pub fn new(values: impl Into<Vec<Int>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    pub fn constant(value: Int) -> Self {
        Self::new(vec![value])
    }
}

impl Roller for Replay {
    fn roll(&mut self, min: Int, max: Int) -> RResult<Int> {
        check_range(min, max)?;
        if self.values.is_empty() {
            return Ok(min);
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.wrapping_add(1);
        Ok(wrap_into(value, min, max))
    }
}

#[cfg(test)]
pub(crate) use step::StepRoller;


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_rng_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = rng.roll(1, 6).unwrap();
            assert!((1..=6).contains(&x));
        }
        assert_eq!(rng.roll(4, 4), Ok(4));
        assert_eq!(rng.roll(-3, -3), Ok(-3));
    }

    #[test]
    fn test_invalid_range() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(rng.roll(6, 1), Err(RollError::InvalidRange { min: 6, max: 1 }));
        assert_eq!(
            Replay::new(vec![1]).roll(2, 1),
            Err(RollError::InvalidRange { min: 2, max: 1 })
        );
    }

    #[test]
    fn test_replay_cycles() {
        let mut replay = Replay::new(vec![3, 1, 6]);
        let rolls: Vec<_> = (0..5).map(|_| replay.roll(1, 6).unwrap()).collect();
        assert_eq!(rolls, vec![3, 1, 6, 3, 1]);
    }

    #[test]
    fn test_replay_wraps_out_of_range() {
        let mut replay = Replay::new(vec![7, 0, -1, 20]);
        assert_eq!(replay.roll(1, 6), Ok(1));
        assert_eq!(replay.roll(1, 6), Ok(6));
        assert_eq!(replay.roll(1, 6), Ok(5));
        assert_eq!(replay.roll(1, 6), Ok(2));
        assert_eq!(Replay::default().roll(2, 9), Ok(2));
    }

    #[test]
    fn test_step_roller() {
        let mut roller = StepRoller::new(10, 1);
        assert_eq!(roller.roll(1, 20), Ok(10));
        assert_eq!(roller.roll(1, 6), Ok(5));
        assert_eq!(roller.roll(1, 6), Ok(6));
        assert_eq!(roller.roll(1, 6), Ok(1));
    }
}
