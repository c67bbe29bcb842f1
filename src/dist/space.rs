use super::{DResult, DistError, Distribution};
use crate::common::{Condition, Int};
use crate::ops::Modifier;
use std::collections::HashMap;

/// Every sorted multiset of faces a dice group can show, with its weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PossibilitySpace(HashMap<Vec<Int>, u64>);

fn add_weight(map: &mut HashMap<Vec<Int>, u64>, key: Vec<Int>, weight: u64) -> DResult<()> {
    let entry = map.entry(key).or_insert(0);
    *entry = entry.checked_add(weight).ok_or(DistError::Overflow)?;
    Ok(())
}

impl PossibilitySpace {
    /// Rolls `count` dice that each follow `die`.
    pub fn roll(die: &Distribution, count: usize, limit: usize) -> DResult<Self> {
        let mut space: HashMap<Vec<Int>, u64> = HashMap::from([(Vec::new(), 1)]);

        for _ in 0..count {
            let capacity = space.len().saturating_mul(die.len());
            let mut next = HashMap::with_capacity(capacity.min(limit.saturating_add(1)));
            for (outcome, weight) in &space {
                for (face, face_weight) in die.iter() {
                    let mut outcome: Vec<Int> = outcome.clone();
                    outcome.insert(outcome.partition_point(|&x| x <= face), face);
                    let weight = weight.checked_mul(face_weight).ok_or(DistError::Overflow)?;
                    add_weight(&mut next, outcome, weight)?;
                    if next.len() > limit {
                        return Err(DistError::TooManyOutcomes { limit });
                    }
                }
            }
            space = next;
        }

        Ok(Self(space))
    }

    /// Applies a keep or drop modifier to every outcome.
    pub fn select(self, op: &Modifier) -> DResult<Self> {
        let mut ret = HashMap::with_capacity(self.0.len());
        for (outcome, weight) in self.0 {
            let len = outcome.len();
            let kept = match op {
                Modifier::KeepHighest(x) => outcome[len - x.0.min(len)..].to_vec(),
                Modifier::KeepLowest(x) => outcome[..x.0.min(len)].to_vec(),
                Modifier::DropHighest(x) => outcome[..len - x.0.min(len)].to_vec(),
                Modifier::DropLowest(x) => outcome[x.0.min(len)..].to_vec(),
                _ => outcome,
            };
            add_weight(&mut ret, kept, weight)?;
        }
        Ok(Self(ret))
    }

    /// Replaces every outcome with the number of its faces matching `condition`.
    pub fn count_successes(self, condition: Condition) -> DResult<Self> {
        let mut ret = HashMap::new();
        for (outcome, weight) in self.0 {
            let successes = outcome.iter().filter(|&&x| condition.matches(x)).count();
            let successes = Int::try_from(successes).map_err(|_| DistError::Overflow)?;
            add_weight(&mut ret, vec![successes], weight)?;
        }
        Ok(Self(ret))
    }

    pub fn into_distribution(self) -> DResult<Distribution> {
        let mut ret = Distribution::default();
        for (outcome, weight) in self.0 {
            let sum = outcome
                .iter()
                .try_fold(0 as Int, |acc, &x| acc.checked_add(x))
                .ok_or(DistError::Overflow)?;
            ret.add_weight(sum, weight)?;
        }
        Ok(ret)
    }
}
