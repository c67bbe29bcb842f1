/// Bounds on how much work a single evaluation may do.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Limits {
    /// Dice rolled per evaluation, `None` for no cap.
    pub max_rolls: Option<usize>,
    /// Rerolls of one die, and length of one explosion chain.
    pub max_iterations: usize,
    /// Distinct outcomes tracked while computing a distribution.
    pub max_outcomes: usize,
}

impl Limits {
    pub const DEFAULT_MAX_ROLLS: usize = 10_000;
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;
    pub const DEFAULT_MAX_OUTCOMES: usize = 1_000_000;

    pub fn max_rolls(mut self, max: impl Into<Option<usize>>) -> Self {
        self.max_rolls = max.into();
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_outcomes(mut self, max: usize) -> Self {
        self.max_outcomes = max;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rolls: Some(Self::DEFAULT_MAX_ROLLS),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            max_outcomes: Self::DEFAULT_MAX_OUTCOMES,
        }
    }
}
