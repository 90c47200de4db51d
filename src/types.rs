//! Core enums shared across the crate.

/// The optimization direction for one objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Lower objective values are better.
    Minimize,
    /// Higher objective values are better.
    Maximize,
}

impl Direction {
    /// Returns `true` if `candidate` is strictly better than `incumbent`
    /// under this direction. Ties are never "better".
    #[must_use]
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Minimize => write!(f, "minimize"),
            Self::Maximize => write!(f, "maximize"),
        }
    }
}

/// The lifecycle state of a trial as reported by the optimizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TrialState {
    /// The objective function is still executing.
    Running,
    /// The objective function returned a value.
    Complete,
    /// The trial was stopped early by a pruner.
    Pruned,
    /// The objective function raised an error.
    Fail,
}

impl TrialState {
    /// Returns `true` for any terminal state (everything except
    /// [`Running`](Self::Running)).
    #[must_use]
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl core::fmt::Display for TrialState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Pruned => write!(f, "PRUNED"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improves_respects_direction() {
        assert!(Direction::Minimize.improves(1.0, 2.0));
        assert!(!Direction::Minimize.improves(2.0, 1.0));
        assert!(Direction::Maximize.improves(2.0, 1.0));
        assert!(!Direction::Maximize.improves(1.0, 2.0));
    }

    #[test]
    fn ties_do_not_improve() {
        assert!(!Direction::Minimize.improves(3.0, 3.0));
        assert!(!Direction::Maximize.improves(3.0, 3.0));
    }

    #[test]
    fn finished_states() {
        assert!(!TrialState::Running.is_finished());
        assert!(TrialState::Complete.is_finished());
        assert!(TrialState::Pruned.is_finished());
        assert!(TrialState::Fail.is_finished());
    }
}
