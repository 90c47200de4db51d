//! Read-only study summaries: all trials of one optimization run plus
//! its direction(s) and best-trial accessors.

use crate::pareto::non_dominated_front;
use crate::trial::TrialRecord;
use crate::types::Direction;

/// The collection of all trials belonging to one optimization run.
///
/// The optimizer owns the live study; this summary is the read-only view
/// the adapter receives in callbacks and replay. Trials are held in the
/// order the optimizer finished them; trial numbers are unique and
/// monotonically assigned.
///
/// # Examples
///
/// ```
/// use optrack::{Direction, StudySummary, TrialRecord};
///
/// let mut study = StudySummary::new("quadratic", vec![Direction::Minimize]);
/// study.push_trial(TrialRecord::complete(0, [("x", 2.0.into())], vec![4.0]));
/// study.push_trial(TrialRecord::complete(1, [("x", 1.0.into())], vec![1.0]));
///
/// assert_eq!(study.best_trial().map(|t| t.number), Some(1));
/// ```
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StudySummary {
    /// Human-readable study name, recorded under `study/study_name`.
    pub study_name: String,
    /// One direction per objective.
    pub directions: Vec<Direction>,
    /// All trials, in completion order.
    pub trials: Vec<TrialRecord>,
}

impl StudySummary {
    /// Creates an empty study with the given name and direction(s).
    #[must_use]
    pub fn new(study_name: impl Into<String>, directions: Vec<Direction>) -> Self {
        Self {
            study_name: study_name.into(),
            directions,
            trials: Vec::new(),
        }
    }

    /// Appends a finalized trial.
    pub fn push_trial(&mut self, trial: TrialRecord) {
        self.trials.push(trial);
    }

    /// Returns `true` when the study optimizes two or more objectives.
    #[must_use]
    pub fn is_multi_objective(&self) -> bool {
        self.directions.len() > 1
    }

    /// The single direction of a single-objective study.
    ///
    /// Returns `None` for multi-objective studies.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        match self.directions.as_slice() {
            [d] => Some(*d),
            _ => None,
        }
    }

    /// Trials that participate in best-trial computation: COMPLETE with
    /// at least one objective value. Pruned and failed trials never
    /// qualify.
    pub fn completed_trials(&self) -> impl Iterator<Item = &TrialRecord> {
        self.trials.iter().filter(|t| t.is_eligible_for_best())
    }

    /// The best completed trial of a single-objective study.
    ///
    /// Comparison is strictly-better under the study direction, so among
    /// tied values the earliest-seen trial wins. Returns `None` for an
    /// empty study or a multi-objective one.
    #[must_use]
    pub fn best_trial(&self) -> Option<&TrialRecord> {
        let direction = self.direction()?;
        let mut best: Option<(&TrialRecord, f64)> = None;
        for trial in self.completed_trials() {
            let Some(value) = trial.value() else {
                continue;
            };
            match best {
                Some((_, incumbent)) if !direction.improves(value, incumbent) => {}
                _ => best = Some((trial, value)),
            }
        }
        best.map(|(trial, _)| trial)
    }

    /// The best completed trial(s).
    ///
    /// For single-objective studies this is at most one trial; for
    /// multi-objective studies it is the Pareto non-dominated set over
    /// all completed trials, in completion order.
    #[must_use]
    pub fn best_trials(&self) -> Vec<&TrialRecord> {
        if !self.is_multi_objective() {
            return self.best_trial().into_iter().collect();
        }

        let candidates: Vec<&TrialRecord> = self
            .completed_trials()
            .filter(|t| t.values.len() == self.directions.len())
            .collect();
        let values: Vec<Vec<f64>> = candidates.iter().map(|t| t.values.clone()).collect();
        non_dominated_front(&values, &self.directions)
            .into_iter()
            .map(|i| candidates[i])
            .collect()
    }
}

/// The optimizer-facing registration surface: invoked synchronously with
/// the study and the just-finalized trial after every trial finishes.
///
/// Implementations must tolerate concurrent invocation — an optimizer
/// that parallelizes trials may call this from several threads at once.
pub trait TrialCallback: Send + Sync {
    /// Called once per finalized trial (complete, pruned, or failed).
    ///
    /// Must not panic and must not abort the trial: implementations
    /// swallow their own failures.
    fn on_trial_complete(&self, study: &StudySummary, trial: &TrialRecord);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(values: &[f64]) -> StudySummary {
        let mut study = StudySummary::new("s", vec![Direction::Minimize]);
        for (i, &v) in values.iter().enumerate() {
            study.push_trial(TrialRecord::complete(i as u64, [], vec![v]));
        }
        study
    }

    #[test]
    fn best_trial_minimize() {
        let study = single(&[5.0, 3.0, 4.0]);
        assert_eq!(study.best_trial().map(|t| t.number), Some(1));
    }

    #[test]
    fn best_trial_tie_keeps_earlier() {
        let study = single(&[3.0, 3.0]);
        assert_eq!(study.best_trial().map(|t| t.number), Some(0));
    }

    #[test]
    fn best_trial_maximize() {
        let mut study = StudySummary::new("s", vec![Direction::Maximize]);
        study.push_trial(TrialRecord::complete(0, [], vec![0.4]));
        study.push_trial(TrialRecord::complete(1, [], vec![0.9]));
        assert_eq!(study.best_trial().map(|t| t.number), Some(1));
    }

    #[test]
    fn pruned_trials_excluded_from_best() {
        let mut study = single(&[5.0]);
        study.push_trial(TrialRecord::pruned(1, [("x", 1i64.into())]));
        assert_eq!(study.best_trial().map(|t| t.number), Some(0));
        assert_eq!(study.completed_trials().count(), 1);
    }

    #[test]
    fn empty_study_has_no_best() {
        let study = StudySummary::new("s", vec![Direction::Minimize]);
        assert!(study.best_trial().is_none());
        assert!(study.best_trials().is_empty());
    }

    #[test]
    fn multi_objective_front() {
        let mut study =
            StudySummary::new("s", vec![Direction::Minimize, Direction::Minimize]);
        study.push_trial(TrialRecord::complete(0, [], vec![1.0, 5.0]));
        study.push_trial(TrialRecord::complete(1, [], vec![2.0, 3.0]));
        study.push_trial(TrialRecord::complete(2, [], vec![4.0, 1.0]));
        study.push_trial(TrialRecord::complete(3, [], vec![5.0, 5.0])); // dominated

        let best: Vec<u64> = study.best_trials().iter().map(|t| t.number).collect();
        assert_eq!(best, vec![0, 1, 2]);
    }

    #[test]
    fn multi_objective_has_no_scalar_best() {
        let mut study =
            StudySummary::new("s", vec![Direction::Minimize, Direction::Minimize]);
        study.push_trial(TrialRecord::complete(0, [], vec![1.0, 2.0]));
        assert!(study.best_trial().is_none());
        assert_eq!(study.best_trials().len(), 1);
    }
}
