//! Finalized trial records as delivered by the optimizer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::param::{Distribution, ParamValue};
use crate::types::TrialState;

/// One finalized evaluation of the objective function.
///
/// A `TrialRecord` is created by the optimizer when a trial begins and
/// finalized when the objective function returns, errors, or is pruned.
/// Once finalized it never changes; the adapter treats it as read-only
/// input.
///
/// Objective values are stored as an ordered sequence: length one for
/// single-objective studies, one entry per objective for multi-objective
/// studies, and empty for pruned or failed trials.
///
/// # Examples
///
/// ```
/// use optrack::{Distribution, TrialRecord};
///
/// let trial = TrialRecord::complete(0, [("x", 2.0.into())], vec![4.0])
///     .distribution("x", Distribution::Float { low: -10.0, high: 10.0, log_scale: false });
/// assert_eq!(trial.value(), Some(4.0));
/// ```
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TrialRecord {
    /// The trial number, assigned monotonically by the optimizer.
    pub number: u64,
    /// The lifecycle state this trial finished in.
    pub state: TrialState,
    /// The parameter assignment, keyed by parameter name.
    pub params: BTreeMap<String, ParamValue>,
    /// The search-space descriptors, keyed by parameter name.
    pub distributions: BTreeMap<String, Distribution>,
    /// Objective value(s). Empty for pruned and failed trials.
    pub values: Vec<f64>,
    /// Intermediate `(step, value)` pairs reported during execution,
    /// in report order.
    pub intermediate_values: Vec<(u64, f64)>,
    /// When the optimizer started this trial.
    pub datetime_start: Option<DateTime<Utc>>,
    /// When this trial reached a terminal state.
    pub datetime_complete: Option<DateTime<Utc>>,
}

impl TrialRecord {
    fn new(
        number: u64,
        state: TrialState,
        params: impl IntoIterator<Item = (&'static str, ParamValue)>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            number,
            state,
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
            distributions: BTreeMap::new(),
            values,
            intermediate_values: Vec::new(),
            datetime_start: None,
            datetime_complete: None,
        }
    }

    /// Creates a successfully completed trial.
    #[must_use]
    pub fn complete(
        number: u64,
        params: impl IntoIterator<Item = (&'static str, ParamValue)>,
        values: Vec<f64>,
    ) -> Self {
        Self::new(number, TrialState::Complete, params, values)
    }

    /// Creates a trial that was pruned before producing a value.
    #[must_use]
    pub fn pruned(
        number: u64,
        params: impl IntoIterator<Item = (&'static str, ParamValue)>,
    ) -> Self {
        Self::new(number, TrialState::Pruned, params, Vec::new())
    }

    /// Creates a trial whose objective function failed.
    #[must_use]
    pub fn failed(
        number: u64,
        params: impl IntoIterator<Item = (&'static str, ParamValue)>,
    ) -> Self {
        Self::new(number, TrialState::Fail, params, Vec::new())
    }

    /// Attaches the distribution descriptor for one parameter.
    #[must_use]
    pub fn distribution(mut self, name: &str, distribution: Distribution) -> Self {
        self.distributions.insert(name.to_owned(), distribution);
        self
    }

    /// Attaches intermediate `(step, value)` pairs.
    #[must_use]
    pub fn intermediate_values(mut self, values: Vec<(u64, f64)>) -> Self {
        self.intermediate_values = values;
        self
    }

    /// Attaches start and completion timestamps.
    #[must_use]
    pub fn timestamps(mut self, start: DateTime<Utc>, complete: DateTime<Utc>) -> Self {
        self.datetime_start = Some(start);
        self.datetime_complete = Some(complete);
        self
    }

    /// The scalar objective value, if exactly one was produced.
    ///
    /// Returns `None` for pruned/failed trials and for multi-objective
    /// trials (use [`values`](Self::values) for those).
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self.values.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Wall-clock duration, when both timestamps are present.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.datetime_start, self.datetime_complete) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Returns `true` if this trial participates in best-trial
    /// computation: it must be COMPLETE and carry at least one value.
    #[must_use]
    pub fn is_eligible_for_best(&self) -> bool {
        self.state == TrialState::Complete && !self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scalar_value_only_for_single_objective() {
        let single = TrialRecord::complete(0, [("x", 1.0.into())], vec![3.5]);
        assert_eq!(single.value(), Some(3.5));

        let multi = TrialRecord::complete(1, [("x", 1.0.into())], vec![3.5, 2.0]);
        assert_eq!(multi.value(), None);

        let pruned = TrialRecord::pruned(2, [("x", 1.0.into())]);
        assert_eq!(pruned.value(), None);
    }

    #[test]
    fn pruned_and_failed_are_ineligible() {
        assert!(TrialRecord::complete(0, [], vec![1.0]).is_eligible_for_best());
        assert!(!TrialRecord::pruned(1, []).is_eligible_for_best());
        assert!(!TrialRecord::failed(2, []).is_eligible_for_best());
    }

    #[test]
    fn duration_needs_both_timestamps() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 30).unwrap();

        let trial = TrialRecord::complete(0, [], vec![1.0]).timestamps(start, end);
        assert_eq!(trial.duration(), Some(chrono::Duration::seconds(30)));

        let bare = TrialRecord::complete(1, [], vec![1.0]);
        assert_eq!(bare.duration(), None);
    }
}
