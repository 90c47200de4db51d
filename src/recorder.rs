//! The event recorder: maps optimizer events into tracking-sink records.
//!
//! [`Recorder`] is the adapter's core. Attached to an optimization run as
//! a [`TrialCallback`], it reacts to every finalized trial by writing the
//! trial's parameters, values, state, and timing under that trial's key
//! namespace, reconciling the study's best trial(s), attaching diagnostic
//! plots, and snapshotting the whole study for later reconstruction.
//!
//! # Fault isolation
//!
//! Every step of the per-trial hook runs independently: a plot that needs
//! more trials than exist, an importance computation on a categorical-only
//! space, or a rejected sink write is logged as a `tracing` warning and
//! skipped. No failure inside [`Recorder::report_trial`] ever reaches the
//! optimizer or aborts the trial that triggered it.
//!
//! The one-shot operations behave differently: [`Recorder::log_study`]
//! propagates sink write failures to its caller (plot failures are still
//! suppressed), and [`load_study`] surfaces every decode error.
//!
//! # Concurrency
//!
//! [`Recorder::report_trial`] takes `&self` and may be invoked from
//! several threads at once when the optimizer parallelizes trials.
//! Per-trial namespaces keep concurrent writes disjoint; the best-trial
//! reconciliation state sits behind a `parking_lot::Mutex`.
//!
//! # Examples
//!
//! ```
//! use optrack::{Direction, MemorySink, Recorder, StudySummary, TrialRecord};
//!
//! let sink = MemorySink::new();
//! let recorder = Recorder::builder(sink.clone()).build().unwrap();
//!
//! let mut study = StudySummary::new("demo", vec![Direction::Minimize]);
//! let trial = TrialRecord::complete(0, [("x", 2.0.into())], vec![4.0]);
//! study.push_trial(trial.clone());
//! recorder.report_trial(&study, &trial);
//!
//! assert!(sink.field("trials/0/value").is_some());
//! assert!(sink.field("best/value").is_some());
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::plot::{HtmlRenderer, PlotKind, PlotRenderer, check_applicable};
use crate::sink::{SUPPORTED_API_VERSIONS, SinkValue, TrackingSink};
use crate::snapshot::StudySnapshot;
use crate::study::{StudySummary, TrialCallback};
use crate::trial::TrialRecord;

/// Key the adapter's own version is recorded under.
const INTEGRATION_VERSION_KEY: &str = "integration/version";

/// Key the serialized study blob is stored under.
const SERIALIZED_STUDY_KEY: &str = "study/serialized";

/// How often a recurring logging step runs, counted in trials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateFreq {
    /// Run on every k-th trial number (k ≥ 1).
    Every(u64),
    /// Never run.
    Never,
}

impl UpdateFreq {
    fn due(self, trial_number: u64) -> bool {
        match self {
            Self::Every(k) => trial_number % k.max(1) == 0,
            Self::Never => false,
        }
    }
}

/// Configures and builds a [`Recorder`].
///
/// All settings are fixed once [`build`](Self::build) runs; retention and
/// frequency choices never change mid-run.
#[must_use]
pub struct RecorderBuilder {
    sink: Arc<dyn TrackingSink>,
    renderer: Arc<dyn PlotRenderer>,
    base_namespace: String,
    plots_update_freq: UpdateFreq,
    study_update_freq: UpdateFreq,
    log_all_trials: bool,
    disabled_plots: Vec<PlotKind>,
    target_objective: Option<usize>,
}

impl RecorderBuilder {
    fn new(sink: Arc<dyn TrackingSink>) -> Self {
        Self {
            sink,
            renderer: Arc::new(HtmlRenderer),
            base_namespace: String::new(),
            plots_update_freq: UpdateFreq::Every(1),
            study_update_freq: UpdateFreq::Every(1),
            log_all_trials: true,
            disabled_plots: Vec::new(),
            target_objective: None,
        }
    }

    /// Prefix every key path with `namespace/`.
    pub fn base_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.base_namespace = namespace.into();
        self
    }

    /// How often the plot pass runs during per-trial recording.
    /// Defaults to every trial.
    pub fn plots_update_freq(mut self, freq: UpdateFreq) -> Self {
        self.plots_update_freq = freq;
        self
    }

    /// How often the study snapshot is refreshed during per-trial
    /// recording. Defaults to every trial.
    pub fn study_update_freq(mut self, freq: UpdateFreq) -> Self {
        self.study_update_freq = freq;
        self
    }

    /// When `false`, per-trial detail is never written — only study
    /// details, the best namespace, plots, and snapshots. Retention is
    /// by skipping writes; nothing already written is deleted. Defaults
    /// to `true`.
    pub fn log_all_trials(mut self, log_all_trials: bool) -> Self {
        self.log_all_trials = log_all_trials;
        self
    }

    /// Excludes one plot kind from the plot pass.
    pub fn disable_plot(mut self, kind: PlotKind) -> Self {
        self.disabled_plots.push(kind);
        self
    }

    /// Narrows multi-objective studies to one objective index so that
    /// scalar-objective plots (optimization history, importances, EDF)
    /// can run. Without this, those plots are skipped on multi-objective
    /// studies.
    pub fn target_objective(mut self, objective_index: usize) -> Self {
        self.target_objective = Some(objective_index);
        self
    }

    /// Replaces the built-in [`HtmlRenderer`].
    pub fn renderer(mut self, renderer: impl PlotRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Validates the sink and builds the recorder.
    ///
    /// # Errors
    ///
    /// - [`Error::IncompatibleApi`] when the sink's API generation is
    ///   not supported. Checked here, eagerly, because every later write
    ///   would be meaningless.
    /// - [`Error::BackendWrite`] if recording the integration version
    ///   fails.
    pub fn build(self) -> Result<Recorder> {
        let found = self.sink.api_version();
        if !SUPPORTED_API_VERSIONS.contains(&found) {
            return Err(Error::IncompatibleApi {
                found,
                supported: SUPPORTED_API_VERSIONS,
            });
        }

        let recorder = Recorder {
            sink: self.sink,
            renderer: self.renderer,
            base_namespace: self.base_namespace,
            plots_update_freq: self.plots_update_freq,
            study_update_freq: self.study_update_freq,
            log_all_trials: self.log_all_trials,
            disabled_plots: self.disabled_plots,
            target_objective: self.target_objective,
            state: Mutex::new(RecorderState::default()),
        };
        recorder.sink.set(
            &recorder.key(INTEGRATION_VERSION_KEY),
            env!("CARGO_PKG_VERSION").into(),
        )?;
        Ok(recorder)
    }
}

#[derive(Default)]
struct RecorderState {
    study_details_written: bool,
    /// Best value recorded so far (single-objective).
    best_value: Option<f64>,
    /// Trial numbers of the recorded best set (multi-objective).
    best_numbers: Vec<u64>,
}

/// Logs study metadata from an optimization run to a tracking sink.
///
/// Built via [`Recorder::builder`]; see the
/// [module documentation](self) for behavior and guarantees.
pub struct Recorder {
    sink: Arc<dyn TrackingSink>,
    renderer: Arc<dyn PlotRenderer>,
    base_namespace: String,
    plots_update_freq: UpdateFreq,
    study_update_freq: UpdateFreq,
    log_all_trials: bool,
    disabled_plots: Vec<PlotKind>,
    target_objective: Option<usize>,
    state: Mutex<RecorderState>,
}

impl Recorder {
    /// Starts configuring a recorder for `sink`.
    #[must_use]
    pub fn builder(sink: impl TrackingSink + 'static) -> RecorderBuilder {
        RecorderBuilder::new(Arc::new(sink))
    }

    fn key(&self, path: &str) -> String {
        if self.base_namespace.is_empty() {
            path.to_owned()
        } else {
            format!("{}/{path}", self.base_namespace)
        }
    }

    /// Logs `result`'s failure as a warning instead of propagating it.
    fn suppress(result: Result<()>, step: &str) {
        if let Err(error) = result {
            tracing::warn!(%error, step, "skipping failed logging step");
        }
    }

    /// The per-trial hook (the optimizer-facing callback body).
    ///
    /// Runs the full per-trial pipeline: trial mapping, best-trial
    /// reconciliation, first-trial study details, the plot pass, and the
    /// study snapshot. Every step is fault-isolated; this never fails
    /// and never panics on sink errors.
    pub fn report_trial(&self, study: &StudySummary, trial: &TrialRecord) {
        tracing::debug!(trial = trial.number, state = %trial.state, "recording trial");

        if self.log_all_trials {
            Self::suppress(self.write_trial(trial), "trial mapping");
        }
        Self::suppress(self.reconcile_best(study), "best-trial update");
        Self::suppress(self.write_study_details_once(study), "study details");
        if self.plots_update_freq.due(trial.number) {
            self.write_plots(study);
        }
        if self.study_update_freq.due(trial.number) {
            Self::suppress(self.write_snapshot(study), "study snapshot");
        }
    }

    /// Maps one trial into its `trials/{number}/...` namespace.
    #[allow(clippy::cast_precision_loss)]
    fn write_trial(&self, trial: &TrialRecord) -> Result<()> {
        let ns = format!("trials/{}", trial.number);
        let set = |path: String, value: SinkValue| self.sink.set(&self.key(&path), value);

        set(format!("{ns}/state"), trial.state.to_string().into())?;

        for (name, value) in &trial.params {
            set(format!("{ns}/params/{name}"), value.into())?;
        }
        for (name, dist) in &trial.distributions {
            set(format!("{ns}/distributions/{name}"), dist.to_string().into())?;
        }

        match trial.values.as_slice() {
            [] => {} // Pruned/failed trials carry no objective value.
            &[value] => {
                set(format!("{ns}/value"), value.into())?;
                // Study-wide objective series, one point per completed trial.
                self.sink.append(&self.key("trials/values"), value.into())?;
            }
            values => {
                for (i, &value) in values.iter().enumerate() {
                    set(format!("{ns}/values/{i}"), value.into())?;
                }
            }
        }

        for &(_, value) in &trial.intermediate_values {
            self.sink
                .append(&self.key(&format!("{ns}/intermediate_values")), value.into())?;
        }

        if let Some(start) = trial.datetime_start {
            set(format!("{ns}/datetime_start"), start.to_rfc3339().into())?;
        }
        if let Some(end) = trial.datetime_complete {
            set(format!("{ns}/datetime_complete"), end.to_rfc3339().into())?;
        }
        if let Some(duration) = trial.duration() {
            let secs = duration.num_milliseconds() as f64 / 1000.0;
            set(format!("{ns}/duration"), secs.into())?;
        }

        Ok(())
    }

    /// Recomputes the best trial(s) and overwrites the `best/` namespace
    /// when the set changed.
    fn reconcile_best(&self, study: &StudySummary) -> Result<()> {
        if study.is_multi_objective() {
            self.reconcile_pareto_best(study)
        } else {
            self.reconcile_scalar_best(study)
        }
    }

    fn reconcile_scalar_best(&self, study: &StudySummary) -> Result<()> {
        let Some(best) = study.best_trial() else {
            return Ok(());
        };
        let Some(value) = best.value() else {
            return Ok(());
        };
        let Some(direction) = study.direction() else {
            return Ok(());
        };

        // The lock is held across the sink writes: concurrent hooks must
        // commit their `best/` records in the same order they won the
        // incumbent check, or the sink can end on a worse trial.
        let mut state = self.state.lock();
        // Strictly-better only: a tie never replaces the incumbent.
        match state.best_value {
            Some(incumbent) if !direction.improves(value, incumbent) => return Ok(()),
            _ => state.best_value = Some(value),
        }

        tracing::debug!(trial = best.number, value, "new best trial");
        self.sink.set(&self.key("best/number"), best.number.into())?;
        self.sink.set(&self.key("best/value"), value.into())?;
        for (name, pv) in &best.params {
            self.sink
                .set(&self.key(&format!("best/params/{name}")), pv.into())?;
        }
        Ok(())
    }

    fn reconcile_pareto_best(&self, study: &StudySummary) -> Result<()> {
        let best = study.best_trials();
        let numbers: Vec<u64> = best.iter().map(|t| t.number).collect();

        // Held across the writes, as in the scalar path: membership and
        // the `best/` records must commit in the same order.
        let mut state = self.state.lock();
        if state.best_numbers == numbers {
            return Ok(());
        }
        state.best_numbers.clone_from(&numbers);

        tracing::debug!(best = ?numbers, "pareto-optimal set changed");
        // Membership is defined by `best/numbers`; stale per-trial detail
        // from an earlier front may remain below `best/trials/`.
        let joined = numbers
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.sink.set(&self.key("best/numbers"), joined.into())?;

        for trial in best {
            let ns = format!("best/trials/{}", trial.number);
            for (i, &value) in trial.values.iter().enumerate() {
                self.sink
                    .set(&self.key(&format!("{ns}/values/{i}")), value.into())?;
            }
            for (name, pv) in &trial.params {
                self.sink
                    .set(&self.key(&format!("{ns}/params/{name}")), pv.into())?;
            }
        }
        Ok(())
    }

    /// Writes `study/...` details the first time a trial is reported.
    fn write_study_details_once(&self, study: &StudySummary) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.study_details_written {
                return Ok(());
            }
            state.study_details_written = true;
        }
        self.write_study_details(study)
    }

    fn write_study_details(&self, study: &StudySummary) -> Result<()> {
        self.sink
            .set(&self.key("study/study_name"), study.study_name.as_str().into())?;
        if let Some(direction) = study.direction() {
            self.sink
                .set(&self.key("study/direction"), direction.to_string().into())?;
        }
        for (i, direction) in study.directions.iter().enumerate() {
            self.sink.set(
                &self.key(&format!("study/directions/{i}")),
                direction.to_string().into(),
            )?;
        }
        Ok(())
    }

    /// Renders and uploads every enabled, applicable plot. Each kind is
    /// fault-isolated: one failed render or upload never blocks the rest.
    fn write_plots(&self, study: &StudySummary) {
        for kind in PlotKind::ALL {
            if self.disabled_plots.contains(&kind) {
                continue;
            }
            let objective_index = match check_applicable(kind, study, self.target_objective) {
                Ok(i) => i,
                Err(error) => {
                    tracing::debug!(%error, "plot not applicable");
                    continue;
                }
            };
            let result = self
                .renderer
                .render(study, kind, objective_index)
                .and_then(|artifact| {
                    self.sink
                        .upload(&self.key(&format!("visualizations/{}", kind.key())), artifact)
                });
            Self::suppress(result, kind.key());
        }
    }

    /// Serializes the whole study into the `study/serialized` blob.
    fn write_snapshot(&self, study: &StudySummary) -> Result<()> {
        let bytes = StudySnapshot::of(study).to_bytes()?;
        self.sink.upload(&self.key(SERIALIZED_STUDY_KEY), bytes)
    }

    /// Logs a complete study in one pass (full-study replay).
    ///
    /// Iterates all trials in ascending trial-number order through the
    /// same per-trial mapping as the callback, then performs one final
    /// best-trial computation, one final plot pass, and one final
    /// snapshot. The resulting per-trial and best fields match what
    /// driving [`report_trial`](Self::report_trial) for every trial
    /// would have produced; intermediate best-history and per-trial plot
    /// artifacts are not reproduced.
    ///
    /// # Errors
    ///
    /// [`Error::BackendWrite`] (or snapshot encoding errors) from the
    /// sink are propagated — retry policy belongs to the caller. Plot
    /// failures are suppressed as warnings, as in the callback.
    pub fn log_study(&self, study: &StudySummary) -> Result<()> {
        tracing::debug!(study = %study.study_name, trials = study.trials.len(), "replaying study");

        self.write_study_details(study)?;
        self.state.lock().study_details_written = true;

        if self.log_all_trials {
            let mut ordered: Vec<&TrialRecord> = study.trials.iter().collect();
            ordered.sort_by_key(|t| t.number);
            for trial in ordered {
                self.write_trial(trial)?;
            }
        }

        self.reconcile_best(study)?;
        self.write_plots(study);
        self.write_snapshot(study)
    }
}

impl TrialCallback for Recorder {
    fn on_trial_complete(&self, study: &StudySummary, trial: &TrialRecord) {
        self.report_trial(study, trial);
    }
}

/// Reconstructs a study from a previously logged run.
///
/// The inverse of the snapshot writes performed by [`Recorder`]: fetches
/// the `study/serialized` blob (below `base_namespace` if one was used)
/// and decodes it into a [`StudySummary`] usable for further trials.
///
/// # Errors
///
/// - [`Error::KeyNotFound`] when no snapshot was ever written.
/// - [`Error::Deserialization`] / [`Error::SnapshotVersion`] when the
///   blob is truncated, corrupt, or from an incompatible format version.
pub fn load_study(sink: &dyn TrackingSink, base_namespace: &str) -> Result<StudySummary> {
    let key = if base_namespace.is_empty() {
        SERIALIZED_STUDY_KEY.to_owned()
    } else {
        format!("{base_namespace}/{SERIALIZED_STUDY_KEY}")
    };
    let bytes = sink.fetch(&key)?;
    Ok(StudySnapshot::from_bytes(&bytes)?.study)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ApiVersion, MemorySink};
    use crate::types::Direction;

    #[test]
    fn update_freq_due() {
        assert!(UpdateFreq::Every(1).due(0));
        assert!(UpdateFreq::Every(1).due(7));
        assert!(UpdateFreq::Every(3).due(6));
        assert!(!UpdateFreq::Every(3).due(7));
        assert!(!UpdateFreq::Never.due(0));
    }

    #[test]
    fn build_records_integration_version() {
        let sink = MemorySink::new();
        let _recorder = Recorder::builder(sink.clone()).build().unwrap();
        assert_eq!(
            sink.field("integration/version"),
            Some(env!("CARGO_PKG_VERSION").into())
        );
    }

    #[test]
    fn base_namespace_prefixes_keys() {
        let sink = MemorySink::new();
        let recorder = Recorder::builder(sink.clone())
            .base_namespace("hpo")
            .build()
            .unwrap();

        let mut study = StudySummary::new("s", vec![Direction::Minimize]);
        let trial = TrialRecord::complete(0, [("x", 1.0.into())], vec![1.0]);
        study.push_trial(trial.clone());
        recorder.report_trial(&study, &trial);

        assert!(sink.field("hpo/trials/0/value").is_some());
        assert!(sink.field("hpo/best/value").is_some());
        assert!(sink.field("trials/0/value").is_none());
    }

    struct LegacySink(MemorySink);

    impl TrackingSink for LegacySink {
        fn api_version(&self) -> ApiVersion {
            ApiVersion::Legacy
        }
        fn set(&self, key: &str, value: SinkValue) -> Result<()> {
            self.0.set(key, value)
        }
        fn append(&self, key: &str, value: SinkValue) -> Result<()> {
            self.0.append(key, value)
        }
        fn upload(&self, key: &str, artifact: Vec<u8>) -> Result<()> {
            self.0.upload(key, artifact)
        }
        fn fetch(&self, key: &str) -> Result<Vec<u8>> {
            self.0.fetch(key)
        }
    }

    #[test]
    fn legacy_sink_rejected_at_build() {
        let result = Recorder::builder(LegacySink(MemorySink::new())).build();
        assert!(matches!(
            result,
            Err(Error::IncompatibleApi {
                found: ApiVersion::Legacy,
                ..
            })
        ));
    }
}
