#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Experiment-tracking adapter for hyperparameter optimization studies.
//! Attach a [`Recorder`] to an optimizer's per-trial callback and every
//! finished trial — its parameters, objective value(s), state, timing,
//! and intermediate values — is mapped into a namespaced key/value record
//! on an external tracking sink, together with the study's current best
//! trial(s), diagnostic plots, and a serialized study snapshot that can
//! be reconstructed later.
//!
//! # Getting Started
//!
//! ```
//! use optrack::prelude::*;
//!
//! let sink = MemorySink::new();
//! let recorder = Recorder::builder(sink.clone()).build().unwrap();
//!
//! // Driven by the optimizer: one callback per finalized trial.
//! let mut study = StudySummary::new("quadratic", vec![Direction::Minimize]);
//! for (i, x) in [3.0_f64, 1.0, 2.0].into_iter().enumerate() {
//!     let trial = TrialRecord::complete(i as u64, [("x", x.into())], vec![x * x]);
//!     study.push_trial(trial.clone());
//!     recorder.report_trial(&study, &trial);
//! }
//!
//! assert_eq!(sink.field("best/value"), Some(1.0.into()));
//! let restored = optrack::load_study(&sink, "").unwrap();
//! assert_eq!(restored.trials.len(), 3);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Recorder`] | Map optimizer events into tracking records: per-trial fields, best reconciliation, plots, snapshots. |
//! | [`StudySummary`] | Read-only view of one optimization run: trials, direction(s), best trial(s). |
//! | [`TrialRecord`] | One finalized evaluation of the objective function. |
//! | [`TrackingSink`](sink::TrackingSink) | The external key-value/artifact store receiving records. |
//! | [`PlotKind`](plot::PlotKind) | Fixed set of diagnostic plots, each independently fault-isolated. |
//! | [`StudySnapshot`] | Versioned serialized-study blob, the basis of [`load_study`]. |
//!
//! # Key namespaces
//!
//! | Namespace | Contents | Write mode |
//! |-----------|----------|------------|
//! | `trials/{n}/...` | One trial's params, value(s), state, timing, distributions | set (per-trial, never collides) |
//! | `trials/values` | Objective series across completed trials | append |
//! | `best/...` | Current best trial(s) params and value(s) | overwrite on change |
//! | `study/...` | Name, direction(s), serialized snapshot | set / upload |
//! | `visualizations/...` | Rendered plot artifacts | upload |
//!
//! # Error policy
//!
//! The per-trial hook never propagates an error to the optimizer: plot
//! render failures, importance computations that cannot run, and sink
//! write rejections are logged via [`tracing`](https://docs.rs/tracing)
//! and skipped. The one-shot operations ([`Recorder::log_study`],
//! [`load_study`]) surface their errors. See [`Error`] for the taxonomy.

mod error;
pub mod importance;
mod param;
mod pareto;
pub mod plot;
mod recorder;
pub mod sink;
mod snapshot;
mod study;
mod trial;
mod types;

pub use error::{Error, Result};
pub use param::{Distribution, ParamValue};
pub use plot::{HtmlRenderer, PlotKind, PlotRenderer};
pub use recorder::{Recorder, RecorderBuilder, UpdateFreq, load_study};
pub use sink::{ApiVersion, MemorySink, SinkValue, TrackingSink};
pub use snapshot::{SNAPSHOT_FORMAT_VERSION, StudySnapshot};
pub use study::{StudySummary, TrialCallback};
pub use trial::TrialRecord;
pub use types::{Direction, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use optrack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::param::{Distribution, ParamValue};
    pub use crate::plot::{PlotKind, PlotRenderer};
    pub use crate::recorder::{Recorder, UpdateFreq, load_study};
    pub use crate::sink::{MemorySink, SinkValue, TrackingSink};
    pub use crate::snapshot::StudySnapshot;
    pub use crate::study::{StudySummary, TrialCallback};
    pub use crate::trial::TrialRecord;
    pub use crate::types::{Direction, TrialState};
}
