//! Error types for the tracking adapter.
//!
//! All fallible operations in the crate return [`Result<T>`], which is an
//! alias for `core::result::Result<T, Error>`. The [`Error`] enum covers
//! plot rendering, snapshot decoding, sink capability checks, and backend
//! write failures.
//!
//! Only a subset of these errors ever reaches a caller: per-trial
//! recording suppresses [`PlotRender`](Error::PlotRender) and
//! [`BackendWrite`](Error::BackendWrite) internally (logged as warnings)
//! so that no failure propagates into an in-progress optimization trial.
//! The one-shot operations — full-study replay and study reconstruction —
//! surface errors to their caller.

/// Errors returned by tracking-adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A visualization cannot be produced for the current trial set or
    /// parameter types (e.g., parameter importances on a categorical-only
    /// search space, or a plot requiring more completed trials than
    /// exist). Suppressed during recording; never fatal.
    #[error("cannot render {plot}: {reason}")]
    PlotRender {
        /// The plot kind that failed to render.
        plot: &'static str,
        /// Why rendering was not possible.
        reason: String,
    },

    /// A stored study snapshot is missing, truncated, corrupt, or was
    /// written by an incompatible format version. Fatal to the
    /// reconstruction operation that hit it.
    #[error("cannot decode study snapshot: {0}")]
    Deserialization(String),

    /// The snapshot format version does not match the version this crate
    /// writes.
    #[error("unsupported snapshot format version {found} (expected {expected})")]
    SnapshotVersion {
        /// The version found in the stored blob.
        found: u32,
        /// The version this crate understands.
        expected: u32,
    },

    /// The recorder was attached to a sink whose API generation is not
    /// supported. Raised at construction time, before any write.
    #[error("unsupported sink API version {found:?}; supported: {supported:?}")]
    IncompatibleApi {
        /// The version reported by the sink.
        found: crate::sink::ApiVersion,
        /// The versions this crate can drive.
        supported: &'static [crate::sink::ApiVersion],
    },

    /// The tracking sink rejected or failed a write. Not retried here;
    /// propagation policy belongs to the caller.
    #[error("sink write to '{key}' failed: {reason}")]
    BackendWrite {
        /// The key path being written.
        key: String,
        /// The sink's failure description.
        reason: String,
    },

    /// A fetch asked for a key the sink has no value for.
    #[error("key '{0}' not found in sink")]
    KeyNotFound(String),

    /// Parameter importance was requested on a study that cannot support
    /// it (fewer than two finished trials, or no numeric parameters).
    #[error("cannot compute parameter importance: {0}")]
    Importance(&'static str),
}

/// A convenience alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;
