//! Versioned study snapshots: the serialized-study blob stored under
//! `study/serialized` and decoded back by study reconstruction.
//!
//! The blob is a JSON document wrapping the [`StudySummary`] together
//! with a format version. Decoding an absent, truncated, corrupt, or
//! version-mismatched blob fails with
//! [`Error::Deserialization`](crate::Error::Deserialization) /
//! [`Error::SnapshotVersion`](crate::Error::SnapshotVersion) — surfaced
//! to the caller, never suppressed.

use crate::error::{Error, Result};
use crate::study::StudySummary;

/// The format version written by this crate.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time serialization of an entire study.
///
/// Reconstruction is a left inverse of serialization: a decoded snapshot
/// carries the same trials (numbers, params, values, states) as the
/// study it was taken from.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StudySnapshot {
    /// The snapshot format version, checked on decode.
    pub format_version: u32,
    /// The serialized study.
    pub study: StudySummary,
}

impl StudySnapshot {
    /// Takes a snapshot of `study` at the current format version.
    #[must_use]
    pub fn of(study: &StudySummary) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            study: study.clone(),
        }
    }

    /// Encodes the snapshot into blob bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Deserialization`] if encoding fails; not expected for
    /// the plain data types a study carries.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Decodes blob bytes back into a snapshot.
    ///
    /// # Errors
    ///
    /// - [`Error::Deserialization`] for empty, truncated, or corrupt
    ///   input.
    /// - [`Error::SnapshotVersion`] when the blob was written by an
    ///   incompatible format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Deserialization("empty blob".to_owned()));
        }
        let snapshot: Self =
            serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::SnapshotVersion {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::TrialRecord;
    use crate::types::{Direction, TrialState};

    fn sample_study() -> StudySummary {
        let mut study = StudySummary::new("snapshot-test", vec![Direction::Minimize]);
        study.push_trial(
            TrialRecord::complete(0, [("lr", 0.01.into()), ("layers", 3i64.into())], vec![0.4])
                .intermediate_values(vec![(0, 1.0), (1, 0.6)]),
        );
        study.push_trial(TrialRecord::pruned(1, [("lr", 0.5.into())]));
        study
    }

    #[test]
    fn round_trip_preserves_trials() {
        let study = sample_study();
        let bytes = StudySnapshot::of(&study).to_bytes().unwrap();
        let restored = StudySnapshot::from_bytes(&bytes).unwrap().study;

        assert_eq!(restored.study_name, study.study_name);
        assert_eq!(restored.directions, study.directions);
        assert_eq!(restored.trials.len(), study.trials.len());
        for (a, b) in restored.trials.iter().zip(study.trials.iter()) {
            assert_eq!(a.number, b.number);
            assert_eq!(a.state, b.state);
            assert_eq!(a.params, b.params);
            assert_eq!(a.values, b.values);
            assert_eq!(a.intermediate_values, b.intermediate_values);
        }
        assert_eq!(restored.trials[1].state, TrialState::Pruned);
    }

    #[test]
    fn empty_blob_is_rejected() {
        assert!(matches!(
            StudySnapshot::from_bytes(&[]),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let bytes = StudySnapshot::of(&sample_study()).to_bytes().unwrap();
        assert!(matches!(
            StudySnapshot::from_bytes(&bytes[..bytes.len() / 2]),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut snapshot = StudySnapshot::of(&sample_study());
        snapshot.format_version = 99;
        let bytes = serde_json::to_vec(&snapshot).unwrap();
        assert!(matches!(
            StudySnapshot::from_bytes(&bytes),
            Err(Error::SnapshotVersion {
                found: 99,
                expected: SNAPSHOT_FORMAT_VERSION
            })
        ));
    }
}
