//! The tracking-sink abstraction and its in-memory implementation.
//!
//! A [`TrackingSink`] is an append/overwrite key-value store with binary
//! artifact support. Key paths are `/`-separated and namespaced by the
//! recorder (`trials/{n}/...`, `best/...`, `study/...`,
//! `visualizations/...`), so writes for different trials never collide.
//! Concurrency control per key is the sink's own concern — the recorder
//! issues one logical write per mapped field and may be driven from
//! several threads at once.
//!
//! [`MemorySink`] is the built-in implementation, backed by
//! `Arc<parking_lot::RwLock<..>>` maps. Cloning it shares storage, which
//! makes it convenient both as a local sink and as a test double.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};

/// The generations of sink API this crate knows about.
///
/// The recorder checks the sink's reported version once, at construction,
/// and refuses unsupported generations outright rather than discovering
/// incompatibilities write by write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ApiVersion {
    /// The pre-namespace API without artifact upload. Rejected.
    Legacy,
    /// The current key-path API.
    V1,
}

/// Sink API versions the recorder can drive.
pub const SUPPORTED_API_VERSIONS: &[ApiVersion] = &[ApiVersion::V1];

/// A scalar value written to a sink key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SinkValue {
    /// A floating-point scalar.
    Float(f64),
    /// An integer scalar.
    Int(i64),
    /// A boolean flag.
    Bool(bool),
    /// A string field.
    Str(String),
}

impl core::fmt::Display for SinkValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for SinkValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for SinkValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for SinkValue {
    #[allow(clippy::cast_possible_wrap)]
    fn from(v: u64) -> Self {
        Self::Int(v as i64)
    }
}

impl From<bool> for SinkValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for SinkValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for SinkValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&crate::param::ParamValue> for SinkValue {
    fn from(v: &crate::param::ParamValue) -> Self {
        use crate::param::ParamValue;
        match v {
            ParamValue::Float(f) => Self::Float(*f),
            ParamValue::Int(i) => Self::Int(*i),
            ParamValue::Bool(b) => Self::Bool(*b),
            ParamValue::Str(s) => Self::Str(s.clone()),
        }
    }
}

/// An external experiment-tracking run, seen as a key-value/artifact store.
///
/// The trait requires `Send + Sync`: an optimizer that parallelizes
/// trials invokes the per-trial hook concurrently, and every hook writes
/// through the same sink handle.
pub trait TrackingSink: Send + Sync {
    /// The API generation this sink speaks.
    fn api_version(&self) -> ApiVersion;

    /// Sets (overwrites) a scalar field.
    ///
    /// # Errors
    ///
    /// [`Error::BackendWrite`] if the sink rejects the write.
    fn set(&self, key: &str, value: SinkValue) -> Result<()>;

    /// Appends one point to an ordered series field.
    ///
    /// # Errors
    ///
    /// [`Error::BackendWrite`] if the sink rejects the write.
    fn append(&self, key: &str, value: SinkValue) -> Result<()>;

    /// Stores (overwrites) a binary artifact.
    ///
    /// # Errors
    ///
    /// [`Error::BackendWrite`] if the sink rejects the write.
    fn upload(&self, key: &str, artifact: Vec<u8>) -> Result<()>;

    /// Retrieves a previously uploaded artifact.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if no artifact exists at `key`.
    fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

#[derive(Default)]
struct MemorySinkInner {
    fields: BTreeMap<String, SinkValue>,
    series: HashMap<String, Vec<SinkValue>>,
    artifacts: HashMap<String, Vec<u8>>,
}

/// In-memory tracking sink (the default test double and local store).
///
/// This is a thin wrapper around `Arc<RwLock<..>>` maps; cloning shares
/// the underlying storage.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<RwLock<MemorySinkInner>>,
}

impl MemorySink {
    /// Creates a new, empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scalar currently stored at `key`, if any.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<SinkValue> {
        self.inner.read().fields.get(key).cloned()
    }

    /// Returns the full series appended at `key` (empty if absent).
    #[must_use]
    pub fn series(&self, key: &str) -> Vec<SinkValue> {
        self.inner.read().series.get(key).cloned().unwrap_or_default()
    }

    /// Returns `true` if an artifact exists at `key`.
    #[must_use]
    pub fn has_artifact(&self, key: &str) -> bool {
        self.inner.read().artifacts.contains_key(key)
    }

    /// All scalar field keys currently present, in sorted order.
    #[must_use]
    pub fn field_keys(&self) -> Vec<String> {
        self.inner.read().fields.keys().cloned().collect()
    }
}

impl TrackingSink for MemorySink {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V1
    }

    fn set(&self, key: &str, value: SinkValue) -> Result<()> {
        self.inner.write().fields.insert(key.to_owned(), value);
        Ok(())
    }

    fn append(&self, key: &str, value: SinkValue) -> Result<()> {
        self.inner
            .write()
            .series
            .entry(key.to_owned())
            .or_default()
            .push(value);
        Ok(())
    }

    fn upload(&self, key: &str, artifact: Vec<u8>) -> Result<()> {
        self.inner.write().artifacts.insert(key.to_owned(), artifact);
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        self.inner
            .read()
            .artifacts
            .get(key)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }
}
