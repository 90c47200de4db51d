//! Finalized parameter values and their distribution descriptors.
//!
//! [`ParamValue`] is the type-erased representation of a parameter
//! assignment as delivered by the optimizer once a trial is finalized.
//! The adapter never samples — it only records what the optimizer chose.
//!
//! [`Distribution`] describes the search space a value was drawn from
//! (range plus sampling kind) and is recorded alongside the value so a
//! run can be inspected without the original search-space definition.

/// A type-erased finalized parameter value.
///
/// # Display
///
/// `ParamValue` implements [`Display`](core::fmt::Display): numeric and
/// boolean values print their literal form, strings print unquoted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParamValue {
    /// A floating-point parameter value.
    Float(f64),
    /// An integer parameter value.
    Int(i64),
    /// A boolean parameter value.
    Bool(bool),
    /// A categorical choice, stored by its label.
    Str(String),
}

impl ParamValue {
    /// Returns the value as `f64` if it is numeric (`Float` or `Int`).
    ///
    /// Booleans and categorical labels return `None` — they have no
    /// meaningful rank for correlation-style analyses.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

/// The search-space descriptor a parameter value was sampled from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Distribution {
    /// A continuous range, optionally sampled on a log scale.
    Float {
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (inclusive).
        high: f64,
        /// Whether sampling happened in log space.
        log_scale: bool,
    },
    /// An integer range, optionally sampled on a log scale.
    Int {
        /// Lower bound (inclusive).
        low: i64,
        /// Upper bound (inclusive).
        high: i64,
        /// Whether sampling happened in log space.
        log_scale: bool,
    },
    /// An unordered choice among `n_choices` labels.
    Categorical {
        /// Number of choices in the category set.
        n_choices: usize,
    },
    /// A two-valued choice.
    Bool,
}

impl Distribution {
    /// Returns `true` for distributions whose values have a numeric rank
    /// ([`Float`](Self::Float) and [`Int`](Self::Int)).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float { .. } | Self::Int { .. })
    }
}

impl core::fmt::Display for Distribution {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float {
                low,
                high,
                log_scale,
            } => {
                if *log_scale {
                    write!(f, "FloatDistribution(low={low}, high={high}, log=true)")
                } else {
                    write!(f, "FloatDistribution(low={low}, high={high})")
                }
            }
            Self::Int {
                low,
                high,
                log_scale,
            } => {
                if *log_scale {
                    write!(f, "IntDistribution(low={low}, high={high}, log=true)")
                } else {
                    write!(f, "IntDistribution(low={low}, high={high})")
                }
            }
            Self::Categorical { n_choices } => {
                write!(f, "CategoricalDistribution(n_choices={n_choices})")
            }
            Self::Bool => write!(f, "BoolDistribution"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_rank() {
        assert_eq!(ParamValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(ParamValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(ParamValue::Bool(true).as_f64(), None);
        assert_eq!(ParamValue::from("adam").as_f64(), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(ParamValue::Float(0.25).to_string(), "0.25");
        assert_eq!(ParamValue::from("sgd").to_string(), "sgd");
        let d = Distribution::Int {
            low: 1,
            high: 128,
            log_scale: true,
        };
        assert_eq!(d.to_string(), "IntDistribution(low=1, high=128, log=true)");
    }

    #[test]
    fn numeric_distributions() {
        assert!(
            Distribution::Int {
                low: 1,
                high: 8,
                log_scale: false
            }
            .is_numeric()
        );
        assert!(!Distribution::Bool.is_numeric());
        assert!(!Distribution::Categorical { n_choices: 3 }.is_numeric());
    }
}
