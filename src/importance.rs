//! Parameter importance via Spearman rank correlation.
//!
//! Computes the absolute Spearman rank correlation between each numeric
//! parameter and the objective value to estimate which parameters most
//! influence the outcome. A lightweight, non-parametric measure that
//! works well for monotonic relationships; it backs the
//! [`ParamImportances`](crate::plot::PlotKind::ParamImportances) plot.
//!
//! Categorical and boolean parameters have no rank and are skipped. A
//! study whose search space is categorical-only therefore cannot produce
//! an importance ranking at all — that surfaces as an error here and is
//! suppressed (not fatal) by the plot pipeline.

use crate::error::{Error, Result};
use crate::study::StudySummary;

/// Assign average ranks to a slice of `f64` values (handles ties).
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub(crate) fn rank(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(core::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        // Find the run of tied values.
        let mut j = i + 1;
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        // Average rank for the tie group (1-based ranks).
        let avg = (i + 1..=j).sum::<usize>() as f64 / (j - i) as f64;
        for item in &indexed[i..j] {
            ranks[item.0] = avg;
        }
        i = j;
    }
    ranks
}

/// Pearson correlation coefficient on two equal-length slices.
#[allow(clippy::cast_precision_loss)]
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 { 0.0 } else { cov / denom }
}

/// Spearman rank correlation (Pearson on ranks).
pub(crate) fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&rank(x), &rank(y))
}

/// Absolute Spearman importance of each numeric parameter against the
/// objective at `objective_index`, sorted descending.
///
/// Only trials that are COMPLETE, carry the parameter, and have a value
/// at `objective_index` enter each parameter's correlation.
///
/// # Errors
///
/// [`Error::Importance`] if fewer than two completed trials exist or if
/// no numeric parameter appears in at least two of them.
pub fn param_importance(
    study: &StudySummary,
    objective_index: usize,
) -> Result<Vec<(String, f64)>> {
    if study.completed_trials().count() < 2 {
        return Err(Error::Importance("fewer than two completed trials"));
    }

    let mut names: Vec<String> = study
        .completed_trials()
        .flat_map(|t| t.params.keys().cloned())
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut scores: Vec<(String, f64)> = Vec::new();
    for name in names {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for trial in study.completed_trials() {
            if let (Some(x), Some(&y)) = (
                trial.params.get(&name).and_then(crate::ParamValue::as_f64),
                trial.values.get(objective_index),
            ) {
                xs.push(x);
                ys.push(y);
            }
        }
        if xs.len() >= 2 {
            scores.push((name, spearman(&xs, &ys).abs()));
        }
    }

    if scores.is_empty() {
        return Err(Error::Importance(
            "no numeric parameter observed in two or more completed trials",
        ));
    }

    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(core::cmp::Ordering::Equal));
    Ok(scores)
}
