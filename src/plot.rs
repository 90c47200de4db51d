//! Diagnostic plot kinds, applicability rules, and rendering.
//!
//! Every plot kind is a member of one fixed enum, rendered independently
//! and independently fault-isolated: a kind that cannot be produced for
//! the current trial set (too few trials, wrong parameter types, wrong
//! objective arity) fails with [`Error::PlotRender`] and the recorder
//! skips it — one broken plot never aborts the rest.
//!
//! # Applicability
//!
//! | Kind | Needs |
//! |------|-------|
//! | [`OptimizationHistory`](PlotKind::OptimizationHistory) | scalar objective (or a target index) |
//! | [`ParamImportances`](PlotKind::ParamImportances) | scalar objective, ≥ 2 completed trials, a numeric parameter |
//! | [`ParallelCoordinate`](PlotKind::ParallelCoordinate) | ≥ 1 numeric parameter |
//! | [`Slice`](PlotKind::Slice) | ≥ 1 numeric parameter |
//! | [`Contour`](PlotKind::Contour) | ≥ 2 numeric parameters |
//! | [`Edf`](PlotKind::Edf) | scalar objective (or a target index) |
//! | [`IntermediateValues`](PlotKind::IntermediateValues) | ≥ 1 reported intermediate value |
//! | [`ParetoFront`](PlotKind::ParetoFront) | exactly 2 objectives |
//!
//! Every kind additionally needs at least one completed trial.
//!
//! The built-in [`HtmlRenderer`] produces small self-contained HTML/SVG
//! artifacts straight from the study's data series. Callers with a
//! heavier charting stack plug in their own [`PlotRenderer`].

use crate::error::{Error, Result};
use crate::importance::param_importance;
use crate::study::StudySummary;

/// The fixed set of diagnostic plots the recorder can attach to a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlotKind {
    /// Objective value per trial with the running best overlaid.
    OptimizationHistory,
    /// Absolute Spearman importance per numeric parameter.
    ParamImportances,
    /// One line per trial across normalized numeric parameter axes.
    ParallelCoordinate,
    /// Objective value against each numeric parameter.
    Slice,
    /// The first two numeric parameters against each other.
    Contour,
    /// Empirical distribution function of objective values.
    Edf,
    /// Intermediate-value curves (pruning curves) per trial.
    IntermediateValues,
    /// The objective-space scatter with the non-dominated front.
    ParetoFront,
}

impl PlotKind {
    /// All plot kinds, in upload order.
    pub const ALL: [Self; 8] = [
        Self::OptimizationHistory,
        Self::ParamImportances,
        Self::ParallelCoordinate,
        Self::Slice,
        Self::Contour,
        Self::Edf,
        Self::IntermediateValues,
        Self::ParetoFront,
    ];

    /// The key name this plot is uploaded under (below `visualizations/`).
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::OptimizationHistory => "plot_optimization_history",
            Self::ParamImportances => "plot_param_importances",
            Self::ParallelCoordinate => "plot_parallel_coordinate",
            Self::Slice => "plot_slice",
            Self::Contour => "plot_contour",
            Self::Edf => "plot_edf",
            Self::IntermediateValues => "plot_intermediate_values",
            Self::ParetoFront => "plot_pareto_front",
        }
    }

    /// Whether this kind assumes a single scalar objective.
    #[must_use]
    pub fn needs_scalar_objective(self) -> bool {
        matches!(
            self,
            Self::OptimizationHistory | Self::ParamImportances | Self::Edf
        )
    }
}

impl core::fmt::Display for PlotKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

fn render_error(kind: PlotKind, reason: impl Into<String>) -> Error {
    Error::PlotRender {
        plot: kind.key(),
        reason: reason.into(),
    }
}

/// Names of numeric parameters observed across completed trials, sorted.
fn numeric_params(study: &StudySummary) -> Vec<String> {
    let mut names: Vec<String> = study
        .completed_trials()
        .flat_map(|t| {
            t.params
                .iter()
                .filter(|(_, v)| v.as_f64().is_some())
                .map(|(k, _)| k.clone())
        })
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Checks whether `kind` can be produced for `study` and resolves the
/// objective index scalar plots should read.
///
/// # Errors
///
/// [`Error::PlotRender`] describing the unmet requirement.
pub fn check_applicable(
    kind: PlotKind,
    study: &StudySummary,
    target_objective: Option<usize>,
) -> Result<usize> {
    if study.completed_trials().next().is_none() {
        return Err(render_error(kind, "no completed trials"));
    }

    let objective_index = if kind.needs_scalar_objective() {
        match (study.is_multi_objective(), target_objective) {
            (false, _) => 0,
            (true, Some(i)) if i < study.directions.len() => i,
            (true, Some(i)) => {
                return Err(render_error(
                    kind,
                    format!(
                        "target objective {i} out of range for {} objectives",
                        study.directions.len()
                    ),
                ));
            }
            (true, None) => {
                return Err(render_error(
                    kind,
                    "study is multi-objective and no target objective is set",
                ));
            }
        }
    } else {
        0
    };

    match kind {
        PlotKind::ParamImportances
            if study.completed_trials().count() < 2 || numeric_params(study).is_empty() =>
        {
            return Err(render_error(
                kind,
                "requires two completed trials and a numeric parameter",
            ));
        }
        PlotKind::ParetoFront if study.directions.len() != 2 => {
            return Err(render_error(kind, "requires exactly two objectives"));
        }
        PlotKind::IntermediateValues
            if study.trials.iter().all(|t| t.intermediate_values.is_empty()) =>
        {
            return Err(render_error(kind, "no trial reported intermediate values"));
        }
        PlotKind::Contour if numeric_params(study).len() < 2 => {
            return Err(render_error(kind, "requires two numeric parameters"));
        }
        PlotKind::Slice | PlotKind::ParallelCoordinate if numeric_params(study).is_empty() => {
            return Err(render_error(kind, "requires a numeric parameter"));
        }
        _ => {}
    }

    Ok(objective_index)
}

/// The "render study to visual artifact" seam.
///
/// Implementations may assume [`check_applicable`] passed for the given
/// kind; they may still fail for their own reasons, and any such failure
/// is suppressed by the recorder.
pub trait PlotRenderer: Send + Sync {
    /// Renders one plot kind into artifact bytes.
    ///
    /// # Errors
    ///
    /// [`Error::PlotRender`] when the artifact cannot be produced.
    fn render(
        &self,
        study: &StudySummary,
        kind: PlotKind,
        objective_index: usize,
    ) -> Result<Vec<u8>>;
}

const SVG_W: f64 = 640.0;
const SVG_H: f64 = 400.0;
const MARGIN: f64 = 40.0;

/// Maps data coordinates into the SVG viewport.
struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Viewport {
    fn fit(points: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut vp = Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for (x, y) in points {
            vp.x_min = vp.x_min.min(x);
            vp.x_max = vp.x_max.max(x);
            vp.y_min = vp.y_min.min(y);
            vp.y_max = vp.y_max.max(y);
        }
        // Degenerate ranges (single point, constant series) still render.
        if vp.x_min >= vp.x_max {
            vp.x_max = vp.x_min + 1.0;
        }
        if vp.y_min >= vp.y_max {
            vp.y_max = vp.y_min + 1.0;
        }
        vp
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN + (x - self.x_min) / (self.x_max - self.x_min) * (SVG_W - 2.0 * MARGIN)
    }

    fn py(&self, y: f64) -> f64 {
        // SVG y grows downward.
        SVG_H - MARGIN - (y - self.y_min) / (self.y_max - self.y_min) * (SVG_H - 2.0 * MARGIN)
    }
}

fn svg_document(title: &str, body: &str) -> Vec<u8> {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body><h3>{title}</h3>\n\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SVG_W}\" height=\"{SVG_H}\" \
         viewBox=\"0 0 {SVG_W} {SVG_H}\">\n\
         <rect width=\"{SVG_W}\" height=\"{SVG_H}\" fill=\"white\" stroke=\"#ccc\"/>\n\
         {body}\n</svg></body></html>\n"
    )
    .into_bytes()
}

fn polyline(vp: &Viewport, points: &[(f64, f64)], color: &str) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|&(x, y)| format!("{:.1},{:.1}", vp.px(x), vp.py(y)))
        .collect();
    format!(
        "<polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"1.5\" points=\"{}\"/>",
        coords.join(" ")
    )
}

fn scatter(vp: &Viewport, points: &[(f64, f64)], color: &str) -> String {
    points
        .iter()
        .map(|&(x, y)| {
            format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{color}\"/>",
                vp.px(x),
                vp.py(y)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The built-in renderer: small self-contained HTML/SVG artifacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    #[allow(clippy::cast_precision_loss)]
    fn optimization_history(study: &StudySummary, objective_index: usize) -> Vec<u8> {
        let points: Vec<(f64, f64)> = study
            .completed_trials()
            .filter_map(|t| {
                t.values
                    .get(objective_index)
                    .map(|&v| (t.number as f64, v))
            })
            .collect();
        let direction = study.directions.get(objective_index).copied();
        let mut running = Vec::with_capacity(points.len());
        let mut best = f64::NAN;
        for &(x, y) in &points {
            if best.is_nan() || direction.is_some_and(|d| d.improves(y, best)) {
                best = y;
            }
            running.push((x, best));
        }
        let vp = Viewport::fit(points.iter().copied());
        let body = format!(
            "{}\n{}",
            scatter(&vp, &points, "#1f77b4"),
            polyline(&vp, &running, "#d62728")
        );
        svg_document("Optimization History", &body)
    }

    #[allow(clippy::cast_precision_loss)]
    fn param_importances(study: &StudySummary, objective_index: usize) -> Result<Vec<u8>> {
        let scores = param_importance(study, objective_index).map_err(|e| Error::PlotRender {
            plot: PlotKind::ParamImportances.key(),
            reason: e.to_string(),
        })?;
        let n = scores.len() as f64;
        let bar_h = (SVG_H - 2.0 * MARGIN) / n;
        let body = scores
            .iter()
            .enumerate()
            .map(|(i, (name, score))| {
                let y = MARGIN + i as f64 * bar_h;
                let w = score * (SVG_W - 2.0 * MARGIN);
                format!(
                    "<rect x=\"{MARGIN}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{:.1}\" \
                     fill=\"#1f77b4\"/>\n\
                     <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{name}: {score:.3}</text>",
                    bar_h * 0.8,
                    MARGIN + 4.0,
                    y + bar_h * 0.5,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(svg_document("Parameter Importances", &body))
    }

    #[allow(clippy::cast_precision_loss)]
    fn parallel_coordinate(study: &StudySummary) -> Vec<u8> {
        let names = numeric_params(study);
        let axes = names.len();
        let vp = Viewport {
            x_min: 0.0,
            x_max: (axes.max(2) - 1) as f64,
            y_min: 0.0,
            y_max: 1.0,
        };

        // Per-axis min/max for normalization.
        let bounds: Vec<(f64, f64)> = names
            .iter()
            .map(|name| {
                let vals: Vec<f64> = study
                    .completed_trials()
                    .filter_map(|t| t.params.get(name).and_then(crate::ParamValue::as_f64))
                    .collect();
                let lo = vals.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if lo >= hi { (lo, lo + 1.0) } else { (lo, hi) }
            })
            .collect();

        let mut body = String::new();
        for trial in study.completed_trials() {
            #[allow(clippy::cast_precision_loss)]
            let line: Vec<(f64, f64)> = names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    let v = trial.params.get(name).and_then(crate::ParamValue::as_f64)?;
                    let (lo, hi) = bounds[i];
                    Some((i as f64, (v - lo) / (hi - lo)))
                })
                .collect();
            if line.len() == axes {
                body.push_str(&polyline(&vp, &line, "#1f77b477"));
                body.push('\n');
            }
        }
        svg_document("Parallel Coordinate", &body)
    }

    fn slice(study: &StudySummary, objective_index: usize) -> Vec<u8> {
        let names = numeric_params(study);
        let colors = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];
        let mut body = String::new();
        for (i, name) in names.iter().enumerate() {
            let points: Vec<(f64, f64)> = study
                .completed_trials()
                .filter_map(|t| {
                    let x = t.params.get(name).and_then(crate::ParamValue::as_f64)?;
                    let y = t.values.get(objective_index)?;
                    Some((x, *y))
                })
                .collect();
            if points.is_empty() {
                continue;
            }
            let vp = Viewport::fit(points.iter().copied());
            body.push_str(&scatter(&vp, &points, colors[i % colors.len()]));
            body.push('\n');
        }
        svg_document("Slice Plot", &body)
    }

    fn contour(study: &StudySummary) -> Result<Vec<u8>> {
        let names = numeric_params(study);
        let [x_name, y_name, ..] = names.as_slice() else {
            return Err(render_error(
                PlotKind::Contour,
                "requires two numeric parameters",
            ));
        };
        let points: Vec<(f64, f64)> = study
            .completed_trials()
            .filter_map(|t| {
                let x = t.params.get(x_name).and_then(crate::ParamValue::as_f64)?;
                let y = t.params.get(y_name).and_then(crate::ParamValue::as_f64)?;
                Some((x, y))
            })
            .collect();
        let vp = Viewport::fit(points.iter().copied());
        let body = scatter(&vp, &points, "#1f77b4");
        Ok(svg_document(&format!("Contour: {x_name} vs {y_name}"), &body))
    }

    #[allow(clippy::cast_precision_loss)]
    fn edf(study: &StudySummary, objective_index: usize) -> Vec<u8> {
        let mut values: Vec<f64> = study
            .completed_trials()
            .filter_map(|t| t.values.get(objective_index).copied())
            .collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
        let n = values.len() as f64;
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, (i + 1) as f64 / n))
            .collect();
        let vp = Viewport::fit(points.iter().copied());
        let body = polyline(&vp, &points, "#1f77b4");
        svg_document("Empirical Distribution Function", &body)
    }

    #[allow(clippy::cast_precision_loss)]
    fn intermediate_values(study: &StudySummary) -> Vec<u8> {
        let all: Vec<(f64, f64)> = study
            .trials
            .iter()
            .flat_map(|t| {
                t.intermediate_values
                    .iter()
                    .map(|&(step, v)| (step as f64, v))
            })
            .collect();
        let vp = Viewport::fit(all.iter().copied());
        let colors = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];
        let body = study
            .trials
            .iter()
            .filter(|t| !t.intermediate_values.is_empty())
            .enumerate()
            .map(|(i, t)| {
                let curve: Vec<(f64, f64)> = t
                    .intermediate_values
                    .iter()
                    .map(|&(step, v)| (step as f64, v))
                    .collect();
                polyline(&vp, &curve, colors[i % colors.len()])
            })
            .collect::<Vec<_>>()
            .join("\n");
        svg_document("Intermediate Values", &body)
    }

    fn pareto_front(study: &StudySummary) -> Vec<u8> {
        let all: Vec<(f64, f64)> = study
            .completed_trials()
            .filter(|t| t.values.len() == 2)
            .map(|t| (t.values[0], t.values[1]))
            .collect();
        let front: Vec<(f64, f64)> = study
            .best_trials()
            .iter()
            .filter(|t| t.values.len() == 2)
            .map(|t| (t.values[0], t.values[1]))
            .collect();
        let vp = Viewport::fit(all.iter().copied());
        let body = format!(
            "{}\n{}",
            scatter(&vp, &all, "#1f77b4"),
            scatter(&vp, &front, "#d62728")
        );
        svg_document("Pareto Front", &body)
    }
}

impl PlotRenderer for HtmlRenderer {
    fn render(
        &self,
        study: &StudySummary,
        kind: PlotKind,
        objective_index: usize,
    ) -> Result<Vec<u8>> {
        let artifact = match kind {
            PlotKind::OptimizationHistory => Self::optimization_history(study, objective_index),
            PlotKind::ParamImportances => Self::param_importances(study, objective_index)?,
            PlotKind::ParallelCoordinate => Self::parallel_coordinate(study),
            PlotKind::Slice => Self::slice(study, objective_index),
            PlotKind::Contour => Self::contour(study)?,
            PlotKind::Edf => Self::edf(study, objective_index),
            PlotKind::IntermediateValues => Self::intermediate_values(study),
            PlotKind::ParetoFront => Self::pareto_front(study),
        };
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::TrialRecord;
    use crate::types::Direction;

    fn single_study(n: u64) -> StudySummary {
        let mut study = StudySummary::new("s", vec![Direction::Minimize]);
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64;
            study.push_trial(TrialRecord::complete(i, [("x", x.into())], vec![x * x]));
        }
        study
    }

    #[test]
    fn empty_study_rejects_everything() {
        let study = StudySummary::new("s", vec![Direction::Minimize]);
        for kind in PlotKind::ALL {
            assert!(check_applicable(kind, &study, None).is_err(), "{kind}");
        }
    }

    #[test]
    fn multi_objective_blocks_scalar_plots() {
        let mut study =
            StudySummary::new("s", vec![Direction::Minimize, Direction::Minimize]);
        study.push_trial(TrialRecord::complete(0, [("x", 1.0.into())], vec![1.0, 2.0]));

        assert!(check_applicable(PlotKind::OptimizationHistory, &study, None).is_err());
        assert!(check_applicable(PlotKind::Edf, &study, None).is_err());
        // Narrowing to one objective unblocks them.
        assert_eq!(
            check_applicable(PlotKind::OptimizationHistory, &study, Some(1)).unwrap(),
            1
        );
        // Out-of-range narrowing is rejected.
        assert!(check_applicable(PlotKind::OptimizationHistory, &study, Some(2)).is_err());
    }

    #[test]
    fn pareto_front_needs_two_objectives() {
        let study = single_study(3);
        assert!(check_applicable(PlotKind::ParetoFront, &study, None).is_err());
    }

    #[test]
    fn intermediate_values_need_reports() {
        let study = single_study(3);
        assert!(check_applicable(PlotKind::IntermediateValues, &study, None).is_err());

        let mut with_curve = single_study(2);
        with_curve.push_trial(
            TrialRecord::complete(2, [("x", 0.5.into())], vec![0.25])
                .intermediate_values(vec![(0, 1.0), (1, 0.5)]),
        );
        assert!(check_applicable(PlotKind::IntermediateValues, &with_curve, None).is_ok());
    }

    #[test]
    fn contour_needs_two_numeric_params() {
        let study = single_study(3);
        assert!(check_applicable(PlotKind::Contour, &study, None).is_err());
        assert!(check_applicable(PlotKind::Slice, &study, None).is_ok());
    }

    #[test]
    fn contour_render_errors_without_two_params() {
        // Even bypassing the applicability check, rendering fails cleanly.
        let study = single_study(3);
        let err = HtmlRenderer
            .render(&study, PlotKind::Contour, 0)
            .unwrap_err();
        assert!(matches!(err, Error::PlotRender { .. }));
    }

    #[test]
    fn importances_need_two_trials_and_a_numeric_param() {
        let study = single_study(1);
        assert!(check_applicable(PlotKind::ParamImportances, &study, None).is_err());
        assert!(check_applicable(PlotKind::ParamImportances, &single_study(2), None).is_ok());

        let mut cats = StudySummary::new("s", vec![Direction::Minimize]);
        cats.push_trial(TrialRecord::complete(0, [("opt", "adam".into())], vec![1.0]));
        cats.push_trial(TrialRecord::complete(1, [("opt", "sgd".into())], vec![2.0]));
        assert!(check_applicable(PlotKind::ParamImportances, &cats, None).is_err());
    }

    #[test]
    fn renderer_produces_html() {
        let study = single_study(5);
        let renderer = HtmlRenderer;
        for kind in [
            PlotKind::OptimizationHistory,
            PlotKind::ParamImportances,
            PlotKind::Slice,
            PlotKind::Edf,
            PlotKind::ParallelCoordinate,
        ] {
            let bytes = renderer.render(&study, kind, 0).unwrap();
            let html = String::from_utf8(bytes).unwrap();
            assert!(html.contains("<svg"), "{kind} is not an SVG document");
        }
    }

    #[test]
    fn importances_render_fails_on_categorical_only() {
        let mut study = StudySummary::new("s", vec![Direction::Minimize]);
        study.push_trial(TrialRecord::complete(0, [("opt", "adam".into())], vec![1.0]));
        study.push_trial(TrialRecord::complete(1, [("opt", "sgd".into())], vec![2.0]));
        let err = HtmlRenderer
            .render(&study, PlotKind::ParamImportances, 0)
            .unwrap_err();
        assert!(matches!(err, Error::PlotRender { .. }));
    }
}
