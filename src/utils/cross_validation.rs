//! Walk-forward cross-validation and model selection.
//!
//! The splitter carves the tail of a series into `K` equal test blocks, each
//! trained on everything before it. The selector fits a fresh model per fold
//! and keeps the one with the lowest out-of-sample RMSE.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::metrics::rmse;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info, warn};

/// One expanding-window train/test split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Position of the fold in split order (0-based).
    pub index: usize,
    /// Training positions, always starting at 0.
    pub train: Range<usize>,
    /// Test positions, starting where training ends.
    pub test: Range<usize>,
}

/// Produce `n_splits` expanding-window folds over a series of length `n`.
///
/// The test block size is `n / (n_splits + 1)`; fold `i` tests
/// `[n - (K - i) * t, n - (K - i - 1) * t)` and trains on every earlier
/// position. Leftover positions at the start always go to training.
///
/// # Example
/// ```
/// use demand_forecast::utils::cross_validation::walk_forward_splits;
///
/// let folds = walk_forward_splits(12, 3).unwrap();
/// assert_eq!(folds[0].train, 0..3);
/// assert_eq!(folds[0].test, 3..6);
/// assert_eq!(folds[2].test, 9..12);
/// ```
pub fn walk_forward_splits(n: usize, n_splits: usize) -> Result<Vec<Fold>> {
    if n_splits < 1 {
        return Err(ForecastError::InvalidParameter(
            "number of splits must be at least 1".into(),
        ));
    }
    if n_splits >= n {
        return Err(ForecastError::InvalidParameter(format!(
            "number of splits ({n_splits}) must be smaller than the number of samples ({n})"
        )));
    }

    let test_size = n / (n_splits + 1);
    let folds = (0..n_splits)
        .map(|i| {
            let start = n - (n_splits - i) * test_size;
            Fold {
                index: i,
                train: 0..start,
                test: start..start + test_size,
            }
        })
        .collect();
    Ok(folds)
}

/// Best model found by walk-forward validation.
#[derive(Debug, Clone)]
pub struct Selection<F> {
    /// The model fitted on the winning fold's training window.
    pub model: F,
    /// The winning fold.
    pub fold: Fold,
    /// Actual values of the winning test window.
    pub y_test: Vec<f64>,
    /// Forecasts for the winning test window.
    pub predictions: Vec<f64>,
    /// RMSE of the winning fold.
    pub score: f64,
    /// RMSE of every fold, in fold order.
    pub fold_scores: Vec<f64>,
}

struct FoldOutcome<F> {
    model: F,
    fold: Fold,
    y_test: Vec<f64>,
    predictions: Vec<f64>,
    score: f64,
}

fn run_fold<F, Factory>(series: &TimeSeries, fold: &Fold, factory: &Factory) -> Result<FoldOutcome<F>>
where
    F: Forecaster,
    Factory: Fn() -> F,
{
    let train = series.slice(fold.train.start, fold.train.end)?;
    let y_test = series.primary_values()[fold.test.clone()].to_vec();

    let mut model = factory();
    model.fit(&train)?;
    let predictions = model.predict(y_test.len())?.into_values();
    let score = rmse(&y_test, &predictions)?;

    debug!(
        fold = fold.index,
        train_len = fold.train.len(),
        test_len = fold.test.len(),
        rmse = score,
        model = model.name(),
        "fold evaluated"
    );

    Ok(FoldOutcome {
        model,
        fold: fold.clone(),
        y_test,
        predictions,
        score,
    })
}

/// Keep the first strictly lower finite score; NaN never wins.
fn better<F>(best: Option<FoldOutcome<F>>, candidate: FoldOutcome<F>) -> Option<FoldOutcome<F>> {
    if candidate.score.is_nan() {
        return best;
    }
    match best {
        Some(current)
            if current.score < candidate.score
                || (current.score == candidate.score && current.fold.index < candidate.fold.index) =>
        {
            Some(current)
        }
        _ => Some(candidate),
    }
}

fn finish<F>(best: Option<FoldOutcome<F>>, fold_scores: Vec<f64>) -> Result<Selection<F>> {
    let best = best.ok_or_else(|| {
        ForecastError::ComputationError("no fold produced a finite RMSE".into())
    })?;
    info!(
        fold = best.fold.index,
        rmse = best.score,
        folds = fold_scores.len(),
        "model selection complete"
    );
    Ok(Selection {
        model: best.model,
        fold: best.fold,
        y_test: best.y_test,
        predictions: best.predictions,
        score: best.score,
        fold_scores,
    })
}

/// Select the best model by walk-forward validation.
///
/// For each fold a fresh model from `model_factory` is fitted on the training
/// window and forecasts the test window. The fold with the strictly lowest
/// RMSE wins; ties keep the earliest fold. Fit and predict errors propagate.
pub fn select_best<F, Factory>(
    series: &TimeSeries,
    n_splits: usize,
    model_factory: Factory,
) -> Result<Selection<F>>
where
    F: Forecaster,
    Factory: Fn() -> F,
{
    let folds = walk_forward_splits(series.len(), n_splits)?;
    let mut best = None;
    let mut fold_scores = Vec::with_capacity(folds.len());

    for fold in &folds {
        let outcome = run_fold(series, fold, &model_factory)?;
        if outcome.score.is_nan() {
            warn!(fold = fold.index, "fold produced a NaN RMSE");
        }
        fold_scores.push(outcome.score);
        best = better(best, outcome);
    }

    finish(best, fold_scores)
}

/// Parallel variant of [`select_best`] evaluating folds on the rayon pool.
///
/// The reduction is keyed on `(score, fold index)`, so the result is the
/// same as the sequential selector.
pub fn select_best_parallel<F, Factory>(
    series: &TimeSeries,
    n_splits: usize,
    model_factory: Factory,
) -> Result<Selection<F>>
where
    F: Forecaster + Send,
    Factory: Fn() -> F + Sync,
{
    let folds = walk_forward_splits(series.len(), n_splits)?;
    let outcomes: Vec<FoldOutcome<F>> = folds
        .par_iter()
        .map(|fold| run_fold(series, fold, &model_factory))
        .collect::<Result<_>>()?;

    let fold_scores = outcomes.iter().map(|o| o.score).collect();
    let best = outcomes.into_iter().fold(None, better);
    finish(best, fold_scores)
}
