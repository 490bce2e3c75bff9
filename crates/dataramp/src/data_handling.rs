//! Shape checks and label helpers shared by the trainer and the metrics.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

/// Check that `x` and `y` form a usable, non-empty dataset.
pub fn check_xy(x: &Array2<f64>, y: &Array1<i32>, what: &str) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(Error::InvalidArguments(format!(
            "{} features must be a non-empty matrix, got shape {:?}",
            what,
            x.shape()
        )));
    }
    if x.nrows() != y.len() {
        return Err(Error::InvalidArguments(format!(
            "{} features have {} rows but {} labels were given",
            what,
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

/// Number of samples per class, ordered by label.
pub fn class_counts(y: &Array1<i32>) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Sorted distinct labels occurring in either array.
pub fn unique_labels(y_true: &Array1<i32>, y_pred: &Array1<i32>) -> Vec<i32> {
    let mut labels: Vec<i32> = y_true.iter().chain(y_pred.iter()).copied().collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Positive label of a binary target: the larger of its two classes.
pub fn binary_positive_label(y: &Array1<i32>) -> Result<i32> {
    let counts = class_counts(y);
    if counts.len() != 2 {
        return Err(Error::UndefinedMetric(format!(
            "binary metrics need exactly two classes, found {} ({:?})",
            counts.len(),
            counts.keys().collect::<Vec<_>>()
        )));
    }
    // BTreeMap keys are sorted, so the last one is the larger label
    Ok(*counts.keys().next_back().unwrap_or(&1))
}

pub fn log_input_data_summary(x: &Array2<f64>, y: &Array1<i32>, what: &str) {
    let summary = class_counts(y)
        .iter()
        .map(|(label, n)| format!("{}: {}", label, n))
        .collect::<Vec<_>>()
        .join(", ");
    log::debug!(
        "{} data: {} samples x {} features, class counts [{}]",
        what,
        x.nrows(),
        x.ncols(),
        summary
    );
}
