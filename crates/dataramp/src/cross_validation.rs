//! Stratified k-fold cross-validation over the training set.
use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data_handling::{binary_positive_label, class_counts};
use crate::error::{Error, Result};
use crate::metrics::{accuracy_score, f1_score, precision_score, recall_score};
use crate::models::Classifier;

pub const DEFAULT_FOLDS: usize = 5;

/// A single train/test split of sample indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub fold_idx: usize,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// K-fold splitter that keeps each class spread evenly over the folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    /// Shuffle samples within each class before assignment when set.
    pub shuffle_seed: Option<u64>,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self::new(DEFAULT_FOLDS)
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle_seed: None,
        }
    }

    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Split the indices of `y` into `n_splits` folds.
    ///
    /// Samples of every class are dealt round-robin over the folds, so a
    /// class with fewer members than folds is missing from some folds.
    pub fn split(&self, y: &Array1<i32>) -> Result<Vec<Fold>> {
        let n_samples = y.len();
        if self.n_splits < 2 {
            return Err(Error::InvalidArguments(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.n_splits
            )));
        }
        if n_samples < self.n_splits {
            return Err(Error::InvalidArguments(format!(
                "cannot split {} samples into {} folds",
                n_samples, self.n_splits
            )));
        }

        let mut per_class: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, &label) in y.iter().enumerate() {
            per_class.entry(label).or_default().push(idx);
        }

        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            for indices in per_class.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        let mut test_folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        let mut next_fold = 0;
        for indices in per_class.values() {
            for &idx in indices {
                test_folds[next_fold].push(idx);
                next_fold = (next_fold + 1) % self.n_splits;
            }
        }

        let folds = test_folds
            .iter()
            .enumerate()
            .map(|(fold_idx, test)| {
                let mut test_indices = test.clone();
                test_indices.sort_unstable();
                let train_indices = test_folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect::<Vec<_>>();
                let mut train_indices = train_indices;
                train_indices.sort_unstable();
                Fold {
                    fold_idx,
                    train_indices,
                    test_indices,
                }
            })
            .collect();

        Ok(folds)
    }
}

/// Metrics summarised by cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CvMetric {
    Accuracy,
    #[serde(rename = "F1-score")]
    F1Score,
    Precision,
    Recall,
}

impl CvMetric {
    pub const ALL: [CvMetric; 4] = [
        CvMetric::Accuracy,
        CvMetric::F1Score,
        CvMetric::Precision,
        CvMetric::Recall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CvMetric::Accuracy => "Accuracy",
            CvMetric::F1Score => "F1-score",
            CvMetric::Precision => "Precision",
            CvMetric::Recall => "Recall",
        }
    }

    fn score(&self, y_true: &Array1<i32>, y_pred: &Array1<i32>, pos_label: i32) -> Result<f64> {
        match self {
            CvMetric::Accuracy => accuracy_score(y_true, y_pred),
            CvMetric::F1Score => f1_score(y_true, y_pred, pos_label),
            CvMetric::Precision => precision_score(y_true, y_pred, pos_label),
            CvMetric::Recall => recall_score(y_true, y_pred, pos_label),
        }
    }

    fn needs_both_classes(&self) -> bool {
        !matches!(self, CvMetric::Accuracy)
    }
}

impl fmt::Display for CvMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mean and population standard deviation of per-fold scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self { mean: 0.0, std: 0.0 };
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std: var.sqrt(),
        }
    }
}

/// Cross-validated mean/std for every [`CvMetric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrossValidationSummary {
    scores: BTreeMap<CvMetric, MeanStd>,
}

impl CrossValidationSummary {
    pub fn get(&self, metric: CvMetric) -> Option<&MeanStd> {
        self.scores.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CvMetric, &MeanStd)> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Cross-validate `estimator` on the training set only.
///
/// Each fold fits a fresh clone of `estimator`; the estimator passed in is
/// left untouched. A fold whose held-out labels lack one of the two classes
/// makes Precision, Recall and F1 undefined and the error is returned.
pub fn cross_validate<E>(
    estimator: &E,
    x: &Array2<f64>,
    y: &Array1<i32>,
    splitter: &StratifiedKFold,
) -> Result<CrossValidationSummary>
where
    E: Classifier + Clone,
{
    let pos_label = binary_positive_label(y)?;
    let folds = splitter.split(y)?;

    let mut per_metric: BTreeMap<CvMetric, Vec<f64>> = BTreeMap::new();
    for fold in &folds {
        let x_train = x.select(Axis(0), &fold.train_indices);
        let y_train = y.select(Axis(0), &fold.train_indices);
        let x_test = x.select(Axis(0), &fold.test_indices);
        let y_test = y.select(Axis(0), &fold.test_indices);

        let mut model = estimator.clone();
        model
            .fit(&x_train, &y_train)
            .map_err(|e| Error::estimator(estimator.name(), e))?;
        let y_pred = model
            .predict(&x_test)
            .map_err(|e| Error::estimator(estimator.name(), e))?;

        let fold_classes = class_counts(&y_test);
        for metric in CvMetric::ALL {
            if metric.needs_both_classes() && fold_classes.len() < 2 {
                return Err(Error::UndefinedMetric(format!(
                    "{} is undefined on fold {}: held-out labels contain a single class {:?}",
                    metric,
                    fold.fold_idx,
                    fold_classes.keys().collect::<Vec<_>>()
                )));
            }
            let score = metric.score(&y_test, &y_pred, pos_label)?;
            log::debug!("fold {} {}: {:.4}", fold.fold_idx, metric, score);
            per_metric.entry(metric).or_default().push(score);
        }
    }

    let scores = per_metric
        .into_iter()
        .map(|(metric, fold_scores)| (metric, MeanStd::from_scores(&fold_scores)))
        .collect();
    Ok(CrossValidationSummary { scores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn folds_partition_all_indices() {
        let y = Array1::from_vec((0..23).map(|i| (i % 3 == 0) as i32).collect());
        let folds = StratifiedKFold::new(5).split(&y).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test_indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train_indices.len() + fold.test_indices.len(), 23);
            assert!(fold.test_indices.iter().all(|i| !fold.train_indices.contains(i)));
        }
    }

    #[test]
    fn folds_are_stratified() {
        let y = Array1::from_vec((0..20).map(|i| (i < 10) as i32).collect());
        for fold in StratifiedKFold::new(5).split(&y).unwrap() {
            let test = y.select(Axis(0), &fold.test_indices);
            assert_eq!(test.iter().filter(|&&l| l == 1).count(), 2);
            assert_eq!(test.iter().filter(|&&l| l == 0).count(), 2);
        }
    }

    #[test]
    fn shuffled_split_is_reproducible() {
        let y = Array1::from_vec((0..30).map(|i| i % 2).collect());
        let a = StratifiedKFold::new(3).with_shuffle(7).split(&y).unwrap();
        let b = StratifiedKFold::new(3).with_shuffle(7).split(&y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_fold_counts() {
        let y = array![0, 1, 0, 1];
        assert!(matches!(
            StratifiedKFold::new(1).split(&y),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            StratifiedKFold::new(5).split(&y),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn mean_std_is_population_std() {
        let ms = MeanStd::from_scores(&[1.0, 0.5, 0.75, 0.75]);
        assert!((ms.mean - 0.75).abs() < 1e-12);
        assert!((ms.std - (0.03125f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn metric_names_match_result_keys() {
        let names: Vec<_> = CvMetric::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["Accuracy", "F1-score", "Precision", "Recall"]);
        assert_eq!(serde_json::to_string(&CvMetric::F1Score).unwrap(), "\"F1-score\"");
    }
}
