//! Train a caller-supplied classifier and collect its evaluation metrics.
use std::path::PathBuf;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::cross_validation::{
    cross_validate, CrossValidationSummary, CvMetric, MeanStd, StratifiedKFold, DEFAULT_FOLDS,
};
use crate::data_handling::{check_xy, log_input_data_summary};
use crate::error::{Error, Result};
use crate::metrics::{classification_report, confusion_matrix, ClassificationReport, ConfusionMatrix};
use crate::models::Classifier;
use crate::report::plots::{select_backend, PlotEmitter, RenderMode};

/// Options of [`train_classifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Cross-validate on the training set instead of scoring a validation split.
    pub cross_validate: bool,
    /// Number of folds when cross-validating.
    pub cv: usize,
    /// Shuffle within classes before building folds.
    pub shuffle_seed: Option<u64>,
    /// Render mode override; the process-wide backend is used when unset.
    pub render_mode: Option<RenderMode>,
    /// HTML destination of the ROC plot.
    pub plot_output: Option<PathBuf>,
    /// Open the ROC plot in a viewer (interactive mode only).
    #[serde(default)]
    pub show_plot: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            cross_validate: false,
            cv: DEFAULT_FOLDS,
            shuffle_seed: None,
            render_mode: None,
            plot_output: None,
            show_plot: false,
        }
    }
}

impl TrainOptions {
    pub fn cross_validated(mut self, cv: usize) -> Self {
        self.cross_validate = true;
        self.cv = cv;
        self
    }

    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = Some(mode);
        self
    }

    pub fn with_plot_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.plot_output = Some(path.into());
        self
    }

    pub fn with_show_plot(mut self, show: bool) -> Self {
        self.show_plot = show;
        self
    }

    fn splitter(&self) -> StratifiedKFold {
        let splitter = StratifiedKFold::new(self.cv);
        match self.shuffle_seed {
            Some(seed) => splitter.with_shuffle(seed),
            None => splitter,
        }
    }
}

/// Metrics of a single train/validation split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitMetrics {
    pub classification_report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
    /// Present only for estimators that score probabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roc_auc: Option<f64>,
}

/// Result of [`train_classifier`]: either a cross-validation summary or the
/// metrics of a single split, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricsResult {
    CrossValidated(CrossValidationSummary),
    SingleSplit(SplitMetrics),
}

impl MetricsResult {
    pub fn cross_validation(&self) -> Option<&CrossValidationSummary> {
        match self {
            MetricsResult::CrossValidated(summary) => Some(summary),
            MetricsResult::SingleSplit(_) => None,
        }
    }

    pub fn split(&self) -> Option<&SplitMetrics> {
        match self {
            MetricsResult::SingleSplit(metrics) => Some(metrics),
            MetricsResult::CrossValidated(_) => None,
        }
    }

    pub fn cv_score(&self, metric: CvMetric) -> Option<&MeanStd> {
        self.cross_validation()?.get(metric)
    }

    pub fn roc_auc(&self) -> Option<f64> {
        self.split()?.roc_auc
    }

    /// Keys of the populated metrics, as they appear when serialized.
    pub fn metric_names(&self) -> Vec<&'static str> {
        match self {
            MetricsResult::CrossValidated(summary) => {
                summary.iter().map(|(metric, _)| metric.name()).collect()
            }
            MetricsResult::SingleSplit(metrics) => {
                let mut names = vec!["classification_report", "confusion_matrix"];
                if metrics.roc_auc.is_some() {
                    names.push("roc_auc");
                }
                names
            }
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Train `estimator` and compute its evaluation metrics.
///
/// With `options.cross_validate` the estimator is cross-validated on the
/// training set (each fold fits a clone; `estimator` itself is not fitted)
/// and only the mean/std summary is returned. Otherwise `estimator` is fit
/// on the training set, scored on the validation set (classification report
/// and confusion matrix) and, when it scores probabilities, its ROC curve is
/// plotted and the AUC added.
///
/// Validation features and labels must be given together; a single split
/// requires them. Violations fail with [`Error::InvalidArguments`] before
/// anything is fitted.
pub fn train_classifier<E>(
    x_train: &Array2<f64>,
    y_train: &Array1<i32>,
    estimator: &mut E,
    x_val: Option<&Array2<f64>>,
    y_val: Option<&Array1<i32>>,
    options: &TrainOptions,
) -> Result<MetricsResult>
where
    E: Classifier + Clone,
{
    check_xy(x_train, y_train, "training")?;
    let validation = match (x_val, y_val) {
        (Some(x), Some(y)) => {
            check_xy(x, y, "validation")?;
            if x.ncols() != x_train.ncols() {
                return Err(Error::InvalidArguments(format!(
                    "validation features have {} columns, training features have {}",
                    x.ncols(),
                    x_train.ncols()
                )));
            }
            Some((x, y))
        }
        (None, None) => None,
        (Some(_), None) => {
            return Err(Error::InvalidArguments(
                "validation features were given without validation labels".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(Error::InvalidArguments(
                "validation labels were given without validation features".to_string(),
            ))
        }
    };
    if validation.is_none() && !options.cross_validate {
        return Err(Error::InvalidArguments(
            "a validation set is required unless cross-validating".to_string(),
        ));
    }

    let render_mode = options.render_mode.unwrap_or_else(select_backend);
    log_input_data_summary(x_train, y_train, "Training");

    if options.cross_validate {
        if validation.is_some() {
            log::debug!("Cross-validating on the training set, the validation set is not used");
        }
        let summary = cross_validate(&*estimator, x_train, y_train, &options.splitter())?;
        for (metric, score) in summary.iter() {
            log::info!("{}: {:.4} +/- {:.4}", metric, score.mean, score.std);
        }
        return Ok(MetricsResult::CrossValidated(summary));
    }

    // Checked above: single-split mode always has a validation pair
    let (x_val, y_val) = validation.ok_or_else(|| {
        Error::InvalidArguments("a validation set is required unless cross-validating".to_string())
    })?;
    log_input_data_summary(x_val, y_val, "Validation");

    estimator
        .fit(x_train, y_train)
        .map_err(|e| Error::estimator(estimator.name(), e))?;
    let y_pred = estimator
        .predict(x_val)
        .map_err(|e| Error::estimator(estimator.name(), e))?;
    if y_pred.len() != y_val.len() {
        return Err(Error::Estimator {
            name: estimator.name().to_string(),
            message: format!(
                "predict returned {} labels for {} samples",
                y_pred.len(),
                y_val.len()
            ),
        });
    }

    let classification_report = classification_report(y_val, &y_pred)?;
    let confusion_matrix = confusion_matrix(y_val, &y_pred)?;
    log::info!("Classification report:\n{}", classification_report);
    log::info!("Confusion Matrix:\n{}", confusion_matrix);

    let mut emitter = PlotEmitter::new(render_mode).with_show(options.show_plot);
    if let Some(path) = &options.plot_output {
        emitter = emitter.with_output(path);
    }
    let roc_auc = emitter.maybe_plot(&*estimator, x_val, y_val)?;
    if let Some(roc_auc) = roc_auc {
        log::info!("ROC AUC: {:.4}", roc_auc);
    }

    Ok(MetricsResult::SingleSplit(SplitMetrics {
        classification_report,
        confusion_matrix,
        roc_auc,
    }))
}
