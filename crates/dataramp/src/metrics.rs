//! Classification metrics: per-class report, confusion matrix, binary
//! scores and the ROC curve.
//!
//! Ratios whose denominator is zero because of the *predictions* (for
//! example, no sample predicted positive) are reported as `0.0` with a
//! warning. A ROC curve over a single class is undefined and fails.
use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::data_handling::unique_labels;
use crate::error::{Error, Result};

fn check_lengths<T, U>(y_true: &Array1<T>, y_pred: &Array1<U>) -> Result<()> {
    if y_true.is_empty() {
        return Err(Error::InvalidArguments(
            "cannot score an empty label array".to_string(),
        ));
    }
    if y_true.len() != y_pred.len() {
        return Err(Error::InvalidArguments(format!(
            "label arrays differ in length: {} vs {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    Ok(())
}

fn ratio(numerator: usize, denominator: usize, metric: &str) -> f64 {
    if denominator == 0 {
        log::warn!("{} is ill-defined and being set to 0.0", metric);
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

pub fn accuracy_score(y_true: &Array1<i32>, y_pred: &Array1<i32>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// (true positives, false positives, false negatives) for `pos_label`.
fn binary_counts(y_true: &Array1<i32>, y_pred: &Array1<i32>, pos_label: i32) -> (usize, usize, usize) {
    let mut counts = (0, 0, 0);
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        match (t == pos_label, p == pos_label) {
            (true, true) => counts.0 += 1,
            (false, true) => counts.1 += 1,
            (true, false) => counts.2 += 1,
            (false, false) => {}
        }
    }
    counts
}

pub fn precision_score(y_true: &Array1<i32>, y_pred: &Array1<i32>, pos_label: i32) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let (tp, fp, _) = binary_counts(y_true, y_pred, pos_label);
    Ok(ratio(tp, tp + fp, "precision"))
}

pub fn recall_score(y_true: &Array1<i32>, y_pred: &Array1<i32>, pos_label: i32) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let (tp, _, fn_) = binary_counts(y_true, y_pred, pos_label);
    Ok(ratio(tp, tp + fn_, "recall"))
}

pub fn f1_score(y_true: &Array1<i32>, y_pred: &Array1<i32>, pos_label: i32) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let (tp, fp, fn_) = binary_counts(y_true, y_pred, pos_label);
    Ok(ratio(2 * tp, 2 * tp + fp + fn_, "f1-score"))
}

/// Count grid with rows indexed by true label and columns by predicted label.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<i32>,
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    /// Count of samples with true label `actual` predicted as `predicted`.
    pub fn get(&self, actual: i32, predicted: i32) -> Option<usize> {
        let row = self.labels.binary_search(&actual).ok()?;
        let col = self.labels.binary_search(&predicted).ok()?;
        Some(self.counts[(row, col)])
    }

    /// Total number of samples, i.e. the length of the scored label arrays.
    pub fn total(&self) -> usize {
        self.counts.sum()
    }
}

pub fn confusion_matrix(y_true: &Array1<i32>, y_pred: &Array1<i32>) -> Result<ConfusionMatrix> {
    check_lengths(y_true, y_pred)?;
    let labels = unique_labels(y_true, y_pred);
    let mut counts = Array2::<usize>::zeros((labels.len(), labels.len()));

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        // Both labels come from `labels`, so the lookups always succeed
        if let (Ok(row), Ok(col)) = (labels.binary_search(t), labels.binary_search(p)) {
            counts[(row, col)] += 1;
        }
    }

    Ok(ConfusionMatrix { labels, counts })
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);
        for (i, row) in self.counts.rows().into_iter().enumerate() {
            let cells = row
                .iter()
                .map(|c| format!("{:>width$}", c, width = width))
                .collect::<Vec<_>>()
                .join(" ");
            let open = if i == 0 { "[[" } else { " [" };
            let close = if i + 1 == self.labels.len() { "]]" } else { "]\n" };
            write!(f, "{}{}{}", open, cells, close)?;
        }
        Ok(())
    }
}

impl Serialize for ConfusionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let rows: Vec<Vec<usize>> = self.counts.rows().into_iter().map(|r| r.to_vec()).collect();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("labels", &self.labels)?;
        map.serialize_entry("counts", &rows)?;
        map.end()
    }
}

/// Precision, recall, F1 and support of one class (or of an average).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class scores plus accuracy and macro/weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: BTreeMap<i32, ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let total = cm.total();
        let mut classes = BTreeMap::new();

        for (i, &label) in cm.labels.iter().enumerate() {
            let tp = cm.counts[(i, i)];
            let predicted = cm.counts.column(i).sum();
            let support = cm.counts.row(i).sum();
            let precision = ratio(tp, predicted, &format!("precision of label {}", label));
            let recall = ratio(tp, support, &format!("recall of label {}", label));
            classes.insert(
                label,
                ClassScores {
                    precision,
                    recall,
                    f1_score: harmonic_mean(precision, recall),
                    support,
                },
            );
        }

        let correct: usize = (0..cm.labels.len()).map(|i| cm.counts[(i, i)]).sum();
        let n_classes = classes.len().max(1) as f64;
        let average = |weight: &dyn Fn(&ClassScores) -> f64, norm: f64| {
            let mut acc = (0.0, 0.0, 0.0);
            for s in classes.values() {
                let w = weight(s);
                acc.0 += w * s.precision;
                acc.1 += w * s.recall;
                acc.2 += w * s.f1_score;
            }
            ClassScores {
                precision: acc.0 / norm,
                recall: acc.1 / norm,
                f1_score: acc.2 / norm,
                support: total,
            }
        };

        let macro_avg = average(&|_| 1.0, n_classes);
        let weighted_avg = average(&|s| s.support as f64, total.max(1) as f64);

        ClassificationReport {
            accuracy: ratio(correct, total, "accuracy"),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: i32) -> Option<&ClassScores> {
        self.classes.get(&label)
    }

    pub fn total_support(&self) -> usize {
        self.classes.values().map(|s| s.support).sum()
    }
}

pub fn classification_report(y_true: &Array1<i32>, y_pred: &Array1<i32>) -> Result<ClassificationReport> {
    Ok(ClassificationReport::from_confusion(&confusion_matrix(y_true, y_pred)?))
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const AVG_NAME: &str = "weighted avg";
        let width = self
            .classes
            .keys()
            .map(|l| l.to_string().len())
            .chain(std::iter::once(AVG_NAME.len()))
            .max()
            .unwrap_or(AVG_NAME.len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n",
            "", "precision", "recall", "f1-score", "support",
            width = width
        )?;
        for (label, scores) in &self.classes {
            write_row(f, &label.to_string(), scores, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support(),
            width = width
        )?;
        write_row(f, "macro avg", &self.macro_avg, width)?;
        write_row(f, AVG_NAME, &self.weighted_avg, width)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, s.precision, s.recall, s.f1_score, s.support,
        width = width
    )
}

impl Serialize for ClassificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len() + 3))?;
        for (label, scores) in &self.classes {
            map.serialize_entry(&label.to_string(), scores)?;
        }
        map.serialize_entry("accuracy", &self.accuracy)?;
        map.serialize_entry("macro avg", &self.macro_avg)?;
        map.serialize_entry("weighted avg", &self.weighted_avg)?;
        map.end()
    }
}

/// Receiver operating characteristic curve, one point per distinct score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Decreasing score thresholds; the first one is `+inf`.
    pub thresholds: Vec<f64>,
}

pub fn roc_curve(y_true: &Array1<i32>, scores: &Array1<f64>, pos_label: i32) -> Result<RocCurve> {
    check_lengths(y_true, scores)?;
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(Error::InvalidArguments(
            "probability scores must be finite".to_string(),
        ));
    }

    let positives = y_true.iter().filter(|&&l| l == pos_label).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(Error::UndefinedMetric(
            "only one class present in y_true, ROC AUC score is not defined".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut curve = RocCurve {
        fpr: vec![0.0],
        tpr: vec![0.0],
        thresholds: vec![f64::INFINITY],
    };
    let (mut tps, mut fps) = (0usize, 0usize);
    for (rank, &idx) in order.iter().enumerate() {
        if y_true[idx] == pos_label {
            tps += 1;
        } else {
            fps += 1;
        }
        let last_of_threshold = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if last_of_threshold {
            curve.fpr.push(fps as f64 / negatives as f64);
            curve.tpr.push(tps as f64 / positives as f64);
            curve.thresholds.push(scores[idx]);
        }
    }

    Ok(curve)
}

/// Area under a curve by the trapezoidal rule; `x` must be monotonic.
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

pub fn roc_auc_score(y_true: &Array1<i32>, scores: &Array1<f64>, pos_label: i32) -> Result<f64> {
    let curve = roc_curve(y_true, scores, pos_label)?;
    Ok(auc(&curve.fpr, &curve.tpr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn confusion_matrix_counts_and_total() {
        let y_true = array![0, 0, 0, 1, 1];
        let y_pred = array![0, 0, 1, 1, 1];
        let cm = confusion_matrix(&y_true, &y_pred).unwrap();

        assert_eq!(cm.labels(), &[0, 1]);
        assert_eq!(cm.counts(), &array![[2usize, 1], [0, 2]]);
        assert_eq!(cm.get(0, 1), Some(1));
        assert_eq!(cm.get(5, 1), None);
        assert_eq!(cm.total(), 5);
        assert_eq!(cm.to_string(), "[[2 1]\n [0 2]]");
    }

    #[test]
    fn confusion_matrix_includes_labels_only_predicted() {
        let cm = confusion_matrix(&array![1, 1], &array![1, 2]).unwrap();
        assert_eq!(cm.labels(), &[1, 2]);
        assert_eq!(cm.total(), 2);
    }

    #[test]
    fn report_matches_hand_computed_scores() {
        let report = classification_report(&array![0, 0, 0, 1, 1], &array![0, 0, 1, 1, 1]).unwrap();

        let c0 = report.class(0).unwrap();
        assert!(approx(c0.precision, 1.0));
        assert!(approx(c0.recall, 2.0 / 3.0));
        assert!(approx(c0.f1_score, 0.8));
        assert_eq!(c0.support, 3);

        let c1 = report.class(1).unwrap();
        assert!(approx(c1.precision, 2.0 / 3.0));
        assert!(approx(c1.recall, 1.0));

        assert!(approx(report.accuracy, 0.8));
        assert!(approx(report.macro_avg.precision, (1.0 + 2.0 / 3.0) / 2.0));
        assert!(approx(report.weighted_avg.recall, 0.8));
        assert_eq!(report.total_support(), 5);

        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
    }

    #[test]
    fn report_serializes_with_familiar_keys() {
        let report = classification_report(&array![0, 1], &array![0, 1]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["1"]["f1-score"], 1.0);
        assert_eq!(json["macro avg"]["support"], 2);
        assert_eq!(json["accuracy"], 1.0);
    }

    #[test]
    fn binary_scores_and_zero_division() {
        let y_true = array![1, 1, 0, 0];
        let y_pred = array![1, 0, 1, 0];
        assert!(approx(accuracy_score(&y_true, &y_pred).unwrap(), 0.5));
        assert!(approx(precision_score(&y_true, &y_pred, 1).unwrap(), 0.5));
        assert!(approx(recall_score(&y_true, &y_pred, 1).unwrap(), 0.5));
        assert!(approx(f1_score(&y_true, &y_pred, 1).unwrap(), 0.5));

        // nothing predicted positive
        assert_eq!(precision_score(&y_true, &array![0, 0, 0, 0], 1).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_invalid() {
        let err = accuracy_score(&array![1, 0], &array![1]).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn roc_curve_and_auc_reference_values() {
        let y = array![0, 0, 1, 1];
        let scores = array![0.1, 0.4, 0.35, 0.8];
        let curve = roc_curve(&y, &scores, 1).unwrap();

        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert!(curve.thresholds[0].is_infinite());
        assert!(approx(roc_auc_score(&y, &scores, 1).unwrap(), 0.75));
    }

    #[test]
    fn roc_ties_collapse_into_one_point() {
        let curve = roc_curve(&array![0, 1, 1], &array![0.5, 0.5, 0.9], 1).unwrap();
        assert_eq!(curve.fpr.len(), 3);
        assert!(approx(auc(&curve.fpr, &curve.tpr), 0.75));
    }

    #[test]
    fn roc_over_single_class_is_undefined() {
        let err = roc_auc_score(&array![1, 1], &array![0.2, 0.9], 1).unwrap_err();
        assert!(matches!(err, Error::UndefinedMetric(_)));
    }
}
