use ndarray::{Array1, Array2};

/// A caller-supplied estimator that can be fit and then predict class labels.
///
/// The trainer never persists estimator state beyond a single call; for
/// cross-validation every fold fits its own clone.
pub trait Classifier {
    /// Fit the model on rows of `x` with class labels `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i32>) -> anyhow::Result<()>;

    /// Predict one class label per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Array1<i32>>;

    /// Whether this estimator can produce probability scores.
    ///
    /// Queried once per evaluation; the default is [`Capability::NonScorable`].
    fn capability(&self) -> Capability<'_> {
        Capability::NonScorable
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Probability scoring for binary classifiers.
pub trait ProbabilityScorer {
    /// Probability of the positive (larger) class for every row of `x`.
    fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>>;
}

/// Result of the probability-scoring capability query.
#[derive(Clone, Copy)]
pub enum Capability<'a> {
    Scorable(&'a dyn ProbabilityScorer),
    NonScorable,
}

impl Capability<'_> {
    pub fn is_scorable(&self) -> bool {
        matches!(self, Capability::Scorable(_))
    }
}

impl std::fmt::Debug for Capability<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Scorable(_) => f.write_str("Scorable"),
            Capability::NonScorable => f.write_str("NonScorable"),
        }
    }
}
