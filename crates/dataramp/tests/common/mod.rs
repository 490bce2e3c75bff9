//! Small estimators and datasets shared by the integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use dataramp::models::{Capability, Classifier, ProbabilityScorer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Binary nearest-centroid classifier that also scores probabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestCentroid {
    /// (label, centroid), sorted by label; empty until fitted.
    centroids: Vec<(i32, Vec<f64>)>,
}

impl NearestCentroid {
    pub fn is_fitted(&self) -> bool {
        !self.centroids.is_empty()
    }

    fn distances(&self, row: &[f64]) -> Vec<f64> {
        self.centroids
            .iter()
            .map(|(_, c)| {
                c.iter()
                    .zip(row)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }
}

impl Classifier for NearestCentroid {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i32>) -> Result<()> {
        let mut labels: Vec<i32> = y.to_vec();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != 2 {
            return Err(anyhow!("expected two classes, got {:?}", labels));
        }

        self.centroids = labels
            .into_iter()
            .map(|label| {
                let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == label).collect();
                let centroid = x
                    .select(Axis(0), &rows)
                    .mean_axis(Axis(0))
                    .map(|m| m.to_vec())
                    .unwrap_or_default();
                (label, centroid)
            })
            .collect();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>> {
        if !self.is_fitted() {
            return Err(anyhow!("model is not fitted"));
        }
        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                let d = self.distances(&row.to_vec());
                if d[1] < d[0] {
                    self.centroids[1].0
                } else {
                    self.centroids[0].0
                }
            })
            .collect())
    }

    fn capability(&self) -> Capability<'_> {
        Capability::Scorable(self)
    }

    fn name(&self) -> &str {
        "nearest_centroid"
    }
}

impl ProbabilityScorer for NearestCentroid {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted() {
            return Err(anyhow!("model is not fitted"));
        }
        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                let d = self.distances(&row.to_vec());
                let total = d[0] + d[1];
                if total == 0.0 {
                    0.5
                } else {
                    d[0] / total
                }
            })
            .collect())
    }
}

/// Predicts the most frequent training label; no probability scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorityClass {
    label: Option<i32>,
}

impl Classifier for MajorityClass {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i32>) -> Result<()> {
        let counts = dataramp::data_handling::class_counts(y);
        self.label = counts
            .into_iter()
            .max_by_key(|&(label, n)| (n, std::cmp::Reverse(label)))
            .map(|(label, _)| label);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>> {
        let label = self.label.ok_or_else(|| anyhow!("model is not fitted"))?;
        Ok(Array1::from_elem(x.nrows(), label))
    }

    fn name(&self) -> &str {
        "majority_class"
    }
}

/// Two well separated blobs; even rows are class 0, odd rows class 1.
pub fn two_blobs(n: usize) -> (Array2<f64>, Array1<i32>) {
    let mut data = Vec::with_capacity(n * 2);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let label = (i % 2) as i32;
        let offset = label as f64 * 5.0;
        let jitter_a = ((i * 37) % 11) as f64 / 10.0;
        let jitter_b = ((i * 53) % 7) as f64 / 10.0;
        data.push(offset + jitter_a);
        data.push(offset + jitter_b);
        labels.push(label);
    }
    (
        Array2::from_shape_vec((n, 2), data).expect("shape matches data"),
        Array1::from_vec(labels),
    )
}
