//! L2-regularized logistic regression on standardized features.
//!
//! Batch gradient descent on the mean log-loss. The penalty is `||w||² / (2·C·n)`
//! per sample, so `C` has the usual inverse-regularization meaning.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scaler::StandardScaler;
use super::{OracleError, SignalOracle};
use crate::domain::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::features::FeatureRow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Stop once the log-loss improves by less than this.
    pub tolerance: f64,
    /// Inverse regularization strength.
    pub c: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            tolerance: 1e-8,
            c: 1.0,
        }
    }
}

/// Fitted trend classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticOracle {
    scaler: StandardScaler,
    weights: Array1<f64>,
    intercept: f64,
    iterations: usize,
    final_loss: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn log_loss(targets: &Array1<f64>, probs: &Array1<f64>) -> f64 {
    let eps = 1e-15;
    -targets
        .iter()
        .zip(probs.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / targets.len() as f64
}

/// One row per feature vector, columns in `FEATURE_COLUMNS` order.
fn design_matrix(features: &[FeatureVector]) -> Array2<f64> {
    let mut x = Array2::zeros((features.len(), FEATURE_COUNT));
    for (mut row, f) in x.rows_mut().into_iter().zip(features) {
        row.assign(&ArrayView1::from(&f.values()));
    }
    x
}

impl LogisticOracle {
    /// Fit on training features and `target_trend` labels.
    pub fn fit(
        features: &[FeatureVector],
        targets: &[bool],
        config: &LogisticConfig,
    ) -> Result<Self, OracleError> {
        if features.is_empty() {
            return Err(OracleError::EmptyTrainingSet);
        }
        if features.len() != targets.len() {
            return Err(OracleError::DimensionMismatch {
                expected: features.len(),
                got: targets.len(),
            });
        }
        if let Some(row) = features.iter().position(|f| !f.is_finite()) {
            return Err(OracleError::NonFiniteInput { row });
        }
        if targets.iter().all(|t| *t) || targets.iter().all(|t| !*t) {
            return Err(OracleError::SingleClass);
        }

        let raw = design_matrix(features);
        let scaler = StandardScaler::fit(&raw);
        let x = scaler.transform(&raw);
        let y: Array1<f64> = targets.iter().map(|t| if *t { 1.0 } else { 0.0 }).collect();
        let n = x.nrows() as f64;
        let alpha = 1.0 / (config.c * n);

        let mut weights = Array1::<f64>::zeros(FEATURE_COUNT);
        let mut intercept = 0.0;
        let mut previous_loss = f64::INFINITY;
        let mut loss = f64::INFINITY;
        let mut iterations = 0;

        for iter in 0..config.max_iter {
            let probs = (x.dot(&weights) + intercept).mapv(sigmoid);
            loss = log_loss(&y, &probs) + alpha * 0.5 * weights.dot(&weights);
            iterations = iter + 1;
            if (previous_loss - loss).abs() < config.tolerance {
                debug!(iterations, loss, "logistic fit converged");
                break;
            }
            previous_loss = loss;

            let errors = &probs - &y;
            let grad_w = x.t().dot(&errors) / n + &weights * alpha;
            let grad_b = errors.sum() / n;
            weights.scaled_add(-config.learning_rate, &grad_w);
            intercept -= config.learning_rate * grad_b;
        }

        Ok(Self {
            scaler,
            weights,
            intercept,
            iterations,
            final_loss: loss,
        })
    }

    /// Fit on dataset rows using their trend labels.
    pub fn fit_rows(rows: &[FeatureRow], config: &LogisticConfig) -> Result<Self, OracleError> {
        let features: Vec<FeatureVector> = rows.iter().map(|r| r.features).collect();
        let targets: Vec<bool> = rows.iter().map(|r| r.labels.target_trend).collect();
        Self::fit(&features, &targets, config)
    }

    pub fn probability(&self, features: &FeatureVector) -> f64 {
        let values = features.values();
        let x = self.scaler.transform_row(ArrayView1::from(&values));
        sigmoid(x.dot(&self.weights) + self.intercept)
    }

    /// Coefficients on standardized features, in column order.
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        FEATURE_COLUMNS
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .collect()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn final_loss(&self) -> f64 {
        self.final_loss
    }
}

impl SignalOracle for LogisticOracle {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, OracleError> {
        if let Some(row) = features.iter().position(|f| !f.is_finite()) {
            return Err(OracleError::NonFiniteInput { row });
        }
        let x = self.scaler.transform(&design_matrix(features));
        Ok((x.dot(&self.weights) + self.intercept)
            .mapv(sigmoid)
            .to_vec())
    }
}
