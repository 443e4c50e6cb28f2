//! SignalOracle: bullish probability per feature row.
//!
//! The engine only sees this trait. Fitted oracles are plain values owned by
//! the caller and passed into each engine by reference.

pub mod evaluation;
pub mod logistic;
pub mod scaler;

use thiserror::Error;

use crate::domain::FeatureVector;

pub use evaluation::{accuracy, roc_auc, ModelEvaluation};
pub use logistic::{LogisticConfig, LogisticOracle};
pub use scaler::StandardScaler;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training targets contain a single class")]
    SingleClass,

    #[error("dimension mismatch: expected {expected} rows, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("non-finite feature value in row {row}")]
    NonFiniteInput { row: usize },
}

/// Source of bullish probabilities.
pub trait SignalOracle: Send + Sync {
    fn name(&self) -> &str;

    /// One probability in [0, 1] per input row, in input order.
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, OracleError>;
}

/// Replays a precomputed probability sequence, whatever the input.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedOracle {
    probabilities: Vec<f64>,
}

impl FixedOracle {
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }
}

impl SignalOracle for FixedOracle {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _features: &[FeatureVector]) -> Result<Vec<f64>, OracleError> {
        Ok(self.probabilities.clone())
    }
}

/// Same probability for every row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantOracle(pub f64);

impl SignalOracle for ConstantOracle {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, OracleError> {
        Ok(vec![self.0; features.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_vector::sample_features;

    #[test]
    fn constant_oracle_matches_row_count() {
        let rows = vec![sample_features(); 4];
        assert_eq!(ConstantOracle(0.7).predict(&rows).unwrap(), vec![0.7; 4]);
    }

    #[test]
    fn fixed_oracle_replays_sequence() {
        let oracle = FixedOracle::new(vec![0.1, 0.9]);
        assert_eq!(oracle.predict(&[]).unwrap(), vec![0.1, 0.9]);
    }
}
