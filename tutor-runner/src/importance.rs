//! Feature importance from the logistic oracle's coefficients.
//!
//! Coefficients are on standardized inputs, so their magnitudes compare
//! across features.

use serde::{Deserialize, Serialize};

use tutor_core::oracle::LogisticOracle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub coefficient: f64,
    pub abs_importance: f64,
}

/// Coefficients sorted by absolute value, largest first. Ties keep column order.
pub fn feature_importance(oracle: &LogisticOracle) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = oracle
        .coefficients()
        .into_iter()
        .map(|(name, coefficient)| FeatureImportance {
            feature: name.to_string(),
            coefficient,
            abs_importance: coefficient.abs(),
        })
        .collect();
    ranked.sort_by(|a, b| b.abs_importance.total_cmp(&a.abs_importance));
    ranked
}

pub fn importance_table(ranked: &[FeatureImportance]) -> String {
    let mut out = format!(
        "{:<24} {:>12} {:>12}\n",
        "Feature", "Coefficient", "|Coef|"
    );
    for row in ranked {
        out.push_str(&format!(
            "{:<24} {:>12.4} {:>12.4}\n",
            row.feature, row.coefficient, row.abs_importance
        ));
    }
    out
}
