//! Per-column standardization fitted on training rows.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::FEATURE_COUNT;

/// `(x - mean) / std` per column, population std. Constant columns keep scale 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit on the rows of `x`. An empty matrix gives the identity transform.
    pub fn fit(x: &Array2<f64>) -> Self {
        let Some(mean) = x.mean_axis(Axis(0)) else {
            return Self {
                mean: Array1::zeros(FEATURE_COUNT),
                scale: Array1::ones(FEATURE_COUNT),
            };
        };
        let std = x.std_axis(Axis(0), 0.0);
        let scale = ndarray::Zip::from(&std)
            .and(&mean)
            .map_collect(|&s, &m| if s > f64::EPSILON * m.abs().max(1.0) { s } else { 1.0 });

        Self { mean, scale }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.scale
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        (&row - &self.mean) / &self.scale
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Array2<f64> {
        let mut x = Array2::from_elem((2, FEATURE_COUNT), 5.0);
        x[[0, 0]] = 1.0;
        x[[1, 0]] = 3.0;
        x
    }

    #[test]
    fn standardizes_to_zero_mean_unit_std() {
        let x = rows();
        let scaler = StandardScaler::fit(&x);
        assert_eq!(scaler.mean()[0], 2.0);
        assert_eq!(scaler.scale()[0], 1.0);
        let z = scaler.transform(&x);
        assert_eq!(z[[0, 0]], -1.0);
        assert_eq!(z[[1, 0]], 1.0);
        assert_eq!(scaler.transform_row(x.row(1))[0], 1.0);
    }

    #[test]
    fn constant_column_keeps_unit_scale() {
        let x = rows();
        let scaler = StandardScaler::fit(&x);
        assert_eq!(scaler.scale()[1], 1.0);
        assert_eq!(scaler.transform(&x)[[0, 1]], 0.0);
    }

    #[test]
    fn empty_fit_is_identity() {
        let scaler = StandardScaler::fit(&Array2::zeros((0, FEATURE_COUNT)));
        let row = Array1::from_elem(FEATURE_COUNT, 2.5);
        assert_eq!(scaler.transform_row(row.view()), row);
    }
}
