use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Capital after processing one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub capital: f64,
}

/// Extract the capital column of an equity curve.
pub fn capital_values(curve: &[EquityPoint]) -> Vec<f64> {
    curve.iter().map(|p| p.capital).collect()
}
