use super::feature_vector::FeatureVector;
use super::trade::Trade;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open long position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_probability: f64,
    pub feature_snapshot: FeatureVector,
    pub position_size: f64,
}

impl Position {
    /// Calendar days elapsed since entry.
    pub fn days_held(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }

    /// Consume the position into a closed trade.
    pub fn close(self, exit_date: NaiveDate, exit_price: f64) -> Trade {
        let pnl = exit_price / self.entry_price - 1.0;
        Trade {
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price,
            pnl,
            position_size: self.position_size,
            entry_probability: self.entry_probability,
            feature_snapshot: self.feature_snapshot,
        }
    }
}

/// Whether the engine is out of the market or holding one position.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PositionState {
    #[default]
    Flat,
    Holding(Position),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionState::Flat => None,
            PositionState::Holding(pos) => Some(pos),
        }
    }

    /// Take the open position out, leaving the state flat.
    pub fn take(&mut self) -> Option<Position> {
        match std::mem::take(self) {
            PositionState::Flat => None,
            PositionState::Holding(pos) => Some(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_vector::sample_features;

    fn position() -> Position {
        Position {
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            entry_price: 50.0,
            entry_probability: 0.66,
            feature_snapshot: sample_features(),
            position_size: 1.0,
        }
    }

    #[test]
    fn close_computes_fractional_pnl() {
        let trade = position().close(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), 45.0);
        assert!((trade.pnl - (-0.1)).abs() < 1e-12);
        assert_eq!(trade.entry_probability, 0.66);
        assert_eq!(trade.feature_snapshot, sample_features());
    }

    #[test]
    fn take_leaves_state_flat() {
        let mut state = PositionState::Holding(position());
        assert!(!state.is_flat());
        let pos = state.take();
        assert!(pos.is_some());
        assert!(state.is_flat());
        assert!(state.take().is_none());
    }

    #[test]
    fn days_held_counts_calendar_days() {
        let pos = position();
        assert_eq!(pos.days_held(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()), 5);
    }
}
