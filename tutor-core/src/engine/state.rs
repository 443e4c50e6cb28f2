//! Mutable simulation state and the published run result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    CooldownPolicy, EquityPoint, Position, PositionState, RiskState, RiskTransition, Trade,
};

/// Everything one run mutates. Built fresh for every run and never shared.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub capital: f64,
    pub position: PositionState,
    pub risk: RiskState,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub cooldown_activations: usize,
}

impl EngineState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            capital: initial_capital,
            position: PositionState::Flat,
            risk: RiskState::new(),
            equity_curve: Vec::new(),
            trades: Vec::new(),
            cooldown_activations: 0,
        }
    }

    /// Close the open position at `price`, book the pnl into capital and the risk state.
    ///
    /// Returns `None` when flat.
    pub fn close_position(
        &mut self,
        date: NaiveDate,
        price: f64,
        policy: &CooldownPolicy,
    ) -> Option<RiskTransition> {
        let trade = self.position.take()?.close(date, price);
        self.capital *= trade.capital_factor();

        let transition = self.risk.record_close(trade.pnl, date, policy);
        debug!(
            entry = %trade.entry_date,
            exit = %date,
            pnl = trade.pnl,
            size = trade.position_size,
            capital = self.capital,
            "trade closed"
        );
        if let RiskTransition::CooldownEntered { until } = transition {
            self.cooldown_activations += 1;
            debug!(%until, "loss streak triggered cooldown");
        }

        self.trades.push(trade);
        Some(transition)
    }

    pub fn open_position(&mut self, position: Position) {
        debug!(
            date = %position.entry_date,
            price = position.entry_price,
            probability = position.entry_probability,
            size = position.position_size,
            "position opened"
        );
        self.position = PositionState::Holding(position);
    }

    pub fn mark(&mut self, date: NaiveDate) {
        self.equity_curve.push(EquityPoint {
            date,
            capital: self.capital,
        });
    }

    pub fn into_result(self) -> SimulationResult {
        SimulationResult {
            final_capital: self.capital,
            equity_curve: self.equity_curve,
            trades: self.trades,
            open_position: self.position.position().cloned(),
            final_risk: self.risk,
            cooldown_activations: self.cooldown_activations,
        }
    }
}

/// Outputs of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// One point per input bar.
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub final_capital: f64,
    /// Still held after the last bar; not booked into capital.
    pub open_position: Option<Position>,
    pub final_risk: RiskState,
    pub cooldown_activations: usize,
}
