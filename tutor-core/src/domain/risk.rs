//! Loss-streak and cooldown state machine.
//!
//! Transitions happen only when a trade closes:
//! - pnl > 0 resets the streak
//! - pnl <= 0 extends the streak
//! - reaching the trigger with cooldown enabled enters `Cooldown { until }`
//!   and resets the streak in the same transition
//!
//! A cooldown elapses once the bar date reaches `until`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cooldown parameters taken from the active strategy profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownPolicy {
    pub enabled: bool,
    pub loss_streak_trigger: u32,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskMode {
    Normal,
    Cooldown { until: NaiveDate },
}

/// What a trade close did to the risk state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTransition {
    StreakReset,
    StreakExtended(u32),
    CooldownEntered { until: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskState {
    loss_streak: u32,
    mode: RiskMode,
}

impl Default for RiskState {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskState {
    pub fn new() -> Self {
        Self {
            loss_streak: 0,
            mode: RiskMode::Normal,
        }
    }

    pub fn loss_streak(&self) -> u32 {
        self.loss_streak
    }

    pub fn mode(&self) -> RiskMode {
        self.mode
    }

    pub fn cooldown_until(&self) -> Option<NaiveDate> {
        match self.mode {
            RiskMode::Normal => None,
            RiskMode::Cooldown { until } => Some(until),
        }
    }

    /// True while `date` is strictly before the active cooldown end.
    pub fn is_in_cooldown(&self, date: NaiveDate) -> bool {
        matches!(self.mode, RiskMode::Cooldown { until } if date < until)
    }

    /// Leave cooldown once `date` has reached its end. Returns the elapsed end date.
    pub fn expire(&mut self, date: NaiveDate) -> Option<NaiveDate> {
        match self.mode {
            RiskMode::Cooldown { until } if date >= until => {
                self.mode = RiskMode::Normal;
                Some(until)
            }
            _ => None,
        }
    }

    /// Apply the outcome of a closed trade.
    pub fn record_close(
        &mut self,
        pnl: f64,
        exit_date: NaiveDate,
        policy: &CooldownPolicy,
    ) -> RiskTransition {
        if pnl > 0.0 {
            self.loss_streak = 0;
            return RiskTransition::StreakReset;
        }

        self.loss_streak += 1;
        if policy.enabled && self.loss_streak >= policy.loss_streak_trigger {
            let candidate = exit_date + Duration::days(policy.duration_days);
            let until = match self.mode {
                RiskMode::Cooldown { until: current } => current.max(candidate),
                RiskMode::Normal => candidate,
            };
            self.mode = RiskMode::Cooldown { until };
            self.loss_streak = 0;
            return RiskTransition::CooldownEntered { until };
        }
        RiskTransition::StreakExtended(self.loss_streak)
    }
}
