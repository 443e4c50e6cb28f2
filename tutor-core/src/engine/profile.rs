//! Strategy profiles: the tunable parameters of one engine run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::CooldownPolicy;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("hold_days must be positive, got {0}")]
    NonPositiveHoldDays(i64),

    #[error("threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("volatility_limit must be a number, got {0}")]
    InvalidVolatilityLimit(f64),

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidSize { field: &'static str, value: f64 },

    #[error("loss_streak_trigger must be at least 1")]
    ZeroLossStreakTrigger,

    #[error("cooldown_duration_days must be positive, got {0}")]
    NonPositiveCooldownDuration(i64),

    #[error("initial capital must be finite and positive, got {0}")]
    InvalidCapital(f64),

    #[error("unknown strategy profile '{0}' (expected conservative, aggressive or ultra)")]
    UnknownProfile(String),
}

/// Entry, exit and risk-throttling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub name: String,
    /// Minimum bullish probability to enter.
    pub threshold: f64,
    /// Calendar days a position is held before it exits.
    pub hold_days: i64,
    /// Entries require `volatility_20d` strictly below this.
    pub volatility_limit: f64,
    pub cooldown_enabled: bool,
    pub normal_size: f64,
    pub cooldown_size: f64,
    pub loss_streak_trigger: u32,
    pub cooldown_duration_days: i64,
}

impl StrategyProfile {
    fn preset(
        name: &str,
        threshold: f64,
        hold_days: i64,
        volatility_limit: f64,
        cooldown: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            hold_days,
            volatility_limit,
            cooldown_enabled: cooldown,
            normal_size: 1.0,
            cooldown_size: 0.3,
            loss_streak_trigger: 3,
            cooldown_duration_days: 30,
        }
    }

    pub fn conservative() -> Self {
        Self::preset("conservative", 0.65, 5, 0.45, true)
    }

    pub fn aggressive() -> Self {
        Self::preset("aggressive", 0.52, 7, 0.65, true)
    }

    /// Low threshold, long holds, no volatility filter and no cooldown.
    pub fn ultra() -> Self {
        Self::preset("ultra", 0.48, 15, 1.0, false)
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::conservative(), Self::aggressive(), Self::ultra()]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_days <= 0 {
            return Err(ConfigError::NonPositiveHoldDays(self.hold_days));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        if self.volatility_limit.is_nan() {
            return Err(ConfigError::InvalidVolatilityLimit(self.volatility_limit));
        }
        for (field, value) in [
            ("normal_size", self.normal_size),
            ("cooldown_size", self.cooldown_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSize { field, value });
            }
        }
        if self.loss_streak_trigger == 0 {
            return Err(ConfigError::ZeroLossStreakTrigger);
        }
        if self.cooldown_duration_days <= 0 {
            return Err(ConfigError::NonPositiveCooldownDuration(
                self.cooldown_duration_days,
            ));
        }
        Ok(())
    }

    pub fn cooldown_policy(&self) -> CooldownPolicy {
        CooldownPolicy {
            enabled: self.cooldown_enabled,
            loss_streak_trigger: self.loss_streak_trigger,
            duration_days: self.cooldown_duration_days,
        }
    }
}

impl Default for StrategyProfile {
    fn default() -> Self {
        Self::conservative()
    }
}

impl FromStr for StrategyProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::conservative()),
            "aggressive" => Ok(Self::aggressive()),
            "ultra" | "ultra_aggressive" => Ok(Self::ultra()),
            _ => Err(ConfigError::UnknownProfile(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (threshold {:.2}, hold {}d, vol < {:.2}, cooldown {})",
            self.name,
            self.threshold,
            self.hold_days,
            self.volatility_limit,
            if self.cooldown_enabled { "on" } else { "off" }
        )
    }
}
