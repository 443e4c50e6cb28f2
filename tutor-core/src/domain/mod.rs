//! Domain types for the simulation.

pub mod bar;
pub mod equity;
pub mod feature_vector;
pub mod position;
pub mod risk;
pub mod trade;

pub use bar::Bar;
pub use equity::{capital_values, EquityPoint};
pub use feature_vector::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
pub use position::{Position, PositionState};
pub use risk::{CooldownPolicy, RiskMode, RiskState, RiskTransition};
pub use trade::Trade;

/// Symbol type alias
pub type Symbol = String;
