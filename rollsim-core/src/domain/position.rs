//! Position — open quantity and accumulated cost basis for one asset.

use super::asset::AssetClass;
use serde::{Deserialize, Serialize};

/// Side of an open position. A zero-quantity position does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn signum(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }

    /// Side implied by a signed quantity. `None` for zero.
    pub fn from_signed(signed_units: f64) -> Option<Self> {
        if signed_units > 0.0 {
            Some(PositionSide::Long)
        } else if signed_units < 0.0 {
            Some(PositionSide::Short)
        } else {
            None
        }
    }
}

/// One open position.
///
/// `cost_basis` is the signed accumulated dollar cost including fees:
/// positive for longs, negative for shorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub identifier: String,
    pub class: AssetClass,
    pub side: PositionSide,
    pub units: f64,
    pub multiplier: f64,
    pub cost_basis: f64,
}

impl Position {
    /// Average fee-loaded price per unit:
    /// `cost_basis / multiplier / signed_units`.
    pub fn avg_price(&self) -> f64 {
        self.cost_basis / self.multiplier / (self.units * self.side.signum())
    }

    /// Signed mark-to-market value at `unit_value` (price × multiplier).
    pub fn market_value(&self, unit_value: f64) -> f64 {
        self.units * unit_value * self.side.signum()
    }

    /// Unrealized P&L at `unit_value`.
    pub fn unrealized_pnl(&self, unit_value: f64) -> f64 {
        self.market_value(unit_value) - self.cost_basis
    }
}
