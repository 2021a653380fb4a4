//! Fee schedule — fixed per-unit fees by asset class.

use super::asset::AssetClass;
use serde::{Deserialize, Serialize};

/// Per-unit fee by asset class, folded into the signed cost basis of every
/// fill (a fee always debits cash, on both buys and sells).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub future_per_unit: f64,
    pub security_per_unit: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            future_per_unit: 3.00,
            security_per_unit: 0.01,
        }
    }
}

impl FeeSchedule {
    pub fn frictionless() -> Self {
        Self {
            future_per_unit: 0.0,
            security_per_unit: 0.0,
        }
    }

    pub fn per_unit(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Future => self.future_per_unit,
            AssetClass::Security => self.security_per_unit,
        }
    }

    /// Total fee for a fill of `units`.
    pub fn fill_fee(&self, class: AssetClass, units: f64) -> f64 {
        self.per_unit(class) * units
    }
}
