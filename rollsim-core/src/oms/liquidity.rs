//! Participation-limited fill quantity.
//!
//! The fillable quantity for one tick is capped at a fraction of trailing
//! average daily volume; for futures, open interest provides an alternate
//! ceiling, since liquidity there can exceed recent volume in thin markets.
//! A small floor guarantees forward progress even with zero recorded volume.

use crate::domain::{Asset, AssetClass};
use serde::{Deserialize, Serialize};

/// Minimum fillable units per tick, so orders never starve indefinitely.
pub const MIN_FILL_UNITS: f64 = 2.0;

/// ADV participation policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticipationPolicy {
    /// Fraction of trailing average daily volume consumable per tick.
    pub adv_participation: f64,
    /// Trailing window, in bars, for the volume average.
    pub adv_period: usize,
    /// Fraction of open interest usable as an alternate ceiling (futures).
    pub adv_oi: f64,
}

impl Default for ParticipationPolicy {
    fn default() -> Self {
        Self {
            adv_participation: 0.20,
            adv_period: 21,
            adv_oi: 0.05,
        }
    }
}

impl ParticipationPolicy {
    /// Participation cap for one tick, before the floor is applied.
    pub fn participation_cap(&self, asset: &Asset) -> f64 {
        let adv = asset
            .prices
            .volume
            .trailing_mean(self.adv_period)
            .unwrap_or(0.0);
        let mut cap = (adv * self.adv_participation).floor();

        if asset.class == AssetClass::Future {
            if let Some(oi) = asset.prices.open_interest.last() {
                cap = cap.max((oi * self.adv_oi).floor());
            }
        }
        cap
    }

    /// Units fillable this tick: `min(requested, max(cap, MIN_FILL_UNITS))`.
    pub fn fillable_units(&self, asset: &Asset, requested: f64) -> f64 {
        requested.min(self.participation_cap(asset).max(MIN_FILL_UNITS))
    }
}
