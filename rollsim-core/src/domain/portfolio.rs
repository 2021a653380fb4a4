//! Portfolio — cash, open positions, and the three append-only logs.
//!
//! Every mutation routes through `buy`, `sell`, or `reconcile`, so the
//! accounting identity `value == cash + sum(position market values)` holds
//! after every reconciliation by construction.

use super::asset::{Asset, AssetClass};
use super::position::{Position, PositionSide};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Read-only view of all assets visible this tick, keyed by identifier.
pub type AssetView<'a> = BTreeMap<&'a str, &'a Asset>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A position references an asset the caller no longer exposes.
    #[error("open position in unknown asset {identifier}")]
    UnknownAsset { identifier: String },
}

/// Point-in-time snapshot of the whole account, appended every reconcile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueSnapshot {
    pub date: NaiveDate,
    pub value: f64,
    pub cash: f64,
    pub long_equity: f64,
    pub short_equity: f64,
    pub unrealized_pnl: f64,
}

/// Point-in-time snapshot of one open position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub date: NaiveDate,
    pub identifier: String,
    pub class: AssetClass,
    pub side: PositionSide,
    pub units: f64,
    pub cost_basis: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub avg_price: f64,
}

/// A realized trade: crossing fill or forced settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub identifier: String,
    pub class: AssetClass,
    /// Units crossed (or settled).
    pub units: f64,
    /// `(new_avg / old_avg - 1)`, signed by the old position's side.
    pub percent_change: f64,
    pub gross_pnl: f64,
    pub per_unit_pnl: f64,
    /// True when the trade came from forced settlement of an untradeable asset.
    pub settlement: bool,
}

/// The account ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    starting_cash: f64,
    cash: f64,
    value: f64,
    long_equity: f64,
    short_equity: f64,
    unrealized_pnl: f64,
    positions: BTreeMap<String, Position>,
    values: Vec<ValueSnapshot>,
    holdings: Vec<PositionSnapshot>,
    trades: Vec<TradeRecord>,
}

impl Portfolio {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            starting_cash,
            cash: starting_cash,
            value: starting_cash,
            long_equity: 0.0,
            short_equity: 0.0,
            unrealized_pnl: 0.0,
            positions: BTreeMap::new(),
            values: Vec::new(),
            holdings: Vec::new(),
            trades: Vec::new(),
        }
    }

    pub fn starting_cash(&self) -> f64 {
        self.starting_cash
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Account value as of the last reconcile.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn long_equity(&self) -> f64 {
        self.long_equity
    }

    pub fn short_equity(&self) -> f64 {
        self.short_equity
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.unrealized_pnl
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, identifier: &str) -> Option<&Position> {
        self.positions.get(identifier)
    }

    pub fn values(&self) -> &[ValueSnapshot] {
        &self.values
    }

    pub fn holdings(&self) -> &[PositionSnapshot] {
        &self.holdings
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Apply a buy fill. `cost_basis` is the signed cash impact including
    /// fees (positive: cash out).
    pub fn buy(&mut self, asset: &Asset, units: f64, cost_basis: f64, date: NaiveDate) {
        self.apply_fill(asset, PositionSide::Long, units, cost_basis, date);
    }

    /// Apply a sell fill. `cost_basis` is the signed cash impact including
    /// fees (negative: cash in, less fees).
    pub fn sell(&mut self, asset: &Asset, units: f64, cost_basis: f64, date: NaiveDate) {
        self.apply_fill(asset, PositionSide::Short, units, cost_basis, date);
    }

    fn apply_fill(
        &mut self,
        asset: &Asset,
        fill_side: PositionSide,
        units: f64,
        cost_basis: f64,
        date: NaiveDate,
    ) {
        debug_assert!(units > 0.0, "fill units must be positive");
        self.cash -= cost_basis;

        let new_avg = cost_basis.abs() / asset.multiplier / units;

        let Some(old) = self.positions.remove(&asset.identifier) else {
            self.positions.insert(
                asset.identifier.clone(),
                Position {
                    identifier: asset.identifier.clone(),
                    class: asset.class,
                    side: fill_side,
                    units,
                    multiplier: asset.multiplier,
                    cost_basis,
                },
            );
            return;
        };

        // Crossing: a fill against the current side realizes a trade on the
        // overlapping quantity.
        if fill_side != old.side {
            let crossed = old.units.min(units);
            let old_avg = old.avg_price();
            let old_sign = old.side.signum();
            self.trades.push(TradeRecord {
                date,
                identifier: asset.identifier.clone(),
                class: asset.class,
                units: crossed,
                percent_change: (new_avg / old_avg - 1.0) * old_sign,
                gross_pnl: (new_avg - old_avg) * asset.multiplier * crossed * old_sign,
                per_unit_pnl: (new_avg - old_avg) * asset.multiplier * old_sign,
                settlement: false,
            });
        }

        let signed_units = old.units * old.side.signum() + units * fill_side.signum();
        let Some(new_side) = PositionSide::from_signed(signed_units) else {
            // Flat: the position ceases to exist.
            return;
        };

        // Same side (add or reduce): blend cost bases. Side flip: the
        // residual is a fresh position at the fill's average price.
        let new_cost_basis = if new_side == old.side {
            old.cost_basis + cost_basis
        } else {
            new_avg * asset.multiplier * signed_units
        };

        self.positions.insert(
            asset.identifier.clone(),
            Position {
                identifier: asset.identifier.clone(),
                class: asset.class,
                side: new_side,
                units: signed_units.abs(),
                multiplier: asset.multiplier,
                cost_basis: new_cost_basis,
            },
        );
    }

    /// End-of-tick reconciliation: mark every open position to market,
    /// force-settle positions in untradeable assets, and append snapshots.
    pub fn reconcile(&mut self, now: NaiveDate, assets: &AssetView<'_>) -> Result<(), LedgerError> {
        let mut long_equity = 0.0;
        let mut short_equity = 0.0;
        let mut unrealized = 0.0;

        let identifiers: Vec<String> = self.positions.keys().cloned().collect();
        for identifier in identifiers {
            let asset = *assets
                .get(identifier.as_str())
                .ok_or_else(|| LedgerError::UnknownAsset {
                    identifier: identifier.clone(),
                })?;
            let position = &self.positions[&identifier];

            // No close yet: mark at cost (zero unrealized).
            let unit_value = asset
                .market_value()
                .unwrap_or_else(|| position.avg_price() * position.multiplier);
            let market_value = position.market_value(unit_value);
            let pnl = market_value - position.cost_basis;

            self.holdings.push(PositionSnapshot {
                date: now,
                identifier: identifier.clone(),
                class: position.class,
                side: position.side,
                units: position.units,
                cost_basis: position.cost_basis,
                market_value,
                unrealized_pnl: pnl,
                avg_price: position.avg_price(),
            });
            unrealized += pnl;

            if !asset.tradeable(now) {
                // Forced settlement: realize at the last available price and
                // close the position out to cash.
                let old_avg = position.avg_price();
                let settle_avg = market_value.abs() / position.multiplier / position.units;
                let sign = position.side.signum();
                self.trades.push(TradeRecord {
                    date: now,
                    identifier: identifier.clone(),
                    class: position.class,
                    units: position.units,
                    percent_change: (settle_avg / old_avg - 1.0) * sign,
                    gross_pnl: (settle_avg - old_avg) * position.multiplier * position.units * sign,
                    per_unit_pnl: (settle_avg - old_avg) * position.multiplier * sign,
                    settlement: true,
                });
                self.cash += market_value;
                self.positions.remove(&identifier);
            } else {
                match position.side {
                    PositionSide::Long => long_equity += market_value,
                    PositionSide::Short => short_equity += market_value,
                }
            }
        }

        self.long_equity = long_equity;
        self.short_equity = short_equity;
        self.unrealized_pnl = unrealized;
        self.value = self.cash + long_equity + short_equity;
        self.values.push(ValueSnapshot {
            date: now,
            value: self.value,
            cash: self.cash,
            long_equity,
            short_equity,
            unrealized_pnl: unrealized,
        });
        Ok(())
    }
}
