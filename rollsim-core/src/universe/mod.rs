//! Universe — owns the asset set for one group of products and answers, per
//! date, what is tradeable and under what continuation label.
//!
//! `refresh` runs once per clock tick, before order processing, and
//! recomputes three lists: `active` (contracts currently occupying a
//! continuation rank), `inactive` (rolled off and no longer tradeable, kept
//! for settlement), and `tradeable` (pure window check per asset).

pub mod continuation;
pub mod roll;

pub use roll::{RollCalendar, RollField, RollRow};

use crate::domain::{Asset, AssetClass};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use continuation::{back_adjust_bar, roll_offset_delta};

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("asset {identifier} has no product code")]
    MissingProduct { identifier: String },

    #[error("asset {identifier} is not a future")]
    NotAFuture { identifier: String },

    #[error("product {product} has no contracts with a {field:?} roll date")]
    NoRollDates { product: String, field: RollField },
}

/// The tradeable-set view every universe exposes to the engine.
pub trait Universe {
    fn name(&self) -> &str;
    /// Recompute active/inactive/tradeable for the given date.
    fn refresh(&mut self, now: NaiveDate);
    fn assets(&self) -> &BTreeMap<String, Asset>;
    fn assets_mut(&mut self) -> &mut BTreeMap<String, Asset>;
    fn active(&self) -> &[String];
    fn inactive(&self) -> &[String];
    fn tradeable(&self) -> &[String];
}

/// Rolling behavior for a futures universe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Inclusive continuation rank range, e.g. (1, 2) for front and second.
    pub continuation_ranks: (u32, u32),
    pub roll_field: RollField,
    /// Business days to roll early.
    pub roll_lag_days: u32,
    /// Maintain synthetic back-adjusted continuation series.
    pub include_continuations: bool,
    /// Divide continuation volume by open interest.
    pub normalize_volume: bool,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            continuation_ranks: (1, 1),
            roll_field: RollField::LastTradeDate,
            roll_lag_days: 0,
            include_continuations: false,
            normalize_volume: false,
        }
    }
}

#[derive(Debug, Clone)]
struct ContinuationState {
    product: String,
    rank: u32,
    identifier: String,
    front: Option<String>,
    offset: f64,
}

/// A universe of futures contracts rolled across expiries by a roll calendar.
#[derive(Debug)]
pub struct FuturesUniverse {
    name: String,
    config: UniverseConfig,
    products: Vec<String>,
    assets: BTreeMap<String, Asset>,
    calendars: BTreeMap<String, RollCalendar>,
    active_by_product: BTreeMap<String, BTreeMap<u32, String>>,
    active: Vec<String>,
    inactive: Vec<String>,
    tradeable: Vec<String>,
    continuations: Vec<ContinuationState>,
}

impl FuturesUniverse {
    pub fn new(
        name: impl Into<String>,
        contracts: Vec<Asset>,
        config: UniverseConfig,
    ) -> Result<Self, UniverseError> {
        let mut assets = BTreeMap::new();
        let mut by_product: BTreeMap<String, Vec<(String, NaiveDate)>> = BTreeMap::new();
        let mut product_multiplier: BTreeMap<String, f64> = BTreeMap::new();

        for asset in contracts {
            if asset.class != AssetClass::Future {
                return Err(UniverseError::NotAFuture {
                    identifier: asset.identifier.clone(),
                });
            }
            let product = asset
                .product
                .clone()
                .ok_or_else(|| UniverseError::MissingProduct {
                    identifier: asset.identifier.clone(),
                })?;

            let roll_date = match config.roll_field {
                RollField::LastTradeDate => asset.last_trade_date,
                RollField::WindowEnd => asset.end_date,
            };
            // A contract without a roll date never enters the calendar; it
            // is retained only for settlement of any open position.
            if let Some(date) = roll_date {
                by_product
                    .entry(product.clone())
                    .or_default()
                    .push((asset.identifier.clone(), date));
            }
            product_multiplier
                .entry(product)
                .or_insert(asset.multiplier);
            assets.insert(asset.identifier.clone(), asset);
        }

        let products: Vec<String> = by_product.keys().cloned().collect();
        let mut calendars = BTreeMap::new();
        for (product, contracts) in &by_product {
            if contracts.is_empty() {
                return Err(UniverseError::NoRollDates {
                    product: product.clone(),
                    field: config.roll_field,
                });
            }
            calendars.insert(
                product.clone(),
                RollCalendar::build(contracts, config.continuation_ranks, config.roll_lag_days),
            );
        }

        let mut continuations = Vec::new();
        if config.include_continuations {
            let (front, back) = config.continuation_ranks;
            for product in &products {
                for rank in front..=back {
                    let identifier = format!("{product}-{rank}");
                    let mut series = Asset::future(
                        identifier.clone(),
                        product.clone(),
                        product_multiplier[product],
                        NaiveDate::MIN,
                        NaiveDate::MIN,
                        NaiveDate::MIN,
                    );
                    // Data-carrier only: never tradeable, no window.
                    series.start_date = None;
                    series.end_date = None;
                    series.last_trade_date = None;
                    assets.insert(identifier.clone(), series);
                    continuations.push(ContinuationState {
                        product: product.clone(),
                        rank,
                        identifier,
                        front: None,
                        offset: 0.0,
                    });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            config,
            products,
            assets,
            calendars,
            active_by_product: BTreeMap::new(),
            active: Vec::new(),
            inactive: Vec::new(),
            tradeable: Vec::new(),
            continuations,
        })
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Rank-to-contract mapping for one product as of the last refresh.
    pub fn active_ranks(&self, product: &str) -> Option<&BTreeMap<u32, String>> {
        self.active_by_product.get(product)
    }

    /// Identifier of the synthetic continuation series for (product, rank).
    pub fn continuation_identifier(product: &str, rank: u32) -> String {
        format!("{product}-{rank}")
    }

    fn synthesize_continuations(&mut self) {
        for state in self.continuations.iter_mut() {
            let Some(front_id) = self
                .active_by_product
                .get(&state.product)
                .and_then(|ranks| ranks.get(&state.rank))
            else {
                // End of listed contracts: the rank is empty this tick.
                state.front = None;
                continue;
            };

            if state.front.as_deref() != Some(front_id.as_str()) {
                // Roll boundary: absorb the close-to-close jump between the
                // outgoing and incoming front.
                if let Some(old_id) = &state.front {
                    let old_close = self.assets[old_id].prices.close.last();
                    let new_close = self.assets[front_id].prices.close.last();
                    if let (Some(old), Some(new)) = (old_close, new_close) {
                        state.offset += roll_offset_delta(old, new);
                    }
                }
                state.front = Some(front_id.clone());
            }

            if let Some(bar) = self.assets[front_id].prices.last_bar() {
                let adjusted = back_adjust_bar(&bar, state.offset, self.config.normalize_volume);
                if let Some(series) = self.assets.get_mut(&state.identifier) {
                    series.prices.push_bar(&adjusted);
                }
            }
        }
    }
}

impl Universe for FuturesUniverse {
    fn name(&self) -> &str {
        &self.name
    }

    fn refresh(&mut self, now: NaiveDate) {
        self.tradeable = self
            .assets
            .values()
            .filter(|a| a.tradeable(now))
            .map(|a| a.identifier.clone())
            .collect();

        self.active.clear();
        self.inactive.clear();
        self.active_by_product.clear();

        for product in &self.products {
            let calendar = &self.calendars[product];
            let ranks: BTreeMap<u32, String> = calendar
                .active_row(now)
                .map(|row| row.by_rank.clone())
                .unwrap_or_default();

            let current: BTreeSet<&String> = ranks.values().collect();
            let mut pending: BTreeSet<String> = BTreeSet::new();
            for row in calendar.rolled_rows(now) {
                for identifier in row.by_rank.values() {
                    if !current.contains(identifier) && !self.assets[identifier].tradeable(now) {
                        pending.insert(identifier.clone());
                    }
                }
            }

            self.inactive.extend(pending);
            self.active.extend(ranks.values().cloned());
            self.active_by_product.insert(product.clone(), ranks);
        }

        if self.config.include_continuations {
            self.synthesize_continuations();
            // Continuation labels join the active list so strategies can
            // subscribe to them by rank.
            for state in &self.continuations {
                if state.front.is_some() {
                    self.active.push(state.identifier.clone());
                }
            }
        }
    }

    fn assets(&self) -> &BTreeMap<String, Asset> {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut BTreeMap<String, Asset> {
        &mut self.assets
    }

    fn active(&self) -> &[String] {
        &self.active
    }

    fn inactive(&self) -> &[String] {
        &self.inactive
    }

    fn tradeable(&self) -> &[String] {
        &self.tradeable
    }
}

/// A flat universe of securities: no rolling, active simply mirrors the
/// tradeable window.
#[derive(Debug)]
pub struct SecuritiesUniverse {
    name: String,
    assets: BTreeMap<String, Asset>,
    active: Vec<String>,
    inactive: Vec<String>,
    tradeable: Vec<String>,
}

impl SecuritiesUniverse {
    pub fn new(name: impl Into<String>, securities: Vec<Asset>) -> Self {
        let assets = securities
            .into_iter()
            .map(|a| (a.identifier.clone(), a))
            .collect();
        Self {
            name: name.into(),
            assets,
            active: Vec::new(),
            inactive: Vec::new(),
            tradeable: Vec::new(),
        }
    }
}

impl Universe for SecuritiesUniverse {
    fn name(&self) -> &str {
        &self.name
    }

    fn refresh(&mut self, now: NaiveDate) {
        self.tradeable = self
            .assets
            .values()
            .filter(|a| a.tradeable(now))
            .map(|a| a.identifier.clone())
            .collect();
        self.active = self.tradeable.clone();
        self.inactive = self
            .assets
            .values()
            .filter(|a| !a.tradeable(now) && a.end_date.is_some_and(|end| end <= now))
            .map(|a| a.identifier.clone())
            .collect();
    }

    fn assets(&self) -> &BTreeMap<String, Asset> {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut BTreeMap<String, Asset> {
        &mut self.assets
    }

    fn active(&self) -> &[String] {
        &self.active
    }

    fn inactive(&self) -> &[String] {
        &self.inactive
    }

    fn tradeable(&self) -> &[String] {
        &self.tradeable
    }
}
