//! The tick loop.
//!
//! One engine owns the clock, the universes, the feed, the OMS, and the
//! ledger. Each tick runs the same four phases in order: apply bars and
//! refresh universes, process resting orders, reconcile the ledger, then let
//! the strategy place new orders from a read-only view of the world. Orders
//! placed on tick N therefore never fill before tick N+1's data unless the
//! strategy chose a same-bar order type deliberately.

use crate::config::RunConfig;
use crate::fingerprint::{fingerprint, RunId};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rollsim_core::domain::{AssetView, OrderSide, OrderType};
use rollsim_core::{Asset, BarFeed, Clock, ClockState, Oms, Portfolio, Universe};

/// A strategy's request to rest one order.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub identifier: String,
    pub side: OrderSide,
    pub units: f64,
    pub order_type: OrderType,
    pub time_in_force: Option<u32>,
    pub fill_or_kill: bool,
}

impl OrderIntent {
    /// Market order with no expiry.
    pub fn market(identifier: impl Into<String>, side: OrderSide, units: f64) -> Self {
        Self {
            identifier: identifier.into(),
            side,
            units,
            order_type: OrderType::Market,
            time_in_force: None,
            fill_or_kill: false,
        }
    }
}

/// Read-only view of the world handed to the strategy each tick.
pub struct StrategyContext<'a> {
    date: NaiveDate,
    assets: &'a AssetView<'a>,
    active: Vec<&'a str>,
    inactive: Vec<&'a str>,
    tradeable: Vec<&'a str>,
    portfolio: &'a Portfolio,
}

impl<'a> StrategyContext<'a> {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn asset(&self, identifier: &str) -> Option<&'a Asset> {
        self.assets.get(identifier).copied()
    }

    /// Identifiers currently occupying a continuation rank, across universes.
    pub fn active(&self) -> &[&'a str] {
        &self.active
    }

    /// Rolled-off identifiers retained for settlement.
    pub fn inactive(&self) -> &[&'a str] {
        &self.inactive
    }

    pub fn tradeable(&self) -> &[&'a str] {
        &self.tradeable
    }

    pub fn is_tradeable(&self, identifier: &str) -> bool {
        self.tradeable.contains(&identifier)
    }

    pub fn portfolio(&self) -> &'a Portfolio {
        self.portfolio
    }
}

/// A trading strategy, driven once per tick after reconciliation.
pub trait Strategy {
    fn on_tick(&mut self, ctx: &StrategyContext<'_>) -> Vec<OrderIntent>;
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: RunId,
    pub ticks: usize,
    pub fills: usize,
    pub final_value: f64,
}

/// The simulation engine.
pub struct Engine {
    run_id: RunId,
    clock: Clock,
    universes: Vec<Box<dyn Universe>>,
    feed: BarFeed,
    oms: Oms,
    portfolio: Portfolio,
}

impl Engine {
    /// Build an engine over pre-loaded data. The run calendar is the feed's
    /// date union clipped to the configured window.
    pub fn new(config: &RunConfig, universes: Vec<Box<dyn Universe>>, feed: BarFeed) -> Self {
        let calendar: Vec<NaiveDate> = feed
            .calendar()
            .into_iter()
            .filter(|d| *d >= config.start_date && *d <= config.end_date)
            .collect();
        Self {
            run_id: fingerprint(config),
            clock: Clock::all_trading(calendar),
            universes,
            feed,
            oms: Oms::new(config.oms_config()),
            portfolio: Portfolio::new(config.starting_cash),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn oms(&self) -> &Oms {
        &self.oms
    }

    /// Drive the strategy over the whole calendar.
    pub fn run(&mut self, strategy: &mut dyn Strategy) -> Result<RunSummary> {
        let mut ticks = 0usize;

        loop {
            let now = match self.clock.advance() {
                ClockState::At(date) => date,
                ClockState::Ended => break,
            };
            ticks += 1;

            for universe in &mut self.universes {
                self.feed.apply(now, universe.assets_mut());
                universe.refresh(now);
            }

            let view: AssetView<'_> = self
                .universes
                .iter()
                .flat_map(|u| u.assets().iter())
                .map(|(k, v)| (k.as_str(), v))
                .collect();

            self.oms
                .process(now, &view, &mut self.portfolio)
                .with_context(|| format!("order processing failed on {now}"))?;

            self.portfolio
                .reconcile(now, &view)
                .with_context(|| format!("reconciliation failed on {now}"))?;

            let ctx = StrategyContext {
                date: now,
                assets: &view,
                active: self
                    .universes
                    .iter()
                    .flat_map(|u| u.active().iter().map(String::as_str))
                    .collect(),
                inactive: self
                    .universes
                    .iter()
                    .flat_map(|u| u.inactive().iter().map(String::as_str))
                    .collect(),
                tradeable: self
                    .universes
                    .iter()
                    .flat_map(|u| u.tradeable().iter().map(String::as_str))
                    .collect(),
                portfolio: &self.portfolio,
            };

            for intent in strategy.on_tick(&ctx) {
                let Some(asset) = view.get(intent.identifier.as_str()) else {
                    bail!("order intent for unknown asset {} on {now}", intent.identifier);
                };
                self.oms
                    .place_order(
                        asset,
                        intent.side,
                        intent.units,
                        intent.order_type,
                        now,
                        intent.time_in_force,
                        intent.fill_or_kill,
                    )
                    .with_context(|| {
                        format!("placing order for {} on {now}", intent.identifier)
                    })?;
            }
        }

        Ok(RunSummary {
            run_id: self.run_id.clone(),
            ticks,
            fills: self.oms.fills().len(),
            final_value: self.portfolio.value(),
        })
    }
}
