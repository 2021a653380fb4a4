//! Bar feed — pre-loaded market data applied to assets each tick.
//!
//! All bars are loaded before the run starts; the hot loop never touches
//! I/O. Each tick, assets with a bar for the current date receive it; assets
//! with history but no bar forward-fill (a missing bar is "no new data",
//! never an error).

use crate::domain::{Asset, Bar};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Per-asset, date-keyed bar storage.
#[derive(Debug, Clone, Default)]
pub struct BarFeed {
    bars: BTreeMap<String, BTreeMap<NaiveDate, Bar>>,
}

impl BarFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a bar. A second insert for the same (identifier, date) replaces
    /// the first.
    pub fn insert(&mut self, identifier: impl Into<String>, date: NaiveDate, bar: Bar) {
        self.bars.entry(identifier.into()).or_default().insert(date, bar);
    }

    pub fn bar(&self, identifier: &str, date: NaiveDate) -> Option<&Bar> {
        self.bars.get(identifier)?.get(&date)
    }

    /// Union of all dates with any data, sorted. The natural run calendar.
    pub fn calendar(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .bars
            .values()
            .flat_map(|by_date| by_date.keys().copied())
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Push the day's bars onto `assets`. Assets without a bar today but
    /// with prior history forward-fill.
    pub fn apply(&self, now: NaiveDate, assets: &mut BTreeMap<String, Asset>) {
        for asset in assets.values_mut() {
            match self.bar(&asset.identifier, now) {
                Some(bar) => asset.prices.push_bar(bar),
                None => asset.prices.ffill(),
            }
        }
    }
}
