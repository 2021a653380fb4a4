//! Roll calendar — maps (product, continuation rank) to a concrete contract
//! over time.
//!
//! Rows are the product's contracts sorted by the roll field. For any date,
//! the active row is the first whose roll date is strictly after that date;
//! rank r on a row is the row's contract shifted forward r-1 places.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which contract date drives the roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollField {
    /// Roll on the contract's last trade date (default).
    LastTradeDate,
    /// Roll on the end of the contract's tradeable window.
    WindowEnd,
}

/// One row of the calendar: the date it rolls off and the contract occupying
/// each continuation rank while it is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollRow {
    pub roll_date: NaiveDate,
    pub by_rank: BTreeMap<u32, String>,
}

/// Date-ordered roll calendar for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollCalendar {
    rows: Vec<RollRow>,
}

impl RollCalendar {
    /// Build from `(identifier, roll_date)` pairs and an inclusive rank range.
    ///
    /// `lag_days` shifts every roll date earlier by that many business days,
    /// rolling off a contract before it actually stops trading.
    pub fn build(
        contracts: &[(String, NaiveDate)],
        ranks: (u32, u32),
        lag_days: u32,
    ) -> Self {
        let mut sorted: Vec<(String, NaiveDate)> = contracts.to_vec();
        sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let (front, back) = ranks;
        let rows = sorted
            .iter()
            .enumerate()
            .map(|(i, (_, roll_date))| {
                let mut by_rank = BTreeMap::new();
                for rank in front..=back {
                    let shifted = i + (rank as usize - 1);
                    if let Some((identifier, _)) = sorted.get(shifted) {
                        by_rank.insert(rank, identifier.clone());
                    }
                }
                RollRow {
                    roll_date: lag_business_days(*roll_date, lag_days),
                    by_rank,
                }
            })
            .collect();

        Self { rows }
    }

    /// The row active on `date`: the first whose roll date is strictly after
    /// it. `None` past the end of listed contracts.
    pub fn active_row(&self, date: NaiveDate) -> Option<&RollRow> {
        self.rows.iter().find(|row| row.roll_date > date)
    }

    /// Rows that have already rolled off as of `date`.
    pub fn rolled_rows(&self, date: NaiveDate) -> impl Iterator<Item = &RollRow> {
        self.rows.iter().take_while(move |row| row.roll_date <= date)
    }

    pub fn rows(&self) -> &[RollRow] {
        &self.rows
    }
}

/// Shift a date earlier by `n` business days (weekends skipped).
fn lag_business_days(mut date: NaiveDate, n: u32) -> NaiveDate {
    let mut remaining = n;
    while remaining > 0 {
        match date.pred_opt() {
            Some(prev) => date = prev,
            None => return date,
        }
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}
