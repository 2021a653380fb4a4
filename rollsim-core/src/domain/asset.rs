//! Asset — one tradeable instrument and its owned price history.

use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Instrument class, which selects the per-unit fee and the liquidity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Future,
    Security,
}

/// A tradeable instrument.
///
/// Created when a universe loads reference data; receives bars over its
/// lifetime and is retained after it stops trading so open positions can be
/// settled against its final prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub class: AssetClass,
    pub identifier: String,
    /// Underlying product code for futures (e.g. "ES"); `None` for securities.
    pub product: Option<String>,
    pub multiplier: f64,
    /// Tradeable window start (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Tradeable window end (exclusive).
    pub end_date: Option<NaiveDate>,
    pub last_trade_date: Option<NaiveDate>,
    /// Treat as tradeable even with no window. Used for synthetic series
    /// that only exist to carry data.
    pub tradeable_override: bool,
    pub prices: PriceSeries,
}

impl Asset {
    pub fn future(
        identifier: impl Into<String>,
        product: impl Into<String>,
        multiplier: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        last_trade_date: NaiveDate,
    ) -> Self {
        Self {
            class: AssetClass::Future,
            identifier: identifier.into(),
            product: Some(product.into()),
            multiplier,
            start_date: Some(start_date),
            end_date: Some(end_date),
            last_trade_date: Some(last_trade_date),
            tradeable_override: false,
            prices: PriceSeries::new(multiplier),
        }
    }

    pub fn security(
        identifier: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            class: AssetClass::Security,
            identifier: identifier.into(),
            product: None,
            multiplier: 1.0,
            start_date: Some(start_date),
            end_date: Some(end_date),
            last_trade_date: None,
            tradeable_override: false,
            prices: PriceSeries::new(1.0),
        }
    }

    /// Tradeability is a pure function of the date and the window:
    /// `start <= now < end`. An asset with a missing window is never
    /// tradeable unless explicitly overridden.
    pub fn tradeable(&self, now: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => self.tradeable_override,
        }
    }

    /// Dollar value of one unit at the latest close.
    pub fn market_value(&self) -> Option<f64> {
        self.prices.market_value()
    }
}
