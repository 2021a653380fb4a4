//! Append-only time series — the fundamental unit of market data storage.
//!
//! A `Series` is an append-only sequence of `f64` samples with a monotonic
//! read pointer (the number of samples pushed so far). All bar data flows
//! through `Series` via `PriceSeries`, which groups the six daily fields.
//!
//! Non-finite policy: `push` silently drops NaN/infinite input and counts it
//! in `dropped`. A missing sample is "no new data", never a fatal error.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Append-only sequence of finite `f64` samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    values: Vec<f64>,
    dropped: usize,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a sample. Non-finite input is a silent no-op; the pointer does
    /// not advance. Returns whether the sample was accepted.
    pub fn push(&mut self, x: f64) -> bool {
        if x.is_finite() {
            self.values.push(x);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Re-push the most recent value. No-op on an empty series.
    pub fn ffill(&mut self) {
        if let Some(&last) = self.values.last() {
            self.values.push(last);
        }
    }

    /// Most recent sample, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Number of samples accepted so far. Only ever increases.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count of non-finite samples rejected by `push`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Full history in push order.
    pub fn history(&self) -> &[f64] {
        &self.values
    }

    /// Trailing window of up to `n` samples.
    pub fn tail(&self, n: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }

    /// Mean of the trailing `n` samples. `None` on an empty series.
    pub fn trailing_mean(&self, n: usize) -> Option<f64> {
        let window = self.tail(n);
        if window.is_empty() {
            return None;
        }
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }
}

/// The six daily fields of one asset, each an independent `Series`,
/// plus the contract multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub open: Series,
    pub high: Series,
    pub low: Series,
    pub close: Series,
    pub volume: Series,
    pub open_interest: Series,
    pub multiplier: f64,
}

impl PriceSeries {
    pub fn new(multiplier: f64) -> Self {
        Self {
            open: Series::new(),
            high: Series::new(),
            low: Series::new(),
            close: Series::new(),
            volume: Series::new(),
            open_interest: Series::new(),
            multiplier,
        }
    }

    /// Push one bar onto the six field series. Each field is accepted or
    /// dropped independently under the non-finite policy.
    pub fn push_bar(&mut self, bar: &Bar) {
        self.open.push(bar.open);
        self.high.push(bar.high);
        self.low.push(bar.low);
        self.close.push(bar.close);
        self.volume.push(bar.volume);
        self.open_interest.push(bar.open_interest);
    }

    /// Carry the previous bar forward on a day with no new data.
    ///
    /// Prices and open interest forward-fill; volume records 0 because no
    /// trading was observed.
    pub fn ffill(&mut self) {
        self.open.ffill();
        self.high.ffill();
        self.low.ffill();
        self.close.ffill();
        self.open_interest.ffill();
        if !self.volume.is_empty() {
            self.volume.push(0.0);
        }
    }

    /// Latest complete bar view, `None` until all four price fields have data.
    pub fn last_bar(&self) -> Option<Bar> {
        Some(Bar {
            open: self.open.last()?,
            high: self.high.last()?,
            low: self.low.last()?,
            close: self.close.last()?,
            volume: self.volume.last().unwrap_or(0.0),
            open_interest: self.open_interest.last().unwrap_or(0.0),
        })
    }

    /// Dollar value of one unit at the latest close.
    pub fn market_value(&self) -> Option<f64> {
        Some(self.close.last()? * self.multiplier)
    }
}
