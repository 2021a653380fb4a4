//! Order — a resting intent and its lifecycle.
//!
//! Orders are identity-stable records: a partial fill closes the order and
//! places a fresh order for the residual, so every fill maps to exactly one
//! order instance. The only in-place mutations are the terminal status
//! transition and the days-on-book counter.

use super::asset::AssetClass;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing order number, unique within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of a one-sided order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1.0 for buys, -1.0 for sells.
    pub fn signum(self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Fill-price policy, each variant carrying only the parameters it needs.
///
/// All policies are deterministic functions of the current bar's OHLC and,
/// for limit-style orders, the caller-supplied price band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderType {
    /// Fill at the bar's close.
    Market,
    /// Fill at the bar's open.
    MarketOnOpen,
    /// Fill at the limit price if the bar touches it, else rest.
    Limit { limit_price: f64 },
    /// Fill at the limit price if touched, else fall back to the close.
    LimitOrFill { limit_price: f64 },
    /// Fill at the bar's mid-range, (high + low) / 2.
    MidRange,
    /// Fill at the triangular blend, (high + low + close) / 3.
    Triangular,
    /// Fill at the favorable extreme for the side (low for buys, high for sells).
    BestFill,
    /// Fill at the unfavorable extreme for the side.
    WorstFill,
    /// Two-sided market-making composite: a synthetic buy resting at `bid`
    /// and a synthetic sell resting at `ask`. Each leg fills independently
    /// when the bar's range touches its band. The order's `side` is ignored.
    MarketMake { bid: f64, ask: f64 },
}

impl OrderType {
    pub fn is_two_sided(&self) -> bool {
        matches!(self, OrderType::MarketMake { .. })
    }
}

/// Why an order left the book without filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// Time-in-force exhausted without a fill.
    Expired,
    /// The underlying asset stopped being tradeable.
    Delisted,
    /// Fill-or-kill order could not fill this tick.
    FillOrKill,
}

/// Order lifecycle states. `Filled`, `Cancelled`, and `Superseded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Resting in the book.
    Placed,
    /// Completely filled (possibly for fewer units than requested; the
    /// residual lives on as a fresh order).
    Filled {
        date: NaiveDate,
        price: f64,
        units: f64,
    },
    Cancelled {
        date: NaiveDate,
        reason: CancelReason,
    },
    /// Replaced by a later order for the same asset.
    Superseded { date: NaiveDate },
}

/// One resting order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_type: OrderType,
    pub identifier: String,
    pub class: AssetClass,
    pub side: OrderSide,
    pub units: f64,
    pub entry_date: NaiveDate,
    /// Close at placement time. Informational only.
    pub entry_price: Option<f64>,
    /// Maximum ticks on the book before forced cancellation.
    pub time_in_force: Option<u32>,
    pub fill_or_kill: bool,
    pub days_on: u32,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_resting(&self) -> bool {
        self.status == OrderStatus::Placed
    }

    /// Count one more tick on the book.
    pub fn bump(&mut self) {
        self.days_on += 1;
    }

    /// Whether time-in-force has been exhausted.
    pub fn expired(&self) -> bool {
        self.time_in_force.is_some_and(|tif| self.days_on >= tif)
    }

    pub fn fill(&mut self, date: NaiveDate, price: f64, units: f64) {
        debug_assert!(self.is_resting(), "fill on a non-resting order");
        self.status = OrderStatus::Filled { date, price, units };
    }

    pub fn cancel(&mut self, date: NaiveDate, reason: CancelReason) {
        debug_assert!(self.is_resting(), "cancel on a non-resting order");
        self.status = OrderStatus::Cancelled { date, reason };
    }

    pub fn supersede(&mut self, date: NaiveDate) {
        debug_assert!(self.is_resting(), "supersede on a non-resting order");
        self.status = OrderStatus::Superseded { date };
    }
}

/// A fill event: one order, one price, one quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub date: NaiveDate,
    pub identifier: String,
    pub class: AssetClass,
    pub side: OrderSide,
    pub price: f64,
    pub units: f64,
    pub fee: f64,
}

impl Fill {
    /// Signed cash impact: positive debits cash (buys), negative credits it
    /// (sells). Fees always debit.
    pub fn cost_basis(&self, multiplier: f64) -> f64 {
        self.side.signum() * self.price * self.units * multiplier + self.fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_order() -> Order {
        Order {
            id: OrderId(1),
            order_type: OrderType::Market,
            identifier: "ESH24".into(),
            class: AssetClass::Future,
            side: OrderSide::Buy,
            units: 10.0,
            entry_date: d(2024, 1, 2),
            entry_price: Some(100.0),
            time_in_force: Some(3),
            fill_or_kill: false,
            days_on: 0,
            status: OrderStatus::Placed,
        }
    }

    #[test]
    fn tif_expiry_counts_ticks() {
        let mut order = sample_order();
        assert!(!order.expired());
        order.bump();
        order.bump();
        assert!(!order.expired());
        order.bump();
        assert!(order.expired());
    }

    #[test]
    fn no_tif_never_expires() {
        let mut order = sample_order();
        order.time_in_force = None;
        for _ in 0..100 {
            order.bump();
        }
        assert!(!order.expired());
    }

    #[test]
    fn terminal_transitions() {
        let mut order = sample_order();
        order.fill(d(2024, 1, 3), 101.0, 10.0);
        assert!(!order.is_resting());
        assert_eq!(
            order.status,
            OrderStatus::Filled {
                date: d(2024, 1, 3),
                price: 101.0,
                units: 10.0
            }
        );
    }

    #[test]
    fn fill_cost_basis_sign() {
        let buy = Fill {
            order_id: OrderId(1),
            date: d(2024, 1, 2),
            identifier: "ESH24".into(),
            class: AssetClass::Future,
            side: OrderSide::Buy,
            price: 100.0,
            units: 10.0,
            fee: 30.0,
        };
        assert_eq!(buy.cost_basis(1.0), 1030.0);

        let sell = Fill {
            side: OrderSide::Sell,
            ..buy
        };
        assert_eq!(sell.cost_basis(1.0), -970.0);
    }
}
