//! Rollsim Core — simulation clock, rolling-futures universe, OMS, ledger.
//!
//! This crate contains the heart of the backtesting simulator:
//! - Domain types (bars, assets, orders, fills, positions, the portfolio ledger)
//! - Append-only series storage with forward-fill semantics
//! - Trading-calendar clock driving the bar-by-bar loop
//! - Roll-calendar futures universe with back-adjusted continuations
//! - Order management with participation-limited partial fills
//! - Pre-loaded bar feed applied to assets each tick

pub mod clock;
pub mod domain;
pub mod feed;
pub mod oms;
pub mod series;
pub mod universe;

pub use clock::{Clock, ClockState};
pub use domain::{
    Asset, AssetClass, AssetView, Bar, FeeSchedule, Fill, LedgerError, Order, OrderId, OrderSide,
    OrderStatus, OrderType, Portfolio, Position, PositionSide,
};
pub use feed::BarFeed;
pub use oms::{Oms, OmsConfig, OmsError};
pub use series::{PriceSeries, Series};
pub use universe::{FuturesUniverse, SecuritiesUniverse, Universe, UniverseConfig, UniverseError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types a runner shares across threads are
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Asset>();
        require_sync::<domain::Asset>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Portfolio>();
        require_sync::<domain::Portfolio>();
        require_send::<domain::OrderId>();
        require_sync::<domain::OrderId>();
        require_send::<Clock>();
        require_sync::<Clock>();
        require_send::<BarFeed>();
        require_sync::<BarFeed>();
        require_send::<Oms>();
        require_sync::<Oms>();
        require_send::<FuturesUniverse>();
        require_sync::<FuturesUniverse>();
    }
}
