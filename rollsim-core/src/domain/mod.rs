//! Domain types: assets, bars, orders, positions, the portfolio ledger, fees.

pub mod asset;
pub mod bar;
pub mod fees;
pub mod order;
pub mod portfolio;
pub mod position;

pub use asset::{Asset, AssetClass};
pub use bar::Bar;
pub use fees::FeeSchedule;
pub use order::{CancelReason, Fill, Order, OrderId, OrderSide, OrderStatus, OrderType};
pub use portfolio::{
    AssetView, LedgerError, Portfolio, PositionSnapshot, TradeRecord, ValueSnapshot,
};
pub use position::{Position, PositionSide};
