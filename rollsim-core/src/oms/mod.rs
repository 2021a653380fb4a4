//! Execution engine (OMS) — consumes resting orders each tick, applies the
//! fill-price and participation policies, and applies fills to the ledger.
//!
//! Per order, per tick: cancel if the asset stopped trading; otherwise resolve
//! the fill price against the current bar. A filled order leaves the book with
//! the filled quantity; a non-FOK partial immediately rests a fresh order for
//! the residual, which resolves no earlier than the next tick. An unfilled
//! order rests, subject to time-in-force; unfilled fill-or-kill is dropped.

pub mod fill_price;
pub mod liquidity;
pub mod order_book;

pub use fill_price::{decide, market_make_legs, PriceDecision};
pub use liquidity::{ParticipationPolicy, MIN_FILL_UNITS};
pub use order_book::OrderBook;

use crate::domain::{
    Asset, AssetView, CancelReason, FeeSchedule, Fill, Order, OrderId, OrderSide, OrderStatus,
    OrderType, Portfolio,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OmsError {
    /// Placing an order for an asset outside its tradeable window is an
    /// integration error, not a market condition.
    #[error("order for untradeable asset {identifier} on {date}")]
    Untradeable {
        identifier: String,
        date: NaiveDate,
    },

    #[error("order units must be positive and finite, got {units} for {identifier}")]
    InvalidUnits { identifier: String, units: f64 },

    /// A resting order references an asset the caller no longer exposes.
    #[error("resting order {order_id} references unknown asset {identifier}")]
    UnknownAsset {
        order_id: OrderId,
        identifier: String,
    },
}

/// Execution parameters: liquidity policy and fees.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OmsConfig {
    pub participation: ParticipationPolicy,
    pub fees: FeeSchedule,
}

/// The order management system.
pub struct Oms {
    config: OmsConfig,
    book: OrderBook,
    fills: Vec<Fill>,
}

impl Oms {
    pub fn new(config: OmsConfig) -> Self {
        Self {
            config,
            book: OrderBook::new(),
            fills: Vec::new(),
        }
    }

    pub fn config(&self) -> &OmsConfig {
        &self.config
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Every fill produced so far, in fill order.
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Rest a new order for `asset`, superseding any existing order for the
    /// same identifier. The current close is snapshotted as the informational
    /// entry price.
    #[allow(clippy::too_many_arguments)]
    pub fn place_order(
        &mut self,
        asset: &Asset,
        side: OrderSide,
        units: f64,
        order_type: OrderType,
        now: NaiveDate,
        time_in_force: Option<u32>,
        fill_or_kill: bool,
    ) -> Result<OrderId, OmsError> {
        if !(units > 0.0 && units.is_finite()) {
            return Err(OmsError::InvalidUnits {
                identifier: asset.identifier.clone(),
                units,
            });
        }
        if !asset.tradeable(now) {
            return Err(OmsError::Untradeable {
                identifier: asset.identifier.clone(),
                date: now,
            });
        }

        let id = self.book.allocate_id();
        self.book.place(
            Order {
                id,
                order_type,
                identifier: asset.identifier.clone(),
                class: asset.class,
                side,
                units,
                entry_date: now,
                entry_price: asset.prices.close.last(),
                time_in_force,
                fill_or_kill,
                days_on: 0,
                status: OrderStatus::Placed,
            },
            now,
        );
        Ok(id)
    }

    /// Process every resting order against the current bars, applying fills
    /// to `portfolio`. Returns the fills produced this tick.
    pub fn process(
        &mut self,
        now: NaiveDate,
        assets: &AssetView<'_>,
        portfolio: &mut Portfolio,
    ) -> Result<Vec<Fill>, OmsError> {
        let mut tick_fills = Vec::new();

        for identifier in self.book.resting_identifiers() {
            let Some(mut order) = self.book.take(&identifier) else {
                continue;
            };
            order.bump();

            let asset = *assets
                .get(identifier.as_str())
                .ok_or_else(|| OmsError::UnknownAsset {
                    order_id: order.id,
                    identifier: identifier.clone(),
                })?;

            // Contract expiry / delisting cancels, never fills.
            if !asset.tradeable(now) {
                order.cancel(now, CancelReason::Delisted);
                self.book.close(order);
                continue;
            }

            // Missing bar: no new data this tick, the order rests.
            let Some(bar) = asset.prices.last_bar() else {
                self.rest_or_drop(order, now);
                continue;
            };

            let qty = self.config.participation.fillable_units(asset, order.units);

            if let OrderType::MarketMake { bid, ask } = order.order_type {
                let (buy_leg, sell_leg) = market_make_legs(bid, ask, &bar);
                if buy_leg.is_none() && sell_leg.is_none() {
                    self.rest_or_drop(order, now);
                    continue;
                }
                let mut filled_units = 0.0;
                let mut notional = 0.0;
                for (side, price) in [
                    (OrderSide::Buy, buy_leg),
                    (OrderSide::Sell, sell_leg),
                ] {
                    let Some(price) = price else { continue };
                    let fill = self.apply_fill(&order, asset, side, price, qty, now, portfolio);
                    filled_units += fill.units;
                    notional += fill.price * fill.units;
                    tick_fills.push(fill);
                }

                // The residual rule applies to the composite too: the quoted
                // quantity drops by what executed per leg this tick, and the
                // remainder rests as a fresh two-sided order.
                let residual = order.units - qty;
                let replace = !order.fill_or_kill && residual > 0.0;
                let (side, order_type, tif) =
                    (order.side, order.order_type, order.time_in_force);
                order.fill(now, notional / filled_units, filled_units);
                self.book.close(order);

                if replace {
                    self.place_order(asset, side, residual, order_type, now, tif, false)?;
                }
                continue;
            }

            match decide(order.order_type, order.side, &bar) {
                PriceDecision::Fill(price) => {
                    let fill =
                        self.apply_fill(&order, asset, order.side, price, qty, now, portfolio);
                    tick_fills.push(fill);

                    let residual = order.units - qty;
                    let replace = !order.fill_or_kill && residual > 0.0;
                    let (side, order_type, tif) =
                        (order.side, order.order_type, order.time_in_force);
                    order.fill(now, price, qty);
                    self.book.close(order);

                    // Residual rests as a fresh order and resolves next tick.
                    if replace {
                        self.place_order(asset, side, residual, order_type, now, tif, false)?;
                    }
                }
                PriceDecision::Unfilled => self.rest_or_drop(order, now),
            }
        }

        self.fills.extend(tick_fills.iter().cloned());
        Ok(tick_fills)
    }

    /// One leg of a fill: compute fee and signed cost basis, apply to the
    /// ledger, and record the fill event.
    #[allow(clippy::too_many_arguments)]
    fn apply_fill(
        &self,
        order: &Order,
        asset: &Asset,
        side: OrderSide,
        price: f64,
        units: f64,
        now: NaiveDate,
        portfolio: &mut Portfolio,
    ) -> Fill {
        let fill = Fill {
            order_id: order.id,
            date: now,
            identifier: asset.identifier.clone(),
            class: asset.class,
            side,
            price,
            units,
            fee: self.config.fees.fill_fee(asset.class, units),
        };
        let cost_basis = fill.cost_basis(asset.multiplier);
        match side {
            OrderSide::Buy => portfolio.buy(asset, units, cost_basis, now),
            OrderSide::Sell => portfolio.sell(asset, units, cost_basis, now),
        }
        fill
    }

    /// Unfilled this tick: drop fill-or-kill, cancel expired time-in-force,
    /// otherwise leave resting for the next tick.
    fn rest_or_drop(&mut self, mut order: Order, now: NaiveDate) {
        if order.fill_or_kill {
            order.cancel(now, CancelReason::FillOrKill);
            self.book.close(order);
        } else if order.expired() {
            order.cancel(now, CancelReason::Expired);
            self.book.close(order);
        } else {
            self.book.requeue(order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn liquid_asset() -> Asset {
        let mut asset =
            Asset::future("ESH24", "ES", 1.0, d(2023, 6, 1), d(2024, 3, 15), d(2024, 3, 15));
        asset.prices.push_bar(&Bar {
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 100.0,
            volume: 1_000_000.0,
            open_interest: 1_000_000.0,
        });
        asset
    }

    fn oms() -> Oms {
        Oms::new(OmsConfig::default())
    }

    fn view(asset: &Asset) -> AssetView<'_> {
        let mut v = AssetView::new();
        v.insert(asset.identifier.as_str(), asset);
        v
    }

    #[test]
    fn market_order_fills_at_close() {
        let asset = liquid_asset();
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy,
            10.0,
            OrderType::Market,
            d(2024, 1, 2),
            None,
            false,
        )
        .unwrap();

        let fills = oms.process(d(2024, 1, 2), &view(&asset), &mut pf).unwrap();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].price, 100.0);
        assert_eq!(fills[0].units, 10.0);
        assert_eq!(fills[0].fee, 30.0);
        assert_eq!(pf.cash(), 1_000_000.0 - 1030.0);
        assert!(oms.book().is_empty());
    }

    #[test]
    fn untradeable_placement_is_rejected() {
        let asset = liquid_asset();
        let mut oms = oms();
        let result = oms.place_order(
            &asset,
            OrderSide::Buy,
            10.0,
            OrderType::Market,
            d(2024, 3, 15), // window end
            None,
            false,
        );
        assert!(matches!(result, Err(OmsError::Untradeable { .. })));
    }

    #[test]
    fn delisting_cancels_resting_order() {
        let mut asset = liquid_asset();
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy,
            10.0,
            OrderType::Limit { limit_price: 1.0 },
            d(2024, 3, 14),
            None,
            false,
        )
        .unwrap();

        // Window closes before the next tick.
        asset.end_date = Some(d(2024, 3, 15));
        let fills = oms.process(d(2024, 3, 15), &view(&asset), &mut pf).unwrap();
        assert!(fills.is_empty());
        assert!(oms.book().is_empty());
        assert!(matches!(
            oms.book().log().last().unwrap().status,
            OrderStatus::Cancelled {
                reason: CancelReason::Delisted,
                ..
            }
        ));
    }

    #[test]
    fn partial_fill_places_residual() {
        let mut asset = liquid_asset();
        // Thin market: cap = 10% of trailing volume.
        asset.prices = crate::series::PriceSeries::new(1.0);
        asset.prices.push_bar(&Bar {
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 100.0,
            volume: 100.0,
            open_interest: 0.0,
        });
        let mut oms = Oms::new(OmsConfig {
            participation: ParticipationPolicy {
                adv_participation: 0.10,
                adv_period: 21,
                adv_oi: 0.0,
            },
            fees: FeeSchedule::frictionless(),
        });
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy,
            25.0,
            OrderType::Market,
            d(2024, 1, 2),
            None,
            false,
        )
        .unwrap();

        let fills = oms.process(d(2024, 1, 2), &view(&asset), &mut pf).unwrap();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].units, 10.0);

        // Residual resting for the next tick, not re-attempted this tick.
        let residual = oms.book().get("ESH24").unwrap();
        assert_eq!(residual.units, 15.0);
        assert!(residual.id > fills[0].order_id);
    }

    #[test]
    fn fok_that_cannot_fill_is_dropped() {
        let asset = liquid_asset();
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy,
            10.0,
            OrderType::Limit { limit_price: 50.0 },
            d(2024, 1, 2),
            None,
            true,
        )
        .unwrap();

        oms.process(d(2024, 1, 2), &view(&asset), &mut pf).unwrap();
        assert!(oms.book().is_empty());
        assert!(matches!(
            oms.book().log().last().unwrap().status,
            OrderStatus::Cancelled {
                reason: CancelReason::FillOrKill,
                ..
            }
        ));
    }

    #[test]
    fn tif_expires_unfilled_orders() {
        let asset = liquid_asset();
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy,
            10.0,
            OrderType::Limit { limit_price: 50.0 },
            d(2024, 1, 2),
            Some(2),
            false,
        )
        .unwrap();

        oms.process(d(2024, 1, 3), &view(&asset), &mut pf).unwrap();
        assert_eq!(oms.book().len(), 1);
        oms.process(d(2024, 1, 4), &view(&asset), &mut pf).unwrap();
        assert!(oms.book().is_empty());
        assert!(matches!(
            oms.book().log().last().unwrap().status,
            OrderStatus::Cancelled {
                reason: CancelReason::Expired,
                ..
            }
        ));
    }

    #[test]
    fn market_make_fills_both_legs() {
        let asset = liquid_asset();
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy, // ignored for two-sided orders
            1.0,
            OrderType::MarketMake {
                bid: 99.0,
                ask: 104.0,
            },
            d(2024, 1, 2),
            None,
            false,
        )
        .unwrap();

        let fills = oms.process(d(2024, 1, 2), &view(&asset), &mut pf).unwrap();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].side, OrderSide::Buy);
        assert_eq!(fills[0].price, 99.0);
        assert_eq!(fills[1].side, OrderSide::Sell);
        assert_eq!(fills[1].price, 104.0);
        // Both legs crossed: one realized trade, no net position.
        assert_eq!(pf.trades().len(), 1);
        assert!(pf.position("ESH24").is_none());
        assert!(oms.book().is_empty());
    }

    #[test]
    fn market_make_partial_rests_residual() {
        let mut asset = liquid_asset();
        // Zero recorded liquidity: each leg fills only the minimum floor.
        asset.prices = crate::series::PriceSeries::new(1.0);
        asset.prices.push_bar(&Bar {
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 100.0,
            volume: 0.0,
            open_interest: 0.0,
        });
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        let bands = OrderType::MarketMake {
            bid: 99.0,
            ask: 104.0,
        };
        let id = oms
            .place_order(&asset, OrderSide::Buy, 10.0, bands, d(2024, 1, 2), None, false)
            .unwrap();

        let fills = oms.process(d(2024, 1, 2), &view(&asset), &mut pf).unwrap();
        assert_eq!(fills.len(), 2);
        assert!(fills.iter().all(|f| f.units == MIN_FILL_UNITS));

        // The unexecuted quantity rests as a fresh two-sided order with the
        // same bands, not silently discarded.
        let residual = oms.book().get("ESH24").unwrap();
        assert_eq!(residual.units, 10.0 - MIN_FILL_UNITS);
        assert_eq!(residual.order_type, bands);
        assert!(residual.id > id);
    }

    #[test]
    fn market_make_fok_does_not_rest_residual() {
        let mut asset = liquid_asset();
        asset.prices = crate::series::PriceSeries::new(1.0);
        asset.prices.push_bar(&Bar {
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 100.0,
            volume: 0.0,
            open_interest: 0.0,
        });
        let mut oms = oms();
        let mut pf = Portfolio::new(1_000_000.0);
        oms.place_order(
            &asset,
            OrderSide::Buy,
            10.0,
            OrderType::MarketMake {
                bid: 99.0,
                ask: 104.0,
            },
            d(2024, 1, 2),
            None,
            true,
        )
        .unwrap();

        let fills = oms.process(d(2024, 1, 2), &view(&asset), &mut pf).unwrap();
        assert_eq!(fills.len(), 2);
        assert!(oms.book().is_empty());
    }
}
