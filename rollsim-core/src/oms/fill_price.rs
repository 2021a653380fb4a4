//! Fill-price policies — deterministic functions of the bar's OHLC.
//!
//! Every one-sided order type resolves to `Fill(price)` or `Unfilled` for the
//! current bar. The two-sided market-making composite resolves its legs
//! separately via `market_make_legs`.

use crate::domain::{Bar, OrderSide, OrderType};

/// Outcome of applying a one-sided price policy to a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDecision {
    Fill(f64),
    /// Band not touched; the order rests.
    Unfilled,
}

/// Whether a buy band at `limit` was touched within the bar.
fn buy_touched(bar: &Bar, limit: f64) -> bool {
    bar.low <= limit || bar.close <= limit
}

/// Whether a sell band at `limit` was touched within the bar.
fn sell_touched(bar: &Bar, limit: f64) -> bool {
    bar.high >= limit || bar.close >= limit
}

/// Resolve the fill price for a one-sided order against the current bar.
///
/// Callers must not pass `MarketMake` here; its legs resolve via
/// `market_make_legs`.
pub fn decide(order_type: OrderType, side: OrderSide, bar: &Bar) -> PriceDecision {
    match order_type {
        OrderType::Market => PriceDecision::Fill(bar.close),
        OrderType::MarketOnOpen => PriceDecision::Fill(bar.open),
        OrderType::Limit { limit_price } => {
            let touched = match side {
                OrderSide::Buy => buy_touched(bar, limit_price),
                OrderSide::Sell => sell_touched(bar, limit_price),
            };
            if touched {
                PriceDecision::Fill(limit_price)
            } else {
                PriceDecision::Unfilled
            }
        }
        OrderType::LimitOrFill { limit_price } => {
            let touched = match side {
                OrderSide::Buy => buy_touched(bar, limit_price),
                OrderSide::Sell => sell_touched(bar, limit_price),
            };
            PriceDecision::Fill(if touched { limit_price } else { bar.close })
        }
        OrderType::MidRange => PriceDecision::Fill((bar.high + bar.low) / 2.0),
        OrderType::Triangular => PriceDecision::Fill((bar.high + bar.low + bar.close) / 3.0),
        OrderType::BestFill => PriceDecision::Fill(match side {
            OrderSide::Buy => bar.low,
            OrderSide::Sell => bar.high,
        }),
        OrderType::WorstFill => PriceDecision::Fill(match side {
            OrderSide::Buy => bar.high,
            OrderSide::Sell => bar.low,
        }),
        OrderType::MarketMake { .. } => PriceDecision::Unfilled,
    }
}

/// Which legs of a market-making composite fill against this bar.
///
/// The buy leg fills at `bid` when the bar trades down to it; the sell leg
/// fills at `ask` when the bar trades up to it. Both may fill.
pub fn market_make_legs(bid: f64, ask: f64, bar: &Bar) -> (Option<f64>, Option<f64>) {
    let buy_leg = (bar.low <= bid).then_some(bid);
    let sell_leg = (bar.high >= ask).then_some(ask);
    (buy_leg, sell_leg)
}
