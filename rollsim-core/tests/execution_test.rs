//! Multi-tick execution flow: clock, feed, OMS, and ledger working together.

use chrono::NaiveDate;
use rollsim_core::domain::{AssetView, OrderSide, OrderType};
use rollsim_core::{Asset, Bar, BarFeed, Clock, ClockState, Oms, OmsConfig, Portfolio};
use std::collections::BTreeMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn bar(close: f64) -> Bar {
    Bar {
        open: close,
        high: close + 2.0,
        low: close - 2.0,
        close,
        volume: 1_000_000.0,
        open_interest: 1_000_000.0,
    }
}

fn view(assets: &BTreeMap<String, Asset>) -> AssetView<'_> {
    assets.iter().map(|(k, v)| (k.as_str(), v)).collect()
}

#[test]
fn buy_hold_sell_round_trip() {
    let mut feed = BarFeed::new();
    feed.insert("ESH24", d(2024, 1, 2), bar(100.0));
    feed.insert("ESH24", d(2024, 1, 3), bar(105.0));
    feed.insert("ESH24", d(2024, 1, 4), bar(102.0));

    let mut assets = BTreeMap::new();
    assets.insert(
        "ESH24".to_string(),
        Asset::future("ESH24", "ES", 1.0, d(2023, 6, 1), d(2024, 3, 15), d(2024, 3, 15)),
    );

    let mut clock = Clock::all_trading(feed.calendar());
    let mut oms = Oms::new(OmsConfig::default());
    let mut pf = Portfolio::new(1_000_000.0);

    // Tick 1: buy 10 at the close.
    assert_eq!(clock.advance(), ClockState::At(d(2024, 1, 2)));
    let now = clock.now().unwrap();
    feed.apply(now, &mut assets);
    oms.place_order(
        &assets["ESH24"],
        OrderSide::Buy,
        10.0,
        OrderType::Market,
        now,
        None,
        false,
    )
    .unwrap();
    let fills = oms.process(now, &view(&assets), &mut pf).unwrap();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price, 100.0);
    pf.reconcile(now, &view(&assets)).unwrap();
    // 10 units at 100 plus 30 in fees.
    assert_eq!(pf.cash(), 998_970.0);
    assert_eq!(pf.long_equity(), 1_000.0);
    assert_eq!(pf.value(), 999_970.0);

    // Tick 2: hold; the mark moves to 105.
    clock.advance();
    let now = clock.now().unwrap();
    feed.apply(now, &mut assets);
    oms.process(now, &view(&assets), &mut pf).unwrap();
    pf.reconcile(now, &view(&assets)).unwrap();
    assert_eq!(pf.long_equity(), 1_050.0);
    assert_eq!(pf.value(), 1_000_020.0);

    // Tick 3: sell 10 at 102, realizing the trade.
    clock.advance();
    let now = clock.now().unwrap();
    feed.apply(now, &mut assets);
    oms.place_order(
        &assets["ESH24"],
        OrderSide::Sell,
        10.0,
        OrderType::Market,
        now,
        None,
        false,
    )
    .unwrap();
    oms.process(now, &view(&assets), &mut pf).unwrap();
    pf.reconcile(now, &view(&assets)).unwrap();

    assert!(pf.position("ESH24").is_none());
    assert_eq!(pf.trades().len(), 1);
    // Bought 100, sold 102, 60 in round-trip fees: -40 net.
    assert!((pf.trades()[0].gross_pnl - -40.0).abs() < 1e-9);
    assert_eq!(pf.cash(), 999_960.0);
    assert_eq!(pf.value(), pf.cash());

    assert_eq!(clock.advance(), ClockState::Ended);
    assert_eq!(pf.values().len(), 3);
}

#[test]
fn resting_limit_fills_when_touched() {
    let mut feed = BarFeed::new();
    feed.insert("ESH24", d(2024, 1, 2), bar(100.0));
    // Day 2 trades down through 95.
    feed.insert(
        "ESH24",
        d(2024, 1, 3),
        Bar {
            open: 99.0,
            high: 100.0,
            low: 94.0,
            close: 96.0,
            volume: 1_000_000.0,
            open_interest: 1_000_000.0,
        },
    );

    let mut assets = BTreeMap::new();
    assets.insert(
        "ESH24".to_string(),
        Asset::future("ESH24", "ES", 1.0, d(2023, 6, 1), d(2024, 3, 15), d(2024, 3, 15)),
    );

    let mut oms = Oms::new(OmsConfig::default());
    let mut pf = Portfolio::new(1_000_000.0);

    feed.apply(d(2024, 1, 2), &mut assets);
    oms.place_order(
        &assets["ESH24"],
        OrderSide::Buy,
        5.0,
        OrderType::Limit { limit_price: 95.0 },
        d(2024, 1, 2),
        None,
        false,
    )
    .unwrap();

    // Not touched on day 1: the order rests.
    let fills = oms.process(d(2024, 1, 2), &view(&assets), &mut pf).unwrap();
    assert!(fills.is_empty());
    assert_eq!(oms.book().len(), 1);

    feed.apply(d(2024, 1, 3), &mut assets);
    let fills = oms.process(d(2024, 1, 3), &view(&assets), &mut pf).unwrap();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price, 95.0);
    assert!(oms.book().is_empty());
}

#[test]
fn partial_fill_completes_over_later_ticks() {
    // Thin book: 10% of 100 volume caps each tick at 10 units.
    let thin_bar = Bar {
        open: 100.0,
        high: 101.0,
        low: 99.0,
        close: 100.0,
        volume: 100.0,
        open_interest: 0.0,
    };
    let mut feed = BarFeed::new();
    for day in [d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)] {
        feed.insert("CLF24", day, thin_bar);
    }

    let mut assets = BTreeMap::new();
    assets.insert(
        "CLF24".to_string(),
        Asset::future("CLF24", "CL", 1.0, d(2023, 1, 1), d(2024, 1, 19), d(2024, 1, 19)),
    );

    let mut config = OmsConfig::default();
    config.participation.adv_participation = 0.10;
    config.participation.adv_oi = 0.0;
    let mut oms = Oms::new(config);
    let mut pf = Portfolio::new(1_000_000.0);

    oms.place_order(
        &assets["CLF24"],
        OrderSide::Buy,
        25.0,
        OrderType::Market,
        d(2024, 1, 2),
        None,
        false,
    )
    .unwrap();

    let mut filled = 0.0;
    for day in [d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)] {
        feed.apply(day, &mut assets);
        for fill in oms.process(day, &view(&assets), &mut pf).unwrap() {
            filled += fill.units;
        }
    }

    // 10 + 10 + 5 across three ticks.
    assert_eq!(filled, 25.0);
    assert!(oms.book().is_empty());
    assert_eq!(pf.position("CLF24").unwrap().units, 25.0);
}
