//! Order book — at most one resting order per asset identifier.
//!
//! The book owns order identity: it allocates monotonically increasing order
//! numbers and keeps the append-only log of every order that left the book
//! (filled, cancelled, or superseded). Keyed by identifier in a `BTreeMap`
//! so per-tick processing order is deterministic.

use crate::domain::{Order, OrderId};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct OrderBook {
    resting: BTreeMap<String, Order>,
    next_seq: u64,
    log: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next order number. Strictly increasing within a run.
    pub fn allocate_id(&mut self) -> OrderId {
        self.next_seq += 1;
        OrderId(self.next_seq)
    }

    /// Rest a new order. Any existing order for the same identifier is
    /// superseded and logged; the book never holds two orders per asset.
    pub fn place(&mut self, order: Order, now: NaiveDate) {
        debug_assert!(order.is_resting(), "placed order must be resting");
        if let Some(mut existing) = self.resting.remove(&order.identifier) {
            existing.supersede(now);
            self.log.push(existing);
        }
        self.resting.insert(order.identifier.clone(), order);
    }

    /// Pull an order out for processing. The caller must either `close` it
    /// or `requeue` it.
    pub fn take(&mut self, identifier: &str) -> Option<Order> {
        self.resting.remove(identifier)
    }

    /// Return a still-resting order to its slot untouched.
    pub fn requeue(&mut self, order: Order) {
        debug_assert!(order.is_resting(), "requeued order must be resting");
        debug_assert!(
            !self.resting.contains_key(&order.identifier),
            "requeue into an occupied slot"
        );
        self.resting.insert(order.identifier.clone(), order);
    }

    /// Move a terminal order to the log.
    pub fn close(&mut self, order: Order) {
        debug_assert!(!order.is_resting(), "closed order must be terminal");
        self.log.push(order);
    }

    pub fn get(&self, identifier: &str) -> Option<&Order> {
        self.resting.get(identifier)
    }

    /// Identifiers with a resting order, in processing order.
    pub fn resting_identifiers(&self) -> Vec<String> {
        self.resting.keys().cloned().collect()
    }

    pub fn resting(&self) -> &BTreeMap<String, Order> {
        &self.resting
    }

    pub fn len(&self) -> usize {
        self.resting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resting.is_empty()
    }

    /// Every order that has left the book, in close order.
    pub fn log(&self) -> &[Order] {
        &self.log
    }
}
