//! Clock — the single authoritative "now" for a run.
//!
//! Holds the pre-computed calendar of event dates and the trading-day subset.
//! Advancing past the end of the calendar is the normal termination signal,
//! not an error: the clock enters `ClockState::Ended` and stays there.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where the clock stands after an `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    /// Positioned on a calendar date.
    At(NaiveDate),
    /// The calendar is exhausted. Terminal.
    Ended,
}

/// Calendar-driven simulation clock.
///
/// Dates strictly increase as the clock advances (the calendar is sorted and
/// deduplicated at construction).
#[derive(Debug, Clone)]
pub struct Clock {
    calendar: Vec<NaiveDate>,
    trading_days: HashSet<NaiveDate>,
    cursor: usize,
    previous: Option<NaiveDate>,
    now: Option<NaiveDate>,
    ended: bool,
}

impl Clock {
    pub fn new(mut calendar: Vec<NaiveDate>, trading_days: Vec<NaiveDate>) -> Self {
        calendar.sort_unstable();
        calendar.dedup();
        Self {
            calendar,
            trading_days: trading_days.into_iter().collect(),
            cursor: 0,
            previous: None,
            now: None,
            ended: false,
        }
    }

    /// Every calendar date is also a trading day.
    pub fn all_trading(calendar: Vec<NaiveDate>) -> Self {
        let trading = calendar.clone();
        Self::new(calendar, trading)
    }

    /// Pop the next date from the calendar, or enter the terminal state.
    pub fn advance(&mut self) -> ClockState {
        match self.calendar.get(self.cursor) {
            Some(&date) => {
                self.cursor += 1;
                self.previous = self.now;
                self.now = Some(date);
                ClockState::At(date)
            }
            None => {
                self.ended = true;
                ClockState::Ended
            }
        }
    }

    /// Current date. `None` before the first advance and after the end.
    pub fn now(&self) -> Option<NaiveDate> {
        if self.ended {
            None
        } else {
            self.now
        }
    }

    /// Date the clock stood on before the most recent advance.
    pub fn previous(&self) -> Option<NaiveDate> {
        self.previous
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Whether the current date is in the trading-day subset.
    pub fn is_trading_day(&self) -> bool {
        self.now().is_some_and(|d| self.trading_days.contains(&d))
    }

    /// Whether the most recent advance moved to a later calendar date.
    pub fn new_day(&self) -> bool {
        match (self.previous, self.now()) {
            (Some(prev), Some(now)) => now > prev,
            (None, Some(_)) => true,
            _ => false,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.calendar.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.calendar.last().copied()
    }
}
