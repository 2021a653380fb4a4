//! Continuation back-adjustment — the numerically delicate piece of rolling.
//!
//! A continuation series stitches successive front contracts into one price
//! path. At each roll the new front typically trades at a different level
//! than the old one; the additive offset absorbs that jump so the stitched
//! series has no discontinuity. Kept as pure functions so the arithmetic is
//! testable in isolation.

use crate::domain::Bar;

/// Offset change introduced by one roll: the old front's close minus the new
/// front's close, both observed at the roll boundary.
///
/// Adding the accumulated offset to the new front's prices continues the
/// series at the old front's level.
pub fn roll_offset_delta(old_front_close: f64, new_front_close: f64) -> f64 {
    old_front_close - new_front_close
}

/// Synthesize a continuation bar from the current front contract's bar.
///
/// Prices shift by the accumulated offset; open interest passes through;
/// volume passes through, optionally normalized by open interest.
pub fn back_adjust_bar(front: &Bar, offset: f64, normalize_volume: bool) -> Bar {
    let volume = if normalize_volume && front.open_interest > 0.0 {
        front.volume / front.open_interest
    } else {
        front.volume
    };
    Bar {
        open: front.open + offset,
        high: front.high + offset,
        low: front.low + offset,
        close: front.close + offset,
        volume,
        open_interest: front.open_interest,
    }
}
