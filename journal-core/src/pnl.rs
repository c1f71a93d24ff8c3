//! Profit/loss calculation over a position and its scale-out legs.
//!
//! All values are raw, unrounded `f64`. Rounding to cents happens only at the
//! presentation boundary; rounding intermediate sums compounds error once a
//! position has three or more legs.

use serde::{Deserialize, Serialize};

use crate::domain::{Position, ScaleOutLeg};

/// Half a cent: totals inside this band classify as breakeven.
pub const BREAKEVEN_BAND: f64 = 0.005;

/// Realized P&L of one leg: `(leg.price - entry) * leg.size * sign`.
///
/// A position without an entry has no legs, so this is 0.0 in that case.
pub fn leg_pnl(position: &Position, leg: &ScaleOutLeg) -> f64 {
    match position.entry_price() {
        Some(entry) => (leg.price - entry) * leg.size * position.direction().sign(),
        None => 0.0,
    }
}

/// Sum of all legs' realized P&L.
pub fn realized_pnl(position: &Position) -> f64 {
    position
        .scale_outs()
        .iter()
        .map(|leg| leg_pnl(position, leg))
        .sum()
}

/// Hypothetical P&L of the remaining size at `mark_price`.
///
/// `None` when no mark is given, nothing remains, or there is no entry.
pub fn unrealized_pnl(position: &Position, mark_price: Option<f64>) -> Option<f64> {
    let mark = mark_price?;
    let entry = position.entry_price()?;
    let remaining = position.remaining_size();
    if remaining <= 0.0 {
        return None;
    }
    Some((mark - entry) * remaining * position.direction().sign())
}

/// Realized plus unrealized P&L, unless a manual override is set, in which
/// case the override is returned unchanged.
pub fn total_pnl(position: &Position, mark_price: Option<f64>) -> f64 {
    if let Some(manual) = position.manual_pnl_override() {
        return manual;
    }
    realized_pnl(position) + unrealized_pnl(position, mark_price).unwrap_or(0.0)
}

/// Size-weighted average exit price across legs.
pub fn average_exit_price(position: &Position) -> Option<f64> {
    let closed = position.total_closed_size();
    if closed <= 0.0 {
        return None;
    }
    let notional: f64 = position
        .scale_outs()
        .iter()
        .map(|leg| leg.price * leg.size)
        .sum();
    Some(notional / closed)
}

/// Result classification of a finished trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    pub fn from_pnl(pnl: f64) -> Self {
        if pnl > BREAKEVEN_BAND {
            Outcome::Win
        } else if pnl < -BREAKEVEN_BAND {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        }
    }
}

/// Outcome of a Closed position (manual override honored). `None` otherwise.
pub fn outcome(position: &Position) -> Option<Outcome> {
    if !position.status().is_closed() {
        return None;
    }
    Some(Outcome::from_pnl(total_pnl(position, None)))
}
