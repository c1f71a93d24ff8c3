//! PositionSummary: every derived display value in one snapshot.
//!
//! Values are raw and unrounded; formatting belongs to the caller.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Position, PositionId, PositionStatus};
use crate::pnl::{self, Outcome};
use crate::risk;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub id: PositionId,
    pub symbol: String,
    pub direction: Direction,
    pub status: PositionStatus,

    // ── Size ──
    pub size: f64,
    pub closed_size: f64,
    pub remaining_size: f64,
    pub leg_count: usize,
    pub average_exit_price: Option<f64>,

    // ── PnL ──
    pub realized_pnl: f64,
    pub unrealized_pnl: Option<f64>,
    pub total_pnl: f64,
    pub manual_override: bool,
    pub outcome: Option<Outcome>,

    // ── Risk/reward ──
    pub risk_per_unit: Option<f64>,
    pub risk_amount: Option<f64>,
    pub risk_percent: Option<f64>,
    pub reward_per_unit: Option<f64>,
    pub reward_amount: Option<f64>,
    pub r_multiple: Option<f64>,
    pub realized_r: Option<f64>,
}

impl PositionSummary {
    /// Compute every derived value for `position` at an optional mark price
    /// and account balance.
    pub fn compute(
        position: &Position,
        mark_price: Option<f64>,
        account_balance: Option<f64>,
    ) -> Self {
        Self {
            id: position.id().clone(),
            symbol: position.symbol().to_string(),
            direction: position.direction(),
            status: position.status(),
            size: position.size(),
            closed_size: position.total_closed_size(),
            remaining_size: position.remaining_size(),
            leg_count: position.scale_outs().len(),
            average_exit_price: pnl::average_exit_price(position),
            realized_pnl: pnl::realized_pnl(position),
            unrealized_pnl: pnl::unrealized_pnl(position, mark_price),
            total_pnl: pnl::total_pnl(position, mark_price),
            manual_override: position.manual_pnl_override().is_some(),
            outcome: pnl::outcome(position),
            risk_per_unit: risk::risk_per_unit(position),
            risk_amount: risk::risk_amount(position),
            risk_percent: risk::risk_percent(position, account_balance),
            reward_per_unit: risk::reward_per_unit(position),
            reward_amount: risk::reward_amount(position),
            r_multiple: risk::r_multiple(position),
            realized_r: risk::realized_r(position, mark_price),
        }
    }
}
