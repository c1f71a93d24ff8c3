//! Risk/reward calculation.
//!
//! Every ratio here guards its denominator: a zero or unset denominator
//! yields `None`, never `NaN` or infinity.

use crate::domain::Position;
use crate::pnl::total_pnl;
use crate::store::AccountBalances;

/// `|entry - stop|`, if both are set.
pub fn risk_per_unit(position: &Position) -> Option<f64> {
    let entry = position.entry_price()?;
    let stop = position.stop_price()?;
    Some((entry - stop).abs())
}

/// Risk per unit times the full position size.
pub fn risk_amount(position: &Position) -> Option<f64> {
    risk_per_unit(position).map(|per_unit| per_unit * position.size())
}

/// Risk amount as a percentage of the account balance.
///
/// `None` when the balance is unset or zero, or the risk amount is unknown.
pub fn risk_percent(position: &Position, account_balance: Option<f64>) -> Option<f64> {
    let balance = account_balance.filter(|b| *b != 0.0 && b.is_finite())?;
    risk_amount(position).map(|risk| risk / balance * 100.0)
}

/// [`risk_percent`] with the balance looked up for the position's account.
pub fn risk_percent_for(position: &Position, balances: &dyn AccountBalances) -> Option<f64> {
    let balance = position
        .account_id()
        .and_then(|account| balances.account_balance(account));
    risk_percent(position, balance)
}

/// `|target - entry|`, if both are set.
pub fn reward_per_unit(position: &Position) -> Option<f64> {
    let entry = position.entry_price()?;
    let target = position.target_price()?;
    Some((target - entry).abs())
}

/// Reward per unit times the full position size.
pub fn reward_amount(position: &Position) -> Option<f64> {
    reward_per_unit(position).map(|per_unit| per_unit * position.size())
}

/// Planned reward in units of risk. `None` for zero or unknown risk.
pub fn r_multiple(position: &Position) -> Option<f64> {
    let risk = risk_per_unit(position).filter(|r| *r != 0.0)?;
    reward_per_unit(position).map(|reward| reward / risk)
}

/// Achieved result in units of risk: total P&L over risk amount.
pub fn realized_r(position: &Position, mark_price: Option<f64>) -> Option<f64> {
    let risk = risk_amount(position).filter(|r| *r != 0.0)?;
    Some(total_pnl(position, mark_price) / risk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Direction, PositionId};
    use std::collections::HashMap;

    fn position(stop: Option<f64>, target: Option<f64>) -> Position {
        let mut pos = Position::with_id(PositionId::new("t"), "EURUSD");
        pos.set_entry(Direction::Long, Some(100.0), stop, target, Some(10.0))
            .unwrap();
        pos
    }

    #[test]
    fn risk_requires_entry_and_stop() {
        let planned = Position::with_id(PositionId::new("t"), "EURUSD");
        assert_eq!(risk_per_unit(&planned), None);
        assert_eq!(risk_per_unit(&position(None, None)), None);
        assert_eq!(risk_amount(&position(None, None)), None);
    }

    #[test]
    fn risk_amount_uses_full_size() {
        let mut pos = position(Some(95.0), None);
        assert_eq!(risk_per_unit(&pos), Some(5.0));
        assert_eq!(risk_amount(&pos), Some(50.0));
        pos.add_leg(4.0, 101.0).unwrap();
        assert_eq!(risk_amount(&pos), Some(50.0));
    }

    #[test]
    fn short_risk_is_absolute() {
        let mut pos = Position::with_id(PositionId::new("t"), "EURUSD");
        pos.set_entry(Direction::Short, Some(100.0), Some(104.0), Some(92.0), Some(1.0))
            .unwrap();
        assert_eq!(risk_per_unit(&pos), Some(4.0));
        assert_eq!(reward_per_unit(&pos), Some(8.0));
        assert_eq!(r_multiple(&pos), Some(2.0));
    }

    #[test]
    fn risk_percent_of_balance() {
        let pos = position(Some(95.0), None);
        assert_eq!(risk_percent(&pos, Some(5_000.0)), Some(1.0));
    }

    #[test]
    fn risk_percent_guards_zero_and_missing_balance() {
        let pos = position(Some(95.0), None);
        assert_eq!(risk_percent(&pos, Some(0.0)), None);
        assert_eq!(risk_percent(&pos, None), None);
    }

    #[test]
    fn risk_percent_via_balance_lookup() {
        let pos = position(Some(95.0), None).with_account(AccountId::new("main"));
        let mut balances = HashMap::new();
        balances.insert(AccountId::new("main"), 2_500.0);
        assert_eq!(risk_percent_for(&pos, &balances), Some(2.0));

        let orphan = position(Some(95.0), None);
        assert_eq!(risk_percent_for(&orphan, &balances), None);
    }

    #[test]
    fn r_multiple_from_target_and_stop() {
        let pos = position(Some(95.0), Some(115.0));
        assert_eq!(reward_amount(&pos), Some(150.0));
        assert_eq!(r_multiple(&pos), Some(3.0));
    }

    #[test]
    fn zero_risk_yields_no_r_multiple() {
        let pos = position(Some(100.0), Some(110.0));
        assert_eq!(risk_per_unit(&pos), Some(0.0));
        assert_eq!(r_multiple(&pos), None);
        assert_eq!(realized_r(&pos, Some(105.0)), None);
    }

    #[test]
    fn r_multiple_without_target_is_none() {
        assert_eq!(r_multiple(&position(Some(95.0), None)), None);
    }

    #[test]
    fn realized_r_in_risk_units() {
        let mut pos = position(Some(95.0), None);
        pos.close_remaining(110.0).unwrap();
        // +100 over 50 risked
        assert_eq!(realized_r(&pos, None), Some(2.0));
    }
}
