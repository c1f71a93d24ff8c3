//! Static account balances from configuration.

use std::collections::BTreeMap;

use journal_core::{AccountBalances, AccountId};

use crate::config::JournalConfig;

/// Account balance lookup backed by the `[accounts]` config table.
#[derive(Debug, Clone, Default)]
pub struct BalanceBook {
    balances: BTreeMap<AccountId, f64>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &JournalConfig) -> Self {
        let balances = config
            .accounts
            .iter()
            .map(|(name, account)| (AccountId::new(name.clone()), account.balance))
            .collect();
        Self { balances }
    }

    pub fn set(&mut self, account: AccountId, balance: f64) {
        self.balances.insert(account, balance);
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, f64)> {
        self.balances.iter().map(|(id, balance)| (id, *balance))
    }
}

impl AccountBalances for BalanceBook {
    fn account_balance(&self, account: &AccountId) -> Option<f64> {
        self.balances.get(account).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::risk::risk_percent_for;
    use journal_core::{Direction, Position};

    #[test]
    fn lookup_from_config() {
        let config = JournalConfig::from_toml("[accounts.main]\nbalance = 5000.0\n").unwrap();
        let book = config.balance_book();
        assert_eq!(book.account_balance(&AccountId::new("main")), Some(5000.0));
        assert_eq!(book.account_balance(&AccountId::new("other")), None);
    }

    #[test]
    fn drives_risk_percent() {
        let mut book = BalanceBook::new();
        book.set(AccountId::new("main"), 5000.0);

        let mut pos = Position::new("ES").with_account(AccountId::new("main"));
        pos.set_entry(Direction::Long, Some(100.0), Some(95.0), None, Some(10.0))
            .unwrap();
        assert_eq!(risk_percent_for(&pos, &book), Some(1.0));
    }

    #[test]
    fn zero_balance_yields_no_percent() {
        let mut book = BalanceBook::new();
        book.set(AccountId::new("empty"), 0.0);

        let mut pos = Position::new("ES").with_account(AccountId::new("empty"));
        pos.set_entry(Direction::Long, Some(100.0), Some(95.0), None, Some(10.0))
            .unwrap();
        assert_eq!(risk_percent_for(&pos, &book), None);
    }
}
