//! Collaborator interfaces: persistence and account balance lookup.
//!
//! The engine performs no I/O. Callers load a position, apply engine
//! operations, and save the whole value back through a [`PositionStore`].

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::domain::{AccountId, Position, PositionId};

/// Errors from storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("position {0} not found")]
    NotFound(PositionId),

    #[error("invalid position id '{0}'")]
    InvalidId(PositionId),

    #[error("serialization failed for position {id}: {source}")]
    Serialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Backing store for positions.
///
/// `save` is an idempotent upsert. A saved position must load back with
/// identical field values, including scale-out order.
pub trait PositionStore {
    fn load(&self, id: &PositionId) -> Result<Position, StoreError>;

    fn save(&mut self, position: &Position) -> Result<(), StoreError>;

    fn delete(&mut self, id: &PositionId) -> Result<(), StoreError>;

    /// IDs of every stored position, in ascending order.
    fn list(&self) -> Result<Vec<PositionId>, StoreError>;
}

/// Account balance lookup, used only by risk percentage.
pub trait AccountBalances {
    fn account_balance(&self, account: &AccountId) -> Option<f64>;
}

impl AccountBalances for HashMap<AccountId, f64> {
    fn account_balance(&self, account: &AccountId) -> Option<f64> {
        self.get(account).copied()
    }
}

impl AccountBalances for BTreeMap<AccountId, f64> {
    fn account_balance(&self, account: &AccountId) -> Option<f64> {
        self.get(account).copied()
    }
}

/// In-memory store. Holds owned copies, so callers never alias stored state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    positions: BTreeMap<PositionId, Position>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PositionStore for InMemoryStore {
    fn load(&self, id: &PositionId) -> Result<Position, StoreError> {
        self.positions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn save(&mut self, position: &Position) -> Result<(), StoreError> {
        self.positions.insert(position.id().clone(), position.clone());
        Ok(())
    }

    fn delete(&mut self, id: &PositionId) -> Result<(), StoreError> {
        self.positions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn list(&self) -> Result<Vec<PositionId>, StoreError> {
        Ok(self.positions.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;

    fn sample() -> Position {
        let mut pos = Position::with_id(PositionId::new("abc"), "GBPUSD");
        pos.set_entry(Direction::Short, Some(1.27), Some(1.28), Some(1.25), Some(3.0))
            .unwrap();
        pos.add_leg(1.0, 1.265).unwrap();
        pos.add_leg(1.5, 1.26).unwrap();
        pos
    }

    #[test]
    fn save_then_load_is_identical() {
        let mut store = InMemoryStore::new();
        let pos = sample();
        store.save(&pos).unwrap();
        assert_eq!(store.load(pos.id()).unwrap(), pos);
    }

    #[test]
    fn save_is_idempotent() {
        let mut store = InMemoryStore::new();
        let pos = sample();
        store.save(&pos).unwrap();
        store.save(&pos).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(pos.id()).unwrap(), pos);
    }

    #[test]
    fn delete_removes_position_and_legs() {
        let mut store = InMemoryStore::new();
        let pos = sample();
        store.save(&pos).unwrap();
        store.delete(pos.id()).unwrap();
        assert!(matches!(store.load(pos.id()), Err(StoreError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let mut store = InMemoryStore::new();
        assert!(matches!(
            store.delete(&PositionId::new("nope")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn list_is_sorted() {
        let mut store = InMemoryStore::new();
        store.save(&Position::with_id(PositionId::new("b"), "X")).unwrap();
        store.save(&Position::with_id(PositionId::new("a"), "Y")).unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec![PositionId::new("a"), PositionId::new("b")]
        );
    }
}
