//! Journal Core: position lifecycle and profit/loss engine.
//!
//! This crate tracks a single trading position from plan to closure:
//! - Numeric input normalization for raw form fields
//! - Position model with validated mutators (entry, breakeven, manual P&L)
//! - Scale-out ledger with the closed-size invariant
//! - Realized / unrealized / total P&L
//! - Risk, reward and R-multiple with division guards
//! - Derived lifecycle status (Planned → Open → PartiallyClosed → Closed)
//! - Storage and account balance collaborator traits
//!
//! The engine is synchronous and performs no I/O.

pub mod domain;
pub mod error;
pub mod ledger;
pub mod normalize;
pub mod pnl;
pub mod risk;
pub mod store;
pub mod summary;

pub use domain::{
    AccountId, Breakeven, Direction, LegId, LegPatch, Position, PositionId, PositionStatus,
    ScaleOutLeg,
};
pub use error::PositionError;
pub use ledger::SIZE_EPSILON;
pub use normalize::{normalize, normalize_opt};
pub use pnl::Outcome;
pub use store::{AccountBalances, InMemoryStore, PositionStore, StoreError};
pub use summary::PositionSummary;
