//! Domain types for the trading journal position engine

pub mod ids;
pub mod leg;
pub mod position;
pub mod status;

pub use ids::{AccountId, LegId, PositionId};
pub use leg::{LegPatch, ScaleOutLeg};
pub use position::{Breakeven, Direction, Position};
pub use status::PositionStatus;
