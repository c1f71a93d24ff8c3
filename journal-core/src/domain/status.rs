//! Position lifecycle state machine.
//!
//! Status is never stored. It is a pure function of whether an entry exists,
//! how much size the scale-out legs have closed, and the total position size:
//!
//! ```text
//! Planned ──set_entry──▶ Open ──add_leg──▶ PartiallyClosed ──add_leg──▶ Closed
//!                          ▲                    ▲   │                    │
//!                          └────remove_leg──────┴───┴────remove_leg──────┘
//! ```
//!
//! Because it is recomputed after every mutation, status cannot drift from
//! the ledger it describes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::SIZE_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    /// No entry recorded yet.
    Planned,
    /// Entered, nothing closed.
    Open,
    /// Some legs closed, size remains.
    PartiallyClosed,
    /// Legs account for the full position size.
    Closed,
}

impl PositionStatus {
    /// Derive status from `(has_entry, total_closed_size, size)`.
    ///
    /// Closed size within [`SIZE_EPSILON`] of the full size counts as closed,
    /// absorbing residue from repeated decimal arithmetic.
    pub fn derive(has_entry: bool, total_closed: f64, size: f64) -> Self {
        if !has_entry {
            return PositionStatus::Planned;
        }
        if total_closed <= 0.0 {
            PositionStatus::Open
        } else if size - total_closed <= SIZE_EPSILON {
            PositionStatus::Closed
        } else {
            PositionStatus::PartiallyClosed
        }
    }

    /// Whether scale-out legs may still be added.
    pub fn accepts_legs(self) -> bool {
        matches!(self, PositionStatus::Open | PositionStatus::PartiallyClosed)
    }

    pub fn is_closed(self) -> bool {
        self == PositionStatus::Closed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionStatus::Planned => "planned",
            PositionStatus::Open => "open",
            PositionStatus::PartiallyClosed => "partially_closed",
            PositionStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_entry_is_planned_regardless_of_sizes() {
        assert_eq!(PositionStatus::derive(false, 0.0, 0.0), PositionStatus::Planned);
        assert_eq!(PositionStatus::derive(false, 5.0, 10.0), PositionStatus::Planned);
    }

    #[test]
    fn entered_with_nothing_closed_is_open() {
        assert_eq!(PositionStatus::derive(true, 0.0, 10.0), PositionStatus::Open);
    }

    #[test]
    fn partial_close() {
        assert_eq!(
            PositionStatus::derive(true, 4.0, 10.0),
            PositionStatus::PartiallyClosed
        );
    }

    #[test]
    fn full_close() {
        assert_eq!(PositionStatus::derive(true, 10.0, 10.0), PositionStatus::Closed);
    }

    #[test]
    fn float_residue_still_counts_as_closed() {
        // 0.1 + 0.2 != 0.3 in binary floating point
        let closed = 0.1 + 0.2;
        assert_eq!(PositionStatus::derive(true, closed, 0.3), PositionStatus::Closed);
    }

    #[test]
    fn only_open_states_accept_legs() {
        assert!(!PositionStatus::Planned.accepts_legs());
        assert!(PositionStatus::Open.accepts_legs());
        assert!(PositionStatus::PartiallyClosed.accepts_legs());
        assert!(!PositionStatus::Closed.accepts_legs());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&PositionStatus::PartiallyClosed).unwrap();
        assert_eq!(json, "\"partially_closed\"");
    }
}
