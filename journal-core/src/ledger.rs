//! Scale-out ledger: partial exits with the sizing invariant enforced.
//!
//! **Invariant:** `sum(leg.size) <= position.size` (within [`SIZE_EPSILON`])
//! after every operation. Remaining size is always recomputed from the legs,
//! never stored.
//!
//! Every operation validates against the would-be ledger first and only then
//! writes, so a rejected call leaves the position untouched.

use tracing::debug;

use crate::domain::position::require_positive;
use crate::domain::{LegId, LegPatch, Position, PositionStatus, ScaleOutLeg};
use crate::error::PositionError;

/// Tolerance for size comparisons. Absorbs sub-cent residue from repeated
/// decimal arithmetic so it is never reported as over-allocation.
pub const SIZE_EPSILON: f64 = 1e-9;

impl Position {
    /// Sum of all leg sizes.
    pub fn total_closed_size(&self) -> f64 {
        self.scale_outs.iter().map(|leg| leg.size).sum()
    }

    /// Size still open. Anything within [`SIZE_EPSILON`] of zero is zero, so
    /// a Closed position always reports nothing remaining.
    pub fn remaining_size(&self) -> f64 {
        let remaining = self.size() - self.total_closed_size();
        if remaining <= SIZE_EPSILON {
            0.0
        } else {
            remaining
        }
    }

    /// Append a leg closing `size` units at `price`.
    ///
    /// Fails with `InvalidTransition` while Planned, and with `OverAllocation`
    /// if the position is Closed, `size <= 0`, or the leg would close more
    /// than remains.
    pub fn add_leg(&mut self, size: f64, price: f64) -> Result<LegId, PositionError> {
        let status = self.status();
        if status == PositionStatus::Planned {
            return Err(PositionError::InvalidTransition {
                operation: "add_leg",
                status,
            });
        }
        if status.is_closed() {
            return Err(PositionError::OverAllocation {
                requested: size,
                available: 0.0,
            });
        }
        require_positive("price", price)?;
        self.check_allocation(None, size)?;

        let id = self.allocate_leg_id();
        self.scale_outs.push(ScaleOutLeg { id, size, price });

        debug!(
            position = %self.id,
            leg = %id,
            size,
            price,
            status = %self.status(),
            "scale-out added"
        );
        Ok(id)
    }

    /// Patch an existing leg's size and/or price.
    ///
    /// The invariant is checked against the other legs plus the patched size.
    pub fn update_leg(&mut self, id: LegId, patch: LegPatch) -> Result<(), PositionError> {
        let index = self.leg_index(id)?;
        if let Some(price) = patch.price {
            require_positive("price", price)?;
        }
        if let Some(size) = patch.size {
            self.check_allocation(Some(id), size)?;
        }

        let leg = &mut self.scale_outs[index];
        if let Some(size) = patch.size {
            leg.size = size;
        }
        if let Some(price) = patch.price {
            leg.price = price;
        }

        debug!(
            position = %self.id,
            leg = %id,
            size = ?patch.size,
            price = ?patch.price,
            status = %self.status(),
            "scale-out updated"
        );
        Ok(())
    }

    /// Remove a leg. Sibling legs keep their sizes, prices and order.
    ///
    /// Removing a leg from a Closed position reopens it (undo).
    pub fn remove_leg(&mut self, id: LegId) -> Result<ScaleOutLeg, PositionError> {
        let index = self.leg_index(id)?;
        let removed = self.scale_outs.remove(index);
        debug!(
            position = %self.id,
            leg = %id,
            status = %self.status(),
            "scale-out removed"
        );
        Ok(removed)
    }

    /// Close everything that remains with one final leg at `price`.
    pub fn close_remaining(&mut self, price: f64) -> Result<LegId, PositionError> {
        let status = self.status();
        if !status.accepts_legs() {
            return Err(PositionError::InvalidTransition {
                operation: "close_remaining",
                status,
            });
        }
        let remaining = self.size() - self.total_closed_size();
        self.add_leg(remaining, price)
    }

    /// Convert a percentage partial close into an absolute size.
    ///
    /// Percentages are relative to the size *remaining now*, not the original
    /// entry size: closing 50% twice leaves 25% of the position open.
    pub fn size_for_percent(&self, percent: f64) -> Result<f64, PositionError> {
        if !(percent.is_finite() && percent > 0.0 && percent <= 100.0) {
            return Err(PositionError::InvalidValue {
                field: "percent",
                value: percent,
            });
        }
        let status = self.status();
        if !status.accepts_legs() {
            return Err(PositionError::InvalidTransition {
                operation: "size_for_percent",
                status,
            });
        }
        Ok(self.remaining_size() * percent / 100.0)
    }

    fn leg_index(&self, id: LegId) -> Result<usize, PositionError> {
        self.scale_outs
            .iter()
            .position(|leg| leg.id == id)
            .ok_or(PositionError::NotFound(id))
    }

    /// Check that replacing leg `replacing` (or appending, if `None`) with a
    /// leg of `size` keeps the ledger within the position size.
    fn check_allocation(&self, replacing: Option<LegId>, size: f64) -> Result<(), PositionError> {
        let others: f64 = self
            .scale_outs
            .iter()
            .filter(|leg| Some(leg.id) != replacing)
            .map(|leg| leg.size)
            .sum();
        let available = (self.size() - others).max(0.0);

        if !size.is_finite() || size <= 0.0 || others + size > self.size() + SIZE_EPSILON {
            debug!(
                position = %self.id,
                requested = size,
                available,
                "scale-out rejected"
            );
            return Err(PositionError::OverAllocation {
                requested: size,
                available,
            });
        }
        Ok(())
    }
}
