//! Position: one trade from plan through entry, partial exits and closure.
//!
//! Fields are private to the crate. The only mutation surface is the
//! validated operations here and in [`crate::ledger`]; each one either
//! succeeds completely or returns an error with the position untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ids::{AccountId, LegId, PositionId};
use super::leg::ScaleOutLeg;
use super::status::PositionStatus;
use crate::error::PositionError;
use crate::ledger::SIZE_EPSILON;

/// Trade direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Long,
    Short,
}

impl Direction {
    /// +1 for Long, −1 for Short. Multiplies every price difference.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(format!("unknown direction '{other}' (expected long or short)")),
        }
    }
}

/// Stop-moved-to-breakeven marker. Display/audit only; closes no size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakeven {
    pub moved: bool,
    pub price: Option<f64>,
}

/// A single journaled position.
///
/// Deserialization goes through [`StoredPosition`] and re-checks the ledger,
/// so a document cannot bring in state the mutators would have rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredPosition")]
pub struct Position {
    pub(crate) id: PositionId,
    pub(crate) symbol: String,
    #[serde(default)]
    pub(crate) account_id: Option<AccountId>,
    #[serde(default)]
    pub(crate) trade_date: Option<NaiveDate>,

    pub(crate) direction: Direction,
    pub(crate) entry_price: Option<f64>,
    pub(crate) stop_price: Option<f64>,
    pub(crate) target_price: Option<f64>,
    pub(crate) size: Option<f64>,

    /// Insertion order is execution order.
    #[serde(default)]
    pub(crate) scale_outs: Vec<ScaleOutLeg>,
    #[serde(default)]
    pub(crate) next_leg_id: u64,

    #[serde(default)]
    pub(crate) breakeven: Breakeven,
    #[serde(default)]
    pub(crate) manual_pnl_override: Option<f64>,
}

/// Wire shape of [`Position`] before validation.
#[derive(Deserialize)]
struct StoredPosition {
    id: PositionId,
    symbol: String,
    #[serde(default)]
    account_id: Option<AccountId>,
    #[serde(default)]
    trade_date: Option<NaiveDate>,
    #[serde(default)]
    direction: Direction,
    #[serde(default)]
    entry_price: Option<f64>,
    #[serde(default)]
    stop_price: Option<f64>,
    #[serde(default)]
    target_price: Option<f64>,
    #[serde(default)]
    size: Option<f64>,
    #[serde(default)]
    scale_outs: Vec<ScaleOutLeg>,
    #[serde(default)]
    next_leg_id: u64,
    #[serde(default)]
    breakeven: Breakeven,
    #[serde(default)]
    manual_pnl_override: Option<f64>,
}

impl TryFrom<StoredPosition> for Position {
    type Error = PositionError;

    fn try_from(raw: StoredPosition) -> Result<Self, Self::Error> {
        let mut position = Position {
            id: raw.id,
            symbol: raw.symbol,
            account_id: raw.account_id,
            trade_date: raw.trade_date,
            direction: raw.direction,
            entry_price: raw.entry_price,
            stop_price: raw.stop_price,
            target_price: raw.target_price,
            size: raw.size,
            scale_outs: raw.scale_outs,
            next_leg_id: raw.next_leg_id,
            breakeven: raw.breakeven,
            manual_pnl_override: raw.manual_pnl_override,
        };
        position.check_loaded()?;
        Ok(position)
    }
}

impl Position {
    /// New Planned position with a freshly generated ID.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_id(PositionId::generate(), symbol)
    }

    /// New Planned position with a caller-chosen ID.
    pub fn with_id(id: PositionId, symbol: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            account_id: None,
            trade_date: None,
            direction: Direction::Long,
            entry_price: None,
            stop_price: None,
            target_price: None,
            size: None,
            scale_outs: Vec::new(),
            next_leg_id: 1,
            breakeven: Breakeven::default(),
            manual_pnl_override: None,
        }
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_trade_date(mut self, date: NaiveDate) -> Self {
        self.trade_date = Some(date);
        self
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn id(&self) -> &PositionId {
        &self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    pub fn trade_date(&self) -> Option<NaiveDate> {
        self.trade_date
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    pub fn stop_price(&self) -> Option<f64> {
        self.stop_price
    }

    pub fn target_price(&self) -> Option<f64> {
        self.target_price
    }

    /// Total size at entry, 0.0 while Planned.
    pub fn size(&self) -> f64 {
        self.size.unwrap_or(0.0)
    }

    pub fn scale_outs(&self) -> &[ScaleOutLeg] {
        &self.scale_outs
    }

    pub fn leg(&self, id: LegId) -> Option<&ScaleOutLeg> {
        self.scale_outs.iter().find(|leg| leg.id == id)
    }

    pub fn breakeven(&self) -> Breakeven {
        self.breakeven
    }

    pub fn manual_pnl_override(&self) -> Option<f64> {
        self.manual_pnl_override
    }

    pub fn has_entry(&self) -> bool {
        self.entry_price.is_some() && self.size.is_some()
    }

    /// Lifecycle status, recomputed on every call.
    pub fn status(&self) -> PositionStatus {
        PositionStatus::derive(self.has_entry(), self.total_closed_size(), self.size())
    }

    // ── Model mutators ─────────────────────────────────────────────────

    /// Record (or re-record) the entry.
    ///
    /// Allowed only before any scale-out exists, i.e. while Planned or Open.
    /// `entry_price` and `size` are required; stop and target are optional.
    pub fn set_entry(
        &mut self,
        direction: Direction,
        entry_price: Option<f64>,
        stop_price: Option<f64>,
        target_price: Option<f64>,
        size: Option<f64>,
    ) -> Result<(), PositionError> {
        if !self.scale_outs.is_empty() {
            return Err(PositionError::InvalidTransition {
                operation: "set_entry",
                status: self.status(),
            });
        }
        let entry_price = entry_price.ok_or(PositionError::MissingRequiredField("entry_price"))?;
        let size = size.ok_or(PositionError::MissingRequiredField("size"))?;

        require_positive("entry_price", entry_price)?;
        require_positive("size", size)?;
        if let Some(stop) = stop_price {
            require_positive("stop_price", stop)?;
        }
        if let Some(target) = target_price {
            require_positive("target_price", target)?;
        }

        self.direction = direction;
        self.entry_price = Some(entry_price);
        self.stop_price = stop_price;
        self.target_price = target_price;
        self.size = Some(size);

        debug!(
            position = %self.id,
            direction = direction.as_str(),
            entry_price,
            size,
            "entry recorded"
        );
        Ok(())
    }

    /// Mark (or unmark) the stop as moved to breakeven.
    pub fn set_breakeven(&mut self, moved: bool, price: Option<f64>) -> Result<(), PositionError> {
        let status = self.status();
        if status.is_closed() {
            return Err(PositionError::InvalidTransition {
                operation: "set_breakeven",
                status,
            });
        }
        if let Some(p) = price {
            require_positive("breakeven_price", p)?;
        }
        self.breakeven = Breakeven { moved, price };
        debug!(position = %self.id, moved, ?price, "breakeven updated");
        Ok(())
    }

    /// Set or clear the manual P&L override. Allowed in every state.
    pub fn set_manual_pnl(&mut self, value: Option<f64>) -> Result<(), PositionError> {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(PositionError::InvalidValue {
                    field: "manual_pnl",
                    value: v,
                });
            }
        }
        self.manual_pnl_override = value;
        debug!(position = %self.id, ?value, "manual pnl override updated");
        Ok(())
    }

    /// Re-check a deserialized position and repair its leg counter.
    ///
    /// Leg IDs must be unique and `next_leg_id` must sit above every one of
    /// them, otherwise a new leg could reuse an existing ID.
    fn check_loaded(&mut self) -> Result<(), PositionError> {
        for (field, value) in [
            ("entry_price", self.entry_price),
            ("stop_price", self.stop_price),
            ("target_price", self.target_price),
            ("size", self.size),
            ("breakeven_price", self.breakeven.price),
        ] {
            if let Some(v) = value {
                require_positive(field, v)?;
            }
        }
        if let Some(v) = self.manual_pnl_override {
            if !v.is_finite() {
                return Err(PositionError::InvalidValue {
                    field: "manual_pnl",
                    value: v,
                });
            }
        }

        if !self.scale_outs.is_empty() && !self.has_entry() {
            return Err(PositionError::InvalidTransition {
                operation: "scale_outs",
                status: PositionStatus::Planned,
            });
        }
        let mut max_id = 0;
        for (i, leg) in self.scale_outs.iter().enumerate() {
            require_positive("leg size", leg.size)?;
            require_positive("leg price", leg.price)?;
            if self.scale_outs[..i].iter().any(|other| other.id == leg.id) {
                return Err(PositionError::DuplicateLeg(leg.id));
            }
            max_id = max_id.max(leg.id.0);
        }
        let closed = self.total_closed_size();
        if closed > self.size() + SIZE_EPSILON {
            return Err(PositionError::OverAllocation {
                requested: closed,
                available: self.size(),
            });
        }

        self.next_leg_id = self.next_leg_id.max(max_id.saturating_add(1)).max(1);
        Ok(())
    }

    pub(crate) fn allocate_leg_id(&mut self) -> LegId {
        let id = LegId(self.next_leg_id);
        self.next_leg_id += 1;
        id
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), PositionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PositionError::InvalidValue { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned() -> Position {
        Position::with_id(PositionId::new("p1"), "EURUSD")
    }

    #[test]
    fn new_position_is_planned() {
        let pos = planned();
        assert_eq!(pos.status(), PositionStatus::Planned);
        assert!(!pos.has_entry());
        assert_eq!(pos.size(), 0.0);
        assert!(pos.scale_outs().is_empty());
    }

    #[test]
    fn set_entry_opens_position() {
        let mut pos = planned();
        pos.set_entry(Direction::Long, Some(1.1), Some(1.095), Some(1.115), Some(10.0))
            .unwrap();
        assert_eq!(pos.status(), PositionStatus::Open);
        assert_eq!(pos.entry_price(), Some(1.1));
        assert_eq!(pos.size(), 10.0);
    }

    #[test]
    fn set_entry_without_entry_price_stays_planned() {
        let mut pos = planned();
        let err = pos
            .set_entry(Direction::Long, None, Some(1.0), None, Some(10.0))
            .unwrap_err();
        assert_eq!(err, PositionError::MissingRequiredField("entry_price"));
        assert_eq!(pos, planned());
    }

    #[test]
    fn set_entry_without_size_stays_planned() {
        let mut pos = planned();
        let err = pos
            .set_entry(Direction::Short, Some(1.2), None, None, None)
            .unwrap_err();
        assert_eq!(err, PositionError::MissingRequiredField("size"));
        assert_eq!(pos.status(), PositionStatus::Planned);
    }

    #[test]
    fn set_entry_rejects_non_positive_size() {
        let mut pos = planned();
        let err = pos
            .set_entry(Direction::Long, Some(1.1), None, None, Some(0.0))
            .unwrap_err();
        assert!(matches!(err, PositionError::InvalidValue { field: "size", .. }));
        assert_eq!(pos, planned());
    }

    #[test]
    fn set_entry_can_be_edited_while_open() {
        let mut pos = planned();
        pos.set_entry(Direction::Long, Some(1.1), None, None, Some(10.0))
            .unwrap();
        pos.set_entry(Direction::Short, Some(1.2), Some(1.21), None, Some(5.0))
            .unwrap();
        assert_eq!(pos.direction(), Direction::Short);
        assert_eq!(pos.size(), 5.0);
        assert_eq!(pos.stop_price(), Some(1.21));
    }

    #[test]
    fn set_entry_rejected_after_scale_out() {
        let mut pos = planned();
        pos.set_entry(Direction::Long, Some(1.1), None, None, Some(10.0))
            .unwrap();
        pos.add_leg(4.0, 1.108).unwrap();
        let before = pos.clone();

        let err = pos
            .set_entry(Direction::Long, Some(1.2), None, None, Some(2.0))
            .unwrap_err();
        assert!(matches!(err, PositionError::InvalidTransition { .. }));
        assert_eq!(pos, before);
    }

    #[test]
    fn breakeven_is_metadata_only() {
        let mut pos = planned();
        pos.set_entry(Direction::Long, Some(1.1), Some(1.095), None, Some(10.0))
            .unwrap();
        pos.set_breakeven(true, Some(1.1)).unwrap();
        assert_eq!(
            pos.breakeven(),
            Breakeven {
                moved: true,
                price: Some(1.1)
            }
        );
        assert_eq!(pos.status(), PositionStatus::Open);
        assert_eq!(pos.stop_price(), Some(1.095));
    }

    #[test]
    fn breakeven_rejected_when_closed() {
        let mut pos = planned();
        pos.set_entry(Direction::Long, Some(1.1), None, None, Some(1.0))
            .unwrap();
        pos.close_remaining(1.2).unwrap();
        let err = pos.set_breakeven(true, None).unwrap_err();
        assert_eq!(
            err,
            PositionError::InvalidTransition {
                operation: "set_breakeven",
                status: PositionStatus::Closed
            }
        );
    }

    #[test]
    fn manual_pnl_set_and_clear_in_any_state() {
        let mut pos = planned();
        pos.set_manual_pnl(Some(500.0)).unwrap();
        assert_eq!(pos.manual_pnl_override(), Some(500.0));
        pos.set_manual_pnl(None).unwrap();
        assert_eq!(pos.manual_pnl_override(), None);
    }

    #[test]
    fn manual_pnl_rejects_nan() {
        let mut pos = planned();
        assert!(pos.set_manual_pnl(Some(f64::NAN)).is_err());
        assert_eq!(pos.manual_pnl_override(), None);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("Long".parse::<Direction>().unwrap(), Direction::Long);
        assert_eq!(" short ".parse::<Direction>().unwrap(), Direction::Short);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn direction_sign() {
        assert_eq!(Direction::Long.sign(), 1.0);
        assert_eq!(Direction::Short.sign(), -1.0);
    }

    // ── Deserialization ────────────────────────────────────────────────

    fn document(size: f64, legs: &str, next_leg_id: Option<u64>) -> String {
        let next = next_leg_id
            .map(|n| format!(r#","next_leg_id":{n}"#))
            .unwrap_or_default();
        format!(
            r#"{{"id":"d1","symbol":"SPY","direction":"long","entry_price":100.0,"size":{size},"scale_outs":[{legs}]{next}}}"#
        )
    }

    #[test]
    fn missing_leg_counter_resumes_above_existing_legs() {
        let json = document(3.0, r#"{"id":1,"size":1.0,"price":101.0}"#, None);
        let mut pos: Position = serde_json::from_str(&json).unwrap();

        let a = pos.add_leg(1.0, 102.0).unwrap();
        let b = pos.add_leg(1.0, 103.0).unwrap();
        assert_eq!((a, b), (LegId(2), LegId(3)));

        let removed = pos.remove_leg(LegId(1)).unwrap();
        assert_eq!(removed.price, 101.0);
        assert_eq!(pos.scale_outs().len(), 2);
    }

    #[test]
    fn stale_leg_counter_is_raised() {
        let json = document(5.0, r#"{"id":4,"size":1.0,"price":101.0}"#, Some(2));
        let mut pos: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(pos.add_leg(1.0, 102.0).unwrap(), LegId(5));
    }

    #[test]
    fn over_allocated_document_is_rejected() {
        let json = document(1.0, r#"{"id":1,"size":5.0,"price":101.0}"#, Some(2));
        let err = serde_json::from_str::<Position>(&json).unwrap_err();
        assert!(err.to_string().contains("exceeds available size"));
    }

    #[test]
    fn duplicate_leg_ids_are_rejected() {
        let legs = r#"{"id":1,"size":1.0,"price":101.0},{"id":1,"size":1.0,"price":102.0}"#;
        let json = document(5.0, legs, Some(2));
        let err = serde_json::from_str::<Position>(&json).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn legs_without_entry_are_rejected() {
        let json = r#"{"id":"d2","symbol":"SPY","scale_outs":[{"id":1,"size":1.0,"price":101.0}]}"#;
        assert!(serde_json::from_str::<Position>(json).is_err());
    }

    #[test]
    fn non_positive_leg_size_is_rejected() {
        let json = document(5.0, r#"{"id":1,"size":-1.0,"price":101.0}"#, Some(2));
        assert!(serde_json::from_str::<Position>(&json).is_err());
    }

    #[test]
    fn valid_document_round_trips() {
        let mut pos = planned();
        pos.set_entry(Direction::Short, Some(1.1), Some(1.105), None, Some(10.0))
            .unwrap();
        let leg = pos.add_leg(4.0, 1.09).unwrap();
        pos.remove_leg(leg).unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        let decoded: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, pos);
    }
}
