use super::ids::LegId;
use serde::{Deserialize, Serialize};

/// One partial exit: `size` units closed at `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleOutLeg {
    pub id: LegId,
    pub size: f64,
    pub price: f64,
}

/// Partial update for an existing leg. `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegPatch {
    pub size: Option<f64>,
    pub price: Option<f64>,
}

impl LegPatch {
    pub fn size(size: f64) -> Self {
        Self {
            size: Some(size),
            price: None,
        }
    }

    pub fn price(price: f64) -> Self {
        Self {
            size: None,
            price: Some(price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.price.is_none()
    }
}
