use crate::model::OrderSide;
use serde::{Deserialize, Serialize};

/// Which units opened *at* a level are still outstanding.
///
/// `Hedged` is reached when the opening policy adds the missing side to a
/// level that already holds one; no further unit can open there until one
/// side settles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    #[default]
    Empty,
    LongOpen,
    ShortOpen,
    Hedged,
}

impl LevelState {
    pub fn has_buy(&self) -> bool {
        matches!(self, LevelState::LongOpen | LevelState::Hedged)
    }

    pub fn has_sell(&self) -> bool {
        matches!(self, LevelState::ShortOpen | LevelState::Hedged)
    }

    /// State after a unit on `side` opens here.
    pub fn open(self, side: OrderSide) -> Self {
        match (self, side) {
            (LevelState::Empty, OrderSide::Buy) => LevelState::LongOpen,
            (LevelState::Empty, OrderSide::Sell) => LevelState::ShortOpen,
            (LevelState::ShortOpen, OrderSide::Buy) | (LevelState::LongOpen, OrderSide::Sell) => {
                LevelState::Hedged
            }
            (state, _) => state,
        }
    }

    /// State after the unit on `side` opened here has been closed.
    pub fn close(self, side: OrderSide) -> Self {
        match (self, side) {
            (LevelState::LongOpen, OrderSide::Buy) | (LevelState::ShortOpen, OrderSide::Sell) => {
                LevelState::Empty
            }
            (LevelState::Hedged, OrderSide::Buy) => LevelState::ShortOpen,
            (LevelState::Hedged, OrderSide::Sell) => LevelState::LongOpen,
            (state, _) => state,
        }
    }
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// No grid yet; waiting for the first valid price.
    Initializing,
    Active,
    ResetRequested,
    /// Flatten submitted, waiting for the net position to reach zero.
    WaitingFlatten { attempts: u32 },
    Rebuilding,
    /// Flatten retries exhausted. Terminal until an operator intervenes.
    Halted { attempts: u32 },
}

impl Lifecycle {
    pub fn is_resetting(&self) -> bool {
        matches!(
            self,
            Lifecycle::ResetRequested | Lifecycle::WaitingFlatten { .. } | Lifecycle::Rebuilding
        )
    }
}

/// What happens when price walks off either end of the grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Stop advancing at the edge and keep trading the edge level.
    #[default]
    Clamp,
    /// Flatten and rebuild around the current price.
    Rebuild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetReason {
    EquityTarget,
    GridBoundary,
}
