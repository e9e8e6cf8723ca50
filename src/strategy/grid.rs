use super::types::LevelState;
use crate::constants::{LEVELS_PER_SHARE, TICKET_OFFSET};
use crate::error::GridError;
use crate::model::OrderSide;
use serde::{Deserialize, Serialize};

/// One price rung of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLevel {
    pub price: f64,
    pub state: LevelState,
    /// Volume of a BUY opened two rungs below, closed by a SELL here.
    pub buy_ticket: Option<f64>,
    /// Volume of a SELL opened two rungs above, closed by a BUY here.
    pub sell_ticket: Option<f64>,
}

impl GridLevel {
    fn new(price: f64) -> Self {
        Self {
            price,
            state: LevelState::Empty,
            buy_ticket: None,
            sell_ticket: None,
        }
    }

    pub fn ticket(&self, side: OrderSide) -> Option<f64> {
        match side {
            OrderSide::Buy => self.buy_ticket,
            OrderSide::Sell => self.sell_ticket,
        }
    }
}

/// Flat, index-addressed ladder of price levels.
///
/// Levels only ever refer to each other by index offset, so the whole grid
/// is a plain `Vec` that can be dropped and replaced in one move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    levels: Vec<GridLevel>,
    center_index: usize,
    distance: f64,
}

impl Grid {
    /// Builds `LEVELS_PER_SHARE * max_shares` levels with `anchor` at the
    /// center, spaced geometrically by `distance` in both directions.
    pub fn build(anchor: f64, max_shares: u32, distance: f64) -> Result<Self, GridError> {
        if !anchor.is_finite() || anchor <= 0.0 {
            return Err(GridError::NonPositiveAnchor(anchor));
        }
        if max_shares == 0 {
            return Err(GridError::InvalidShares);
        }
        if !distance.is_finite() || distance <= 0.0 || distance >= 1.0 {
            return Err(GridError::InvalidDistance(distance));
        }

        let len = LEVELS_PER_SHARE * max_shares as usize;
        let center_index = len / 2;
        let mut prices = vec![0.0; len];
        prices[center_index] = anchor;

        for i in center_index + 1..len {
            prices[i] = prices[i - 1] * (1.0 + distance);
        }
        for i in (0..center_index).rev() {
            prices[i] = prices[i + 1] * (1.0 - distance);
        }

        Ok(Self {
            levels: prices.into_iter().map(GridLevel::new).collect(),
            center_index,
            distance,
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn center_index(&self) -> usize {
        self.center_index
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn anchor_price(&self) -> f64 {
        self.levels[self.center_index].price
    }

    pub fn price(&self, index: usize) -> Option<f64> {
        self.levels.get(index).map(|l| l.price)
    }

    pub fn level(&self, index: usize) -> Option<&GridLevel> {
        self.levels.get(index)
    }

    pub fn level_mut(&mut self, index: usize) -> Option<&mut GridLevel> {
        self.levels.get_mut(index)
    }

    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    pub fn is_edge(&self, index: usize) -> bool {
        index == 0 || index + 1 == self.levels.len()
    }

    /// Where the closing ticket of a unit opened at `index` lives.
    pub fn ticket_index(&self, index: usize, side: OrderSide) -> Option<usize> {
        let target = match side {
            OrderSide::Buy => index.checked_add(TICKET_OFFSET)?,
            OrderSide::Sell => index.checked_sub(TICKET_OFFSET)?,
        };
        (target < self.levels.len()).then_some(target)
    }

    /// Inverse of [`Grid::ticket_index`]: the opening level of a ticket
    /// found at `index`.
    pub fn opening_index(&self, index: usize, side: OrderSide) -> Option<usize> {
        let origin = match side {
            OrderSide::Buy => index.checked_sub(TICKET_OFFSET)?,
            OrderSide::Sell => index.checked_add(TICKET_OFFSET)?,
        };
        (origin < self.levels.len()).then_some(origin)
    }
}
