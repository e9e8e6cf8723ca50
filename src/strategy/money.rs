//! Martingale money allocation.
//!
//! Each side starts at `first_unit` and every additional unit opened on the
//! same side adds `increment`. The increment is chosen so that half the grid
//! (`max_shares / 2` units) spends roughly half of the initial balance.

use crate::constants::FIRST_UNIT_DIVISOR;
use crate::engine::context::MarketInfo;

/// Notional and tradable volume of one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub money: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneyManager {
    first_unit: f64,
    increment: f64,
}

impl MoneyManager {
    /// * `open_budget` - per-share budget (`initial_balance / max_shares`).
    /// * `initial_balance` - equity snapshot of the current grid.
    /// * `max_shares` - unit cap of the grid.
    /// * `price_floor` - lower bound for the first unit's notional.
    pub fn new(open_budget: f64, initial_balance: f64, max_shares: u32, price_floor: f64) -> Self {
        let first_unit = (open_budget / FIRST_UNIT_DIVISOR).max(price_floor.max(0.0));
        let increment = Self::triangular_increment(first_unit, initial_balance, max_shares);
        Self {
            first_unit,
            increment,
        }
    }

    /// Solves `sum_{n=0}^{h-1} (first_unit + n * inc) = initial_balance / 2`
    /// for `inc`, with `h = max_shares / 2`.
    fn triangular_increment(first_unit: f64, initial_balance: f64, max_shares: u32) -> f64 {
        let h = (max_shares / 2) as f64;
        if h <= 1.0 {
            return 0.0;
        }
        let numerator = initial_balance / 2.0 - h * first_unit;
        if numerator <= 0.0 || !numerator.is_finite() {
            return 0.0;
        }
        let pairs = h * (h - 1.0) / 2.0;
        numerator / pairs
    }

    pub fn first_unit(&self) -> f64 {
        self.first_unit
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Notional for the next unit when `open_count` units are already open
    /// on that side.
    pub fn money(&self, open_count: u32) -> f64 {
        self.first_unit + open_count as f64 * self.increment
    }

    /// Sizes the next unit at `reference_price`. `None` means the volume
    /// normalized to nothing and the unit must be skipped.
    pub fn size(&self, open_count: u32, reference_price: f64, market: &MarketInfo) -> Option<Sizing> {
        if reference_price <= 0.0 {
            return None;
        }
        let money = self.money(open_count);
        let volume = market.normalize_volume(money / reference_price)?;
        Some(Sizing { money, volume })
    }
}
