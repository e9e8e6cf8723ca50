use super::equity::{EquityMonitor, FeeAccumulator};
use super::grid::Grid;
use super::ledger::PositionLedger;
use super::money::MoneyManager;
use super::navigator::GridNavigator;
use crate::error::GridError;

/// Inputs for building a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub max_shares: u32,
    pub distance: f64,
    pub target_return: f64,
    /// Smallest tradable volume, used to floor the first unit's notional.
    pub volume_min: f64,
}

/// A grid together with all state that only makes sense for that grid.
///
/// Built in one piece and dropped in one piece; nothing outside holds
/// indices into it.
#[derive(Debug, Clone)]
pub struct GridBook {
    pub grid: Grid,
    pub navigator: GridNavigator,
    pub ledger: PositionLedger,
    pub money: MoneyManager,
    pub fees: FeeAccumulator,
    pub monitor: EquityMonitor,
    pub open_budget: f64,
}

impl GridBook {
    pub fn build(
        anchor: f64,
        params: &GridParams,
        portfolio_value: Option<f64>,
    ) -> Result<Self, GridError> {
        let grid = Grid::build(anchor, params.max_shares, params.distance)?;
        let max_shares = params.max_shares as f64;

        let initial_balance = portfolio_value
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(max_shares * anchor);

        let mut open_budget = initial_balance / max_shares;
        if open_budget.is_nan() || open_budget <= 0.0 {
            open_budget = anchor;
        }

        let price_floor = params.volume_min * anchor;
        let money = MoneyManager::new(open_budget, initial_balance, params.max_shares, price_floor);

        Ok(Self {
            navigator: GridNavigator::new(&grid),
            ledger: PositionLedger::new(params.max_shares),
            money,
            fees: FeeAccumulator::default(),
            monitor: EquityMonitor::new(initial_balance, params.target_return),
            open_budget,
            grid,
        })
    }

    pub fn initial_balance(&self) -> f64 {
        self.monitor.initial_balance()
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current_index()
    }
}
