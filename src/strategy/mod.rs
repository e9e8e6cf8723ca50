use crate::config::strategy::StrategyConfig;

pub mod book;
pub mod equity;
pub mod grid;
pub mod ledger;
pub mod money;
pub mod navigator;
pub mod turn_grid;
pub mod types;

use crate::engine::context::StrategyContext;
use crate::model::{Bar, OrderFill};
use crate::ui::types::{GridState, StrategySummary};
use anyhow::Result;

pub trait Strategy {
    fn on_bar(&mut self, bar: &Bar, ctx: &mut StrategyContext) -> Result<()>;
    fn on_order_filled(&mut self, fill: &OrderFill, ctx: &mut StrategyContext) -> Result<()>;

    fn get_summary(&self, ctx: &StrategyContext) -> StrategySummary;
    fn get_grid_state(&self, ctx: &StrategyContext) -> Option<GridState>;
}

pub fn init_strategy(config: StrategyConfig) -> Result<Box<dyn Strategy>> {
    config.validate()?;
    match config {
        StrategyConfig::TurnGrid(c) => Ok(Box::new(turn_grid::TurnGridStrategy::new(c))),
    }
}
