use crate::constants::DEFAULT_MAX_FLATTEN_RETRIES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::strategy::types::BoundaryPolicy;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum StrategyConfig {
    #[serde(rename = "turn_grid")]
    TurnGrid(TurnGridConfig),
}

/// Bar period of the price feed.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarPeriod {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[default]
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl BarPeriod {
    pub fn duration(&self) -> Duration {
        let minutes = match self {
            BarPeriod::M1 => 1,
            BarPeriod::M5 => 5,
            BarPeriod::M15 => 15,
            BarPeriod::H1 => 60,
            BarPeriod::H4 => 240,
            BarPeriod::D1 => 1440,
        };
        Duration::from_secs(minutes * 60)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TurnGridConfig {
    pub symbol: String,
    /// Fractional spacing between levels, e.g. 0.01 for 1%.
    pub grid_distance: f64,
    pub max_grid_shares: u32,
    /// Equity growth over the grid's initial balance that triggers a reset.
    pub equity_target_return: f64,
    /// Estimated cost per unit of traded notional.
    pub fee_rate: f64,
    #[serde(default)]
    pub bar_period: BarPeriod,
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,
    /// Flatten attempts before halting. 0 retries forever.
    #[serde(default = "default_max_flatten_retries")]
    pub max_flatten_retries: u32,
}

fn default_max_flatten_retries() -> u32 {
    DEFAULT_MAX_FLATTEN_RETRIES
}

impl StrategyConfig {
    pub fn type_name(&self) -> &str {
        match self {
            StrategyConfig::TurnGrid(_) => "Turn Grid",
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            StrategyConfig::TurnGrid(c) => &c.symbol,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            StrategyConfig::TurnGrid(c) => c.validate(),
        }
    }
}

impl TurnGridConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(anyhow::anyhow!("Symbol must not be empty."));
        }
        if !(self.grid_distance > 0.0 && self.grid_distance < 1.0) {
            return Err(anyhow::anyhow!(
                "Grid distance {} must be between 0 and 1 (exclusive).",
                self.grid_distance
            ));
        }
        if self.max_grid_shares < 1 {
            return Err(anyhow::anyhow!(
                "Max grid shares {} must be at least 1.",
                self.max_grid_shares
            ));
        }
        if !(self.equity_target_return >= 0.0) {
            return Err(anyhow::anyhow!(
                "Equity target return {} must not be negative.",
                self.equity_target_return
            ));
        }
        if !(self.fee_rate >= 0.0) {
            return Err(anyhow::anyhow!(
                "Fee rate {} must not be negative.",
                self.fee_rate
            ));
        }
        Ok(())
    }
}

pub fn print_strategy_help() {
    println!("Available Strategies:\n");

    println!("1. Turn Grid Strategy (type = 'turn_grid')");
    println!("   Description: Two-sided martingale grid that alternates long and short units");
    println!("                and resets once equity reaches a growth target.");
    println!("   Parameters:");
    println!("     - symbol (String): Instrument symbol (e.g., 'BTC').");
    println!("     - grid_distance (f64): Fractional level spacing, > 0 (e.g., 0.01 = 1%).");
    println!("     - max_grid_shares (u32): Maximum open units, >= 1.");
    println!("     - equity_target_return (f64): Reset when equity grows by this fraction, >= 0.");
    println!("     - fee_rate (f64): Estimated cost per traded notional, >= 0.");
    println!("     - bar_period (String): '1m', '5m', '15m', '1h', '4h' or '1d' (default: '1h').");
    println!("     - boundary_policy (String): 'clamp' or 'rebuild' (default: 'clamp').");
    println!(
        "     - max_flatten_retries (u32): Flatten attempts before halting, 0 = unbounded (default: {}).",
        DEFAULT_MAX_FLATTEN_RETRIES
    );
    println!();
}
