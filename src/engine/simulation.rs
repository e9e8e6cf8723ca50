//! Bar-replay simulation engine.
//!
//! Feeds historical bars to a strategy one at a time and fills its market
//! orders against a simulated account at the bar close.

use crate::config::simulation::SimulationConfig;
use crate::config::strategy::StrategyConfig;
use crate::engine::context::{MarketInfo, StrategyContext};
use crate::logging::order_audit::OrderAuditLogger;
use crate::model::{Bar, OrderFill, OrderRequest};
use crate::strategy::Strategy;
use crate::ui::console::AccountReport;
use crate::ui::types::{GridState, StrategySummary};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const FEED_BUFFER: usize = 256;

/// Cash and inventory of the simulated venue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimAccount {
    pub cash: f64,
    pub position: f64,
    pub commission_paid: f64,
}

impl SimAccount {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            cash: initial_balance,
            position: 0.0,
            commission_paid: 0.0,
        }
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position * price
    }
}

/// Streams `bars` through a bounded channel from a background task.
pub fn spawn_feed(bars: Vec<Bar>) -> mpsc::Receiver<Bar> {
    let (tx, rx) = mpsc::channel(FEED_BUFFER);
    tokio::spawn(async move {
        for bar in bars {
            if tx.send(bar).await.is_err() {
                break;
            }
        }
    });
    rx
}

pub struct SimulationEngine {
    config: StrategyConfig,
    sim_config: SimulationConfig,
    ctx: StrategyContext,
    account: SimAccount,
    audit_logger: Option<OrderAuditLogger>,
    last_bar_time: Option<DateTime<Utc>>,
    last_price: f64,
    bars: usize,
    fills: usize,
}

impl SimulationEngine {
    pub fn new(
        config: StrategyConfig,
        sim_config: SimulationConfig,
        audit_logger: Option<OrderAuditLogger>,
    ) -> Self {
        let symbol = config.symbol().to_string();
        let instrument = &sim_config.instrument;
        let mut markets = HashMap::new();
        markets.insert(
            symbol.clone(),
            MarketInfo::new(
                symbol,
                instrument.price_step,
                instrument.volume_step,
                instrument.volume_min,
                instrument.volume_max,
            ),
        );

        let mut ctx = StrategyContext::new(markets);
        ctx.update_portfolio_value(sim_config.initial_balance);

        Self {
            account: SimAccount::new(sim_config.initial_balance),
            config,
            sim_config,
            ctx,
            audit_logger,
            last_bar_time: None,
            last_price: 0.0,
            bars: 0,
            fills: 0,
        }
    }

    /// Drains the feed until the sender side closes.
    pub async fn run(
        &mut self,
        strategy: &mut dyn Strategy,
        mut feed: mpsc::Receiver<Bar>,
    ) -> Result<()> {
        info!(
            "[SIMULATION] Replaying {} bars | balance: {:.2} | fill ratio: {}",
            self.config.symbol(),
            self.sim_config.initial_balance,
            self.sim_config.fill_ratio
        );

        while let Some(bar) = feed.recv().await {
            self.step(strategy, &bar)?;
        }

        info!(
            "[SIMULATION] Done. {} bars, {} fills, equity {:.3}",
            self.bars,
            self.fills,
            self.account.equity(self.last_price)
        );
        Ok(())
    }

    /// Processes one bar: mark, hand it to the strategy, fill its orders.
    pub fn step(&mut self, strategy: &mut dyn Strategy, bar: &Bar) -> Result<()> {
        if let Some(prev) = self.last_bar_time {
            if bar.close_time <= prev {
                warn!(
                    "[SIMULATION] Skipping bar at {} (not after {})",
                    bar.close_time, prev
                );
                return Ok(());
            }
            let StrategyConfig::TurnGrid(c) = &self.config;
            if let Ok(period) = chrono::Duration::from_std(c.bar_period.duration()) {
                if bar.close_time - prev > period {
                    debug!(
                        "[SIMULATION] Gap in feed: {} -> {}",
                        prev, bar.close_time
                    );
                }
            }
        }
        self.last_bar_time = Some(bar.close_time);
        self.last_price = bar.close;
        self.bars += 1;

        self.mark(bar.close);
        strategy.on_bar(bar, &mut self.ctx)?;
        self.execute_orders(strategy, bar)?;
        self.mark(bar.close);
        Ok(())
    }

    fn mark(&mut self, price: f64) {
        let symbol = self.config.symbol().to_string();
        self.ctx
            .update_portfolio_value(self.account.equity(price));
        self.ctx.update_position(symbol, self.account.position);
    }

    fn execute_orders(&mut self, strategy: &mut dyn Strategy, bar: &Bar) -> Result<()> {
        let orders = std::mem::take(&mut self.ctx.order_queue);
        let price = bar.close;

        for order in orders {
            match order {
                OrderRequest::Market {
                    symbol,
                    side,
                    sz,
                    cloid,
                } => {
                    if let Some(logger) = &self.audit_logger {
                        logger.log_req(bar.close_time, &symbol, side, price, sz, cloid);
                    }

                    let filled = if self.sim_config.fill_ratio >= 1.0 {
                        sz
                    } else {
                        self.ctx
                            .market_info(&symbol)
                            .map(|m| m.round_size(sz * self.sim_config.fill_ratio))
                            .unwrap_or(0.0)
                    };
                    if filled <= 0.0 {
                        warn!("[SIMULATION] {} {} {} did not fill", side, sz, symbol);
                        continue;
                    }

                    let notional = filled * price;
                    let fee = notional * self.sim_config.commission_rate;
                    self.account.cash -= side.sign() * notional + fee;
                    self.account.position += side.sign() * filled;
                    self.account.commission_paid += fee;
                    self.fills += 1;

                    let notes = (filled < sz).then(|| format!("partial {} of {}", filled, sz));
                    if let Some(logger) = &self.audit_logger {
                        logger.log_fill(
                            bar.close_time,
                            &symbol,
                            side,
                            price,
                            filled,
                            cloid,
                            fee,
                            notes,
                        );
                    }
                    debug!(
                        "[SIMULATION] FILL {} {} {} @ {} | position: {}",
                        side, filled, symbol, price, self.account.position
                    );

                    self.ctx.update_position(symbol, self.account.position);
                    let fill = OrderFill {
                        side,
                        size: filled,
                        price,
                        fee,
                        cloid,
                    };
                    strategy.on_order_filled(&fill, &mut self.ctx)?;
                }
            }
        }
        Ok(())
    }

    pub fn get_summary(&self, strategy: &dyn Strategy) -> StrategySummary {
        strategy.get_summary(&self.ctx)
    }

    pub fn get_grid_state(&self, strategy: &dyn Strategy) -> Option<GridState> {
        strategy.get_grid_state(&self.ctx)
    }

    pub fn account(&self) -> &SimAccount {
        &self.account
    }

    pub fn report(&self) -> AccountReport {
        AccountReport {
            initial_balance: self.sim_config.initial_balance,
            equity: self.account.equity(self.last_price),
            cash: self.account.cash,
            position: self.account.position,
            commission_paid: self.account.commission_paid,
            bars: self.bars,
            fills: self.fills,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }
}
