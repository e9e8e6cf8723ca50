use super::book::{GridBook, GridParams};
use super::types::{BoundaryPolicy, Lifecycle, ResetReason};
use super::Strategy;
use crate::config::strategy::TurnGridConfig;
use crate::constants::POSITION_EPSILON;
use crate::engine::context::StrategyContext;
use crate::model::{Bar, OrderFill, OrderRequest, OrderSide};
use crate::ui::types::{GridState, LevelInfo, StrategySummary, TurnGridSummary};
use anyhow::Result;
use log::{debug, error, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct EngineStats {
    grids_built: u32,
    rebuilds: u32,
    round_trips: u32,
    skipped_openings: u32,
    flatten_orders: u32,
    fills: u32,
}

/// Two-sided martingale grid driven one bar at a time.
///
/// Per bar: navigate, settle tickets at the new level, check the reset
/// condition, then decide on an opening. While a reset is in flight the
/// grid is gone and only the lifecycle is kept.
pub struct TurnGridStrategy {
    config: TurnGridConfig,
    lifecycle: Lifecycle,
    book: Option<GridBook>,
    reset_reason: Option<ResetReason>,
    stats: EngineStats,
    last_price: f64,
}

impl TurnGridStrategy {
    pub fn new(config: TurnGridConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Initializing,
            book: None,
            reset_reason: None,
            stats: EngineStats::default(),
            last_price: 0.0,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn book(&self) -> Option<&GridBook> {
        self.book.as_ref()
    }

    pub fn reset_reason(&self) -> Option<ResetReason> {
        self.reset_reason
    }

    fn params(&self, ctx: &StrategyContext) -> GridParams {
        GridParams {
            max_shares: self.config.max_grid_shares,
            distance: self.config.grid_distance,
            target_return: self.config.equity_target_return,
            volume_min: ctx
                .market_info(&self.config.symbol)
                .map(|m| m.volume_min)
                .unwrap_or(0.0),
        }
    }

    fn submit(symbol: &str, side: OrderSide, sz: f64, ctx: &mut StrategyContext) {
        let cloid = ctx.generate_cloid();
        info!(
            "[ORDER_REQUEST] [TURN_GRID] MARKET {} {} {}",
            side, sz, symbol
        );
        ctx.place_order(OrderRequest::Market {
            symbol: symbol.to_string(),
            side,
            sz,
            cloid: Some(cloid),
        });
    }

    /// Replaces the grid with a fresh one anchored at `anchor`.
    fn build_grid(&mut self, anchor: f64, ctx: &StrategyContext) -> bool {
        let params = self.params(ctx);
        match GridBook::build(anchor, &params, ctx.portfolio_value()) {
            Ok(book) => {
                info!(
                    "[TURN_GRID] Grid built @ {} | levels: {} | initial balance: {:.2} | first unit: {:.4} | increment: {:.4}",
                    anchor,
                    book.grid.len(),
                    book.initial_balance(),
                    book.money.first_unit(),
                    book.money.increment()
                );
                self.book = Some(book);
                self.stats.grids_built += 1;
                true
            }
            Err(e) => {
                warn!("[TURN_GRID] Grid build skipped: {}", e);
                false
            }
        }
    }

    fn step(&mut self, price: f64, ctx: &mut StrategyContext, fresh: bool) {
        let Some(book) = self.book.as_mut() else {
            return;
        };

        let nav = book.navigator.advance(&book.grid, price);
        let index = nav.current;
        if nav.changed() {
            debug!(
                "[TURN_GRID] Level {} -> {} ({} rungs) @ {}",
                nav.previous,
                nav.current,
                nav.rungs_moved(),
                price
            );

            for settlement in book.ledger.settle(&mut book.grid, index) {
                Self::submit(
                    &self.config.symbol,
                    settlement.order_side(),
                    settlement.volume,
                    ctx,
                );
                self.stats.round_trips += 1;
                info!(
                    "[TURN_GRID] Settled {:?} unit opened at level {:?} on level {} | vol: {} | occupancy buy={} sell={}",
                    settlement.unit_side,
                    settlement.opening_index,
                    index,
                    settlement.volume,
                    book.ledger.buy_count(),
                    book.ledger.sell_count()
                );
            }
        }

        let equity_hit = ctx
            .portfolio_value()
            .map(|value| book.monitor.target_reached(value, book.fees.total()))
            .unwrap_or(false);

        let reason = if equity_hit {
            Some(ResetReason::EquityTarget)
        } else if nav.changed() && nav.at_boundary {
            match self.config.boundary_policy {
                BoundaryPolicy::Rebuild => Some(ResetReason::GridBoundary),
                BoundaryPolicy::Clamp => {
                    warn!(
                        "[TURN_GRID] Price {} reached grid edge (level {}); further drift is not tracked",
                        price, index
                    );
                    None
                }
            }
        } else {
            None
        };

        if let Some(reason) = reason {
            self.request_reset(reason, ctx);
            return;
        }

        if nav.changed() || fresh {
            self.open_unit(index, price, ctx);
        }
    }

    fn open_unit(&mut self, index: usize, price: f64, ctx: &mut StrategyContext) {
        let Some(book) = self.book.as_mut() else {
            return;
        };
        let Some(side) = book.ledger.decide_opening(&book.grid, index) else {
            debug!(
                "[TURN_GRID] No opening at level {} (occupancy {}/{})",
                index,
                book.ledger.occupancy(),
                self.config.max_grid_shares
            );
            return;
        };
        let Some(market) = ctx.market_info(&self.config.symbol) else {
            error!("[TURN_GRID] No market info for {}", self.config.symbol);
            return;
        };

        let open_count = book.ledger.count(side);
        let Some(sizing) = book.money.size(open_count, price, market) else {
            self.stats.skipped_openings += 1;
            debug!(
                "[TURN_GRID] Skipping {} at level {}: money {:.4} @ {} normalizes to zero volume",
                side,
                index,
                book.money.money(open_count),
                price
            );
            return;
        };

        let ticket = book
            .ledger
            .record_opening(&mut book.grid, index, side, sizing.volume);
        let fee = book
            .fees
            .charge(price * sizing.volume, self.config.fee_rate);
        Self::submit(&self.config.symbol, side, sizing.volume, ctx);

        info!(
            "[TURN_GRID] OPEN {} @ level {} ({}) | money: {:.4} | vol: {} | ticket: {:?} | fee: {:.6} | total_fee: {:.6} | occupancy buy={} sell={}",
            side,
            index,
            price,
            sizing.money,
            sizing.volume,
            ticket,
            fee,
            book.fees.total(),
            book.ledger.buy_count(),
            book.ledger.sell_count()
        );
    }

    fn request_reset(&mut self, reason: ResetReason, ctx: &mut StrategyContext) {
        info!(
            "[TURN_GRID] Reset requested ({:?}) | equity: {:?} | last price: {}",
            reason,
            ctx.portfolio_value(),
            self.last_price
        );
        self.lifecycle = Lifecycle::ResetRequested;
        self.reset_reason = Some(reason);
        // Tickets and counts are meaningless once a rebuild is pending.
        self.book = None;
        self.flatten(0, ctx);
    }

    /// Sends one market order against the projected net position.
    fn flatten(&mut self, attempts: u32, ctx: &mut StrategyContext) {
        let net = ctx.projected_position(&self.config.symbol);
        if net.abs() > POSITION_EPSILON {
            let side = if net > 0.0 {
                OrderSide::Sell
            } else {
                OrderSide::Buy
            };
            info!(
                "[TURN_GRID] Flattening net position {} (attempt {})",
                net,
                attempts + 1
            );
            Self::submit(&self.config.symbol, side, net.abs(), ctx);
            self.stats.flatten_orders += 1;
            self.lifecycle = Lifecycle::WaitingFlatten {
                attempts: attempts + 1,
            };
        } else {
            self.lifecycle = Lifecycle::WaitingFlatten { attempts };
        }
    }

    fn continue_flatten(&mut self, attempts: u32, price: f64, ctx: &mut StrategyContext) {
        let net = ctx.projected_position(&self.config.symbol);
        if net.abs() <= POSITION_EPSILON {
            info!("[TURN_GRID] Position flat after {} attempt(s). Rebuilding.", attempts);
            self.lifecycle = Lifecycle::Rebuilding;
            self.rebuild(price, ctx);
            return;
        }

        let limit = self.config.max_flatten_retries;
        if limit > 0 && attempts >= limit {
            error!(
                "[TURN_GRID] ALERT: position {} still open after {} flatten attempts. Halting.",
                net, attempts
            );
            self.lifecycle = Lifecycle::Halted { attempts };
            return;
        }

        warn!(
            "[TURN_GRID] Position {} still open after {} flatten attempt(s); retrying",
            net, attempts
        );
        self.flatten(attempts, ctx);
    }

    fn rebuild(&mut self, price: f64, ctx: &mut StrategyContext) {
        if !self.build_grid(price, ctx) {
            return;
        }
        self.stats.rebuilds += 1;
        self.lifecycle = Lifecycle::Active;
        self.reset_reason = None;
        self.step(price, ctx, true);
    }
}

impl Strategy for TurnGridStrategy {
    fn on_bar(&mut self, bar: &Bar, ctx: &mut StrategyContext) -> Result<()> {
        let price = bar.close;
        if !price.is_finite() {
            warn!("[TURN_GRID] Ignoring bar with non-finite close at {}", bar.close_time);
            return Ok(());
        }
        if price <= 0.0 && self.book.is_some() {
            warn!(
                "[TURN_GRID] Ignoring bar with non-positive close {} at {}",
                price, bar.close_time
            );
            return Ok(());
        }

        self.last_price = price;
        if let Some(info) = ctx.market_info_mut(&self.config.symbol) {
            info.last_price = price;
        }

        match self.lifecycle {
            Lifecycle::Initializing => {
                if self.build_grid(price, ctx) {
                    self.lifecycle = Lifecycle::Active;
                    self.step(price, ctx, true);
                }
            }
            Lifecycle::Active => self.step(price, ctx, false),
            Lifecycle::ResetRequested => self.flatten(0, ctx),
            Lifecycle::WaitingFlatten { attempts } => self.continue_flatten(attempts, price, ctx),
            Lifecycle::Rebuilding => self.rebuild(price, ctx),
            Lifecycle::Halted { attempts } => {
                debug!(
                    "[TURN_GRID] Halted after {} flatten attempts; bar ignored",
                    attempts
                );
            }
        }
        Ok(())
    }

    fn on_order_filled(&mut self, fill: &OrderFill, _ctx: &mut StrategyContext) -> Result<()> {
        self.stats.fills += 1;
        debug!(
            "[TURN_GRID] Fill {} {} @ {} | fee: {:.6}",
            fill.side, fill.size, fill.price, fill.fee
        );
        Ok(())
    }

    fn get_summary(&self, ctx: &StrategyContext) -> StrategySummary {
        let book = self.book.as_ref();
        StrategySummary::TurnGrid(TurnGridSummary {
            symbol: self.config.symbol.clone(),
            price: self.last_price,
            state: format!("{:?}", self.lifecycle),
            anchor_price: book.map(|b| b.grid.anchor_price()),
            current_index: book.map(|b| b.current_index()),
            initial_balance: book.map(|b| b.initial_balance()),
            target_equity: book.map(|b| b.monitor.target_equity()),
            first_unit: book.map(|b| b.money.first_unit()),
            open_increment: book.map(|b| b.money.increment()),
            buy_count: book.map(|b| b.ledger.buy_count()).unwrap_or(0),
            sell_count: book.map(|b| b.ledger.sell_count()).unwrap_or(0),
            max_shares: self.config.max_grid_shares,
            total_fee: book.map(|b| b.fees.total()).unwrap_or(0.0),
            grids_built: self.stats.grids_built,
            rebuilds: self.stats.rebuilds,
            round_trips: self.stats.round_trips,
            skipped_openings: self.stats.skipped_openings,
            flatten_orders: self.stats.flatten_orders,
            portfolio_value: ctx.portfolio_value(),
            net_position: ctx.net_position(&self.config.symbol),
        })
    }

    fn get_grid_state(&self, _ctx: &StrategyContext) -> Option<GridState> {
        let book = self.book.as_ref()?;
        Some(GridState {
            symbol: self.config.symbol.clone(),
            current_price: self.last_price,
            current_index: book.current_index(),
            center_index: book.grid.center_index(),
            levels: book
                .grid
                .levels()
                .iter()
                .enumerate()
                .map(|(index, level)| LevelInfo {
                    index,
                    price: level.price,
                    state: format!("{:?}", level.state),
                    buy_ticket: level.ticket(OrderSide::Buy),
                    sell_ticket: level.ticket(OrderSide::Sell),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::strategy::BarPeriod;
    use crate::engine::context::MarketInfo;
    use crate::strategy::types::LevelState;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;

    const SYMBOL: &str = "BTC";

    fn create_test_context() -> StrategyContext {
        let mut markets = HashMap::new();
        markets.insert(
            SYMBOL.to_string(),
            MarketInfo::new(SYMBOL.to_string(), 0.01, 0.01, 0.01, 1000.0),
        );
        let mut ctx = StrategyContext::new(markets);
        ctx.update_portfolio_value(1000.0);
        ctx
    }

    fn config() -> TurnGridConfig {
        TurnGridConfig {
            symbol: SYMBOL.to_string(),
            grid_distance: 0.01,
            max_grid_shares: 4,
            equity_target_return: 0.02,
            fee_rate: 0.001,
            bar_period: BarPeriod::H1,
            boundary_policy: BoundaryPolicy::Clamp,
            max_flatten_retries: 20,
        }
    }

    fn bar(n: i64, price: f64) -> Bar {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(n);
        Bar::flat(t, price)
    }

    fn only_order(ctx: &StrategyContext) -> (OrderSide, f64) {
        assert_eq!(ctx.order_queue.len(), 1, "queue: {:?}", ctx.order_queue);
        (ctx.order_queue[0].side(), ctx.order_queue[0].size())
    }

    #[test]
    fn test_first_bar_builds_grid_and_buys_first_unit() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();

        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
        let book = strategy.book().unwrap();
        assert_eq!(book.grid.anchor_price(), 100.0);
        assert_eq!(book.ledger.buy_count(), 1);
        assert_eq!(book.ledger.sell_count(), 0);

        // first unit = (1000 / 4) / 10 = 25 -> 0.25 @ 100
        let (side, sz) = only_order(&ctx);
        assert_eq!(side, OrderSide::Buy);
        assert!((sz - 0.25).abs() < 1e-12);
        assert!((book.fees.total() - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_anchor_keeps_engine_uninitialized() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 0.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Initializing);
        assert!(strategy.book().is_none());
        assert!(ctx.order_queue.is_empty());

        strategy.on_bar(&bar(1, 100.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_no_activity_without_level_change() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        ctx.order_queue.clear();

        strategy.on_bar(&bar(1, 100.4), &mut ctx).unwrap();
        strategy.on_bar(&bar(2, 99.6), &mut ctx).unwrap();
        assert!(ctx.order_queue.is_empty());
    }

    #[test]
    fn test_settlement_closes_first_buy_two_levels_up() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        let center = strategy.book().unwrap().grid.center_index();
        assert_eq!(
            strategy.book().unwrap().grid.level(center + 2).unwrap().buy_ticket,
            Some(0.25)
        );
        ctx.order_queue.clear();

        // one level up: buys outnumber sells on an empty level -> SELL
        strategy.on_bar(&bar(1, 101.2), &mut ctx).unwrap();
        let (side, _) = only_order(&ctx);
        assert_eq!(side, OrderSide::Sell);
        ctx.order_queue.clear();

        // two levels up: ticket fires, then a new BUY opens
        strategy.on_bar(&bar(2, 102.1), &mut ctx).unwrap();
        assert_eq!(ctx.order_queue.len(), 2);
        assert_eq!(ctx.order_queue[0].side(), OrderSide::Sell);
        assert!((ctx.order_queue[0].size() - 0.25).abs() < 1e-12);
        assert_eq!(ctx.order_queue[1].side(), OrderSide::Buy);

        let book = strategy.book().unwrap();
        assert_eq!(book.grid.level(center).unwrap().state, LevelState::Empty);
        assert_eq!(book.grid.level(center + 2).unwrap().state, LevelState::LongOpen);
        assert_eq!(book.ledger.buy_count(), 1);
        assert_eq!(book.ledger.sell_count(), 1);
    }

    #[test]
    fn test_equity_reset_flattens_then_rebuilds_once() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        ctx.order_queue.clear();
        ctx.update_position(SYMBOL.to_string(), 5.0);

        // 1021 > 1000 * 1.02
        ctx.update_portfolio_value(1021.0);
        strategy.on_bar(&bar(1, 100.3), &mut ctx).unwrap();
        assert_eq!(
            strategy.lifecycle(),
            Lifecycle::WaitingFlatten { attempts: 1 }
        );
        assert_eq!(strategy.reset_reason(), Some(ResetReason::EquityTarget));
        assert!(strategy.book().is_none());
        assert_eq!(only_order(&ctx), (OrderSide::Sell, 5.0));

        // flatten did not fill: stay put and retry
        ctx.order_queue.clear();
        strategy.on_bar(&bar(2, 100.6), &mut ctx).unwrap();
        assert_eq!(
            strategy.lifecycle(),
            Lifecycle::WaitingFlatten { attempts: 2 }
        );
        assert_eq!(only_order(&ctx), (OrderSide::Sell, 5.0));

        // filled: rebuild around the latest price
        ctx.order_queue.clear();
        ctx.update_position(SYMBOL.to_string(), 0.0);
        strategy.on_bar(&bar(3, 105.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
        let book = strategy.book().unwrap();
        assert_eq!(book.grid.anchor_price(), 105.0);
        assert_eq!(book.initial_balance(), 1021.0);
        assert_eq!(only_order(&ctx).0, OrderSide::Buy);

        // still above the old target, but the baseline moved: no second reset
        ctx.order_queue.clear();
        strategy.on_bar(&bar(4, 105.2), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
        let StrategySummary::TurnGrid(summary) = strategy.get_summary(&ctx);
        assert_eq!(summary.rebuilds, 1);
        assert_eq!(summary.grids_built, 2);
    }

    #[test]
    fn test_fees_count_against_equity_target() {
        let mut ctx = create_test_context();
        let mut cfg = config();
        cfg.fee_rate = 0.5; // 0.25 * 100 * 0.5 = 12.5 of estimated fees
        let mut strategy = TurnGridStrategy::new(cfg);
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();

        ctx.update_portfolio_value(1025.0);
        strategy.on_bar(&bar(1, 100.1), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Active);

        ctx.update_portfolio_value(1033.0);
        strategy.on_bar(&bar(2, 100.2), &mut ctx).unwrap();
        assert!(strategy.lifecycle().is_resetting());
    }

    #[test]
    fn test_flatten_includes_orders_queued_this_bar() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        // the opening BUY is still queued (unfilled) when the target is hit
        ctx.update_portfolio_value(1100.0);
        strategy.on_bar(&bar(1, 100.1), &mut ctx).unwrap();

        assert_eq!(ctx.order_queue.len(), 2);
        assert_eq!(ctx.order_queue[1].side(), OrderSide::Sell);
        assert!((ctx.order_queue[1].size() - 0.25).abs() < 1e-12);
        assert!((ctx.projected_position(SYMBOL)).abs() < 1e-12);
    }

    #[test]
    fn test_flatten_retries_are_bounded() {
        let mut ctx = create_test_context();
        let mut cfg = config();
        cfg.max_flatten_retries = 2;
        let mut strategy = TurnGridStrategy::new(cfg);
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        ctx.order_queue.clear();
        ctx.update_position(SYMBOL.to_string(), -1.0);

        ctx.update_portfolio_value(2000.0);
        strategy.on_bar(&bar(1, 100.0), &mut ctx).unwrap();
        assert_eq!(only_order(&ctx), (OrderSide::Buy, 1.0));
        ctx.order_queue.clear();

        strategy.on_bar(&bar(2, 100.0), &mut ctx).unwrap();
        assert_eq!(
            strategy.lifecycle(),
            Lifecycle::WaitingFlatten { attempts: 2 }
        );
        ctx.order_queue.clear();

        strategy.on_bar(&bar(3, 100.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Halted { attempts: 2 });
        assert!(ctx.order_queue.is_empty());

        // halted engines stay halted
        ctx.update_position(SYMBOL.to_string(), 0.0);
        strategy.on_bar(&bar(4, 100.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Halted { attempts: 2 });
        assert!(strategy.book().is_none());
    }

    #[test]
    fn test_boundary_clamp_keeps_trading() {
        let mut ctx = create_test_context();
        let mut cfg = config();
        cfg.max_grid_shares = 1; // levels 98.01, 99, 100, 101
        let mut strategy = TurnGridStrategy::new(cfg);
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();

        strategy.on_bar(&bar(1, 150.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
        assert_eq!(strategy.book().unwrap().current_index(), 3);
    }

    #[test]
    fn test_boundary_rebuild_resets_grid() {
        let mut ctx = create_test_context();
        let mut cfg = config();
        cfg.max_grid_shares = 1;
        cfg.boundary_policy = BoundaryPolicy::Rebuild;
        let mut strategy = TurnGridStrategy::new(cfg);
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        ctx.order_queue.clear();
        ctx.update_position(SYMBOL.to_string(), 0.25);

        strategy.on_bar(&bar(1, 150.0), &mut ctx).unwrap();
        assert_eq!(strategy.reset_reason(), Some(ResetReason::GridBoundary));
        assert_eq!(only_order(&ctx), (OrderSide::Sell, 0.25));

        ctx.order_queue.clear();
        ctx.update_position(SYMBOL.to_string(), 0.0);
        strategy.on_bar(&bar(2, 150.0), &mut ctx).unwrap();
        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
        assert_eq!(strategy.book().unwrap().grid.anchor_price(), 150.0);
    }

    #[test]
    fn test_volume_underflow_skips_opening() {
        let mut markets = HashMap::new();
        markets.insert(
            SYMBOL.to_string(),
            MarketInfo::new(SYMBOL.to_string(), 0.01, 1.0, 0.0, 1000.0),
        );
        let mut ctx = StrategyContext::new(markets);
        ctx.update_portfolio_value(1000.0);

        let mut strategy = TurnGridStrategy::new(config());
        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();

        assert_eq!(strategy.lifecycle(), Lifecycle::Active);
        assert!(ctx.order_queue.is_empty());
        assert_eq!(strategy.book().unwrap().ledger.occupancy(), 0);
        let StrategySummary::TurnGrid(summary) = strategy.get_summary(&ctx);
        assert_eq!(summary.skipped_openings, 1);
    }

    #[test]
    fn test_occupancy_and_ticket_invariants_hold_over_a_walk() {
        let mut ctx = create_test_context();
        let mut cfg = config();
        cfg.max_grid_shares = 6;
        let mut strategy = TurnGridStrategy::new(cfg);

        for n in 0..400 {
            let price = 100.0 * (1.0 + 0.045 * (n as f64 * 0.37).sin());
            strategy.on_bar(&bar(n, price), &mut ctx).unwrap();
            ctx.order_queue.clear();

            let book = strategy.book().unwrap();
            assert!(book.ledger.occupancy() <= 6);

            for (i, level) in book.grid.levels().iter().enumerate() {
                if level.state.has_buy() {
                    if let Some(t) = book.grid.ticket_index(i, OrderSide::Buy) {
                        assert!(book.grid.level(t).unwrap().buy_ticket.unwrap_or(0.0) > 0.0);
                    }
                }
                if level.state.has_sell() {
                    if let Some(t) = book.grid.ticket_index(i, OrderSide::Sell) {
                        assert!(book.grid.level(t).unwrap().sell_ticket.unwrap_or(0.0) > 0.0);
                    }
                }
            }
        }

        let StrategySummary::TurnGrid(summary) = strategy.get_summary(&ctx);
        assert!(summary.round_trips > 0);
    }

    #[test]
    fn test_grid_state_snapshot() {
        let mut ctx = create_test_context();
        let mut strategy = TurnGridStrategy::new(config());
        assert!(strategy.get_grid_state(&ctx).is_none());

        strategy.on_bar(&bar(0, 100.0), &mut ctx).unwrap();
        let state = strategy.get_grid_state(&ctx).unwrap();
        assert_eq!(state.levels.len(), 16);
        assert_eq!(state.current_index, state.center_index);
        assert_eq!(state.levels[state.center_index].state, "LongOpen");
        assert_eq!(state.levels[state.center_index + 2].buy_ticket, Some(0.25));
    }
}
