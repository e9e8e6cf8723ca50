//! Console renderer for the end-of-run replay report.

use crate::config::strategy::StrategyConfig;
use crate::constants::LEVELS_PER_SHARE;
use crate::ui::types::{GridState, StrategySummary, TurnGridSummary};

/// Account figures of the simulated venue at the end of the replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountReport {
    pub initial_balance: f64,
    pub equity: f64,
    pub cash: f64,
    pub position: f64,
    pub commission_paid: f64,
    pub bars: usize,
    pub fills: usize,
}

/// Console renderer for replay reports.
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    /// Render a complete replay report to stdout.
    pub fn render(
        config: &StrategyConfig,
        summary: Option<&StrategySummary>,
        grid: Option<&GridState>,
        account: &AccountReport,
    ) {
        println!();
        println!("{}", "=".repeat(60));
        println!(" TURN GRID REPLAY REPORT");
        println!("{}", "=".repeat(60));

        // Section 1: Grid State
        if let Some(g) = grid {
            println!();
            Self::render_grid(g);
        }

        // Section 2: Configuration & Summary
        println!();
        println!("{}", "=".repeat(60));
        Self::render_config(config);

        println!();
        println!("{}", "-".repeat(60));
        if let Some(s) = summary {
            Self::render_summary(s);
        }

        println!();
        println!("{}", "-".repeat(60));
        Self::render_account(account);

        println!();
        println!("{}", "=".repeat(60));
        println!();
    }

    fn render_config(config: &StrategyConfig) {
        println!("CONFIGURATION");

        match config {
            StrategyConfig::TurnGrid(c) => {
                println!("Symbol:      {}", c.symbol);
                println!("Type:        turn_grid");
                println!("Distance:    {:.3}%", c.grid_distance * 100.0);
                println!("Max Shares:  {}", c.max_grid_shares);
                println!(
                    "Levels:      {}",
                    c.max_grid_shares as usize * LEVELS_PER_SHARE
                );
                println!("Target:      {:.3}%", c.equity_target_return * 100.0);
                println!("Fee Rate:    {:.4}%", c.fee_rate * 100.0);
                println!("Bar Period:  {:?}", c.bar_period);
                println!("Boundary:    {:?}", c.boundary_policy);
            }
        }
    }

    fn render_summary(summary: &StrategySummary) {
        match summary {
            StrategySummary::TurnGrid(s) => Self::render_turn_grid_summary(s),
        }
    }

    fn render_turn_grid_summary(s: &TurnGridSummary) {
        println!("STRATEGY: {}", s.symbol);
        println!("State:    {}", s.state);
        println!("Price:    {:.6}", s.price);

        match (s.anchor_price, s.current_index) {
            (Some(anchor), Some(index)) => {
                println!("Anchor:   {:.6} (level {})", anchor, index);
            }
            _ => println!("Anchor:   -"),
        }
        if let (Some(ib), Some(target)) = (s.initial_balance, s.target_equity) {
            println!("Equity:   start {:.3} | target {:.3}", ib, target);
        }
        if let (Some(first), Some(inc)) = (s.first_unit, s.open_increment) {
            println!("Units:    first {:.4} | increment {:.4}", first, inc);
        }

        println!(
            "Open:     {} buy / {} sell (max {})",
            s.buy_count, s.sell_count, s.max_shares
        );
        println!("Est. Fee: {:.6}", s.total_fee);
        println!(
            "Grids:    {} built | {} rebuilds | {} round trips",
            s.grids_built, s.rebuilds, s.round_trips
        );
        println!(
            "Skipped:  {} openings | {} flatten orders",
            s.skipped_openings, s.flatten_orders
        );
        if let Some(pv) = s.portfolio_value {
            println!("Value:    {:.3}", pv);
        }
        println!("Position: {:.6}", s.net_position);
    }

    fn render_account(a: &AccountReport) {
        println!("ACCOUNT");
        println!("Bars:        {}", a.bars);
        println!("Fills:       {}", a.fills);
        println!("Cash:        {:.3}", a.cash);
        println!("Position:    {:.6}", a.position);
        println!("Commission:  {:.6}", a.commission_paid);

        let pnl = a.equity - a.initial_balance;
        let pnl_pct = if a.initial_balance > 0.0 {
            pnl / a.initial_balance * 100.0
        } else {
            0.0
        };
        println!("Equity:      {:.3} ({:+.3} / {:+.2}%)", a.equity, pnl, pnl_pct);
    }

    fn render_grid(g: &GridState) {
        println!(
            "GRID STATE ({} Levels, center {})",
            g.levels.len(),
            g.center_index
        );
        println!(
            "{:<4} | {:<14} | {:<9} | {:<12} | {:<12} |",
            "IDX", "PRICE", "STATE", "BUY TICKET", "SELL TICKET"
        );
        println!("{}", "-".repeat(64));

        // Highest price first
        for l in g.levels.iter().rev() {
            let marker = if l.index == g.current_index {
                "<- price"
            } else if l.index == g.center_index {
                "<- anchor"
            } else {
                ""
            };
            println!(
                "{:<4} | {:<14.6} | {:<9} | {:<12} | {:<12} | {}",
                l.index,
                l.price,
                l.state,
                format_ticket(l.buy_ticket),
                format_ticket(l.sell_ticket),
                marker
            );
        }
    }
}

fn format_ticket(ticket: Option<f64>) -> String {
    ticket.map(|v| format!("{:.6}", v)).unwrap_or_else(|| "-".to_string())
}
