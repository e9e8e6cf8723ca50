use serde::{Deserialize, Serialize};

// ============================================================
// Strategy Summaries (High-level metrics)
// ============================================================

/// Turn Grid strategy summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnGridSummary {
    pub symbol: String,
    pub price: f64,
    pub state: String, // "Initializing", "Active", "WaitingFlatten", ...

    // Current grid
    pub anchor_price: Option<f64>,
    pub current_index: Option<usize>,
    pub initial_balance: Option<f64>,
    pub target_equity: Option<f64>,
    pub first_unit: Option<f64>,
    pub open_increment: Option<f64>,

    // Occupancy
    pub buy_count: u32,
    pub sell_count: u32,
    pub max_shares: u32,
    pub total_fee: f64,

    // Lifetime stats
    pub grids_built: u32,
    pub rebuilds: u32,
    pub round_trips: u32,
    pub skipped_openings: u32,
    pub flatten_orders: u32,

    // Account
    pub portfolio_value: Option<f64>,
    pub net_position: f64,
}

/// Wrapper enum for strategy-specific summaries
#[derive(Debug, Clone)]
pub enum StrategySummary {
    TurnGrid(TurnGridSummary),
}

// ============================================================
// Grid State (per-level data for the console report)
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridState {
    pub symbol: String,
    pub current_price: f64,
    pub current_index: usize,
    pub center_index: usize,
    pub levels: Vec<LevelInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelInfo {
    pub index: usize,
    pub price: f64,
    pub state: String, // "Empty", "LongOpen", "ShortOpen", "Hedged"
    pub buy_ticket: Option<f64>,
    pub sell_ticket: Option<f64>,
}
