//! Central configuration constants for turngrid-bot.
//!
//! Tunable parameters and magic numbers used across the engine and the
//! simulation harness.

// =============================================================================
// GRID CONSTANTS
// =============================================================================

/// Levels allocated per share of `max_grid_shares` (2x above, 2x below the anchor)
pub const LEVELS_PER_SHARE: usize = 4;

/// Rungs between an opening and its closing ticket
pub const TICKET_OFFSET: usize = 2;

/// First unit of a side gets `open_budget / FIRST_UNIT_DIVISOR`
pub const FIRST_UNIT_DIVISOR: f64 = 10.0;

/// Default bound on consecutive flatten attempts before the engine halts
pub const DEFAULT_MAX_FLATTEN_RETRIES: u32 = 20;

/// Positions smaller than this are treated as flat
pub const POSITION_EPSILON: f64 = 1e-9;

// =============================================================================
// HARNESS DEFAULTS
// =============================================================================

/// Directory for rolling logs and the order audit trail
pub const LOG_DIR: &str = "logs";

/// Default simulated starting balance
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
