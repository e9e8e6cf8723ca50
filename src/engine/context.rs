use crate::model::{Cloid, OrderRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Floating point noise tolerated when snapping a value onto a step.
const STEP_TOLERANCE: f64 = 1e-9;

fn round_to_12(value: f64) -> f64 {
    (value * 1e12).round() / 1e12
}

/// Instrument metadata supplied by the venue (or the simulation config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub symbol: String,
    pub price_step: f64,
    pub volume_step: f64,
    pub volume_min: f64,
    pub volume_max: f64,
    #[serde(default)]
    pub last_price: f64,
}

impl MarketInfo {
    pub fn new(
        symbol: String,
        price_step: f64,
        volume_step: f64,
        volume_min: f64,
        volume_max: f64,
    ) -> Self {
        Self {
            symbol,
            price_step,
            volume_step,
            volume_min,
            volume_max,
            last_price: 0.0,
        }
    }

    /// Rounds down to the volume step.
    pub fn round_size(&self, sz: f64) -> f64 {
        if self.volume_step <= 0.0 {
            return sz;
        }
        round_to_12((sz / self.volume_step + STEP_TOLERANCE).floor() * self.volume_step)
    }

    /// Turns a raw volume into a tradable one: round down to the step, then
    /// clamp into `[volume_min, volume_max]`. `None` means the unit should
    /// not be opened.
    pub fn normalize_volume(&self, raw: f64) -> Option<f64> {
        if !raw.is_finite() || raw <= 0.0 {
            return None;
        }
        let mut volume = self.round_size(raw).max(self.volume_min);
        if self.volume_max > 0.0 {
            volume = volume.min(self.volume_max);
        }
        if volume > 0.0 {
            Some(volume)
        } else {
            None
        }
    }
}

pub struct StrategyContext {
    pub markets: HashMap<String, MarketInfo>,
    pub positions: HashMap<String, f64>,
    pub portfolio_value: Option<f64>,
    pub order_queue: Vec<OrderRequest>,
}

impl StrategyContext {
    pub fn new(markets: HashMap<String, MarketInfo>) -> Self {
        Self {
            markets,
            positions: HashMap::new(),
            portfolio_value: None,
            order_queue: Vec::new(),
        }
    }

    pub fn market_info(&self, symbol: &str) -> Option<&MarketInfo> {
        self.markets.get(symbol)
    }

    pub fn market_info_mut(&mut self, symbol: &str) -> Option<&mut MarketInfo> {
        self.markets.get_mut(symbol)
    }

    pub fn place_order(&mut self, order: OrderRequest) {
        self.order_queue.push(order);
    }

    pub fn generate_cloid(&mut self) -> Cloid {
        uuid::Uuid::new_v4()
    }

    // --- Account Accessors ---

    /// Current equity, if the collaborator can provide a meaningful one.
    pub fn portfolio_value(&self) -> Option<f64> {
        self.portfolio_value.filter(|v| v.is_finite() && *v > 0.0)
    }

    pub fn update_portfolio_value(&mut self, value: f64) {
        self.portfolio_value = Some(value);
    }

    /// Confirmed (filled) net position for `symbol`.
    pub fn net_position(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn update_position(&mut self, symbol: String, size: f64) {
        self.positions.insert(symbol, size);
    }

    /// Net position once every queued order for `symbol` has filled.
    pub fn projected_position(&self, symbol: &str) -> f64 {
        let pending: f64 = self
            .order_queue
            .iter()
            .filter(|o| match o {
                OrderRequest::Market { symbol: s, .. } => s == symbol,
            })
            .map(|o| o.signed_size())
            .sum();
        self.net_position(symbol) + pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderSide;

    fn market() -> MarketInfo {
        MarketInfo::new("BTC".to_string(), 0.01, 0.01, 0.01, 100.0)
    }

    #[test]
    fn test_round_size_floors_to_step() {
        let m = market();
        assert!((m.round_size(0.129) - 0.12).abs() < 1e-12);
        // 0.3 / 0.1 is 2.9999... in binary; the tolerance keeps it at 0.3
        let coarse = MarketInfo::new("BTC".to_string(), 0.01, 0.1, 0.0, 0.0);
        assert!((coarse.round_size(0.3) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_volume_clamps() {
        let m = market();
        assert_eq!(m.normalize_volume(0.001), Some(0.01));
        assert_eq!(m.normalize_volume(500.0), Some(100.0));
        assert_eq!(m.normalize_volume(0.0), None);
        assert_eq!(m.normalize_volume(f64::NAN), None);
    }

    #[test]
    fn test_normalize_volume_underflow_without_minimum() {
        let m = MarketInfo::new("BTC".to_string(), 0.01, 0.1, 0.0, 10.0);
        assert_eq!(m.normalize_volume(0.05), None);
    }

    #[test]
    fn test_projected_position_includes_queue() {
        let mut ctx = StrategyContext::new(HashMap::new());
        ctx.update_position("BTC".to_string(), 2.0);
        ctx.place_order(OrderRequest::Market {
            symbol: "BTC".to_string(),
            side: OrderSide::Sell,
            sz: 0.5,
            cloid: None,
        });
        ctx.place_order(OrderRequest::Market {
            symbol: "ETH".to_string(),
            side: OrderSide::Buy,
            sz: 9.0,
            cloid: None,
        });
        assert!((ctx.projected_position("BTC") - 1.5).abs() < 1e-12);
        assert_eq!(ctx.net_position("BTC"), 2.0);
    }

    #[test]
    fn test_portfolio_value_filters_non_positive() {
        let mut ctx = StrategyContext::new(HashMap::new());
        assert_eq!(ctx.portfolio_value(), None);
        ctx.update_portfolio_value(-5.0);
        assert_eq!(ctx.portfolio_value(), None);
        ctx.update_portfolio_value(1000.0);
        assert_eq!(ctx.portfolio_value(), Some(1000.0));
    }
}
