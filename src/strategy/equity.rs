/// Running estimate of transaction costs for one grid lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FeeAccumulator {
    total: f64,
}

impl FeeAccumulator {
    /// Adds `notional * fee_rate` and returns the fee just booked.
    pub fn charge(&mut self, notional: f64, fee_rate: f64) -> f64 {
        let fee = (notional * fee_rate).max(0.0);
        self.total += fee;
        fee
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Equity take-profit check against the grid's initial balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityMonitor {
    initial_balance: f64,
    target_return: f64,
}

impl EquityMonitor {
    pub fn new(initial_balance: f64, target_return: f64) -> Self {
        Self {
            initial_balance,
            target_return,
        }
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn target_equity(&self) -> f64 {
        self.initial_balance * (1.0 + self.target_return)
    }

    /// Strictly above target once fees are deducted.
    pub fn target_reached(&self, portfolio_value: f64, total_fee: f64) -> bool {
        portfolio_value - total_fee > self.target_equity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_accumulates() {
        let mut fees = FeeAccumulator::default();
        let fee = fees.charge(100.0 * 0.25, 0.001);
        assert!((fee - 0.025).abs() < 1e-12);
        fees.charge(50.0, 0.001);
        assert!((fees.total() - 0.075).abs() < 1e-12);
        // negative rates never reduce the total
        fees.charge(50.0, -0.5);
        assert!((fees.total() - 0.075).abs() < 1e-12);
    }

    #[test]
    fn test_target_scenario() {
        let monitor = EquityMonitor::new(1000.0, 0.02);
        assert!(monitor.target_reached(1021.0, 0.0));
        assert!(!monitor.target_reached(1020.0, 0.0));
        // fees push equity back under the target
        assert!(!monitor.target_reached(1021.0, 1.5));
    }
}
