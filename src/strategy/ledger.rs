use super::grid::Grid;
use crate::model::OrderSide;

/// A closing ticket that was reached and must be turned into an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    /// Side of the unit being closed.
    pub unit_side: OrderSide,
    pub volume: f64,
    /// Level the unit was opened on, if it is still inside the grid.
    pub opening_index: Option<usize>,
}

impl Settlement {
    /// Side of the order that closes the unit.
    pub fn order_side(&self) -> OrderSide {
        self.unit_side.opposite()
    }
}

/// Open-unit bookkeeping for one grid lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionLedger {
    buy_count: u32,
    sell_count: u32,
    max_shares: u32,
}

impl PositionLedger {
    pub fn new(max_shares: u32) -> Self {
        Self {
            buy_count: 0,
            sell_count: 0,
            max_shares,
        }
    }

    pub fn buy_count(&self) -> u32 {
        self.buy_count
    }

    pub fn sell_count(&self) -> u32 {
        self.sell_count
    }

    pub fn count(&self, side: OrderSide) -> u32 {
        match side {
            OrderSide::Buy => self.buy_count,
            OrderSide::Sell => self.sell_count,
        }
    }

    pub fn occupancy(&self) -> u32 {
        self.buy_count + self.sell_count
    }

    pub fn is_full(&self) -> bool {
        self.occupancy() >= self.max_shares
    }

    /// Consumes every ticket parked at `index`. Buy tickets come first.
    pub fn settle(&mut self, grid: &mut Grid, index: usize) -> Vec<Settlement> {
        let mut settlements = Vec::new();

        for unit_side in [OrderSide::Buy, OrderSide::Sell] {
            let volume = match grid.level_mut(index) {
                Some(level) => match unit_side {
                    OrderSide::Buy => level.buy_ticket.take(),
                    OrderSide::Sell => level.sell_ticket.take(),
                },
                None => None,
            };
            let Some(volume) = volume.filter(|v| *v > 0.0) else {
                continue;
            };

            match unit_side {
                OrderSide::Buy => self.buy_count = self.buy_count.saturating_sub(1),
                OrderSide::Sell => self.sell_count = self.sell_count.saturating_sub(1),
            }

            let opening_index = grid.opening_index(index, unit_side);
            if let Some(level) = opening_index.and_then(|i| grid.level_mut(i)) {
                level.state = level.state.close(unit_side);
            }

            settlements.push(Settlement {
                unit_side,
                volume,
                opening_index,
            });
        }

        settlements
    }

    /// Which side, if any, should open at `index`.
    pub fn decide_opening(&self, grid: &Grid, index: usize) -> Option<OrderSide> {
        if self.is_full() {
            return None;
        }
        let state = grid.level(index)?.state;
        match (state.has_buy(), state.has_sell()) {
            (true, false) => Some(OrderSide::Sell),
            (false, true) => Some(OrderSide::Buy),
            (false, false) => {
                if self.buy_count <= self.sell_count {
                    Some(OrderSide::Buy)
                } else {
                    Some(OrderSide::Sell)
                }
            }
            (true, true) => None,
        }
    }

    /// Books a unit of `volume` opened on `side` at `index` and parks its
    /// closing ticket two rungs away. Returns the ticket index, if any.
    pub fn record_opening(
        &mut self,
        grid: &mut Grid,
        index: usize,
        side: OrderSide,
        volume: f64,
    ) -> Option<usize> {
        let level = grid.level_mut(index)?;
        level.state = level.state.open(side);

        let ticket_index = grid.ticket_index(index, side);
        if let Some(ticket) = ticket_index.and_then(|i| grid.level_mut(i)) {
            let slot = match side {
                OrderSide::Buy => &mut ticket.buy_ticket,
                OrderSide::Sell => &mut ticket.sell_ticket,
            };
            *slot = Some(slot.unwrap_or(0.0) + volume);
        }

        match side {
            OrderSide::Buy => self.buy_count += 1,
            OrderSide::Sell => self.sell_count += 1,
        }
        ticket_index
    }
}
