use super::grid::Grid;

/// Result of one navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub previous: usize,
    pub current: usize,
    /// The index sits on the first or last level after this step.
    pub at_boundary: bool,
}

impl Navigation {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    pub fn rungs_moved(&self) -> usize {
        self.previous.abs_diff(self.current)
    }
}

/// Tracks the level the price currently sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridNavigator {
    current: usize,
}

impl GridNavigator {
    /// Starts on the anchor level.
    pub fn new(grid: &Grid) -> Self {
        Self {
            current: grid.center_index(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Walks the index towards `price`, possibly several rungs at once.
    /// Stops at either end of the grid.
    pub fn advance(&mut self, grid: &Grid, price: f64) -> Navigation {
        let previous = self.current;

        while let Some(next) = grid.price(self.current + 1) {
            if price >= next {
                self.current += 1;
            } else {
                break;
            }
        }
        while self.current > 0 {
            match grid.price(self.current - 1) {
                Some(prev) if price <= prev => self.current -= 1,
                _ => break,
            }
        }

        Navigation {
            previous,
            current: self.current,
            at_boundary: grid.is_edge(self.current),
        }
    }
}
