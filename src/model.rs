use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Cloid = uuid::Uuid;

/// One completed price bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(close_time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            close_time,
            open,
            high,
            low,
            close,
        }
    }

    /// Bar where every price equals `price`. Handy for replaying ticks.
    pub fn flat(close_time: DateTime<Utc>, price: f64) -> Self {
        Self::new(close_time, price, price, price, price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells.
    pub fn sign(&self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderRequest {
    Market {
        symbol: String,
        side: OrderSide,
        sz: f64,
        cloid: Option<Cloid>,
    },
}

impl OrderRequest {
    pub fn side(&self) -> OrderSide {
        match self {
            OrderRequest::Market { side, .. } => *side,
        }
    }

    pub fn size(&self) -> f64 {
        match self {
            OrderRequest::Market { sz, .. } => *sz,
        }
    }

    /// Signed size: positive for buys, negative for sells.
    pub fn signed_size(&self) -> f64 {
        self.side().sign() * self.size()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFill {
    pub side: OrderSide,
    pub size: f64,
    pub price: f64,
    pub fee: f64,
    pub cloid: Option<Cloid>,
}
