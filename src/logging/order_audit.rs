use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;
use std::fs::{create_dir_all, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::model::{Cloid, OrderSide};

#[derive(Debug, Serialize, Clone)]
pub struct OrderRecord {
    /// Close time of the bar the order belongs to.
    pub timestamp: String,
    pub symbol: String,
    pub order_type: String, // REQ, FILL
    pub side: String,
    pub price: f64,
    pub size: f64,
    pub cloid: Option<String>,
    pub fee: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct OrderAuditLogger {
    writer: Arc<Mutex<Writer<std::fs::File>>>,
}

impl OrderAuditLogger {
    pub fn new(log_dir: &str) -> Result<Self> {
        let dir = Path::new(log_dir);
        create_dir_all(dir).context("Failed to create log directory")?;

        let file_path = dir.join("trades.csv");
        let file_exists = file_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .context("Failed to open trades.csv")?;

        let writer = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
        })
    }

    pub fn log(&self, record: OrderRecord) {
        if let Ok(mut w) = self.writer.lock() {
            if let Err(e) = w.serialize(record) {
                log::error!("Failed to write order audit log: {}", e);
            } else {
                let _ = w.flush();
            }
        }
    }

    pub fn log_req(
        &self,
        time: DateTime<Utc>,
        symbol: &str,
        side: OrderSide,
        reference_price: f64,
        size: f64,
        cloid: Option<Cloid>,
    ) {
        self.log(OrderRecord {
            timestamp: time.to_rfc3339(),
            symbol: symbol.to_string(),
            order_type: "REQ".to_string(),
            side: side.to_string(),
            price: reference_price,
            size,
            cloid: cloid.map(|c| c.to_string()),
            fee: None,
            notes: None,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_fill(
        &self,
        time: DateTime<Utc>,
        symbol: &str,
        side: OrderSide,
        price: f64,
        size: f64,
        cloid: Option<Cloid>,
        fee: f64,
        notes: Option<String>,
    ) {
        self.log(OrderRecord {
            timestamp: time.to_rfc3339(),
            symbol: symbol.to_string(),
            order_type: "FILL".to_string(),
            side: side.to_string(),
            price,
            size,
            cloid: cloid.map(|c| c.to_string()),
            fee: Some(fee),
            notes,
        });
    }
}
