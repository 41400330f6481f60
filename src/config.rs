use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Share of sales assumed to be profit.
pub const DEFAULT_PROFIT_MARGIN: f64 = 0.30;
/// Days projected by the next-period forecast ("next month").
pub const DEFAULT_FORECAST_DAYS: u32 = 30;
pub const DEFAULT_TOP_ITEMS: usize = 10;

/// Tunable policy constants for the derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub profit_margin: f64,
    pub forecast_days: u32,
    pub top_items_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            profit_margin: DEFAULT_PROFIT_MARGIN,
            forecast_days: DEFAULT_FORECAST_DAYS,
            top_items_limit: DEFAULT_TOP_ITEMS,
        }
    }
}

impl ReportConfig {
    /// Load a JSON config file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}
