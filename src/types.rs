use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{format_number, format_optional_date, format_optional_f64, format_optional_i64};

/// Untyped table as it comes out of a file: one header row and text cells.
///
/// Empty strings stand for missing values. Rows are padded to the header
/// width by the loader, so `rows[i].len() == headers.len()` always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One cleaned transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    /// `None` when the source value could not be parsed as a date.
    pub date: Option<NaiveDate>,
    pub name: String,
    pub kind: String,
    pub price: Option<f64>,
    pub total: Option<f64>,
    pub payment_mode: String,
    pub clients: String,
    pub quantity: Option<i64>,
    /// Values of the non-required columns, addressed by `ColumnSlot::Extra`.
    pub extras: Vec<String>,
}

/// Where a table column takes its cell from.
///
/// Columns are resolved once by position, so an extra column that happens to
/// share a name with a canonical one (or with another extra) still renders
/// its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    Date,
    Name,
    Kind,
    Price,
    Total,
    PaymentMode,
    Clients,
    Quantity,
    /// Index into `SalesRecord::extras`.
    Extra(usize),
}

/// Canonical sales table produced by the normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    /// Output column order: source order with canonical names applied.
    pub columns: Vec<String>,
    /// One slot per entry of `columns`.
    pub slots: Vec<ColumnSlot>,
    pub records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Builds a table sharing this table's layout but holding `records`.
    pub fn with_records(&self, records: Vec<SalesRecord>) -> Self {
        Self {
            columns: self.columns.clone(),
            slots: self.slots.clone(),
            records,
        }
    }

    /// Renders a record as text cells in `columns` order.
    pub fn render_row(&self, record: &SalesRecord) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| match *slot {
                ColumnSlot::Date => format_optional_date(record.date),
                ColumnSlot::Name => record.name.clone(),
                ColumnSlot::Kind => record.kind.clone(),
                ColumnSlot::Price => format_optional_f64(record.price),
                ColumnSlot::Total => format_optional_f64(record.total),
                ColumnSlot::PaymentMode => record.payment_mode.clone(),
                ColumnSlot::Clients => record.clients.clone(),
                ColumnSlot::Quantity => format_optional_i64(record.quantity),
                ColumnSlot::Extra(idx) => record.extras.get(idx).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

fn display_money(value: &f64) -> String {
    format_number(*value, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct DailySales {
    #[tabled(rename = "date")]
    pub date: NaiveDate,
    #[tabled(rename = "total", display_with = "display_money")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct PaymentModeSales {
    #[tabled(rename = "payment_mode")]
    pub payment_mode: String,
    #[tabled(rename = "total", display_with = "display_money")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct ItemQuantity {
    #[tabled(rename = "name")]
    pub name: String,
    #[tabled(rename = "quantity")]
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub rows: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_sales: f64,
    pub estimated_profit: f64,
    pub profit_margin: f64,
    /// `None` when there is no dated record to project from.
    pub forecast_next_period: Option<f64>,
    pub forecast_days: u32,
}
