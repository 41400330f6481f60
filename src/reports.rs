use std::collections::{BTreeMap, HashMap};

use crate::config::ReportConfig;
use crate::error::{Result, SalesError};
use crate::filter::DateRange;
use crate::types::{DailySales, ItemQuantity, PaymentModeSales, SalesSummary, SalesTable};
use crate::util::average;

/// Sum of `total`; missing amounts count as zero.
pub fn total_sales(table: &SalesTable) -> f64 {
    table.records.iter().filter_map(|r| r.total).sum()
}

/// `total_sales * margin`. The margin is a policy figure, not derived from cost data.
pub fn estimated_profit(table: &SalesTable, margin: f64) -> f64 {
    total_sales(table) * margin
}

/// Mean daily sales across the distinct dates present, scaled to `days`.
pub fn forecast_next_period(table: &SalesTable, days: u32) -> Result<f64> {
    let daily: Vec<f64> = sales_by_day(table).into_iter().map(|d| d.total).collect();
    if daily.is_empty() {
        return Err(SalesError::DataIntegrity(
            "no dated sales to forecast from".to_string(),
        ));
    }
    Ok(average(&daily) * f64::from(days))
}

/// Sales per calendar day, oldest first. Undated records are left out.
pub fn sales_by_day(table: &SalesTable) -> Vec<DailySales> {
    let mut map: BTreeMap<_, f64> = BTreeMap::new();
    for r in &table.records {
        if let Some(date) = r.date {
            *map.entry(date).or_insert(0.0) += r.total.unwrap_or(0.0);
        }
    }
    map.into_iter()
        .map(|(date, total)| DailySales { date, total })
        .collect()
}

/// Sales per payment mode, ordered by payment mode name.
pub fn sales_by_payment_mode(table: &SalesTable) -> Vec<PaymentModeSales> {
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in &table.records {
        *map.entry(r.payment_mode.as_str()).or_insert(0.0) += r.total.unwrap_or(0.0);
    }
    map.into_iter()
        .map(|(mode, total)| PaymentModeSales {
            payment_mode: mode.to_string(),
            total,
        })
        .collect()
}

/// Best sellers by summed quantity, highest first.
///
/// Items with equal quantity keep the order in which they first appear in
/// the table. At most `limit` rows are returned. Sums saturate at the `i64`
/// bounds.
pub fn top_items_by_quantity(table: &SalesTable, limit: usize) -> Vec<ItemQuantity> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut items: Vec<ItemQuantity> = Vec::new();
    for r in &table.records {
        let idx = *positions.entry(r.name.as_str()).or_insert_with(|| {
            items.push(ItemQuantity {
                name: r.name.clone(),
                quantity: 0,
            });
            items.len() - 1
        });
        let item = &mut items[idx];
        item.quantity = item.quantity.saturating_add(r.quantity.unwrap_or(0));
    }
    // `sort_by` is stable, which is what keeps first-seen order on ties.
    items.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    items.truncate(limit);
    items
}

/// Everything the reporting surface shows for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub summary: SalesSummary,
    pub daily: Vec<DailySales>,
    pub by_payment_mode: Vec<PaymentModeSales>,
    pub top_items: Vec<ItemQuantity>,
}

pub fn build_report(table: &SalesTable, config: &ReportConfig) -> SalesReport {
    SalesReport {
        summary: summarize(table, config),
        daily: sales_by_day(table),
        by_payment_mode: sales_by_payment_mode(table),
        top_items: top_items_by_quantity(table, config.top_items_limit),
    }
}

/// Headline figures for `table` under `config`.
///
/// An unavailable forecast is reported as `None` rather than failing the
/// whole summary.
pub fn summarize(table: &SalesTable, config: &ReportConfig) -> SalesSummary {
    let observed = DateRange::observed(table);
    let forecast = match forecast_next_period(table, config.forecast_days) {
        Ok(value) => Some(value),
        Err(e) => {
            log::info!("Forecast unavailable: {}", e);
            None
        }
    };
    SalesSummary {
        rows: table.len(),
        start_date: observed.map(|r| r.start),
        end_date: observed.map(|r| r.end),
        total_sales: total_sales(table),
        estimated_profit: estimated_profit(table, config.profit_margin),
        profit_margin: config.profit_margin,
        forecast_next_period: forecast,
        forecast_days: config.forecast_days,
    }
}
