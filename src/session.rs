// One user's working state: the loaded table, the chosen window and the
// report settings. Each front end owns its own `Session`.
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::clean::NormalizeReport;
use crate::config::ReportConfig;
use crate::error::{Result, SalesError};
use crate::filter::{filter_by_date, DateRange};
use crate::loader;
use crate::output;
use crate::reports::{self, SalesReport};
use crate::types::SalesTable;
use crate::util::{format_int, format_number};

pub const FILTERED_FILE: &str = "filtered_sales.csv";
pub const DAILY_FILE: &str = "sales_by_day.csv";
pub const PAYMENT_FILE: &str = "sales_by_payment_mode.csv";
pub const TOP_ITEMS_FILE: &str = "top_items.csv";
pub const SUMMARY_FILE: &str = "summary.json";

pub struct Session {
    pub config: ReportConfig,
    pub output_dir: PathBuf,
    table: Option<SalesTable>,
    range: Option<DateRange>,
}

impl Session {
    pub fn new(config: ReportConfig, output_dir: PathBuf) -> Self {
        Self {
            config,
            output_dir,
            table: None,
            range: None,
        }
    }

    pub fn table(&self) -> Option<&SalesTable> {
        self.table.as_ref()
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    /// Replace the session table with a freshly loaded one and reset the
    /// window to the observed dates.
    pub fn load(&mut self, path: Option<&Path>) -> Result<NormalizeReport> {
        let (table, report) = loader::load_and_clean(path)?;
        self.install(table);
        Ok(report)
    }

    pub fn install(&mut self, table: SalesTable) {
        self.range = DateRange::observed(&table);
        self.table = Some(table);
    }

    /// Set the report window, clamped to the dates present in the data.
    /// `None` keeps the current bound.
    pub fn set_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange> {
        let table = self.table.as_ref().ok_or_else(not_loaded)?;
        let observed = DateRange::observed(table).ok_or_else(|| {
            SalesError::DataIntegrity("the loaded table has no valid dates".to_string())
        })?;
        let current = self.range.unwrap_or(observed);
        let picked = DateRange::new(start.unwrap_or(current.start), end.unwrap_or(current.end))
            .clamp_to(&observed);
        self.range = Some(picked);
        Ok(picked)
    }

    /// Loaded table restricted to the current window. Without any dated row
    /// nothing can fall inside a window, so the view is empty.
    pub fn filtered(&self) -> Result<SalesTable> {
        let table = self.table.as_ref().ok_or_else(not_loaded)?;
        Ok(match &self.range {
            Some(range) => filter_by_date(table, range),
            None => table.with_records(Vec::new()),
        })
    }

    pub fn report(&self) -> Result<(SalesTable, SalesReport)> {
        let filtered = self.filtered()?;
        let report = reports::build_report(&filtered, &self.config);
        Ok((filtered, report))
    }

    /// Write every export under `output_dir` and return the written paths.
    pub fn export(&self, filtered: &SalesTable, report: &SalesReport) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = |name: &str| self.output_dir.join(name);

        output::write_table_csv(&path(FILTERED_FILE), filtered)?;
        output::write_csv(&path(DAILY_FILE), &report.daily)?;
        output::write_csv(&path(PAYMENT_FILE), &report.by_payment_mode)?;
        output::write_csv(&path(TOP_ITEMS_FILE), &report.top_items)?;
        output::write_json(&path(SUMMARY_FILE), &report.summary)?;

        let written: Vec<PathBuf> = [
            FILTERED_FILE,
            DAILY_FILE,
            PAYMENT_FILE,
            TOP_ITEMS_FILE,
            SUMMARY_FILE,
        ]
        .iter()
        .map(|name| path(name))
        .collect();
        info!(
            "Exported {} file(s) to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}

fn not_loaded() -> SalesError {
    SalesError::DataIntegrity("no data loaded, load a file first".to_string())
}

pub fn print_load_summary(report: &NormalizeReport) {
    println!(
        "Processing dataset... ({} rows loaded)",
        format_int(report.rows as u64)
    );
    if report.unparsed_dates > 0 {
        println!(
            "Note: {} rows have an unreadable date and are excluded from date windows.",
            format_int(report.unparsed_dates as u64)
        );
    }
    if report.imputed_payment_modes > 0 {
        println!(
            "Info: Filled {} missing payment modes with '{}'.",
            format_int(report.imputed_payment_modes as u64),
            report.payment_mode_fill
        );
    }
    println!();
}

pub fn print_report(filtered: &SalesTable, report: &SalesReport, range: Option<DateRange>) {
    let summary = &report.summary;
    match range {
        Some(r) => println!("Restaurant Sales Dashboard ({} to {})\n", r.start, r.end),
        None => println!("Restaurant Sales Dashboard\n"),
    }
    if filtered.is_empty() {
        println!("No data available for the selected period.\n");
    } else {
        println!("Data available for the selected period.\n");
    }

    println!("Total Sales:       €{}", format_number(summary.total_sales, 2));
    println!(
        "Estimated Profit:  €{} ({}% margin)",
        format_number(summary.estimated_profit, 2),
        format_number(summary.profit_margin * 100.0, 0)
    );
    match summary.forecast_next_period {
        Some(v) => println!(
            "Forecast ({} days): €{}\n",
            summary.forecast_days,
            format_number(v, 2)
        ),
        None => println!("Forecast ({} days): unavailable\n", summary.forecast_days),
    }

    println!("Sales Data Table");
    output::preview_sales_table(filtered, 5);
    println!("Sales Over Time");
    output::preview_table_rows(&report.daily, 10);
    println!("Sales by Payment Mode");
    output::preview_table_rows(&report.by_payment_mode, 10);
    println!("Top Selling Items");
    output::preview_table_rows(&report.top_items, report.top_items.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnSlot, SalesRecord};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> SalesTable {
        let record = |d: u32, total: f64| SalesRecord {
            date: Some(ymd(2024, 1, d)),
            name: "Tea".to_string(),
            kind: "Beverages".to_string(),
            price: Some(total),
            total: Some(total),
            payment_mode: "Cash".to_string(),
            clients: "Mr.".to_string(),
            quantity: Some(1),
            extras: Vec::new(),
        };
        SalesTable {
            columns: vec!["date".to_string(), "total".to_string()],
            slots: vec![ColumnSlot::Date, ColumnSlot::Total],
            records: vec![record(1, 10.0), record(5, 20.0), record(9, 30.0)],
        }
    }

    #[test]
    fn install_defaults_to_observed_range() {
        let mut session = Session::new(ReportConfig::default(), PathBuf::from("."));
        session.install(table());
        assert_eq!(
            session.range(),
            Some(DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 9)))
        );
        assert_eq!(session.filtered().unwrap().len(), 3);
    }

    #[test]
    fn set_range_clamps_and_keeps_unspecified_bound() {
        let mut session = Session::new(ReportConfig::default(), PathBuf::from("."));
        session.install(table());
        let range = session.set_range(Some(ymd(2024, 1, 4)), None).unwrap();
        assert_eq!(range, DateRange::new(ymd(2024, 1, 4), ymd(2024, 1, 9)));
        let range = session.set_range(None, Some(ymd(2030, 1, 1))).unwrap();
        assert_eq!(range.end, ymd(2024, 1, 9));
        assert_eq!(session.filtered().unwrap().len(), 2);
    }

    #[test]
    fn operations_require_loaded_data() {
        let mut session = Session::new(ReportConfig::default(), PathBuf::from("."));
        assert!(session.filtered().is_err());
        assert!(session.set_range(None, None).is_err());
    }
}
