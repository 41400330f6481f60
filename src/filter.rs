use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::types::SalesTable;

/// Inclusive date window. `start <= end` is up to the caller; an inverted
/// range simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Earliest and latest known dates in `table`, or `None` when no record
    /// carries a date.
    pub fn observed(table: &SalesTable) -> Option<Self> {
        let mut dates = table.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Pull both bounds into `bounds`, the way a date picker limited to the
    /// observed data would.
    pub fn clamp_to(&self, bounds: &DateRange) -> Self {
        Self {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }
}

/// Records dated inside `range`, in their original relative order.
///
/// Records with a missing date never match. The source table is left as is.
pub fn filter_by_date(table: &SalesTable, range: &DateRange) -> SalesTable {
    let records: Vec<_> = table
        .records
        .iter()
        .filter(|r| r.date.is_some_and(|d| range.contains(d)))
        .cloned()
        .collect();
    debug!(
        "Date filter {}..={} kept {} of {} row(s)",
        range.start,
        range.end,
        records.len(),
        table.len()
    );
    table.with_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnSlot, SalesRecord};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: Option<NaiveDate>, name: &str, total: f64) -> SalesRecord {
        SalesRecord {
            date,
            name: name.to_string(),
            kind: "Fastfood".to_string(),
            price: Some(total),
            total: Some(total),
            payment_mode: "Cash".to_string(),
            clients: "Mr.".to_string(),
            quantity: Some(1),
            extras: Vec::new(),
        }
    }

    fn table() -> SalesTable {
        SalesTable {
            columns: vec!["date".to_string(), "name".to_string()],
            slots: vec![ColumnSlot::Date, ColumnSlot::Name],
            records: vec![
                record(Some(ymd(2024, 1, 1)), "a", 10.0),
                record(Some(ymd(2024, 1, 2)), "b", 20.0),
                record(Some(ymd(2024, 1, 3)), "c", 30.0),
                record(None, "d", 40.0),
            ],
        }
    }

    #[test]
    fn filter_is_inclusive_on_both_ends() {
        let t = table();
        let filtered = filter_by_date(&t, &DateRange::new(ymd(2024, 1, 2), ymd(2024, 1, 3)));
        let names: Vec<_> = filtered.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(filtered.columns, t.columns);
        assert_eq!(t.len(), 4, "source table must not change");
    }

    #[test]
    fn inverted_range_is_empty() {
        let filtered = filter_by_date(&table(), &DateRange::new(ymd(2024, 1, 3), ymd(2024, 1, 1)));
        assert!(filtered.is_empty());
    }

    #[test]
    fn range_outside_data_is_empty() {
        let filtered = filter_by_date(&table(), &DateRange::new(ymd(2025, 1, 1), ymd(2025, 12, 31)));
        assert!(filtered.is_empty());
    }

    #[test]
    fn observed_skips_missing_dates() {
        let range = DateRange::observed(&table()).unwrap();
        assert_eq!(range, DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 3)));
        assert_eq!(DateRange::observed(&SalesTable::default()), None);
    }

    #[test]
    fn clamp_to_limits_both_bounds() {
        let bounds = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31));
        let picked = DateRange::new(ymd(2023, 12, 1), ymd(2024, 3, 1));
        assert_eq!(picked.clamp_to(&bounds), bounds);
    }
}
