// Normalizer: raw export rows to the canonical sales table.
//
// Malformed cells are repaired in place (unparseable dates and numbers
// become missing, blank payment modes are imputed); rows are never dropped.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::error::{Result, SalesError};
use crate::schema;
use crate::types::{ColumnSlot, RawTable, SalesRecord, SalesTable};
use crate::util::{parse_date_safe, parse_f64_safe, parse_i64_safe};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub rows: usize,
    pub unparsed_dates: usize,
    pub unparsed_numbers: usize,
    pub imputed_payment_modes: usize,
    pub payment_mode_fill: String,
}

/// Row as read from the source, before `payment_mode` has been imputed.
struct StagedRecord {
    date: Option<NaiveDate>,
    name: String,
    kind: String,
    price: Option<f64>,
    total: Option<f64>,
    payment_mode: Option<String>,
    clients: String,
    quantity: Option<i64>,
    extras: Vec<String>,
}

struct ColumnIndexes {
    date: usize,
    name: usize,
    kind: usize,
    price: usize,
    total: usize,
    payment_mode: usize,
    clients: usize,
    quantity: usize,
}

impl ColumnIndexes {
    fn resolve(table: &RawTable) -> Result<Self> {
        let date = table
            .column_index("date")
            .ok_or(SalesError::MissingDateColumn)?;
        let missing = schema::missing_columns(&table.headers);
        if !missing.is_empty() {
            return Err(SalesError::Schema { missing });
        }
        // Presence was checked just above.
        let idx = |name: &str| table.column_index(name).unwrap_or_default();
        Ok(Self {
            date,
            name: idx("item_name"),
            kind: idx("item_type"),
            price: idx("item_price"),
            total: idx("transaction_amount"),
            payment_mode: idx("transaction_type"),
            clients: idx("received_by"),
            quantity: idx("quantity"),
        })
    }

    /// Canonical slot backed by source column `idx`, if any.
    fn slot(&self, idx: usize) -> Option<ColumnSlot> {
        [
            (self.date, ColumnSlot::Date),
            (self.name, ColumnSlot::Name),
            (self.kind, ColumnSlot::Kind),
            (self.price, ColumnSlot::Price),
            (self.total, ColumnSlot::Total),
            (self.payment_mode, ColumnSlot::PaymentMode),
            (self.clients, ColumnSlot::Clients),
            (self.quantity, ColumnSlot::Quantity),
        ]
        .into_iter()
        .find(|(i, _)| *i == idx)
        .map(|(_, slot)| slot)
    }
}

/// Most frequent non-blank value. Ties go to the lexicographically smallest
/// value; `None` when every value is missing.
pub fn column_mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Replace every missing value with the column mode.
///
/// Returns the filled column and the mode used. Fails when the column holds
/// no value at all, since there is nothing to impute from.
pub fn impute_mode(values: Vec<Option<String>>, column: &str) -> Result<(Vec<String>, String)> {
    let mode = column_mode(&values).ok_or_else(|| {
        SalesError::DataIntegrity(format!(
            "column '{column}' has no values to impute missing entries from"
        ))
    })?;
    let filled = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| mode.clone()))
        .collect();
    Ok((filled, mode))
}

/// Placeholders spreadsheet and pandas exports write for an absent value.
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// `None` for blank cells and missing-value placeholders.
fn present(cell: &str) -> Option<String> {
    if MISSING_TOKENS.contains(&cell.trim()) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn stage_row(
    row: &[String],
    cols: &ColumnIndexes,
    extra_idx: &[usize],
    report: &mut NormalizeReport,
) -> StagedRecord {
    let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

    let raw_date = cell(cols.date);
    let date = parse_date_safe(Some(raw_date));
    if date.is_none() {
        report.unparsed_dates += 1;
        debug!("Unparseable date '{}', keeping row with a missing date", raw_date);
    }

    let mut numeric = |idx: usize| {
        let raw = cell(idx);
        let parsed = parse_f64_safe(Some(raw));
        if parsed.is_none() && !raw.trim().is_empty() {
            report.unparsed_numbers += 1;
        }
        parsed
    };
    let price = numeric(cols.price);
    let total = numeric(cols.total);

    let raw_quantity = cell(cols.quantity);
    let quantity = parse_i64_safe(Some(raw_quantity));
    if quantity.is_none() && !raw_quantity.trim().is_empty() {
        report.unparsed_numbers += 1;
    }

    StagedRecord {
        date,
        name: cell(cols.name).to_string(),
        kind: cell(cols.kind).to_string(),
        price,
        total,
        payment_mode: present(cell(cols.payment_mode)),
        clients: cell(cols.clients).to_string(),
        quantity,
        extras: extra_idx.iter().map(|&i| cell(i).to_string()).collect(),
    }
}

/// Turn a schema-valid raw table into the canonical table.
///
/// Order of work: date repair, stable chronological sort (missing dates
/// last), column rename, `payment_mode` mode imputation.
pub fn normalize(raw: RawTable) -> Result<(SalesTable, NormalizeReport)> {
    let cols = ColumnIndexes::resolve(&raw)?;
    let mut extra_idx: Vec<usize> = Vec::new();
    let slots: Vec<ColumnSlot> = (0..raw.headers.len())
        .map(|i| {
            cols.slot(i).unwrap_or_else(|| {
                extra_idx.push(i);
                ColumnSlot::Extra(extra_idx.len() - 1)
            })
        })
        .collect();

    let mut report = NormalizeReport {
        rows: raw.len(),
        ..NormalizeReport::default()
    };
    let mut staged: Vec<StagedRecord> = raw
        .rows
        .iter()
        .map(|row| stage_row(row, &cols, &extra_idx, &mut report))
        .collect();

    staged.sort_by_key(|r| (r.date.is_none(), r.date));

    let columns = schema::rename_columns(&raw.headers);

    let modes: Vec<Option<String>> = staged
        .iter_mut()
        .map(|r| r.payment_mode.take())
        .collect();
    report.imputed_payment_modes = modes.iter().filter(|m| m.is_none()).count();
    let (payment_modes, fill) = if staged.is_empty() {
        (Vec::new(), String::new())
    } else {
        impute_mode(modes, "payment_mode")?
    };
    report.payment_mode_fill = fill;

    let records = staged
        .into_iter()
        .zip(payment_modes)
        .map(|(r, payment_mode)| SalesRecord {
            date: r.date,
            name: r.name,
            kind: r.kind,
            price: r.price,
            total: r.total,
            payment_mode,
            clients: r.clients,
            quantity: r.quantity,
            extras: r.extras,
        })
        .collect();

    if report.unparsed_dates > 0 {
        warn!(
            "{} row(s) had an unparseable date and were kept with a missing date",
            report.unparsed_dates
        );
    }
    if report.unparsed_numbers > 0 {
        warn!(
            "{} numeric cell(s) could not be parsed and were treated as missing",
            report.unparsed_numbers
        );
    }
    if report.imputed_payment_modes > 0 {
        info!(
            "Filled {} missing payment mode(s) with '{}'",
            report.imputed_payment_modes, report.payment_mode_fill
        );
    }
    info!("Normalized {} row(s)", report.rows);

    Ok((
        SalesTable {
            columns,
            slots,
            records,
        },
        report,
    ))
}
