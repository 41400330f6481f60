use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{Result, SalesError};
use crate::types::RawTable;

/// Columns every sales export must carry, in the order they are reported.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "item_name",
    "item_type",
    "item_price",
    "transaction_amount",
    "transaction_type",
    "received_by",
    "quantity",
];

/// Raw export name to canonical name. `date` and `quantity` keep their names,
/// and no canonical name appears as a key, so renaming is idempotent.
pub static COLUMN_RENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("item_name", "name"),
        ("item_type", "type"),
        ("item_price", "price"),
        ("transaction_amount", "total"),
        ("transaction_type", "payment_mode"),
        ("received_by", "clients"),
    ])
});

pub fn canonical_name(column: &str) -> &str {
    COLUMN_RENAMES.get(column).copied().unwrap_or(column)
}

pub fn rename_columns(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| canonical_name(h).to_string())
        .collect()
}

/// Strip whitespace and a UTF-8 byte order mark from a header cell.
pub fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Lists the required columns absent from `headers`, in required order.
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|required| required.to_string())
        .collect()
}

/// Check `table` against the required column set before any renaming.
///
/// Returns the table untouched when every required column is present;
/// extra columns are allowed.
pub fn validate(table: RawTable) -> Result<RawTable> {
    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        log::warn!("Rejected table, missing column(s): {}", missing.join(", "));
        return Err(SalesError::Schema { missing });
    }
    Ok(table)
}
