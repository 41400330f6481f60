use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::error::Result;
use crate::types::SalesTable;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write `table` as comma separated text: a header row, then one line per
/// record, no row index.
pub fn write_table<W: Write>(table: &SalesTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    for record in &table.records {
        wtr.write_record(table.render_row(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_table_csv(path: &Path, table: &SalesTable) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_table(table, io::BufWriter::new(file))
}

/// In-memory CSV rendering of `table`, ready to hand to a download button.
pub fn table_to_csv_string(table: &SalesTable) -> Result<String> {
    let mut buf = Vec::new();
    write_table(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Markdown rendering of the first `max_rows` records of `table`.
pub fn render_sales_preview(table: &SalesTable, max_rows: usize) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().cloned());
    for record in table.records.iter().take(max_rows) {
        builder.push_record(table.render_row(record));
    }
    Some(builder.build().with(Style::markdown()).to_string())
}

pub fn preview_sales_table(table: &SalesTable, max_rows: usize) {
    match render_sales_preview(table, max_rows) {
        Some(s) => println!("{}\n", s),
        None => println!("(no rows)\n"),
    }
}
