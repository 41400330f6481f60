use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use log::info;

use crate::clean::{self, NormalizeReport};
use crate::error::{Result, SalesError};
use crate::schema::{self, clean_header};
use crate::types::{RawTable, SalesTable};

/// Export loaded when the user does not pick a file.
pub const DEMO_FILE: &str = "Balaji Fast Food Sales.csv";

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "xlsb"];

/// Read comma separated text with a header row into a raw table.
pub fn read_csv<R: Read>(input: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = rdr.headers()?.iter().map(clean_header).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Read the first worksheet of an Excel workbook into a raw table.
pub fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SalesError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SalesError::Workbook("workbook has no worksheets".to_string()))?
        .map_err(|e| SalesError::Workbook(e.to_string()))?;
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| clean_header(&cell_to_string(c))).collect(),
        None => Vec::new(),
    };
    let rows = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Ok(RawTable::new(headers, rows))
}

/// Read `path` according to its extension.
pub fn load_raw(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = if ext == "csv" {
        read_csv(std::fs::File::open(path)?)?
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook(path)?
    } else {
        return Err(SalesError::UnsupportedFormat(path.display().to_string()));
    };
    info!(
        "Read {} row(s) and {} column(s) from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Validate and normalize an already loaded raw table.
pub fn prepare(raw: RawTable) -> Result<(SalesTable, NormalizeReport)> {
    let raw = schema::validate(raw)?;
    clean::normalize(raw)
}

/// Load `path` (or the demo export when `None`) and produce the canonical table.
pub fn load_and_clean(path: Option<&Path>) -> Result<(SalesTable, NormalizeReport)> {
    let path = match path {
        Some(p) => p,
        None => {
            info!("No file given, loading demo file '{}'", DEMO_FILE);
            Path::new(DEMO_FILE)
        }
    };
    prepare(load_raw(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn read_csv_pads_short_rows_and_cleans_headers() {
        let input = "\u{feff}date, item_name\n2024-01-01,Tea\n2024-01-02\n";
        let table = read_csv(input.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["date", "item_name"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["2024-01-01".to_string(), "Tea".to_string()],
                vec!["2024-01-02".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn cell_to_string_renders_dates_as_iso() {
        let serial = Data::DateTime(ExcelDateTime::new(45296.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_to_string(&serial), "2024-01-05");
        let iso = Data::DateTimeIso("2024-01-05T08:30:00".to_string());
        assert_eq!(cell_to_string(&iso), "2024-01-05");
    }

    #[test]
    fn cell_to_string_renders_numbers_and_blanks() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(12)), "12");
        assert_eq!(cell_to_string(&Data::String("Tea".to_string())), "Tea");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn load_raw_rejects_unknown_extension() {
        let err = load_raw(Path::new("sales.parquet")).unwrap_err();
        assert!(matches!(err, SalesError::UnsupportedFormat(_)));
    }

    #[test]
    fn prepare_validates_before_renaming() {
        let input = "date,item_name\n2024-01-01,Tea\n";
        let err = prepare(read_csv(input.as_bytes()).unwrap()).unwrap_err();
        assert!(matches!(err, SalesError::Schema { .. }));
    }
}
