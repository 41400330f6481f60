use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about = "Summarize a restaurant sales export", long_about = None)]
pub struct Cli {
    /// Sales export to load (.csv, .xlsx, .xls, .xlsm, .xlsb); defaults to the demo file
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// JSON file overriding the report constants
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory receiving the exported CSV and JSON files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
    /// First day of the report window (YYYY-MM-DD), defaults to the earliest sale
    #[arg(long)]
    pub start: Option<String>,
    /// Last day of the report window (YYYY-MM-DD), defaults to the latest sale
    #[arg(long)]
    pub end: Option<String>,
    /// Profit margin applied to total sales
    #[arg(long)]
    pub margin: Option<f64>,
    /// Number of days covered by the sales forecast
    #[arg(long)]
    pub forecast_days: Option<u32>,
    /// Number of best sellers to list
    #[arg(long)]
    pub top: Option<usize>,
    /// Load, report and exit without the interactive menu
    #[arg(long)]
    pub batch: bool,
}
