pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod schema;
pub mod session;
pub mod types;
pub mod util;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::{env, sync::OnceLock};

use chrono::NaiveDate;
use clap::Parser;
use log::{debug, LevelFilter};

use crate::cli::Cli;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::session::Session;
use crate::util::parse_iso_date;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Config file (if any) with command line overrides applied on top.
pub fn build_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(margin) = cli.margin {
        config.profit_margin = margin;
    }
    if let Some(days) = cli.forecast_days {
        config.forecast_days = days;
    }
    if let Some(top) = cli.top {
        config.top_items_limit = top;
    }
    debug!("Report config: {:?}", config);
    Ok(config)
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let mut session = Session::new(config, cli.output_dir.clone());

    if cli.batch {
        return run_batch(&mut session, &cli);
    }
    run_menu(&mut session, &cli, &mut io::stdin().lock())
}

fn run_batch(session: &mut Session, cli: &Cli) -> Result<()> {
    let load_report = session.load(cli.input.as_deref())?;
    session::print_load_summary(&load_report);
    let start = cli.start.as_deref().map(parse_iso_date).transpose()?;
    let end = cli.end.as_deref().map(parse_iso_date).transpose()?;
    if start.is_some() || end.is_some() {
        session.set_range(start, end)?;
    }
    generate(session)
}

fn generate(session: &Session) -> Result<()> {
    let (filtered, report) = session.report()?;
    session::print_report(&filtered, &report, session.range());
    for path in session.export(&filtered, &report)? {
        println!("Exported {}", path.display());
    }
    println!();
    Ok(())
}

/// Print `label` and read one trimmed line; `None` once input is exhausted.
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Blank input keeps the current bound and comes back as `Ok(None)`.
fn prompt_date<R: BufRead>(input: &mut R, label: &str) -> Option<Result<Option<NaiveDate>>> {
    let line = prompt(input, label)?;
    if line.is_empty() {
        return Some(Ok(None));
    }
    Some(parse_iso_date(&line).map(Some))
}

fn handle_load<R: BufRead>(session: &mut Session, input: &mut R, default: Option<&Path>) {
    let Some(line) = prompt(input, "File path (blank for default): ") else {
        return;
    };
    let path = if line.is_empty() {
        default.map(Path::to_path_buf)
    } else {
        Some(line.into())
    };
    match session.load(path.as_deref()) {
        Ok(report) => session::print_load_summary(&report),
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

fn handle_range<R: BufRead>(session: &mut Session, input: &mut R) {
    if let Some(range) = session.range() {
        println!("Current window: {} to {}", range.start, range.end);
    }
    let start = match prompt_date(input, "Start date (YYYY-MM-DD, blank keeps): ") {
        Some(Ok(d)) => d,
        Some(Err(e)) => {
            eprintln!("{}\n", e);
            return;
        }
        None => return,
    };
    let end = match prompt_date(input, "End date (YYYY-MM-DD, blank keeps): ") {
        Some(Ok(d)) => d,
        Some(Err(e)) => {
            eprintln!("{}\n", e);
            return;
        }
        None => return,
    };
    match session.set_range(start, end) {
        Ok(range) => println!("Window set to {} to {}\n", range.start, range.end),
        Err(e) => eprintln!("Error: {}\n", e),
    }
}

fn run_menu<R: BufRead>(session: &mut Session, cli: &Cli, input: &mut R) -> Result<()> {
    loop {
        println!("Sales Dashboard");
        println!("[1] Load file");
        println!("[2] Set date range");
        println!("[3] Generate reports");
        println!("[4] Exit\n");
        let Some(choice) = prompt(input, "Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(session, input, cli.input.as_deref()),
            "2" => handle_range(session, input),
            "3" => {
                if let Err(e) = generate(session) {
                    eprintln!("Error: {}\n", e);
                }
            }
            "4" => break,
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
    println!("Exiting the program.");
    Ok(())
}
