mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{fixture_path, TestWorkspace, REQUIRED_HEADER};

fn sales_report() -> Command {
    let mut cmd = Command::cargo_bin("sales_report").expect("binary exists");
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn batch_run_prints_metrics_and_writes_exports() {
    let ws = TestWorkspace::new();
    let input = fixture_path("sample_sales.csv");
    sales_report()
        .args(["--batch", "--input"])
        .arg(&input)
        .arg("--output-dir")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(
            contains("Processing dataset... (10 rows loaded)")
                .and(contains("2022-07-03 to 2023-03-19"))
                .and(contains("Total Sales:       €1,420.00"))
                .and(contains("Estimated Profit:  €426.00 (30% margin)"))
                .and(contains("Vadapav")),
        );

    let filtered = ws.read("filtered_sales.csv");
    assert_eq!(filtered.lines().count(), 10, "header plus nine dated rows");
    assert!(filtered.starts_with("order_id,date,name,type,price,quantity,total"));

    let daily = ws.read("sales_by_day.csv");
    assert!(daily.starts_with("date,total\n2022-07-03,360.0\n"));

    let summary: serde_json::Value = serde_json::from_str(&ws.read("summary.json")).unwrap();
    assert_eq!(summary["rows"], 9);
    assert_eq!(summary["total_sales"], 1420.0);
    assert_eq!(summary["start_date"], "2022-07-03");
}

#[test]
fn batch_run_honours_date_window_and_overrides() {
    let ws = TestWorkspace::new();
    let config = ws.write("config.json", r#"{"profit_margin": 0.5}"#);
    sales_report()
        .args(["--batch", "--start", "2022-11-01", "--end", "2022-12-31", "--top", "1"])
        .arg("--input")
        .arg(fixture_path("sample_sales.csv"))
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(
            contains("Total Sales:       €220.00")
                .and(contains("Estimated Profit:  €110.00 (50% margin)")),
        );

    assert_eq!(ws.read("top_items.csv"), "name,quantity\nVadapav,11\n");
}

#[test]
fn batch_run_rejects_malformed_start_date() {
    let ws = TestWorkspace::new();
    sales_report()
        .args(["--batch", "--start", "03/01/2023", "--input"])
        .arg(fixture_path("sample_sales.csv"))
        .arg("--output-dir")
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(contains("Invalid date '03/01/2023'"));
}

#[test]
fn batch_run_reports_missing_columns() {
    let ws = TestWorkspace::new();
    let input = ws.write("bad.csv", "date,item_name\n2024-01-01,Tea\n");
    sales_report()
        .args(["--batch", "--input"])
        .arg(&input)
        .arg("--output-dir")
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(contains("Missing required column(s): item_type"));
}

#[test]
fn menu_loads_and_generates_reports() {
    let ws = TestWorkspace::new();
    let input = ws.write(
        "menu.csv",
        &format!(
            "{REQUIRED_HEADER}\n\
             2024-01-01,Tea,Beverages,10,10,cash,Mr.,1\n\
             2024-01-02,Vada,Fastfood,20,20,card,Mr.,1\n"
        ),
    );
    let stdin = format!("1\n{}\n2\n2024-01-02\n\n3\n4\n", input.display());
    sales_report()
        .arg("--output-dir")
        .arg(ws.path())
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(
            contains("Window set to 2024-01-02 to 2024-01-02")
                .and(contains("Total Sales:       €20.00"))
                .and(contains("Exiting the program.")),
        );
    assert!(ws.path().join("filtered_sales.csv").exists());
}

#[test]
fn menu_reports_when_nothing_is_loaded() {
    let ws = TestWorkspace::new();
    sales_report()
        .arg("--output-dir")
        .arg(ws.path())
        .write_stdin("3\n9\n")
        .assert()
        .success()
        .stdout(contains("Invalid choice").and(contains("Exiting the program.")))
        .stderr(contains("no data loaded"));
}
