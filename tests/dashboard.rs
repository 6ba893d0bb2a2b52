mod common;

use common::{SCENARIO_CSV, bin, write_fixture};
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn full_run_renders_metrics_charts_and_table() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);
    let trend = dir.path().join("trend.svg");
    let forecast = dir.path().join("forecast.svg");

    bin()
        .args(["dashboard", "-i"])
        .arg(&input)
        .arg("--trend-chart")
        .arg(&trend)
        .arg("--forecast-chart")
        .arg(&forecast)
        .assert()
        .success()
        .stdout(contains("Total Sales"))
        .stdout(contains("35 units"))
        .stdout(contains("Top Selling Category"))
        .stdout(contains("Highest Sales Day"))
        .stdout(contains("Date"))
        .stdout(contains("Shoes"));

    assert!(std::fs::read_to_string(&trend).expect("trend chart").contains("<svg"));
    assert!(
        std::fs::read_to_string(&forecast)
            .expect("forecast chart")
            .contains("<svg")
    );
}

#[test]
fn empty_selection_skips_forecast_but_finishes_the_run() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);
    let trend = dir.path().join("trend.svg");

    bin()
        .args([
            "dashboard",
            "--exclude-category",
            "Dresses",
            "--exclude-category",
            "Shoes",
            "-i",
        ])
        .arg(&input)
        .arg("--trend-chart")
        .arg(&trend)
        .assert()
        .success()
        .stdout(contains("0 units"))
        .stdout(contains("N/A"))
        .stderr(contains("No data available for forecasting"));

    // The empty selection still renders an (empty) trend chart.
    assert!(std::fs::read_to_string(&trend).expect("trend chart").contains("<svg"));
}

#[test]
fn export_writes_the_normalized_filtered_table() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);
    let export = dir.path().join("filtered.csv");

    bin()
        .args(["dashboard", "--category", "Dresses", "-i"])
        .arg(&input)
        .arg("--export")
        .arg(&export)
        .assert()
        .success();

    let mut reader = csv::Reader::from_path(&export).expect("open export");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers, csv::StringRecord::from(vec!["Date", "Category", "Sales"]));
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "2023-01-01");
    assert_eq!(&rows[1][2], "20");
}

#[test]
fn row_limit_bounds_the_displayed_table() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);

    let output = bin()
        .args(["dashboard", "--rows", "1", "-i"])
        .arg(&input)
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // One metric table mention plus exactly one data row for Dresses.
    assert_eq!(stdout.matches("2023-01-01").count(), 1);
}

#[test]
fn profile_supplies_defaults_for_an_unflagged_run() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);
    let profile = write_fixture(
        dir.path(),
        "run.yml",
        &format!(
            "input: {}\ncategories:\n  - Shoes\nhorizon: 45\n",
            input.display()
        ),
    );

    bin()
        .args(["dashboard", "--profile"])
        .arg(&profile)
        .assert()
        .success()
        .stdout(contains("5 units"))
        .stdout(contains("Shoes"));
}

#[test]
fn conflicting_sources_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);

    bin()
        .args(["dashboard", "--db-name", "boutique", "-i"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("not both"));
}
