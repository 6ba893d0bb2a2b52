mod common;

use common::{SCENARIO_CSV, bin, write_fixture};
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn metrics_over_all_categories() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);

    bin()
        .args(["metrics", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Total Sales"))
        .stdout(contains("35 units"))
        .stdout(contains("Dresses"))
        .stdout(contains("2023-01-02"));
}

#[test]
fn metrics_respect_category_selection() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);

    bin()
        .args(["metrics", "--category", "Shoes", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("5 units"))
        .stdout(contains("Shoes"))
        .stdout(contains("2023-01-01"));
}

#[test]
fn metrics_on_empty_selection_show_placeholders() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);

    bin()
        .args([
            "metrics",
            "--exclude-category",
            "Dresses",
            "--exclude-category",
            "Shoes",
            "-i",
        ])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("0 units"))
        .stdout(contains("N/A"));
}

#[test]
fn metrics_emit_json() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "sales.csv", SCENARIO_CSV);

    let output = bin()
        .args(["metrics", "--format", "json", "-i"])
        .arg(&input)
        .output()
        .expect("run");
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON metrics");
    assert_eq!(parsed["total_sales"], 35.0);
    assert_eq!(parsed["top_category"], "Dresses");
    assert_eq!(parsed["peak_day"], "2023-01-02");
}

#[test]
fn missing_semantic_column_fails_naming_it() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(
        dir.path(),
        "no_category.csv",
        "day_of_order,sales\n2023-01-01,10\n",
    );

    bin()
        .args(["metrics", "-i"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("No column related to 'Category' found"))
        .stderr(contains("day_of_order, sales"));
}

#[test]
fn unparseable_sales_cell_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let input = write_fixture(
        dir.path(),
        "bad.csv",
        "date,category,sales\n2023-01-01,Dresses,lots\n",
    );

    bin()
        .args(["metrics", "-i"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("Parsing row 2"));
}

#[test]
fn requires_some_input_source() {
    bin()
        .arg("metrics")
        .assert()
        .failure()
        .stderr(contains("supply an input file"));
}
