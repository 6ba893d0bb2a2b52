#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Small scenario dataset, with the messy headers the normalizer exists for.
pub const SCENARIO_CSV: &str = "\
Order Date,Product Category,Weekly Sales
2023-01-01,Dresses,10
2023-01-02,Dresses,20
2023-01-01,Shoes,5
";

pub fn bin() -> Command {
    Command::cargo_bin("demand-lens").expect("binary built")
}

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

/// Fourteen days of strictly linear sales (y = 3x + 5) for one category.
pub fn linear_csv() -> String {
    let mut contents = String::from("date,category,sales\n");
    for day in 0..14 {
        contents.push_str(&format!("2023-06-{:02},Dresses,{}\n", day + 1, 3 * day + 5));
    }
    contents
}
