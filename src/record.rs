use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use itertools::Itertools;

/// Canonical column names every downstream stage depends on, in schema order.
pub const CANONICAL_HEADERS: [&str; 3] = ["Date", "Category", "Sales"];

/// One normalized sales observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub category: String,
    pub sales: f64,
}

/// An ordered collection of sales records, preserving source order.
///
/// Rows are never deduplicated or re-sorted; filtering and rendering rely on
/// the original insertion order for all tie-breaks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: SalesRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct category labels in first-seen order.
    pub fn distinct_categories(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.category.as_str())
            .unique()
            .map(|category| category.to_string())
            .collect()
    }
}

pub fn parse_sales_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    let trimmed = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    // Timestamp inputs are accepted and truncated to their calendar date.
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed.date());
        }
    }
    Err(anyhow!("Failed to parse '{trimmed}' as date"))
}

pub fn parse_sales_value(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let parsed: f64 = trimmed
        .parse()
        .with_context(|| format!("Failed to parse '{trimmed}' as a sales quantity"))?;
    if !parsed.is_finite() {
        return Err(anyhow!("Sales quantity '{trimmed}' is not a finite number"));
    }
    Ok(parsed)
}
