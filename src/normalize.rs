//! Canonical-field resolution for arbitrary input headers.
//!
//! Input tables name their columns freely; the pipeline only needs the three
//! semantic columns `Date`, `Category`, and `Sales`. A header qualifies for a
//! canonical field when its trimmed, lowercased name contains the field name
//! as a substring, and the first qualifying header in column order wins.
//! Resolution runs exactly once per table and is idempotent: canonical names
//! qualify for their own field, so re-resolving a renamed header set yields
//! the same mapping.

use anyhow::{Result, anyhow};

use crate::record::{SalesRecord, SalesTable, parse_sales_date, parse_sales_value};

/// The semantic fields the rest of the pipeline depends on, in the order they
/// are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Date,
    Sales,
    Category,
}

pub const CANONICAL_FIELDS: [CanonicalField; 3] = [
    CanonicalField::Date,
    CanonicalField::Sales,
    CanonicalField::Category,
];

impl CanonicalField {
    /// Substring a header must contain (after trim + lowercase) to qualify.
    pub fn needle(self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Sales => "sales",
            CanonicalField::Category => "category",
        }
    }

    pub fn canonical_name(self) -> &'static str {
        match self {
            CanonicalField::Date => "Date",
            CanonicalField::Sales => "Sales",
            CanonicalField::Category => "Category",
        }
    }
}

/// Positions of the three canonical columns within the source header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub sales: usize,
    pub category: usize,
}

impl ColumnMap {
    fn index_for(&self, field: CanonicalField) -> usize {
        match field {
            CanonicalField::Date => self.date,
            CanonicalField::Sales => self.sales,
            CanonicalField::Category => self.category,
        }
    }
}

/// Locate the canonical columns in `headers`, or fail naming the missing
/// field and listing every available column.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMap> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();

    let resolve = |field: CanonicalField| -> Result<usize> {
        normalized
            .iter()
            .position(|header| header.contains(field.needle()))
            .ok_or_else(|| {
                anyhow!(
                    "No column related to '{}' found; available columns: {}",
                    field.canonical_name(),
                    if headers.is_empty() {
                        "(none)".to_string()
                    } else {
                        headers.join(", ")
                    }
                )
            })
    };

    Ok(ColumnMap {
        date: resolve(CanonicalField::Date)?,
        sales: resolve(CanonicalField::Sales)?,
        category: resolve(CanonicalField::Category)?,
    })
}

/// Header row with the matched columns renamed to their canonical form.
/// Unmatched columns keep their original names.
pub fn rename_headers(headers: &[String], map: &ColumnMap) -> Vec<String> {
    let mut renamed: Vec<String> = headers.to_vec();
    for field in CANONICAL_FIELDS {
        if let Some(slot) = renamed.get_mut(map.index_for(field)) {
            *slot = field.canonical_name().to_string();
        }
    }
    renamed
}

/// Coerce one raw row into a typed record. Coercion failure is fatal for the
/// run, not a per-row skip.
pub fn record_from_row(map: &ColumnMap, row: &[String]) -> Result<SalesRecord> {
    let cell = |index: usize, field: CanonicalField| {
        row.get(index)
            .map(|value| value.as_str())
            .ok_or_else(|| anyhow!("Row has no value for column '{}'", field.canonical_name()))
    };
    let date = parse_sales_date(cell(map.date, CanonicalField::Date)?)?;
    let sales = parse_sales_value(cell(map.sales, CanonicalField::Sales)?)?;
    let category = cell(map.category, CanonicalField::Category)?
        .trim()
        .to_string();
    Ok(SalesRecord {
        date,
        category,
        sales,
    })
}

/// Normalize a fully materialized table (header row + data rows), as produced
/// by the database path.
pub fn build_table(headers: &[String], rows: &[Vec<String>]) -> Result<SalesTable> {
    let map = resolve_columns(headers)?;
    let mut table = SalesTable::new();
    for (row_idx, row) in rows.iter().enumerate() {
        let record = record_from_row(&map, row)
            .map_err(|err| anyhow!("Parsing row {}: {err}", row_idx + 2))?;
        table.push(record);
    }
    Ok(table)
}
