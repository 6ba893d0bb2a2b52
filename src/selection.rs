use log::warn;

use crate::record::SalesTable;

/// The set of category labels currently enabled, in first-seen table order.
///
/// Selection defaults to every distinct category present. Narrowing to the
/// empty set is valid and yields an empty filtered table; it is the
/// "select nothing" state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    enabled: Vec<String>,
}

impl CategorySelection {
    /// Derive the selection for this run from the unfiltered table and the
    /// user's include/exclude lists. Names that match no category present in
    /// the data are reported and ignored.
    pub fn resolve(table: &SalesTable, include: &[String], exclude: &[String]) -> Self {
        let present = table.distinct_categories();
        for name in include.iter().chain(exclude.iter()) {
            if !present.iter().any(|category| category == name) {
                warn!("Category '{name}' does not occur in the data");
            }
        }
        let enabled = present
            .into_iter()
            .filter(|category| include.is_empty() || include.contains(category))
            .filter(|category| !exclude.contains(category))
            .collect();
        Self { enabled }
    }

    pub fn labels(&self) -> &[String] {
        &self.enabled
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn is_enabled(&self, category: &str) -> bool {
        self.enabled.iter().any(|label| label == category)
    }

    /// Pure, order-preserving row selection. No row is mutated.
    pub fn apply(&self, table: &SalesTable) -> SalesTable {
        SalesTable::from_records(
            table
                .records()
                .iter()
                .filter(|record| self.is_enabled(&record.category))
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SalesRecord;
    use chrono::NaiveDate;

    fn sample_table() -> SalesTable {
        let rows = [
            ("2023-01-01", "Dresses", 10.0),
            ("2023-01-02", "Dresses", 20.0),
            ("2023-01-01", "Shoes", 5.0),
        ];
        SalesTable::from_records(
            rows.iter()
                .map(|(date, category, sales)| SalesRecord {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    category: category.to_string(),
                    sales: *sales,
                })
                .collect(),
        )
    }

    #[test]
    fn defaults_to_all_categories() {
        let table = sample_table();
        let selection = CategorySelection::resolve(&table, &[], &[]);
        assert_eq!(selection.labels(), ["Dresses", "Shoes"]);
        assert_eq!(selection.apply(&table), table);
    }

    #[test]
    fn include_narrows_to_subset_in_original_order() {
        let table = sample_table();
        let selection = CategorySelection::resolve(&table, &["Shoes".to_string()], &[]);
        let filtered = selection.apply(&table);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].category, "Shoes");
        assert_eq!(filtered.records()[0].sales, 5.0);
    }

    #[test]
    fn exclude_removes_categories() {
        let table = sample_table();
        let selection = CategorySelection::resolve(&table, &[], &["Dresses".to_string()]);
        assert_eq!(selection.labels(), ["Shoes"]);
    }

    #[test]
    fn excluding_everything_yields_empty_table() {
        let table = sample_table();
        let selection = CategorySelection::resolve(
            &table,
            &[],
            &["Dresses".to_string(), "Shoes".to_string()],
        );
        assert!(selection.is_empty());
        assert!(selection.apply(&table).is_empty());
    }

    #[test]
    fn unknown_names_are_ignored() {
        let table = sample_table();
        let selection = CategorySelection::resolve(&table, &["Hats".to_string()], &[]);
        assert!(selection.is_empty());
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let table = sample_table();
        let selection = CategorySelection::resolve(&table, &["Dresses".to_string()], &[]);
        let filtered = selection.apply(&table);
        let dates: Vec<String> = filtered
            .records()
            .iter()
            .map(|record| record.date.to_string())
            .collect();
        assert_eq!(dates, ["2023-01-01", "2023-01-02"]);
    }
}
