use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::{
    cli::{MetricsArgs, OutputFormat},
    record::SalesTable,
    selection::CategorySelection,
    source::SalesSource,
    table,
};

/// The three scalar summaries displayed at the top of the dashboard.
///
/// `top_category` and `peak_day` are `None` for an empty table and render as
/// "N/A". Ties on summed category sales resolve to the category appearing
/// first in table order; ties on the single-row maximum resolve to the first
/// such row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_sales: f64,
    pub top_category: Option<String>,
    pub peak_day: Option<NaiveDate>,
}

pub fn compute(table: &SalesTable) -> MetricsSummary {
    let total_sales = table.records().iter().map(|record| record.sales).sum();

    let mut category_totals: Vec<(String, f64)> = Vec::new();
    for record in table.records() {
        match category_totals
            .iter_mut()
            .find(|(category, _)| category == &record.category)
        {
            Some((_, sum)) => *sum += record.sales,
            None => category_totals.push((record.category.clone(), record.sales)),
        }
    }
    let top_category = category_totals
        .iter()
        .fold(None::<&(String, f64)>, |best, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        })
        .map(|(category, _)| category.clone());

    let peak_day = table
        .records()
        .iter()
        .fold(None::<(NaiveDate, f64)>, |best, record| match best {
            Some((_, max)) if max >= record.sales => best,
            _ => Some((record.date, record.sales)),
        })
        .map(|(date, _)| date);

    MetricsSummary {
        total_sales,
        top_category,
        peak_day,
    }
}

impl MetricsSummary {
    pub fn total_sales_display(&self) -> String {
        format!("{} units", format_quantity(self.total_sales))
    }

    pub fn top_category_display(&self) -> String {
        self.top_category
            .clone()
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn peak_day_display(&self) -> String {
        self.peak_day
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        vec![
            vec!["Total Sales".to_string(), self.total_sales_display()],
            vec![
                "Top Selling Category".to_string(),
                self.top_category_display(),
            ],
            vec!["Highest Sales Day".to_string(), self.peak_day_display()],
        ]
    }
}

pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn execute(args: &MetricsArgs) -> Result<()> {
    let source = SalesSource::from_cli(&args.source)?;
    let sales_data = source.load()?;
    let selection = CategorySelection::resolve(
        &sales_data,
        &args.selection.categories,
        &args.selection.exclude_categories,
    );
    let filtered = selection.apply(&sales_data);
    let summary = compute(&filtered);

    match args.format {
        OutputFormat::Table => {
            let headers = vec!["metric".to_string(), "value".to_string()];
            table::print_table(&headers, &summary.render_rows());
        }
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(&summary).context("Serializing metrics to JSON")?;
            println!("{rendered}");
        }
    }
    info!(
        "Computed metrics over {} of {} row(s)",
        filtered.len(),
        sales_data.len()
    );
    Ok(())
}
