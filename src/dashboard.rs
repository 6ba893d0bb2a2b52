use std::path::Path;

use anyhow::{Context, Result};
use log::{error, info};

use crate::{
    chart,
    cli::DashboardArgs,
    forecast::{self, AdditiveModel},
    io_utils, metrics,
    profile::{self, RunProfile},
    record::{CANONICAL_HEADERS, SalesTable},
    selection::CategorySelection,
    source::SalesSource,
    table,
};

/// One full dashboard run: acquire, normalize, filter, then render metrics,
/// charts, forecast, and the data table. Every entity is rebuilt from
/// scratch; nothing survives between invocations.
pub fn execute(args: &DashboardArgs) -> Result<()> {
    let mut args = args.clone();
    if let Some(path) = &args.profile {
        let run_profile = RunProfile::load(path)?;
        profile::apply(&run_profile, &mut args)?;
    }
    let horizon = args.horizon.unwrap_or(forecast::DEFAULT_HORIZON);

    let source = SalesSource::from_cli(&args.source)?;
    let sales_data = source.load()?;
    let selection = CategorySelection::resolve(
        &sales_data,
        &args.selection.categories,
        &args.selection.exclude_categories,
    );
    let filtered = selection.apply(&sales_data);
    info!(
        "{} of {} row(s) selected across {} category(ies)",
        filtered.len(),
        sales_data.len(),
        selection.labels().len()
    );

    let summary = metrics::compute(&filtered);
    let metric_headers = vec!["metric".to_string(), "value".to_string()];
    table::print_table(&metric_headers, &summary.render_rows());

    if let Some(path) = &args.trend_chart {
        chart::render_trend_chart(path, &filtered)?;
        info!("Trend chart written to {path:?}");
    }

    // An empty filtered table skips forecasting with a diagnostic; the rest
    // of the run still renders. A model that fails to fit is reported the
    // same way rather than aborting the run.
    if filtered.is_empty() {
        error!("No data available for forecasting");
    } else {
        let history = forecast::series_from_table(&filtered);
        match AdditiveModel.fit(&history) {
            Ok(trained) => {
                let predicted = trained.predict(horizon);
                if let Some(path) = &args.forecast_chart {
                    chart::render_forecast_chart(path, &predicted, trained.last_observed())?;
                    info!("Forecast chart written to {path:?}");
                }
                info!(
                    "Forecast fitted on {} observation(s), {}-day horizon",
                    history.len(),
                    horizon
                );
            }
            Err(err) => error!("Forecasting failed: {err}"),
        }
    }

    println!();
    print_data_table(&filtered, args.rows);

    if let Some(path) = &args.export {
        export_table(path, &filtered)?;
        info!("Exported {} row(s) to {path:?}", filtered.len());
    }
    Ok(())
}

fn print_data_table(filtered: &SalesTable, limit: usize) {
    let headers: Vec<String> = CANONICAL_HEADERS
        .iter()
        .map(|name| name.to_string())
        .collect();
    let rows: Vec<Vec<String>> = filtered
        .records()
        .iter()
        .take(limit)
        .map(|record| {
            vec![
                record.date.format("%Y-%m-%d").to_string(),
                record.category.clone(),
                metrics::format_quantity(record.sales),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
    info!("Displayed {} of {} filtered row(s)", rows.len(), filtered.len());
}

fn export_table(path: &Path, filtered: &SalesTable) -> Result<()> {
    let delimiter = io_utils::resolve_delimiter(path, None);
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    writer
        .write_record(CANONICAL_HEADERS)
        .with_context(|| format!("Writing header to {path:?}"))?;
    for record in filtered.records() {
        writer
            .write_record([
                record.date.format("%Y-%m-%d").to_string(),
                record.category.clone(),
                metrics::format_quantity(record.sales),
            ])
            .with_context(|| format!("Writing row to {path:?}"))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing output file {path:?}"))?;
    Ok(())
}
