//! Short-term demand forecasting over a daily sales series.
//!
//! The pipeline treats forecasting as a fit/predict black box: hand the
//! filtered (date, sales) history to a model, extend the date index a chosen
//! number of days past the last observation, and read back a predicted value
//! for every point in the extended index, historical points included.
//!
//! The model is additive: a least-squares linear trend over the day index
//! plus a day-of-week effect estimated from mean residuals. Fitting is
//! order-independent, so history may arrive in whatever order the filtered
//! table holds.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::{
    cli::{ForecastArgs, OutputFormat},
    chart,
    record::SalesTable,
    selection::CategorySelection,
    source::SalesSource,
    table,
};

pub const MIN_HORIZON: u32 = 7;
pub const MAX_HORIZON: u32 = 365;
pub const DEFAULT_HORIZON: u32 = 30;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("No data available for forecasting")]
    EmptyHistory,
    #[error("History must span at least two distinct dates to fit a trend, found {0}")]
    DegenerateHistory(usize),
}

/// One point of the predicted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
}

/// Untrained additive model. Fitting produces a [`TrainedAdditiveModel`]
/// that owns the estimated parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveModel;

#[derive(Debug, Clone)]
pub struct TrainedAdditiveModel {
    origin: NaiveDate,
    last_observed: NaiveDate,
    intercept: f64,
    slope: f64,
    weekday_effects: [f64; 7],
}

impl AdditiveModel {
    pub fn fit(
        &self,
        history: &[(NaiveDate, f64)],
    ) -> Result<TrainedAdditiveModel, ForecastError> {
        if history.is_empty() {
            return Err(ForecastError::EmptyHistory);
        }
        let origin = history.iter().map(|(date, _)| *date).min().expect("non-empty");
        let last_observed = history.iter().map(|(date, _)| *date).max().expect("non-empty");

        let mut distinct_dates: Vec<NaiveDate> = history.iter().map(|(date, _)| *date).collect();
        distinct_dates.sort_unstable();
        distinct_dates.dedup();
        if distinct_dates.len() < 2 {
            return Err(ForecastError::DegenerateHistory(distinct_dates.len()));
        }

        let points: Vec<(f64, f64)> = history
            .iter()
            .map(|(date, value)| (day_index(origin, *date), *value))
            .collect();
        let count = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / count;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / count;
        let denominator: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let numerator: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        // Two or more distinct dates guarantee a non-zero spread in x.
        let slope = numerator / denominator;
        let intercept = mean_y - slope * mean_x;

        let mut residual_sums = [0.0f64; 7];
        let mut residual_counts = [0usize; 7];
        for (date, value) in history {
            let weekday = date.weekday().num_days_from_monday() as usize;
            let trend = intercept + slope * day_index(origin, *date);
            residual_sums[weekday] += value - trend;
            residual_counts[weekday] += 1;
        }
        let mut weekday_effects = [0.0f64; 7];
        for weekday in 0..7 {
            if residual_counts[weekday] > 0 {
                weekday_effects[weekday] = residual_sums[weekday] / residual_counts[weekday] as f64;
            }
        }

        Ok(TrainedAdditiveModel {
            origin,
            last_observed,
            intercept,
            slope,
            weekday_effects,
        })
    }
}

impl TrainedAdditiveModel {
    pub fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    /// Predicted values for every day from the first observation through
    /// `horizon` days past the last one.
    pub fn predict(&self, horizon: u32) -> Vec<ForecastPoint> {
        let span = (self.last_observed - self.origin).num_days() + i64::from(horizon);
        (0..=span)
            .map(|offset| {
                let date = self.origin + Duration::days(offset);
                let weekday = date.weekday().num_days_from_monday() as usize;
                let predicted =
                    self.intercept + self.slope * offset as f64 + self.weekday_effects[weekday];
                ForecastPoint { date, predicted }
            })
            .collect()
    }
}

fn day_index(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// Reshape the filtered table into the two-column series the model consumes,
/// in table order.
pub fn series_from_table(table: &SalesTable) -> Vec<(NaiveDate, f64)> {
    table
        .records()
        .iter()
        .map(|record| (record.date, record.sales))
        .collect()
}

pub fn execute(args: &ForecastArgs) -> Result<()> {
    let source = SalesSource::from_cli(&args.source)?;
    let sales_data = source.load()?;
    let selection = CategorySelection::resolve(
        &sales_data,
        &args.selection.categories,
        &args.selection.exclude_categories,
    );
    let filtered = selection.apply(&sales_data);

    let history = series_from_table(&filtered);
    let trained = AdditiveModel
        .fit(&history)
        .context("Fitting forecast model")?;
    let predicted = trained.predict(args.horizon);

    if let Some(path) = &args.chart {
        chart::render_forecast_chart(path, &predicted, trained.last_observed())?;
        info!("Forecast chart written to {path:?}");
    }

    match args.format {
        OutputFormat::Table => {
            let headers = vec!["date".to_string(), "predicted_sales".to_string()];
            let rows: Vec<Vec<String>> = predicted
                .iter()
                .map(|point| {
                    vec![
                        point.date.format("%Y-%m-%d").to_string(),
                        format!("{:.2}", point.predicted),
                    ]
                })
                .collect();
            table::print_table(&headers, &rows);
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&predicted)
                .context("Serializing forecast to JSON")?;
            println!("{rendered}");
        }
    }
    info!(
        "Fitted on {} observation(s); predicted {} point(s) over a {}-day horizon",
        history.len(),
        predicted.len(),
        args.horizon
    );
    Ok(())
}
