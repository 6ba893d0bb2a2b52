//! SVG chart rendering for the trend and forecast views.
//!
//! Charts are data-driven: series and bounds are computed from the tables
//! before any drawing happens, and dates are plotted as f64 day offsets from
//! the earliest date with tick labels formatted back to ISO dates. The SVG
//! backend needs no native font or bitmap dependencies.

use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

use crate::{forecast::ForecastPoint, record::SalesTable};

const CHART_SIZE: (u32, u32) = (900, 500);

/// High-contrast series palette, cycled when a table has more categories.
const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(23, 190, 207),
];

/// Multi-series line chart of sales over time, one series per category in
/// first-seen order. An empty table renders an empty set of axes.
pub fn render_trend_chart(path: &Path, table: &SalesTable) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?;

    if table.is_empty() {
        let mut chart = ChartBuilder::on(&root)
            .caption("Sales Trends Over Time", ("sans-serif", 22))
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0.0..1.0, 0.0..1.0)
            .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Date")
            .y_desc("Sales")
            .draw()
            .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?;
        root.present()
            .map_err(|err| anyhow!("Writing trend chart {path:?}: {err}"))?;
        return Ok(());
    }

    let origin = table
        .records()
        .iter()
        .map(|record| record.date)
        .min()
        .expect("non-empty table");

    let mut series: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for record in table.records() {
        let offset = (record.date - origin).num_days() as f64;
        match series
            .iter_mut()
            .find(|(category, _)| category == &record.category)
        {
            Some((_, points)) => points.push((offset, record.sales)),
            None => series.push((record.category.clone(), vec![(offset, record.sales)])),
        }
    }

    let (x_range, y_range) = plot_bounds(
        series
            .iter()
            .flat_map(|(_, points)| points.iter().copied()),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Sales Trends Over Time", ("sans-serif", 22))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Date")
        .y_desc("Sales")
        .x_labels(8)
        .y_labels(6)
        .x_label_formatter(&|offset| format_offset(origin, *offset))
        .draw()
        .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?;

    for (idx, (label, points)) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?
            .label(label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|err| anyhow!("Rendering trend chart {path:?}: {err}"))?;
    root.present()
        .map_err(|err| anyhow!("Writing trend chart {path:?}: {err}"))?;
    Ok(())
}

/// Single-line chart of the predicted series across fitted history and the
/// future horizon; the points past `last_observed` are drawn in a second
/// color.
pub fn render_forecast_chart(
    path: &Path,
    points: &[ForecastPoint],
    last_observed: NaiveDate,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|err| anyhow!("Rendering forecast chart {path:?}: {err}"))?;

    let origin = points
        .first()
        .map(|point| point.date)
        .ok_or_else(|| anyhow!("Forecast series is empty"))?;
    let offsets: Vec<(f64, f64)> = points
        .iter()
        .map(|point| ((point.date - origin).num_days() as f64, point.predicted))
        .collect();
    let (x_range, y_range) = plot_bounds(offsets.iter().copied());

    let mut chart = ChartBuilder::on(&root)
        .caption("Forecasted Sales Trends", ("sans-serif", 22))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|err| anyhow!("Rendering forecast chart {path:?}: {err}"))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Date")
        .y_desc("Predicted Sales")
        .x_labels(8)
        .y_labels(6)
        .x_label_formatter(&|offset| format_offset(origin, *offset))
        .draw()
        .map_err(|err| anyhow!("Rendering forecast chart {path:?}: {err}"))?;

    let split = (last_observed - origin).num_days() as f64;
    let fitted = offsets.iter().copied().filter(|(x, _)| *x <= split);
    let future = offsets.iter().copied().filter(|(x, _)| *x >= split);

    chart
        .draw_series(LineSeries::new(fitted, PALETTE[0].stroke_width(2)))
        .map_err(|err| anyhow!("Rendering forecast chart {path:?}: {err}"))?
        .label("fitted")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 18, y)], PALETTE[0].stroke_width(2))
        });
    chart
        .draw_series(LineSeries::new(future, PALETTE[1].stroke_width(2)))
        .map_err(|err| anyhow!("Rendering forecast chart {path:?}: {err}"))?
        .label("forecast")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 18, y)], PALETTE[1].stroke_width(2))
        });

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|err| anyhow!("Rendering forecast chart {path:?}: {err}"))?;
    root.present()
        .map_err(|err| anyhow!("Writing forecast chart {path:?}: {err}"))?;
    Ok(())
}

fn format_offset(origin: NaiveDate, offset: f64) -> String {
    (origin + Duration::days(offset.round() as i64))
        .format("%Y-%m-%d")
        .to_string()
}

fn plot_bounds(
    points: impl Iterator<Item = (f64, f64)>,
) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    let mut any = false;
    for (x, y) in points {
        any = true;
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !any {
        return (0.0..1.0, 0.0..1.0);
    }
    let x_hi = if x_max <= 0.0 { 1.0 } else { x_max };
    let y_lo = y_min.min(0.0);
    let headroom = (y_max - y_lo).abs().max(1.0) * 0.05;
    (0.0..x_hi, y_lo..y_max + headroom)
}
