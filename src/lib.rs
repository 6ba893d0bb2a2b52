pub mod chart;
pub mod cli;
pub mod dashboard;
pub mod db;
pub mod forecast;
pub mod io_utils;
pub mod metrics;
pub mod normalize;
pub mod profile;
pub mod record;
pub mod selection;
pub mod source;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{CategoriesArgs, Cli, Commands, TrendArgs};
use crate::selection::CategorySelection;
use crate::source::SalesSource;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("demand_lens", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Dashboard(args) => dashboard::execute(&args),
        Commands::Metrics(args) => metrics::execute(&args),
        Commands::Trend(args) => handle_trend(&args),
        Commands::Forecast(args) => forecast::execute(&args),
        Commands::Categories(args) => handle_categories(&args),
    }
}

fn handle_trend(args: &TrendArgs) -> Result<()> {
    let source = SalesSource::from_cli(&args.source)?;
    let sales_data = source.load()?;
    let selection = CategorySelection::resolve(
        &sales_data,
        &args.selection.categories,
        &args.selection.exclude_categories,
    );
    let filtered = selection.apply(&sales_data);
    chart::render_trend_chart(&args.output, &filtered)?;
    info!(
        "Trend chart for {} row(s) written to {:?}",
        filtered.len(),
        args.output
    );
    Ok(())
}

fn handle_categories(args: &CategoriesArgs) -> Result<()> {
    let source = SalesSource::from_cli(&args.source)?;
    let sales_data = source.load()?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in sales_data.records() {
        match counts
            .iter_mut()
            .find(|(category, _)| category == &record.category)
        {
            Some((_, count)) => *count += 1,
            None => counts.push((record.category.clone(), 1)),
        }
    }
    let total = sales_data.len();
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|(category, count)| {
            let percent = (*count as f64 / total as f64) * 100.0;
            vec![
                category.clone(),
                count.to_string(),
                format!("{percent:.2}%"),
            ]
        })
        .collect();
    let headers = vec![
        "category".to_string(),
        "rows".to_string(),
        "share".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!("Found {} distinct category(ies)", counts.len());
    Ok(())
}
