use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::forecast::{DEFAULT_HORIZON, MAX_HORIZON, MIN_HORIZON};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore, chart, and forecast tabular sales data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full dashboard pipeline: metrics, charts, forecast, and table
    Dashboard(DashboardArgs),
    /// Print the KPI metrics (total sales, top category, highest sales day)
    Metrics(MetricsArgs),
    /// Render the per-category sales trend chart as SVG
    Trend(TrendArgs),
    /// Fit the demand model and print or chart the predicted series
    Forecast(ForecastArgs),
    /// List the distinct categories present, with row counts
    Categories(CategoriesArgs),
}

/// Where the data comes from: a delimited file or a database table.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Input delimited file ('-' reads from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Database host (defaults to localhost)
    #[arg(long = "db-host")]
    pub db_host: Option<String>,
    /// Database port
    #[arg(long = "db-port", default_value_t = 5432)]
    pub db_port: u16,
    /// Database name
    #[arg(long = "db-name")]
    pub db_name: Option<String>,
    /// Database username
    #[arg(long = "db-user")]
    pub db_user: Option<String>,
    /// Database password
    #[arg(long = "db-password", env = "DEMAND_LENS_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,
    /// Table to read (SELECT * FROM <table>)
    #[arg(long)]
    pub table: Option<String>,
}

/// Which categories are enabled for this run (all present, by default).
#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Enable only this category (repeatable; default is every category)
    #[arg(long = "category", action = clap::ArgAction::Append)]
    pub categories: Vec<String>,
    /// Disable this category (repeatable)
    #[arg(long = "exclude-category", action = clap::ArgAction::Append)]
    pub exclude_categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// YAML profile supplying source/selection/horizon defaults
    #[arg(long)]
    pub profile: Option<PathBuf>,
    /// Forecast horizon in days (7-365, defaults to 30)
    #[arg(long, value_parser = parse_horizon)]
    pub horizon: Option<u32>,
    /// Write the sales trend chart to this SVG file
    #[arg(long = "trend-chart")]
    pub trend_chart: Option<PathBuf>,
    /// Write the forecast chart to this SVG file
    #[arg(long = "forecast-chart")]
    pub forecast_chart: Option<PathBuf>,
    /// Number of data rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Export the normalized, filtered table to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Destination SVG file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Forecast horizon in days (7-365)
    #[arg(long, default_value_t = DEFAULT_HORIZON, value_parser = parse_horizon)]
    pub horizon: u32,
    /// Also write the forecast chart to this SVG file
    #[arg(long)]
    pub chart: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_horizon(value: &str) -> Result<u32, String> {
    let parsed: u32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number of days"))?;
    if !(MIN_HORIZON..=MAX_HORIZON).contains(&parsed) {
        return Err(format!(
            "Forecast horizon must be between {MIN_HORIZON} and {MAX_HORIZON} days"
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_horizon_enforces_bounds() {
        assert_eq!(parse_horizon("7").unwrap(), 7);
        assert_eq!(parse_horizon("365").unwrap(), 365);
        assert!(parse_horizon("0").is_err());
        assert!(parse_horizon("6").is_err());
        assert!(parse_horizon("366").is_err());
        assert!(parse_horizon("monthly").is_err());
    }

    #[test]
    fn parse_delimiter_accepts_names_and_single_chars() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
