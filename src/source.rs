use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    cli::SourceArgs,
    db::{self, DbParams},
    io_utils, normalize,
    record::SalesTable,
};

/// Where this run's data comes from: exactly one of an uploaded delimited
/// file or a database table.
#[derive(Debug, Clone)]
pub enum SalesSource {
    File {
        path: PathBuf,
        delimiter: Option<u8>,
        encoding: Option<String>,
    },
    Database(DbParams),
}

impl SalesSource {
    pub fn from_cli(args: &SourceArgs) -> Result<Self> {
        let wants_db = args.db_host.is_some()
            || args.db_name.is_some()
            || args.db_user.is_some()
            || args.table.is_some();
        match (&args.input, wants_db) {
            (Some(_), true) => {
                bail!("Choose either --input or a database connection, not both")
            }
            (Some(path), false) => Ok(SalesSource::File {
                path: path.clone(),
                delimiter: args.delimiter,
                encoding: args.input_encoding.clone(),
            }),
            (None, true) => {
                let Some(database) = args.db_name.clone() else {
                    bail!("Database connections require --db-name");
                };
                let Some(user) = args.db_user.clone() else {
                    bail!("Database connections require --db-user");
                };
                let Some(table) = args.table.clone() else {
                    bail!("Database connections require --table");
                };
                Ok(SalesSource::Database(DbParams {
                    host: args.db_host.clone().unwrap_or_else(|| "localhost".to_string()),
                    port: args.db_port,
                    database,
                    user,
                    password: args.db_password.clone().unwrap_or_default(),
                    table,
                }))
            }
            (None, false) => {
                bail!("Please supply an input file (--input) or a database connection (--db-name, --db-user, --table)")
            }
        }
    }

    /// Acquire and normalize the table for this run.
    pub fn load(&self) -> Result<SalesTable> {
        match self {
            SalesSource::File {
                path,
                delimiter,
                encoding,
            } => {
                let delimiter = io_utils::resolve_delimiter(path, *delimiter);
                let encoding = io_utils::resolve_encoding(encoding.as_deref())?;
                let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
                let headers = io_utils::reader_headers(&mut reader, encoding)?;
                let map = normalize::resolve_columns(&headers)
                    .with_context(|| format!("Normalizing columns of {path:?}"))?;

                let mut sales_data = SalesTable::new();
                for (row_idx, record) in reader.byte_records().enumerate() {
                    let record =
                        record.with_context(|| format!("Reading row {}", row_idx + 2))?;
                    let decoded = io_utils::decode_record(&record, encoding)?;
                    let parsed = normalize::record_from_row(&map, &decoded)
                        .with_context(|| format!("Parsing row {}", row_idx + 2))?;
                    sales_data.push(parsed);
                }
                info!("Loaded {} row(s) from {path:?}", sales_data.len());
                Ok(sales_data)
            }
            SalesSource::Database(params) => {
                let (headers, rows) = db::fetch_table(params)?;
                let sales_data = normalize::build_table(&headers, &rows)
                    .with_context(|| format!("Normalizing columns of table '{}'", params.table))?;
                info!(
                    "Loaded {} row(s) from table '{}' on {}",
                    sales_data.len(),
                    params.table,
                    params.host
                );
                Ok(sales_data)
            }
        }
    }
}
