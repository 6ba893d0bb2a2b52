use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::cli::{self, DashboardArgs};
use crate::forecast::{MAX_HORIZON, MIN_HORIZON};

/// Saved run configuration: the dashboard's "widget state" between
/// invocations. Command-line flags always win over profile values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunProfile {
    pub input: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub input_encoding: Option<String>,
    pub database: Option<DbProfile>,
    pub categories: Vec<String>,
    pub exclude_categories: Vec<String>,
    pub horizon: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbProfile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: String,
    pub user: String,
    pub password: Option<String>,
    pub table: String,
}

impl RunProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile {path:?}"))?;
        serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing profile {path:?}"))
    }
}

/// Fill unset dashboard arguments from the profile.
pub fn apply(profile: &RunProfile, args: &mut DashboardArgs) -> Result<()> {
    let source_given = args.source.input.is_some()
        || args.source.db_host.is_some()
        || args.source.db_name.is_some()
        || args.source.db_user.is_some()
        || args.source.table.is_some();
    if !source_given {
        if let Some(input) = &profile.input {
            args.source.input = Some(input.clone());
        } else if let Some(database) = &profile.database {
            args.source.db_host = database.host.clone();
            if let Some(port) = database.port {
                args.source.db_port = port;
            }
            args.source.db_name = Some(database.name.clone());
            args.source.db_user = Some(database.user.clone());
            if args.source.db_password.is_none() {
                args.source.db_password = database.password.clone();
            }
            args.source.table = Some(database.table.clone());
        }
    }
    if args.source.delimiter.is_none()
        && let Some(delimiter) = &profile.delimiter
    {
        args.source.delimiter = Some(
            cli::parse_delimiter(delimiter)
                .map_err(|err| anyhow!("Profile delimiter '{delimiter}': {err}"))?,
        );
    }
    if args.source.input_encoding.is_none() {
        args.source.input_encoding = profile.input_encoding.clone();
    }
    if args.selection.categories.is_empty() {
        args.selection.categories = profile.categories.clone();
    }
    if args.selection.exclude_categories.is_empty() {
        args.selection.exclude_categories = profile.exclude_categories.clone();
    }
    if args.horizon.is_none()
        && let Some(horizon) = profile.horizon
    {
        if !(MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
            return Err(anyhow!(
                "Profile horizon {horizon} must be between {MIN_HORIZON} and {MAX_HORIZON} days"
            ));
        }
        args.horizon = Some(horizon);
    }
    Ok(())
}
