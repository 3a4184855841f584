//! Run settings, read once from the environment.
//!
//! | Variable       | Meaning                                          |
//! |----------------|--------------------------------------------------|
//! | `DATE_WINDOW`  | lookback window, e.g. `"12 weeks"` (required)    |
//! | `SITES`        | JSON array of site codes; absent means all sites |
//! | `SQL_ADDRESS`  | database server address                          |
//! | `SQL_DATABASE` | database holding the target table                |
//! | `SQL_SCHEMA`   | schema of the target table                       |
//! | `SQL_TABLE`    | name of the target table                         |

use tracing::debug;

use crate::error::ConfigError;
use crate::window::DateWindow;

/// Where the weekly summaries are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub address: Option<String>,
    pub database: Option<String>,
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub window: DateWindow,
    /// Empty means every site is processed.
    pub sites: Vec<String>,
    /// Present only when both `SQL_SCHEMA` and `SQL_TABLE` are set.
    pub target: Option<TargetTable>,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let window = get("DATE_WINDOW")
            .ok_or(ConfigError::MissingVar("DATE_WINDOW"))
            .and_then(|w| DateWindow::parse(w.trim()))?;

        let sites = match get("SITES") {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw)
                .map_err(|e| ConfigError::InvalidSites(e.to_string()))?,
            None => Vec::new(),
        };

        let target = match (get("SQL_SCHEMA"), get("SQL_TABLE")) {
            (Some(schema), Some(table)) => Some(TargetTable {
                address: get("SQL_ADDRESS"),
                database: get("SQL_DATABASE"),
                schema,
                table,
            }),
            _ => None,
        };

        let settings = Settings {
            window,
            sites,
            target,
        };
        debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}
