//! T-SQL rendering for the attendance extract and the summary table.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::config::TargetTable;
use crate::occupancy::WeeklyAggregate;
use crate::services::store::{StoreOutcome, WeeklyStore, earliest_week};

/// Rows per `INSERT` statement.
pub const INSERT_BATCH_ROWS: usize = 250;

const COLUMNS: &[(&str, &str)] = &[
    ("date_weekstarting", "DATE NOT NULL"),
    ("date_weekending", "DATE NOT NULL"),
    ("fin_year", "VARCHAR(7) NOT NULL"),
    ("month", "VARCHAR(3) NOT NULL"),
    ("site_code", "VARCHAR(20) NOT NULL"),
    ("patients_mean", "FLOAT NOT NULL"),
    ("arrivals_mean", "FLOAT NOT NULL"),
    ("completeness", "FLOAT NOT NULL"),
];

/// Appends the arrival-date lower bound to an extract query template.
pub fn extraction_query(template: &str, week_start: NaiveDate) -> String {
    format!(
        "{}\n AND [attendance.arrival.date] >= '{}'",
        template.trim_end(),
        week_start.format("%Y-%m-%d")
    )
}

pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl TargetTable {
    /// `[database].[schema].[table]`, or `[schema].[table]` without a database.
    pub fn qualified_name(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(db) = &self.database {
            parts.push(quote_ident(db));
        }
        parts.push(quote_ident(&self.schema));
        parts.push(quote_ident(&self.table));
        parts.join(".")
    }
}

pub fn create_table_sql(target: &TargetTable) -> String {
    let name = target.qualified_name();
    let columns = COLUMNS
        .iter()
        .map(|(col, ty)| format!("    {} {}", quote_ident(col), ty))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "IF OBJECT_ID({}, N'U') IS NULL\nCREATE TABLE {} (\n{}\n);\n",
        quote_literal(&name),
        name,
        columns
    )
}

pub fn delete_window_sql(target: &TargetTable, from: NaiveDate) -> String {
    format!(
        "DELETE FROM {} WHERE [date_weekstarting] >= '{}';\n",
        target.qualified_name(),
        from.format("%Y-%m-%d")
    )
}

/// One `INSERT ... VALUES` statement for `rows`.
pub fn insert_sql(target: &TargetTable, rows: &[WeeklyAggregate]) -> String {
    let columns = COLUMNS
        .iter()
        .map(|(col, _)| quote_ident(col))
        .collect::<Vec<_>>()
        .join(", ");

    let values = rows
        .iter()
        .map(|r| {
            format!(
                "    ('{}', '{}', {}, {}, {}, {}, {}, {})",
                r.date_weekstarting.format("%Y-%m-%d"),
                r.date_weekending.format("%Y-%m-%d"),
                quote_literal(&r.fin_year),
                quote_literal(&r.month),
                quote_literal(&r.site_code),
                r.patients_mean,
                r.arrivals_mean,
                r.completeness
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "INSERT INTO {} ({})\nVALUES\n{};\n",
        target.qualified_name(),
        columns,
        values
    )
}

/// Writes the statements that apply a batch to a SQL Server table as a script
/// file, for running with the database's own tooling.
pub struct SqlScriptStore {
    target: TargetTable,
    path: PathBuf,
}

impl SqlScriptStore {
    pub fn new(target: TargetTable, path: impl Into<PathBuf>) -> Self {
        Self {
            target,
            path: path.into(),
        }
    }

    pub fn render(&self, rows: &[WeeklyAggregate]) -> Option<String> {
        let from = earliest_week(rows)?;

        let mut script = String::new();
        if let Some(address) = &self.target.address {
            script.push_str(&format!("-- server: {address}\n"));
        }
        script.push_str("SET XACT_ABORT ON;\nBEGIN TRANSACTION;\n\n");
        script.push_str(&create_table_sql(&self.target));
        script.push('\n');
        script.push_str(&delete_window_sql(&self.target, from));
        for chunk in rows.chunks(INSERT_BATCH_ROWS) {
            script.push('\n');
            script.push_str(&insert_sql(&self.target, chunk));
        }
        script.push_str("\nCOMMIT TRANSACTION;\n");

        Some(script)
    }
}

impl WeeklyStore for SqlScriptStore {
    #[tracing::instrument(skip(self, rows), fields(path = %self.path.display(), rows = rows.len()))]
    fn replace_window(&mut self, rows: &[WeeklyAggregate]) -> Result<StoreOutcome> {
        let Some(script) = self.render(rows) else {
            info!("No weekly rows to script");
            return Ok(StoreOutcome::default());
        };

        fs::write(&self.path, script)
            .with_context(|| format!("writing SQL script {}", self.path.display()))?;

        info!(
            table = %self.target.qualified_name(),
            statements = rows.len().div_ceil(INSERT_BATCH_ROWS),
            "SQL script written"
        );
        Ok(StoreOutcome {
            created: false,
            removed: None,
            inserted: rows.len(),
        })
    }
}
