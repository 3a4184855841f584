//! Collaborators on either side of the occupancy pipeline.
//!
//! [`StaySource`] supplies stay records already restricted to the run's
//! window and sites. [`WeeklyStore`] persists the weekly summaries, replacing
//! any stored weeks the new batch covers. [`sql`] renders the SQL Server side
//! of both.

pub mod source;
pub mod sql;
pub mod store;

pub use source::{CsvStaySource, Extraction, StaySource};
pub use sql::SqlScriptStore;
pub use store::{CsvWeeklyStore, StoreOutcome, WeeklyStore};
