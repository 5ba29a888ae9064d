//! Typed records for the application tables
//!
//! Each table has a record type (a persisted row, implementing [`Record`])
//! and an insert input (implementing [`Insertable`]). Columns the database
//! fills in (`id`, `created_at`, auto timestamps, defaults) only appear on
//! the record.

mod labels;
mod report;
mod scenario;
mod timeseries;
mod user;

pub use labels::{Label, NewLabel, NewReportLabel, NewScenarioLabel, ReportLabel, ScenarioLabel};
pub use report::{NewReportMetadata, ReportMetadata};
pub use scenario::{NewScenarioMetadata, ScenarioMetadata};
pub use timeseries::{NewTimeseriesData, TimeseriesData};
pub use user::{User, UserIn, UserToken};

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use tokio_postgres::Row;

/// A borrowed column value, typed so it can be validated against the
/// declaration before being bound as a statement parameter.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Text(&'a String),
    Int(&'a i32),
    Bool(&'a bool),
    Timestamp(&'a DateTime<Utc>),
    Decimal(&'a Decimal),
}

impl<'a> Value<'a> {
    pub fn as_sql(&self) -> &'a (dyn ToSql + Sync) {
        match *self {
            Value::Text(v) => v,
            Value::Int(v) => v,
            Value::Bool(v) => v,
            Value::Timestamp(v) => v,
            Value::Decimal(v) => v,
        }
    }
}

/// A persisted row
pub trait Record: Sized + Send + Sync {
    const TABLE: &'static str;

    fn id(&self) -> i32;

    fn from_row(row: &Row) -> Result<Self>;

    /// Columns written back by a save, in binding order
    fn values(&self) -> Vec<(&'static str, Value<'_>)>;
}

/// Input for inserting a new row
pub trait Insertable: Send + Sync {
    type Record: Record;

    fn values(&self) -> Vec<(&'static str, Value<'_>)>;
}

/// Read a column, naming the table and column on failure
pub(crate) fn column<'a, T: FromSql<'a>>(row: &'a Row, table: &str, name: &str) -> Result<T> {
    row.try_get(name).map_err(|e| StoreError::Decode {
        table: table.to_string(),
        column: name.to_string(),
        cause: e.to_string(),
    })
}
