use crate::error::Result;
use crate::models::{column, Insertable, Record, Value};
use crate::schema::TIMESERIES_DATA;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Metadata for an uploaded time series dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesData {
    pub id: i32,
    pub username: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Sampling resolution in minutes
    pub resolution_min: Decimal,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub image: String,
    pub filename: String,
    pub category: String,
}

impl Record for TimeseriesData {
    const TABLE: &'static str = TIMESERIES_DATA;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, TIMESERIES_DATA, "id")?,
            username: column(row, TIMESERIES_DATA, "username")?,
            start_date: column(row, TIMESERIES_DATA, "start_date")?,
            end_date: column(row, TIMESERIES_DATA, "end_date")?,
            resolution_min: column(row, TIMESERIES_DATA, "resolution_min")?,
            created_at: column(row, TIMESERIES_DATA, "created_at")?,
            name: column(row, TIMESERIES_DATA, "name")?,
            description: column(row, TIMESERIES_DATA, "description")?,
            image: column(row, TIMESERIES_DATA, "image")?,
            filename: column(row, TIMESERIES_DATA, "filename")?,
            category: column(row, TIMESERIES_DATA, "category")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("start_date", Value::Timestamp(&self.start_date)),
            ("end_date", Value::Timestamp(&self.end_date)),
            ("resolution_min", Value::Decimal(&self.resolution_min)),
            ("name", Value::Text(&self.name)),
            ("description", Value::Text(&self.description)),
            ("image", Value::Text(&self.image)),
            ("filename", Value::Text(&self.filename)),
            ("category", Value::Text(&self.category)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimeseriesData {
    pub username: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub resolution_min: Decimal,
    pub name: String,
    pub description: String,
    pub image: String,
    pub filename: String,
    pub category: String,
}

impl Insertable for NewTimeseriesData {
    type Record = TimeseriesData;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("start_date", Value::Timestamp(&self.start_date)),
            ("end_date", Value::Timestamp(&self.end_date)),
            ("resolution_min", Value::Decimal(&self.resolution_min)),
            ("name", Value::Text(&self.name)),
            ("description", Value::Text(&self.description)),
            ("image", Value::Text(&self.image)),
            ("filename", Value::Text(&self.filename)),
            ("category", Value::Text(&self.category)),
        ]
    }
}
