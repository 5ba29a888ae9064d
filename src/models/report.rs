use crate::error::Result;
use crate::models::{column, Insertable, Record, Value};
use crate::schema::REPORT_METADATA;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub status: String,
    /// Name of the scenario the report was generated from; not a key
    pub scenario_name: String,
    pub report_file: String,
    pub report_data_file: String,
}

impl Record for ReportMetadata {
    const TABLE: &'static str = REPORT_METADATA;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, REPORT_METADATA, "id")?,
            username: column(row, REPORT_METADATA, "username")?,
            created_at: column(row, REPORT_METADATA, "created_at")?,
            name: column(row, REPORT_METADATA, "name")?,
            description: column(row, REPORT_METADATA, "description")?,
            status: column(row, REPORT_METADATA, "status")?,
            scenario_name: column(row, REPORT_METADATA, "scenario_name")?,
            report_file: column(row, REPORT_METADATA, "report_file")?,
            report_data_file: column(row, REPORT_METADATA, "report_data_file")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("name", Value::Text(&self.name)),
            ("description", Value::Text(&self.description)),
            ("status", Value::Text(&self.status)),
            ("scenario_name", Value::Text(&self.scenario_name)),
            ("report_file", Value::Text(&self.report_file)),
            ("report_data_file", Value::Text(&self.report_data_file)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReportMetadata {
    pub username: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub scenario_name: String,
    pub report_file: String,
    pub report_data_file: String,
}

impl Insertable for NewReportMetadata {
    type Record = ReportMetadata;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("name", Value::Text(&self.name)),
            ("description", Value::Text(&self.description)),
            ("status", Value::Text(&self.status)),
            ("scenario_name", Value::Text(&self.scenario_name)),
            ("report_file", Value::Text(&self.report_file)),
            ("report_data_file", Value::Text(&self.report_data_file)),
        ]
    }
}
