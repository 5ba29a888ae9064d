//! Label records
//!
//! A [`Label`] is a user's label name. Scenario and report labels attach a
//! label name to a scenario or report id. Nothing enforces that the id
//! exists.

use crate::error::Result;
use crate::models::{column, Insertable, Record, Value};
use crate::schema::{LABELS, REPORT_LABELS, SCENARIO_LABELS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i32,
    pub labelname: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Label {
    const TABLE: &'static str = LABELS;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, LABELS, "id")?,
            labelname: column(row, LABELS, "labelname")?,
            username: column(row, LABELS, "username")?,
            created_at: column(row, LABELS, "created_at")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("labelname", Value::Text(&self.labelname)),
            ("username", Value::Text(&self.username)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabel {
    pub labelname: String,
    pub username: String,
}

impl Insertable for NewLabel {
    type Record = Label;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("labelname", Value::Text(&self.labelname)),
            ("username", Value::Text(&self.username)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioLabel {
    pub id: i32,
    pub scenario_id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub labelname: String,
}

impl Record for ScenarioLabel {
    const TABLE: &'static str = SCENARIO_LABELS;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, SCENARIO_LABELS, "id")?,
            scenario_id: column(row, SCENARIO_LABELS, "scenario_id")?,
            username: column(row, SCENARIO_LABELS, "username")?,
            created_at: column(row, SCENARIO_LABELS, "created_at")?,
            labelname: column(row, SCENARIO_LABELS, "labelname")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("scenario_id", Value::Int(&self.scenario_id)),
            ("username", Value::Text(&self.username)),
            ("labelname", Value::Text(&self.labelname)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScenarioLabel {
    pub scenario_id: i32,
    pub username: String,
    pub labelname: String,
}

impl Insertable for NewScenarioLabel {
    type Record = ScenarioLabel;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("scenario_id", Value::Int(&self.scenario_id)),
            ("username", Value::Text(&self.username)),
            ("labelname", Value::Text(&self.labelname)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLabel {
    pub id: i32,
    pub report_id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub labelname: String,
}

impl Record for ReportLabel {
    const TABLE: &'static str = REPORT_LABELS;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, REPORT_LABELS, "id")?,
            report_id: column(row, REPORT_LABELS, "report_id")?,
            username: column(row, REPORT_LABELS, "username")?,
            created_at: column(row, REPORT_LABELS, "created_at")?,
            labelname: column(row, REPORT_LABELS, "labelname")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("report_id", Value::Int(&self.report_id)),
            ("username", Value::Text(&self.username)),
            ("labelname", Value::Text(&self.labelname)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReportLabel {
    pub report_id: i32,
    pub username: String,
    pub labelname: String,
}

impl Insertable for NewReportLabel {
    type Record = ReportLabel;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("report_id", Value::Int(&self.report_id)),
            ("username", Value::Text(&self.username)),
            ("labelname", Value::Text(&self.labelname)),
        ]
    }
}
