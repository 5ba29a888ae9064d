use crate::error::Result;
use crate::models::{column, Insertable, Record, Value};
use crate::schema::SCENARIO_METADATA;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A simulation scenario and the technologies it includes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub solar: bool,
    pub ev: bool,
    pub storage: bool,
    pub filename: String,
}

impl Record for ScenarioMetadata {
    const TABLE: &'static str = SCENARIO_METADATA;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, SCENARIO_METADATA, "id")?,
            username: column(row, SCENARIO_METADATA, "username")?,
            created_at: column(row, SCENARIO_METADATA, "created_at")?,
            name: column(row, SCENARIO_METADATA, "name")?,
            description: column(row, SCENARIO_METADATA, "description")?,
            solar: column(row, SCENARIO_METADATA, "solar")?,
            ev: column(row, SCENARIO_METADATA, "ev")?,
            storage: column(row, SCENARIO_METADATA, "storage")?,
            filename: column(row, SCENARIO_METADATA, "filename")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("name", Value::Text(&self.name)),
            ("description", Value::Text(&self.description)),
            ("solar", Value::Bool(&self.solar)),
            ("ev", Value::Bool(&self.ev)),
            ("storage", Value::Bool(&self.storage)),
            ("filename", Value::Text(&self.filename)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScenarioMetadata {
    pub username: String,
    pub name: String,
    pub description: String,
    pub solar: bool,
    pub ev: bool,
    pub storage: bool,
    pub filename: String,
}

impl Insertable for NewScenarioMetadata {
    type Record = ScenarioMetadata;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("name", Value::Text(&self.name)),
            ("description", Value::Text(&self.description)),
            ("solar", Value::Bool(&self.solar)),
            ("ev", Value::Bool(&self.ev)),
            ("storage", Value::Bool(&self.storage)),
            ("filename", Value::Text(&self.filename)),
        ]
    }
}
