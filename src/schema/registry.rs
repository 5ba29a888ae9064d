//! Schema Registry
//!
//! Declares the seven application tables. Table names are the lower-cased
//! model names the application has always used, so an existing database is
//! adopted as-is.

use crate::schema::definition::{ColumnDefault, FieldDef, FieldType, TableDef};
use tracing::warn;

pub const USERS: &str = "users";
pub const TIMESERIES_DATA: &str = "timeseriesdata";
pub const SCENARIO_METADATA: &str = "scenariometadata";
pub const REPORT_METADATA: &str = "reportmetadata";
pub const LABELS: &str = "labels";
pub const SCENARIO_LABELS: &str = "scenariolabels";
pub const REPORT_LABELS: &str = "reportlabels";

#[derive(Debug, Clone, Copy)]
pub struct SchemaOptions {
    /// Put a UNIQUE constraint on `username` in every table, not only `users`.
    ///
    /// This is the layout existing deployments have, and it limits each user
    /// to one dataset, scenario, report and label. When off, `username` gets a
    /// plain index on those tables instead.
    pub unique_username_per_table: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            unique_username_per_table: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    options: SchemaOptions,
    tables: Vec<TableDef>,
}

impl SchemaRegistry {
    pub fn new(options: SchemaOptions) -> Self {
        if options.unique_username_per_table {
            warn!(
                "username is UNIQUE on every table: users are limited to one row per table outside of {}",
                USERS
            );
        }

        let owner = || {
            let field = FieldDef::varchar("username", 100);
            if options.unique_username_per_table {
                field.unique()
            } else {
                field.indexed()
            }
        };

        let tables = vec![
            TableDef::new(
                USERS,
                "User model.",
                vec![
                    FieldDef::id(),
                    FieldDef::varchar("username", 100).unique(),
                    FieldDef::varchar("hashed_password", 255),
                    FieldDef::varchar("email", 100).unique(),
                    FieldDef::new("is_logged_in", FieldType::Boolean).default(ColumnDefault::False),
                    FieldDef::new("last_logged_date", FieldType::Timestamptz).auto_now(),
                    FieldDef::created_at(),
                ],
            ),
            TableDef::new(
                TIMESERIES_DATA,
                "Time series data model.",
                vec![
                    FieldDef::id(),
                    owner(),
                    FieldDef::new("start_date", FieldType::Timestamptz),
                    FieldDef::new("end_date", FieldType::Timestamptz),
                    FieldDef::new(
                        "resolution_min",
                        FieldType::Decimal {
                            digits: 7,
                            places: 3,
                        },
                    ),
                    FieldDef::created_at(),
                    FieldDef::varchar("name", 100),
                    FieldDef::varchar("description", 255),
                    FieldDef::varchar("image", 100),
                    FieldDef::varchar("filename", 100),
                    FieldDef::varchar("category", 100),
                ],
            ),
            TableDef::new(
                SCENARIO_METADATA,
                "Scenario metadata model.",
                vec![
                    FieldDef::id(),
                    owner(),
                    FieldDef::created_at(),
                    FieldDef::varchar("name", 100),
                    FieldDef::varchar("description", 255),
                    FieldDef::new("solar", FieldType::Boolean),
                    FieldDef::new("ev", FieldType::Boolean),
                    FieldDef::new("storage", FieldType::Boolean),
                    FieldDef::varchar("filename", 100),
                ],
            ),
            TableDef::new(
                REPORT_METADATA,
                "Report metadata model.",
                vec![
                    FieldDef::id(),
                    owner(),
                    FieldDef::created_at(),
                    FieldDef::varchar("name", 100),
                    FieldDef::varchar("description", 255),
                    FieldDef::varchar("status", 100),
                    FieldDef::varchar("scenario_name", 100),
                    FieldDef::varchar("report_file", 100),
                    FieldDef::varchar("report_data_file", 100),
                ],
            ),
            TableDef::new(
                LABELS,
                "Labels model.",
                vec![
                    FieldDef::id(),
                    FieldDef::varchar("labelname", 100),
                    owner(),
                    FieldDef::created_at(),
                ],
            ),
            // scenario_id and report_id are plain integers: label rows may
            // outlive the scenario or report they were attached to.
            TableDef::new(
                SCENARIO_LABELS,
                "Scenario label model.",
                vec![
                    FieldDef::id(),
                    FieldDef::new("scenario_id", FieldType::Integer).indexed(),
                    owner(),
                    FieldDef::created_at(),
                    FieldDef::varchar("labelname", 100),
                ],
            ),
            TableDef::new(
                REPORT_LABELS,
                "Report labels model.",
                vec![
                    FieldDef::id(),
                    FieldDef::new("report_id", FieldType::Integer).indexed(),
                    owner(),
                    FieldDef::created_at(),
                    FieldDef::varchar("labelname", 100),
                ],
            ),
        ];

        Self { options, tables }
    }

    pub fn options(&self) -> SchemaOptions {
        self.options
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(SchemaOptions::default())
    }
}
