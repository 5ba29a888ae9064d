//! Table and field declarations
//!
//! A [`TableDef`] is the single source of truth for a table: the DDL, the
//! statements the store issues, and client-side validation all derive from it.

use crate::error::{Result, StoreError};
use crate::models::Value;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Serial,
    Integer,
    Varchar(u16),
    Boolean,
    Timestamptz,
    Decimal { digits: u32, places: u32 },
}

impl FieldType {
    pub fn sql(&self) -> String {
        match self {
            FieldType::Serial => "SERIAL".to_string(),
            FieldType::Integer => "INT".to_string(),
            FieldType::Varchar(len) => format!("VARCHAR({})", len),
            FieldType::Boolean => "BOOL".to_string(),
            FieldType::Timestamptz => "TIMESTAMPTZ".to_string(),
            FieldType::Decimal { digits, places } => format!("DECIMAL({},{})", digits, places),
        }
    }

    /// `data_type` as reported by information_schema.columns
    pub fn information_schema_type(&self) -> &'static str {
        match self {
            FieldType::Serial | FieldType::Integer => "integer",
            FieldType::Varchar(_) => "character varying",
            FieldType::Boolean => "boolean",
            FieldType::Timestamptz => "timestamp with time zone",
            FieldType::Decimal { .. } => "numeric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTimestamp {
    None,
    /// Set by the database when the row is inserted, never written again.
    OnInsert,
    /// Set on insert and refreshed on every save.
    OnSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    False,
    Now,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub primary_key: bool,
    pub unique: bool,
    pub indexed: bool,
    pub default: Option<ColumnDefault>,
    pub auto: AutoTimestamp,
}

impl FieldDef {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            primary_key: false,
            unique: false,
            indexed: false,
            default: None,
            auto: AutoTimestamp::None,
        }
    }

    pub fn id() -> Self {
        Self {
            primary_key: true,
            ..Self::new("id", FieldType::Serial)
        }
    }

    pub fn varchar(name: &'static str, max_length: u16) -> Self {
        Self::new(name, FieldType::Varchar(max_length))
    }

    pub fn created_at() -> Self {
        Self {
            default: Some(ColumnDefault::Now),
            auto: AutoTimestamp::OnInsert,
            ..Self::new("created_at", FieldType::Timestamptz)
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn auto_now(mut self) -> Self {
        self.default = Some(ColumnDefault::Now);
        self.auto = AutoTimestamp::OnSave;
        self
    }

    /// Whether `Store::save` writes this column from the record.
    pub fn is_writable(&self) -> bool {
        !self.primary_key && self.auto == AutoTimestamp::None
    }

    fn column_sql(&self) -> String {
        let mut sql = format!("\"{}\" {} NOT NULL", self.name, self.field_type.sql());

        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        match self.default {
            Some(ColumnDefault::False) => sql.push_str(" DEFAULT FALSE"),
            Some(ColumnDefault::Now) => sql.push_str(" DEFAULT CURRENT_TIMESTAMP"),
            None => {}
        }

        sql
    }
}

#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldDef>,
}

impl TableDef {
    pub fn new(name: &'static str, description: &'static str, fields: Vec<FieldDef>) -> Self {
        Self {
            name,
            description,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&FieldDef> {
        self.field(name).ok_or_else(|| StoreError::UnknownColumn {
            table: self.name.to_string(),
            column: name.to_string(),
        })
    }

    /// Columns carrying a single-column UNIQUE constraint
    pub fn unique_columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.unique)
            .map(|f| f.name)
            .collect()
    }

    /// CREATE TABLE plus any secondary indexes
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("    {}", f.column_sql()))
            .collect();

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n);\nCOMMENT ON TABLE \"{}\" IS '{}';",
            self.name,
            columns.join(",\n"),
            self.name,
            self.description.replace('\'', "''")
        );

        for field in self.fields.iter().filter(|f| f.indexed && !f.unique) {
            sql.push_str(&format!(
                "\nCREATE INDEX IF NOT EXISTS \"idx_{}_{}\" ON \"{}\" (\"{}\");",
                self.name, field.name, self.name, field.name
            ));
        }

        sql
    }

    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM \"{}\"", self.column_list(), self.name)
    }

    pub fn insert_sql(&self, columns: &[&str]) -> Result<String> {
        for column in columns {
            self.require_field(column)?;
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        let quoted: Vec<String> = columns.iter().map(|c| format!("\"{}\"", c)).collect();

        Ok(format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
            self.name,
            quoted.join(", "),
            placeholders.join(", "),
            self.column_list()
        ))
    }

    /// UPDATE by id; `id` binds to the parameter after the last column.
    ///
    /// `OnSave` timestamps use clock_timestamp() so two saves inside one
    /// transaction still differ.
    pub fn update_sql(&self, columns: &[&str]) -> Result<String> {
        let mut assignments = Vec::new();
        for (i, column) in columns.iter().enumerate() {
            let field = self.require_field(column)?;
            if !field.is_writable() {
                return Err(StoreError::InvalidField {
                    table: self.name.to_string(),
                    field: column.to_string(),
                    message: "column is managed by the database".to_string(),
                });
            }
            assignments.push(format!("\"{}\" = ${}", column, i + 1));
        }

        for field in self.fields.iter().filter(|f| f.auto == AutoTimestamp::OnSave) {
            assignments.push(format!("\"{}\" = clock_timestamp()", field.name));
        }

        Ok(format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING {}",
            self.name,
            assignments.join(", "),
            columns.len() + 1,
            self.column_list()
        ))
    }

    /// Check values against declared lengths and precisions before writing
    pub fn validate(&self, values: &[(&'static str, Value<'_>)]) -> Result<()> {
        for (column, value) in values {
            let field = self.require_field(column)?;

            match (field.field_type, value) {
                (FieldType::Varchar(max), Value::Text(text)) => {
                    let len = text.chars().count();
                    if len > max as usize {
                        return Err(self.invalid(column, format!(
                            "length {} exceeds max_length {}",
                            len, max
                        )));
                    }
                }
                (FieldType::Decimal { digits, places }, Value::Decimal(number)) => {
                    check_decimal(number, digits, places)
                        .map_err(|message| self.invalid(column, message))?;
                }
                (FieldType::Integer, Value::Int(_))
                | (FieldType::Boolean, Value::Bool(_))
                | (FieldType::Timestamptz, Value::Timestamp(_)) => {}
                (expected, _) => {
                    return Err(self.invalid(
                        column,
                        format!("value does not match column type {}", expected.sql()),
                    ));
                }
            }
        }

        Ok(())
    }

    fn column_list(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("\"{}\"", f.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn invalid(&self, column: &str, message: String) -> StoreError {
        StoreError::InvalidField {
            table: self.name.to_string(),
            field: column.to_string(),
            message,
        }
    }
}

fn check_decimal(number: &Decimal, digits: u32, places: u32) -> std::result::Result<(), String> {
    let normalized = number.normalize();
    if normalized.scale() > places {
        return Err(format!(
            "{} has more than {} decimal places",
            number, places
        ));
    }

    let limit = Decimal::from(10i64.pow(digits - places));
    if normalized.abs() >= limit {
        return Err(format!(
            "{} has more than {} digits before the decimal point",
            number,
            digits - places
        ));
    }

    Ok(())
}

pub(crate) fn is_valid_identifier(name: &str) -> bool {
    if name.is_empty() || name.len() > 63 {
        return false;
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
