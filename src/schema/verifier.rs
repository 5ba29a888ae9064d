//! Schema verifier
//!
//! Compares the live database against the registry: missing tables, missing
//! columns, column type and nullability drift, and single-column UNIQUE
//! constraints that were added or dropped by hand.

use crate::error::{Result, StoreError};
use crate::schema::definition::{FieldType, TableDef};
use crate::schema::registry::SchemaRegistry;
use deadpool_postgres::Pool;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// A column as reported by information_schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

/// Introspected shape of one table
#[derive(Debug, Clone, Default)]
pub struct LiveTable {
    pub columns: Vec<LiveColumn>,
    pub unique_columns: BTreeSet<String>,
}

/// Result of schema verification
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub expected: Vec<String>,
    pub found: Vec<String>,
    pub missing: Vec<String>,
    pub mismatches: Vec<TableMismatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMismatch {
    pub table: String,
    pub issue: String,
}

impl VerificationResult {
    pub fn new() -> Self {
        Self {
            passed: true,
            expected: Vec::new(),
            found: Vec::new(),
            missing: Vec::new(),
            mismatches: Vec::new(),
        }
    }

    /// Generate a human-readable error log
    pub fn error_log(&self) -> String {
        let mut log = String::new();

        log.push_str("═══════════════════════════════════════════════════════════════\n");
        log.push_str("              SCHEMA VERIFICATION FAILED\n");
        log.push_str("═══════════════════════════════════════════════════════════════\n\n");

        if !self.missing.is_empty() {
            log.push_str("MISSING TABLES:\n");
            for t in &self.missing {
                log.push_str(&format!("  - {}\n", t));
            }
            log.push('\n');
        }

        if !self.mismatches.is_empty() {
            log.push_str("TABLE SCHEMA MISMATCHES:\n");
            for m in &self.mismatches {
                log.push_str(&format!("  - {}: {}\n", m.table, m.issue));
            }
            log.push('\n');
        }

        log.push_str("═══════════════════════════════════════════════════════════════\n");
        log.push_str("ACTION REQUIRED: Migrate the database to the declared schema\n");
        log.push_str("═══════════════════════════════════════════════════════════════\n");

        log
    }
}

impl Default for VerificationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SchemaVerifier;

impl SchemaVerifier {
    pub fn new() -> Self {
        Self
    }

    pub async fn verify(&self, pool: &Pool, registry: &SchemaRegistry) -> Result<VerificationResult> {
        let live = self.query_live_tables(pool, registry).await?;
        let result = compare(registry, &live);

        if result.passed {
            info!("Schema verification PASSED ({} tables)", result.found.len());
        } else {
            warn!(
                "Schema verification FAILED: {} missing tables, {} mismatches",
                result.missing.len(),
                result.mismatches.len()
            );
        }

        Ok(result)
    }

    async fn query_live_tables(
        &self,
        pool: &Pool,
        registry: &SchemaRegistry,
    ) -> Result<HashMap<String, LiveTable>> {
        let client = pool.get().await?;
        let names: Vec<String> = registry.tables().iter().map(|t| t.name.to_string()).collect();

        let rows = client
            .query(
                r#"
                SELECT
                    c.table_name::TEXT,
                    c.column_name::TEXT,
                    c.data_type::TEXT,
                    c.is_nullable::TEXT,
                    c.character_maximum_length::INT,
                    c.numeric_precision::INT,
                    c.numeric_scale::INT
                FROM information_schema.columns c
                WHERE c.table_schema = current_schema()
                    AND c.table_name::TEXT = ANY($1::TEXT[])
                ORDER BY c.table_name, c.ordinal_position
                "#,
                &[&names],
            )
            .await
            .map_err(|e| StoreError::from_query("information_schema.columns", e))?;

        let mut tables: HashMap<String, LiveTable> = HashMap::new();

        for row in rows {
            let table_name: String = row.get(0);
            let is_nullable: String = row.get(3);

            tables.entry(table_name).or_default().columns.push(LiveColumn {
                name: row.get(1),
                data_type: row.get(2),
                is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
                character_maximum_length: row.get(4),
                numeric_precision: row.get(5),
                numeric_scale: row.get(6),
            });
        }

        // Single-column UNIQUE constraints only
        let rows = client
            .query(
                r#"
                SELECT tc.table_name::TEXT, MIN(kcu.column_name::TEXT)
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                    AND tc.table_name = kcu.table_name
                WHERE tc.constraint_type = 'UNIQUE'
                    AND tc.table_schema = current_schema()
                    AND tc.table_name::TEXT = ANY($1::TEXT[])
                GROUP BY tc.table_name, tc.constraint_name
                HAVING COUNT(*) = 1
                "#,
                &[&names],
            )
            .await
            .map_err(|e| StoreError::from_query("information_schema.table_constraints", e))?;

        for row in rows {
            let table_name: String = row.get(0);
            let column: String = row.get(1);
            if let Some(table) = tables.get_mut(&table_name) {
                table.unique_columns.insert(column);
            }
        }

        debug!("Introspected {} of {} declared tables", tables.len(), names.len());

        Ok(tables)
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare declared tables against introspected ones
pub fn compare(registry: &SchemaRegistry, live: &HashMap<String, LiveTable>) -> VerificationResult {
    let mut result = VerificationResult::new();

    for table in registry.tables() {
        result.expected.push(table.name.to_string());

        match live.get(table.name) {
            Some(live_table) => {
                result.found.push(table.name.to_string());
                result.mismatches.extend(compare_table(table, live_table));
            }
            None => result.missing.push(table.name.to_string()),
        }
    }

    result.passed = result.missing.is_empty() && result.mismatches.is_empty();
    result
}

fn compare_table(table: &TableDef, live: &LiveTable) -> Vec<TableMismatch> {
    let mut mismatches = Vec::new();
    let mut push = |issue: String| {
        mismatches.push(TableMismatch {
            table: table.name.to_string(),
            issue,
        })
    };

    for field in &table.fields {
        let Some(column) = live.columns.iter().find(|c| c.name == field.name) else {
            push(format!("missing column '{}'", field.name));
            continue;
        };

        let expected_type = field.field_type.information_schema_type();
        if column.data_type != expected_type {
            push(format!(
                "column '{}' type {} -> {}",
                field.name, column.data_type, expected_type
            ));
            continue;
        }

        match field.field_type {
            FieldType::Varchar(max) if column.character_maximum_length != Some(max as i32) => {
                push(format!(
                    "column '{}' max length {:?} -> {}",
                    field.name, column.character_maximum_length, max
                ));
            }
            FieldType::Decimal { digits, places }
                if column.numeric_precision != Some(digits as i32)
                    || column.numeric_scale != Some(places as i32) =>
            {
                push(format!(
                    "column '{}' precision ({:?},{:?}) -> ({},{})",
                    field.name, column.numeric_precision, column.numeric_scale, digits, places
                ));
            }
            _ => {}
        }

        if column.is_nullable {
            push(format!("column '{}' is nullable, expected NOT NULL", field.name));
        }

        let live_unique = live.unique_columns.contains(field.name);
        if field.unique && !live_unique {
            push(format!("column '{}' is missing its UNIQUE constraint", field.name));
        } else if !field.unique && live_unique {
            push(format!("column '{}' has an undeclared UNIQUE constraint", field.name));
        }
    }

    for column in &live.columns {
        if table.field(&column.name).is_none() {
            push(format!("undeclared column '{}'", column.name));
        }
    }

    mismatches
}
