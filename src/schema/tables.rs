//! Table deployer
//!
//! Creates the registry's tables in a database, the way an ORM generates its
//! schema on start-up. Deployment is idempotent:
//!
//! 1. Ensure the `_gridlab_store_tables` tracking table exists
//! 2. Render each table's DDL and checksum it
//! 3. Skip tables that already exist (adopting untracked ones)
//! 4. Create the rest in declaration order and record their checksum
//!
//! Changing an existing table is a migration and is not done here.

use crate::error::{Result, StoreError};
use crate::schema::definition::TableDef;
use crate::schema::registry::SchemaRegistry;
use deadpool_postgres::Pool;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const TRACKING_TABLE: &str = "_gridlab_store_tables";

/// Result of table deployment
#[derive(Debug, Clone, Default)]
pub struct TableDeployResult {
    pub tables_created: usize,
    pub tables_skipped: usize,
    pub creation_order: Vec<String>,
    /// Tables whose live definition differs from the declared one
    pub drifted: Vec<String>,
}

pub struct TableDeployer;

impl TableDeployer {
    pub fn new() -> Self {
        Self
    }

    /// Ensure the tracking table exists
    pub async fn ensure_tracking_table(&self, pool: &Pool) -> Result<()> {
        let client = pool.get().await?;

        client
            .batch_execute(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    id SERIAL PRIMARY KEY,
                    table_name TEXT NOT NULL UNIQUE,
                    checksum TEXT NOT NULL,
                    deployed_at TIMESTAMPTZ DEFAULT NOW()
                )
                "#,
                TRACKING_TABLE
            ))
            .await
            .map_err(|e| StoreError::SchemaDeployFailed {
                table: TRACKING_TABLE.to_string(),
                cause: e.to_string(),
            })?;

        Ok(())
    }

    /// Check if a table already exists in the database
    async fn table_exists(&self, client: &deadpool_postgres::Object, table_name: &str) -> Result<bool> {
        let row = client
            .query_opt(
                r#"
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema()
                AND table_name = $1
                "#,
                &[&table_name],
            )
            .await
            .map_err(|e| StoreError::from_query(table_name, e))?;

        Ok(row.is_some())
    }

    /// Get deployed tables from tracking table
    async fn get_deployed_tables(
        &self,
        client: &deadpool_postgres::Object,
    ) -> Result<HashMap<String, String>> {
        let rows = client
            .query(
                &format!("SELECT table_name, checksum FROM {}", TRACKING_TABLE),
                &[],
            )
            .await
            .map_err(|e| StoreError::from_query(TRACKING_TABLE, e))?;

        let mut tables = HashMap::new();
        for row in rows {
            let name: String = row.get(0);
            let checksum: String = row.get(1);
            tables.insert(name, checksum);
        }

        Ok(tables)
    }

    /// Update tracking table after creating or adopting a table
    async fn update_tracking(
        &self,
        client: &deadpool_postgres::Object,
        table: &TableDef,
        checksum: &str,
    ) -> Result<()> {
        client
            .execute(
                &format!(
                    r#"
                    INSERT INTO {} (table_name, checksum, deployed_at)
                    VALUES ($1, $2, NOW())
                    ON CONFLICT (table_name) DO UPDATE SET
                        checksum = EXCLUDED.checksum,
                        deployed_at = NOW()
                    "#,
                    TRACKING_TABLE
                ),
                &[&table.name, &checksum],
            )
            .await
            .map_err(|e| StoreError::from_query(TRACKING_TABLE, e))?;

        Ok(())
    }

    /// Deploy every table in the registry
    pub async fn deploy(&self, pool: &Pool, registry: &SchemaRegistry) -> Result<TableDeployResult> {
        self.ensure_tracking_table(pool).await?;

        let client = pool.get().await?;
        let deployed = self.get_deployed_tables(&client).await?;

        let mut result = TableDeployResult::default();

        for table in registry.tables() {
            let sql = table.create_sql();
            let checksum = compute_checksum(&sql);

            if self.table_exists(&client, table.name).await? {
                match deployed.get(table.name) {
                    Some(existing) if existing == &checksum => {
                        debug!("Table {} unchanged (checksum match), skipping", table.name);
                    }
                    Some(_) => {
                        warn!(
                            "Table {} already exists with a different definition, it is left unchanged",
                            table.name
                        );
                        self.update_tracking(&client, table, &checksum).await?;
                        result.drifted.push(table.name.to_string());
                    }
                    None => {
                        debug!("Table {} already exists in database, adding to tracking", table.name);
                        self.update_tracking(&client, table, &checksum).await?;
                    }
                }
                result.tables_skipped += 1;
                continue;
            }

            debug!("Creating table {}", table.name);

            client
                .batch_execute(&sql)
                .await
                .map_err(|e| StoreError::SchemaDeployFailed {
                    table: table.name.to_string(),
                    cause: e.to_string(),
                })?;

            info!("Created table {}", table.name);
            self.update_tracking(&client, table, &checksum).await?;
            result.tables_created += 1;
            result.creation_order.push(table.name.to_string());
        }

        info!(
            "Table deployment complete: {} created, {} skipped",
            result.tables_created, result.tables_skipped
        );

        Ok(result)
    }

    /// List application tables in the current schema
    pub async fn list_tables(&self, pool: &Pool) -> Result<Vec<String>> {
        let client = pool.get().await?;

        let rows = client
            .query(
                r#"
                SELECT table_name::TEXT
                FROM information_schema.tables
                WHERE table_schema = current_schema()
                AND table_type = 'BASE TABLE'
                AND table_name NOT LIKE '\_gridlab\_store\_%'
                ORDER BY table_name
                "#,
                &[],
            )
            .await
            .map_err(|e| StoreError::from_query("information_schema.tables", e))?;

        Ok(rows.iter().map(|r| r.get(0)).collect())
    }
}

impl Default for TableDeployer {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of the DDL with comments stripped, whitespace collapsed and case folded
pub fn compute_checksum(content: &str) -> String {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    let [single_line, multi_line, whitespace] = PATTERNS.get_or_init(|| {
        [
            Regex::new(r"--[^\n]*").expect("valid regex"),
            Regex::new(r"/\*[\s\S]*?\*/").expect("valid regex"),
            Regex::new(r"\s+").expect("valid regex"),
        ]
    });

    let content = single_line.replace_all(content, "");
    let content = multi_line.replace_all(&content, "");
    let normalized = whitespace.replace_all(&content, " ").trim().to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::SchemaOptions;

    #[test]
    fn test_checksum_normalization() {
        let sql1 = "CREATE TABLE users (id INT);";
        let sql2 = "CREATE   TABLE   users   (id   INT);";
        let sql3 = "create table users (id int);";
        let sql4 = "-- users\nCREATE TABLE users /* pk */ (id INT);";

        assert_eq!(compute_checksum(sql1), compute_checksum(sql2));
        assert_eq!(compute_checksum(sql1), compute_checksum(sql3));
        assert_eq!(compute_checksum(sql1), compute_checksum(sql4));
        assert_ne!(compute_checksum(sql1), compute_checksum("CREATE TABLE users (id BIGINT);"));
    }

    #[test]
    fn test_checksum_tracks_username_uniqueness() {
        let strict = SchemaRegistry::new(SchemaOptions {
            unique_username_per_table: true,
        });
        let relaxed = SchemaRegistry::new(SchemaOptions {
            unique_username_per_table: false,
        });

        let users = |r: &SchemaRegistry| compute_checksum(&r.table("users").unwrap().create_sql());
        let labels = |r: &SchemaRegistry| compute_checksum(&r.table("labels").unwrap().create_sql());

        assert_eq!(users(&strict), users(&relaxed));
        assert_ne!(labels(&strict), labels(&relaxed));
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let checksum = compute_checksum("CREATE TABLE labels (id SERIAL);");
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
