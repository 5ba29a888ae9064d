//! Record store
//!
//! Generic insert/read/save/delete over any [`Record`], with the SQL derived
//! from the table's declaration in the [`SchemaRegistry`]. Values are
//! validated against the declaration before a statement is sent.

mod labels;
mod users;

use crate::error::{Result, StoreError};
use crate::models::{Insertable, Record, Value};
use crate::schema::{SchemaRegistry, TableDef};
use deadpool_postgres::{Object, Pool};
use postgres_types::ToSql;
use tracing::{debug, info};

pub struct Store {
    pool: Pool,
    registry: SchemaRegistry,
    bcrypt_cost: u32,
}

impl Store {
    pub fn new(pool: Pool, registry: SchemaRegistry, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            registry,
            bcrypt_cost,
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    async fn client(&self) -> Result<Object> {
        Ok(self.pool.get().await?)
    }

    fn table<R: Record>(&self) -> Result<&TableDef> {
        self.registry
            .table(R::TABLE)
            .ok_or_else(|| StoreError::Internal(format!("Table {} is not declared", R::TABLE)))
    }

    /// Insert a row and return it with database-filled columns populated
    pub async fn insert<I: Insertable>(&self, new: &I) -> Result<I::Record> {
        let table = self.table::<I::Record>()?;
        let values = new.values();
        table.validate(&values)?;

        let (columns, params) = split(&values);
        let sql = table.insert_sql(&columns)?;

        let client = self.client().await?;
        let row = client
            .query_one(&sql, &params)
            .await
            .map_err(|e| StoreError::from_query(table.name, e))?;

        let record = I::Record::from_row(&row)?;
        debug!("Inserted {} id={}", table.name, record.id());
        Ok(record)
    }

    pub async fn find<R: Record>(&self, id: i32) -> Result<Option<R>> {
        let table = self.table::<R>()?;
        let sql = format!("{} WHERE \"id\" = $1", table.select_sql());

        let client = self.client().await?;
        let row = client
            .query_opt(&sql, &[&id])
            .await
            .map_err(|e| StoreError::from_query(table.name, e))?;

        row.as_ref().map(R::from_row).transpose()
    }

    pub async fn get<R: Record>(&self, id: i32) -> Result<R> {
        self.find(id).await?.ok_or_else(|| StoreError::NotFound {
            table: R::TABLE.to_string(),
            id,
        })
    }

    /// Every row, ordered by id
    pub async fn all<R: Record>(&self) -> Result<Vec<R>> {
        let table = self.table::<R>()?;
        let sql = format!("{} ORDER BY \"id\"", table.select_sql());
        self.query(table, &sql, &[]).await
    }

    /// Rows whose `column` equals `value`, ordered by id
    pub async fn filter<R, T>(&self, column: &str, value: &T) -> Result<Vec<R>>
    where
        R: Record,
        T: ToSql + Sync,
    {
        let table = self.table::<R>()?;
        let field = table.require_field(column)?;
        let sql = format!(
            "{} WHERE \"{}\" = $1 ORDER BY \"id\"",
            table.select_sql(),
            field.name
        );
        self.query(table, &sql, &[value]).await
    }

    pub async fn filter_by_username<R: Record>(&self, username: &str) -> Result<Vec<R>> {
        self.filter::<R, _>("username", &username).await
    }

    /// Write the record's columns back, refreshing it from the stored row.
    ///
    /// Auto-now timestamps are set to the current time; `id` and
    /// `created_at` are never written.
    pub async fn save<R: Record>(&self, record: &mut R) -> Result<()> {
        let table = self.table::<R>()?;
        let id = record.id();

        let refreshed = {
            let values = record.values();
            table.validate(&values)?;

            let (columns, mut params) = split(&values);
            params.push(&id);
            let sql = table.update_sql(&columns)?;

            let client = self.client().await?;
            let row = client
                .query_opt(&sql, &params)
                .await
                .map_err(|e| StoreError::from_query(table.name, e))?
                .ok_or_else(|| StoreError::NotFound {
                    table: table.name.to_string(),
                    id,
                })?;

            R::from_row(&row)?
        };

        *record = refreshed;
        debug!("Saved {} id={}", table.name, id);
        Ok(())
    }

    /// Returns whether a row was deleted
    pub async fn delete<R: Record>(&self, id: i32) -> Result<bool> {
        let table = self.table::<R>()?;
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", table.name);

        let client = self.client().await?;
        let deleted = client
            .execute(&sql, &[&id])
            .await
            .map_err(|e| StoreError::from_query(table.name, e))?;

        if deleted > 0 {
            info!("Deleted {} id={}", table.name, id);
        }
        Ok(deleted > 0)
    }

    pub async fn count<R: Record>(&self) -> Result<i64> {
        let table = self.table::<R>()?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name);

        let client = self.client().await?;
        let row = client
            .query_one(&sql, &[])
            .await
            .map_err(|e| StoreError::from_query(table.name, e))?;

        Ok(row.get(0))
    }

    async fn query<R: Record>(
        &self,
        table: &TableDef,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<R>> {
        let client = self.client().await?;
        let rows = client
            .query(sql, params)
            .await
            .map_err(|e| StoreError::from_query(table.name, e))?;

        rows.iter().map(R::from_row).collect()
    }
}

fn split<'a>(
    values: &'a [(&'static str, Value<'a>)],
) -> (Vec<&'static str>, Vec<&'a (dyn ToSql + Sync)>) {
    values.iter().map(|(column, value)| (*column, value.as_sql())).unzip()
}
