//! Statement execution and the stateful database session

use std::future::Future;

use futures::TryStreamExt;
use sqlx::any::{AnyArguments, AnyPoolOptions, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Column, Row};

use crate::materialize::{materialize_rows, project_to_model, ColumnMeta, Model, RawRow, Record};
use crate::params::{substitute, Params};
use crate::resolver::resolve_aliases;
use crate::{Error, QueryBuilder, Result, Value};

/// Result of a write statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_affected: u64,
    /// Identifier generated by an INSERT, when the backend reports one
    pub last_insert_id: Option<i64>,
}

/// Trait for anything that can run SQL against a database
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE)
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<WriteOutcome>> + Send;

    /// Execute a statement and collect every row with its column metadata
    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<RawRow>>> + Send;
}

/// [`Executor`] over a sqlx `AnyPool`
///
/// The Any driver does not report which table a column came from, so every
/// [`ColumnMeta::table`] it produces is `None`.
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
    pool: AnyPool,
}

impl SqlxExecutor {
    /// Connect to `url` with at most `max_connections` pooled connections
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Create from an existing AnyPool
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

fn failed(err: sqlx::Error, sql: &str) -> Error {
    tracing::warn!(target: "sqlweave::exec", error = %err, sql, "statement failed");
    Error::execution(err.to_string(), sql)
}

impl Executor for SqlxExecutor {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<WriteOutcome> {
        tracing::debug!(target: "sqlweave::exec", sql, params = params.len(), "executing statement");

        let result = bind_values(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(|err| failed(err, sql))?;

        Ok(WriteOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<RawRow>> {
        tracing::debug!(target: "sqlweave::exec", sql, params = params.len(), "fetching rows");

        let mut stream = bind_values(sqlx::query(sql), params).fetch(&self.pool);
        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await.map_err(|err| failed(err, sql))? {
            rows.push(decode_row(&row)?);
        }
        Ok(rows)
    }
}

/// Bind sqlweave Values to a sqlx Any query
fn bind_values<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[Value],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(*b),
            Value::I32(i) => query.bind(*i),
            Value::I64(i) => query.bind(*i),
            Value::F32(f) => query.bind(*f),
            Value::F64(f) => query.bind(*f),
            Value::String(s) | Value::Expr(s) => query.bind(s.clone()),
            Value::Bytes(b) => query.bind(b.clone()),
            // Any has no JSON or datetime kinds; both travel as text
            Value::Json(_) | Value::DateTime(_) => query.bind(param.as_text()),
        };
    }
    query
}

/// Decode one cell, trying the kinds the Any driver can produce
fn decode_cell(row: &AnyRow, index: usize) -> Option<Value> {
    fn get<T>(row: &AnyRow, index: usize) -> Option<Option<T>>
    where
        T: for<'r> sqlx::Decode<'r, Any> + sqlx::Type<Any>,
    {
        row.try_get::<Option<T>, _>(index).ok()
    }

    if let Some(v) = get::<i64>(row, index) {
        return Some(v.map(Value::I64).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<i32>(row, index) {
        return Some(v.map(Value::I32).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<i16>(row, index) {
        return Some(v.map(|i| Value::I32(i as i32)).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<f64>(row, index) {
        return Some(v.map(Value::F64).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<f32>(row, index) {
        return Some(v.map(Value::F32).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<bool>(row, index) {
        return Some(v.map(Value::Bool).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<String>(row, index) {
        return Some(v.map(Value::String).unwrap_or(Value::Null));
    }
    if let Some(v) = get::<Vec<u8>>(row, index) {
        return Some(v.map(Value::Bytes).unwrap_or(Value::Null));
    }
    None
}

fn decode_row(row: &AnyRow) -> Result<RawRow> {
    row.columns()
        .iter()
        .map(|column| {
            let value = decode_cell(row, column.ordinal()).ok_or_else(|| {
                Error::materialization(column.name(), "unsupported column type")
            })?;
            Ok((value, ColumnMeta::new(column.name(), None)))
        })
        .collect()
}

/// A session over an [`Executor`]
///
/// Every retrieval replaces the row count and first-row snapshot, so the
/// single-value accessors always describe the latest result set.
#[derive(Debug)]
pub struct Database<E> {
    executor: E,
    row_count: usize,
    first_row: Option<Record>,
}

impl<E: Executor> Database<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            row_count: 0,
            first_row: None,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run a builder-produced write with bound parameters
    pub async fn execute(&self, query: &QueryBuilder) -> Result<WriteOutcome> {
        let bound = query.render_bound()?;
        self.executor.execute(&bound.sql, &bound.params).await
    }

    /// Run a hand-written write statement
    pub async fn execute_sql(&self, sql: &str) -> Result<WriteOutcome> {
        self.executor.execute(sql, &[]).await
    }

    /// Fetch the rows of a builder-produced SELECT
    pub async fn fetch(&mut self, query: &QueryBuilder) -> Result<Vec<Record>> {
        let bound = query.render_bound()?;
        self.retrieve(&bound.sql, &bound.params).await
    }

    /// Fetch the rows of a hand-written SELECT
    pub async fn fetch_sql(&mut self, sql: &str) -> Result<Vec<Record>> {
        self.retrieve(sql, &[]).await
    }

    /// Fetch a `?name` template after textual substitution
    pub async fn fetch_with_params(
        &mut self,
        template: &str,
        params: &Params,
    ) -> Result<Vec<Record>> {
        let sql = substitute(template, params)?;
        self.retrieve(&sql, &[]).await
    }

    /// Fetch a builder-produced SELECT as typed models
    pub async fn fetch_models<M: Model>(&mut self, query: &QueryBuilder) -> Result<Vec<M>> {
        let bound = query.render_bound()?;
        let records = self.retrieve(&bound.sql, &bound.params).await?;
        project_to_model(&records, &resolve_aliases(&bound.sql))
    }

    /// Fetch a hand-written SELECT as typed models
    pub async fn fetch_models_sql<M: Model>(&mut self, sql: &str) -> Result<Vec<M>> {
        let records = self.retrieve(sql, &[]).await?;
        project_to_model(&records, &resolve_aliases(sql))
    }

    /// Column names of `table`, read with `DESCRIBE`
    pub async fn fieldset(&mut self, table: &str) -> Result<Vec<String>> {
        let records = self.retrieve(&format!("DESCRIBE {}", table), &[]).await?;
        Ok(records
            .iter()
            .filter_map(|record| record.get("Field").or_else(|| record.values().next()))
            .map(Value::as_text)
            .collect())
    }

    /// Rows returned by the latest retrieval
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// First row of the latest retrieval
    pub fn first_row(&self) -> Option<&Record> {
        self.first_row.as_ref()
    }

    /// One column of the first row of the latest retrieval
    pub fn first_value(&self, column: &str) -> Option<&Value> {
        self.first_row.as_ref().and_then(|row| row.get(column))
    }

    async fn retrieve(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        self.row_count = 0;
        self.first_row = None;

        let rows = self.executor.fetch_all(sql, params).await?;
        let records = materialize_rows(rows, &resolve_aliases(sql))?;

        self.row_count = records.len();
        self.first_row = records.first().cloned();
        Ok(records)
    }
}
