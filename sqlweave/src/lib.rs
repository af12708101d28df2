//! sqlweave - a fluent SQL builder with alias-aware row materialization
//!
//! Build a statement, render it, run it and read the rows back as records
//! keyed `alias.column` or as typed models.
//!
//! ```
//! use sqlweave::{new_query, op, SortDirection, WhereConnector};
//!
//! let sql = new_query()
//!     .select("users", ("id", "name"))
//!     .where_(WhereConnector::None, "age", op::GT, 18)
//!     .or_where(("role", "admin"))
//!     .order("name", SortDirection::Asc)
//!     .limit(10)
//!     .render()?;
//!
//! assert_eq!(
//!     sql,
//!     "SELECT id, name FROM users WHERE age > '18' OR role = 'admin' ORDER BY name ASC LIMIT 10"
//! );
//! # Ok::<(), sqlweave::Error>(())
//! ```

pub mod config;

pub use config::{Backend, DatabaseConfig};
pub use sqlweave_core::*;

/// Open a pooled session for `config`
///
/// The driver for the configured backend must be enabled through the
/// `mysql` or `sqlite` feature.
pub async fn connect(config: &DatabaseConfig) -> Result<Database<SqlxExecutor>> {
    let url = config.connection_url()?;
    tracing::info!(
        target: "sqlweave::exec",
        backend = %config.backend,
        max_connections = config.max_connections,
        "connecting"
    );
    let executor = SqlxExecutor::connect(&url, config.max_connections).await?;
    Ok(Database::new(executor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_query_round_trip() {
        let query = new_query()
            .select("orders:o", "*")
            .join("customers:c", ("o.customer_id", "c.id"))
            .unwrap();
        let aliases = resolve_aliases(&query.render().unwrap());
        assert_eq!(aliases, query.registered_tables());
    }

    #[tokio::test]
    async fn test_connect_rejects_incomplete_config() {
        let err = connect(&DatabaseConfig::default()).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
