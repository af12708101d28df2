//! sqlweave core - fluent SQL construction and row materialization
//!
//! This crate holds the query builder, its renderer, the textual table
//! resolver and the materializer that turns fetched rows into records or
//! typed models. Execution goes through the [`Executor`] trait.

pub mod builder;
pub mod error;
pub mod executor;
pub mod materialize;
pub mod operator;
pub mod params;
pub mod resolver;
pub mod value;

// Re-export main types
pub use builder::{
    BoundQuery, IntoColumns, IntoCondition, IntoJoinCriteria, JoinType, LimitClause, QueryBuilder,
    QuerySpec, SortDirection, StatementKind, TableRef, WhereCondition, WhereConnector,
};
pub use error::{Error, Result};
pub use executor::{Database, Executor, SqlxExecutor, WriteOutcome};
pub use materialize::{
    descriptor_of, materialize_rows, project_records, project_to_model, ColumnMeta,
    FieldDescriptor, FieldType, Model, ModelDescriptor, RawRow, Record,
};
pub use operator::{op, IntoOperator, Operator};
pub use params::{substitute, Params};
pub use resolver::{resolve_aliases, AliasMap};
pub use value::Value;

/// Start an empty query
pub fn new_query() -> QueryBuilder {
    QueryBuilder::new()
}
