//! Fluent query builder
//!
//! A [`QueryBuilder`] owns one [`QuerySpec`] describing the statement in
//! progress. Each call mutates it; [`QueryBuilder::render`] serializes it.
//!
//! ```
//! use sqlweave_core::{op, QueryBuilder, WhereConnector};
//!
//! let sql = QueryBuilder::new()
//!     .select("orders:o", "*")
//!     .join("customers:c", ("o.customer_id", "c.id"))?
//!     .where_(WhereConnector::None, "c.country", op::EQ, "IT")
//!     .pagination(10, 3)
//!     .render()?;
//!
//! assert_eq!(
//!     sql,
//!     "SELECT o.*, c.* FROM orders AS o INNER JOIN customers AS c \
//!      ON o.customer_id = c.id WHERE c.country = 'IT' LIMIT 20, 10"
//! );
//! # Ok::<(), sqlweave_core::Error>(())
//! ```

pub mod common;
mod delete;
mod insert;
pub mod render;
mod select;
mod update;

use indexmap::IndexMap;

pub use common::{
    IntoColumns, IntoCondition, IntoJoinCriteria, JoinCriteria, JoinType, LimitClause,
    OrderByClause, Payload, PredicateSet, QuerySpec, SortDirection, StatementKind, TableRef,
    WhereCondition, WhereConnector,
};
pub use render::BoundQuery;

use crate::{IntoOperator, Result, Value};
use render::{render_spec, RenderMode};

/// The public fluent API over a single [`QuerySpec`]
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    spec: QuerySpec,
}

impl QueryBuilder {
    /// Start an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything accumulated so far
    pub fn reset(&mut self) {
        self.spec = QuerySpec::default();
    }

    /// SELECT `columns` from `table` (`table` or `table:alias`)
    pub fn select<C>(mut self, table: &str, columns: C) -> Self
    where
        C: IntoColumns,
    {
        self.spec.establish(StatementKind::Select, table);
        self.spec.payload = Payload::Columns(columns.into_columns());
        self
    }

    /// INSERT one column value; repeated calls add columns in call order
    pub fn insert<V>(mut self, table: &str, column: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.spec.establish(StatementKind::Insert, table);
        self.spec.assign(column, value.into());
        self
    }

    /// UPDATE one column; repeated calls add SET entries in call order
    pub fn update<V>(mut self, table: &str, column: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.spec.establish(StatementKind::Update, table);
        self.spec.assign(column, value.into());
        self
    }

    /// DELETE from `table`; rendering requires at least one predicate
    pub fn delete(mut self, table: &str) -> Self {
        self.spec.establish(StatementKind::Delete, table);
        self
    }

    /// Add an INNER JOIN. The table must be written as `table:alias`.
    pub fn join<J>(self, table: &str, on: J) -> Result<Self>
    where
        J: IntoJoinCriteria,
    {
        self.add_join(JoinType::Inner, table, on)
    }

    /// Add a LEFT JOIN. The table must be written as `table:alias`.
    pub fn left_join<J>(self, table: &str, on: J) -> Result<Self>
    where
        J: IntoJoinCriteria,
    {
        self.add_join(JoinType::Left, table, on)
    }

    fn add_join<J>(mut self, join_type: JoinType, table: &str, on: J) -> Result<Self>
    where
        J: IntoJoinCriteria,
    {
        let table = TableRef::parse_aliased(table)?;
        self.spec.joins.add(join_type, table, on.into_join_criteria());
        Ok(self)
    }

    /// Append a predicate. The connector of the first predicate is ignored.
    pub fn where_<O, V>(
        mut self,
        connector: WhereConnector,
        column: &str,
        operator: O,
        value: V,
    ) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.spec.predicates.push(WhereCondition {
            connector,
            column: column.to_string(),
            operator: operator.into_operator(),
            value: value.into(),
        });
        self
    }

    /// Append an AND predicate: `and_where(("age", op::GT, 18))`
    pub fn and_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        let (column, operator, value) = condition.into_condition();
        self.where_(WhereConnector::And, &column, operator, value)
    }

    /// Append an OR predicate: `or_where(("status", "admin"))`
    pub fn or_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        let (column, operator, value) = condition.into_condition();
        self.where_(WhereConnector::Or, &column, operator, value)
    }

    /// Set the GROUP BY expression
    pub fn group_by(mut self, expression: &str) -> Self {
        self.spec.group_by = Some(expression.to_string());
        self
    }

    /// Set the ORDER BY column, replacing any earlier one
    pub fn order(mut self, column: &str, direction: SortDirection) -> Self {
        self.spec.order_by = Some(OrderByClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Cap the number of rows; `0` means unlimited. Replaces any pagination.
    pub fn limit(mut self, count: u64) -> Self {
        self.spec.limit = Some(LimitClause::Rows(count));
        self
    }

    /// Limit to page `page_number` (1-based) of `page_size` rows. Replaces
    /// any earlier limit.
    pub fn pagination(mut self, page_size: u64, page_number: u64) -> Self {
        self.spec.limit = Some(LimitClause::page(page_size, page_number));
        self
    }

    /// Emit `INSERT IGNORE` instead of `INSERT`
    pub fn ignore_duplicates(mut self, ignore: bool) -> Self {
        self.spec.ignore_duplicates = ignore;
        self
    }

    /// Render the statement with values written in as literals
    pub fn render(&self) -> Result<String> {
        render_spec(&self.spec, RenderMode::Literal).map(|bound| bound.sql)
    }

    /// Render the statement with `?` placeholders and ordered parameters
    pub fn render_bound(&self) -> Result<BoundQuery> {
        render_spec(&self.spec, RenderMode::Bound)
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Tables registered through select and join calls, alias -> table
    pub fn registered_tables(&self) -> IndexMap<String, String> {
        self.spec.registered_tables()
    }
}
