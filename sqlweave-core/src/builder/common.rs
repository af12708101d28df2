//! Builder state shared by every statement kind

use indexmap::IndexMap;

use crate::{Error, IntoOperator, Operator, Result, Value};

/// Which statement a builder currently represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::Select => write!(f, "SELECT"),
            StatementKind::Insert => write!(f, "INSERT"),
            StatementKind::Update => write!(f, "UPDATE"),
            StatementKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// How a predicate is connected to the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereConnector {
    And,
    Or,
    /// No connector; only meaningful on the first predicate
    None,
}

impl WhereConnector {
    pub(crate) fn keyword(&self) -> Option<&'static str> {
        match self {
            WhereConnector::And => Some("AND"),
            WhereConnector::Or => Some("OR"),
            WhereConnector::None => None,
        }
    }
}

/// A WHERE condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub connector: WhereConnector,
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

/// Trait for conditions that can be used in WHERE clauses
pub trait IntoCondition {
    fn into_condition(self) -> (String, Operator, Value);
}

// Shorthand equality: and_where(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: Into<Value>,
{
    fn into_condition(self) -> (String, Operator, Value) {
        (self.0.to_string(), Operator::EQ, self.1.into())
    }
}

// Explicit operators: and_where(("age", op::GT, 18)) or and_where(("age", ">", 18))
impl<T, O> IntoCondition for (&str, O, T)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_condition(self) -> (String, Operator, Value) {
        (self.0.to_string(), self.1.into_operator(), self.2.into())
    }
}

/// Ordered WHERE predicates, keyed by their position in the call sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    predicates: IndexMap<usize, WhereCondition>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate; predicates are never updated in place
    pub fn push(&mut self, condition: WhereCondition) {
        let index = self.predicates.len();
        self.predicates.insert(index, condition);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WhereCondition> {
        self.predicates.values()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// A table reference written as `table` or `table:alias`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// Parse the `table:alias` surface syntax
    pub fn parse(input: &str) -> Self {
        match input.split_once(':') {
            Some((name, alias)) if !alias.trim().is_empty() => Self {
                name: name.trim().to_string(),
                alias: Some(alias.trim().to_string()),
            },
            Some((name, _)) => Self {
                name: name.trim().to_string(),
                alias: None,
            },
            None => Self {
                name: input.trim().to_string(),
                alias: None,
            },
        }
    }

    /// Parse a reference that must carry an alias (join targets)
    pub fn parse_aliased(input: &str) -> Result<Self> {
        let table = Self::parse(input);
        if table.alias.is_none() {
            return Err(Error::configuration(format!(
                "joined table '{}' must be written as 'table:alias'",
                input
            )));
        }
        Ok(table)
    }

    /// The name other clauses use to refer to this table
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// `name` or `name AS alias`
    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
        }
    }
}

/// ON criteria of one join: column -> column, rendered with `=` and `AND`
pub type JoinCriteria = IndexMap<String, String>;

/// Joins grouped by kind. Buckets iterate in the order their first join was
/// registered; tables iterate in registration order within a bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinSet {
    buckets: IndexMap<JoinType, IndexMap<TableRef, JoinCriteria>>,
}

impl JoinSet {
    pub fn add(&mut self, join_type: JoinType, table: TableRef, criteria: JoinCriteria) {
        self.buckets
            .entry(join_type)
            .or_default()
            .entry(table)
            .or_default()
            .extend(criteria);
    }

    pub fn iter(&self) -> impl Iterator<Item = (JoinType, &TableRef, &JoinCriteria)> {
        self.buckets.iter().flat_map(|(join_type, tables)| {
            tables
                .iter()
                .map(move |(table, criteria)| (*join_type, table, criteria))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|tables| tables.is_empty())
    }
}

/// Trait for types that can be converted to join ON criteria
pub trait IntoJoinCriteria {
    fn into_join_criteria(self) -> JoinCriteria;
}

impl IntoJoinCriteria for (&str, &str) {
    fn into_join_criteria(self) -> JoinCriteria {
        let mut criteria = JoinCriteria::new();
        criteria.insert(self.0.to_string(), self.1.to_string());
        criteria
    }
}

impl IntoJoinCriteria for Vec<(&str, &str)> {
    fn into_join_criteria(self) -> JoinCriteria {
        self.into_iter()
            .map(|(left, right)| (left.to_string(), right.to_string()))
            .collect()
    }
}

impl<const N: usize> IntoJoinCriteria for [(&str, &str); N] {
    fn into_join_criteria(self) -> JoinCriteria {
        self.into_iter()
            .map(|(left, right)| (left.to_string(), right.to_string()))
            .collect()
    }
}

impl IntoJoinCriteria for JoinCriteria {
    fn into_join_criteria(self) -> JoinCriteria {
        self
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// An ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: SortDirection,
}

/// Row cap or an `offset,count` pagination pair, sharing one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitClause {
    /// Plain row cap; `0` means unlimited
    Rows(u64),
    Page { offset: u64, count: u64 },
}

impl LimitClause {
    /// Derive the pair for a 1-based page number
    pub fn page(page_size: u64, page_number: u64) -> Self {
        LimitClause::Page {
            offset: page_size.saturating_mul(page_number.saturating_sub(1)),
            count: page_size,
        }
    }
}

/// Column payload: a select list, or ordered assignments for INSERT/UPDATE
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Columns(Vec<String>),
    Assignments(IndexMap<String, Value>),
}

/// Trait to convert various types into a select list
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.trim().to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self.trim().to_string()]
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

macro_rules! columns_tuple {
    ($($name:ident),+) => {
        impl IntoColumns for ($(columns_tuple!(@str $name),)+) {
            #[allow(non_snake_case)]
            fn into_columns(self) -> Vec<String> {
                let ($($name,)+) = self;
                vec![$($name.to_string()),+]
            }
        }
    };
    (@str $name:ident) => { &str };
}

columns_tuple!(A, B);
columns_tuple!(A, B, C);
columns_tuple!(A, B, C, D);
columns_tuple!(A, B, C, D, E);

/// The statement being built.
///
/// Switching to a different statement kind drops the column payload but keeps
/// joins, predicates, grouping, ordering and the limit.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub(crate) kind: Option<StatementKind>,
    pub(crate) table: Option<TableRef>,
    pub(crate) payload: Payload,
    pub(crate) joins: JoinSet,
    pub(crate) predicates: PredicateSet,
    pub(crate) group_by: Option<String>,
    pub(crate) order_by: Option<OrderByClause>,
    pub(crate) limit: Option<LimitClause>,
    pub(crate) ignore_duplicates: bool,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            kind: None,
            table: None,
            payload: Payload::Empty,
            joins: JoinSet::default(),
            predicates: PredicateSet::new(),
            group_by: None,
            order_by: None,
            limit: None,
            ignore_duplicates: false,
        }
    }
}

impl QuerySpec {
    pub fn kind(&self) -> Option<StatementKind> {
        self.kind
    }

    pub fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn joins(&self) -> &JoinSet {
        &self.joins
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    pub fn limit(&self) -> Option<LimitClause> {
        self.limit
    }

    /// Establish the statement kind, dropping the payload of a different kind
    pub(crate) fn establish(&mut self, kind: StatementKind, table: &str) {
        if self.kind.is_some_and(|current| current != kind) {
            self.payload = Payload::Empty;
        }
        self.kind = Some(kind);
        self.table = Some(TableRef::parse(table));
    }

    /// Add or overwrite one INSERT/UPDATE assignment, keeping its position
    pub(crate) fn assign(&mut self, column: &str, value: Value) {
        match &mut self.payload {
            Payload::Assignments(assignments) => {
                assignments.insert(column.to_string(), value);
            }
            _ => {
                let mut assignments = IndexMap::new();
                assignments.insert(column.to_string(), value);
                self.payload = Payload::Assignments(assignments);
            }
        }
    }

    /// Every table taking part in the statement, alias (or bare name) -> table,
    /// in registration order
    pub fn registered_tables(&self) -> IndexMap<String, String> {
        let mut tables = IndexMap::new();
        if let Some(table) = &self.table {
            tables.insert(table.reference().to_string(), table.name.clone());
        }
        for (_, table, _) in self.joins.iter() {
            tables.insert(table.reference().to_string(), table.name.clone());
        }
        tables
    }

    /// The table to render, or the configuration error for its absence
    pub(crate) fn require_table(&self) -> Result<&TableRef> {
        match &self.table {
            Some(table) if !table.name.is_empty() => Ok(table),
            _ => Err(Error::configuration("no table has been set for the query")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::op;

    #[test]
    fn test_condition_tuples() {
        assert_eq!(
            ("name", "John").into_condition(),
            ("name".to_string(), op::EQ, Value::from("John"))
        );
        assert_eq!(
            ("age", ">", 18).into_condition(),
            ("age".to_string(), op::GT, Value::I32(18))
        );
    }

    #[test]
    fn test_predicate_set_keeps_call_order() {
        let mut predicates = PredicateSet::new();
        for column in ["a", "b", "c"] {
            predicates.push(WhereCondition {
                connector: WhereConnector::And,
                column: column.to_string(),
                operator: Operator::EQ,
                value: Value::I32(1),
            });
        }
        let columns: Vec<&str> = predicates.iter().map(|p| p.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
        assert_eq!(predicates.len(), 3);
    }

    #[test]
    fn test_table_ref_parsing() {
        let plain = TableRef::parse("users");
        assert_eq!(plain.alias, None);
        assert_eq!(plain.to_sql(), "users");

        let aliased = TableRef::parse("orders:o");
        assert_eq!(aliased.name, "orders");
        assert_eq!(aliased.reference(), "o");
        assert_eq!(aliased.to_sql(), "orders AS o");

        assert!(TableRef::parse_aliased("customers").unwrap_err().is_configuration());
        assert!(TableRef::parse_aliased("customers:").is_err());
    }

    #[test]
    fn test_join_buckets_follow_first_registration() {
        let mut joins = JoinSet::default();
        joins.add(JoinType::Left, TableRef::parse("a:a1"), ("x.id", "a1.x_id").into_join_criteria());
        joins.add(JoinType::Inner, TableRef::parse("b:b1"), ("x.id", "b1.x_id").into_join_criteria());
        joins.add(JoinType::Left, TableRef::parse("c:c1"), ("x.id", "c1.x_id").into_join_criteria());

        let order: Vec<(JoinType, &str)> = joins
            .iter()
            .map(|(kind, table, _)| (kind, table.reference()))
            .collect();
        assert_eq!(
            order,
            vec![(JoinType::Left, "a1"), (JoinType::Left, "c1"), (JoinType::Inner, "b1")]
        );
    }

    #[test]
    fn test_pagination_pair() {
        assert_eq!(LimitClause::page(10, 3), LimitClause::Page { offset: 20, count: 10 });
        assert_eq!(LimitClause::page(10, 1), LimitClause::Page { offset: 0, count: 10 });
        assert_eq!(LimitClause::page(10, 0), LimitClause::Page { offset: 0, count: 10 });
    }

    #[test]
    fn test_kind_switch_drops_payload_only() {
        let mut spec = QuerySpec::default();
        spec.establish(StatementKind::Insert, "users");
        spec.assign("name", "a".into());
        spec.predicates.push(WhereCondition {
            connector: WhereConnector::None,
            column: "id".to_string(),
            operator: Operator::EQ,
            value: Value::I32(1),
        });

        spec.establish(StatementKind::Insert, "users");
        assert!(matches!(spec.payload(), Payload::Assignments(a) if a.len() == 1));

        spec.establish(StatementKind::Update, "users");
        assert_eq!(spec.payload(), &Payload::Empty);
        assert_eq!(spec.predicates().len(), 1);
    }

    #[test]
    fn test_assign_overwrites_in_place() {
        let mut spec = QuerySpec::default();
        spec.establish(StatementKind::Insert, "users");
        spec.assign("a", 1.into());
        spec.assign("b", 2.into());
        spec.assign("a", 3.into());
        match spec.payload() {
            Payload::Assignments(assignments) => {
                let pairs: Vec<(&str, &Value)> =
                    assignments.iter().map(|(k, v)| (k.as_str(), v)).collect();
                assert_eq!(pairs, vec![("a", &Value::I32(3)), ("b", &Value::I32(2))]);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_select_lists() {
        assert_eq!("*".into_columns(), vec!["*"]);
        assert_eq!("id, name".into_columns(), vec!["id, name"]);
        assert_eq!(("id", "name").into_columns(), vec!["id", "name"]);
        assert_eq!(vec!["id"].into_columns(), vec!["id"]);
        assert_eq!(("a", "b", "c", "d", "e").into_columns().len(), 5);
    }
}
