//! Serialization of a [`QuerySpec`] into SQL text

use super::common::{QuerySpec, StatementKind, WhereCondition};
use super::{delete, insert, select, update};
use crate::value::escape_slashes;
use crate::{Error, Result, Value};

/// SQL text with `?` placeholders and the values bound to them, in order
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderMode {
    /// Values are written into the text as escaped literals
    Literal,
    /// Values become `?` placeholders collected as parameters
    Bound,
}

/// Accumulates parameters while a statement is written
#[derive(Debug)]
pub(crate) struct SqlWriter {
    mode: RenderMode,
    params: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            params: Vec::new(),
        }
    }

    /// A payload value for INSERT/UPDATE
    pub(crate) fn value(&mut self, value: &Value) -> String {
        match (self.mode, value) {
            (_, Value::Expr(expr)) => expr.clone(),
            (RenderMode::Literal, value) => value.to_sql_literal(),
            (RenderMode::Bound, value) => {
                self.params.push(value.clone());
                "?".to_string()
            }
        }
    }

    /// `<op> '<value>'`, with LIKE operands wrapped in `%...%`.
    ///
    /// Operands are always quoted, numeric or not.
    fn operand(&mut self, condition: &WhereCondition) -> String {
        if let Value::Expr(expr) = &condition.value {
            return format!("{} {}", condition.operator, expr);
        }
        let text = if condition.operator.is_like() {
            format!("%{}%", condition.value.as_text())
        } else {
            condition.value.as_text()
        };
        match self.mode {
            RenderMode::Literal => format!("{} '{}'", condition.operator, escape_slashes(&text)),
            RenderMode::Bound => {
                if condition.operator.is_like() {
                    self.params.push(Value::String(text));
                } else {
                    self.params.push(condition.value.clone());
                }
                format!("{} ?", condition.operator)
            }
        }
    }

    /// `WHERE a = '1' AND b = '2'`, or an empty string without predicates
    pub(crate) fn where_clause(&mut self, spec: &QuerySpec) -> String {
        let mut sql = String::new();
        for (i, condition) in spec.predicates.iter().enumerate() {
            if i == 0 {
                sql.push_str("WHERE ");
            } else {
                // a stored None after the first predicate falls back to AND
                let keyword = condition.connector.keyword().unwrap_or("AND");
                sql.push(' ');
                sql.push_str(keyword);
                sql.push(' ');
            }
            sql.push_str(&condition.column);
            sql.push(' ');
            let operand = self.operand(condition);
            sql.push_str(&operand);
        }
        sql
    }

    pub(crate) fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// Render the statement a [`QuerySpec`] describes.
///
/// Configuration problems are reported before any text is produced.
pub(crate) fn render_spec(spec: &QuerySpec, mode: RenderMode) -> Result<BoundQuery> {
    let kind = spec
        .kind
        .ok_or_else(|| Error::render("no statement kind has been established"))?;

    let mut writer = SqlWriter::new(mode);
    let sql = match kind {
        StatementKind::Select => select::render(spec, &mut writer)?,
        StatementKind::Insert => insert::render(spec, &mut writer)?,
        StatementKind::Update => update::render(spec, &mut writer)?,
        StatementKind::Delete => delete::render(spec, &mut writer)?,
    };
    let params = writer.into_params();

    tracing::debug!(
        target: "sqlweave::render",
        kind = %kind,
        bound = mode == RenderMode::Bound,
        params = params.len(),
        sql = %sql,
        "rendered statement"
    );

    Ok(BoundQuery { sql, params })
}
