//! SELECT rendering

use super::common::{LimitClause, Payload, QuerySpec};
use super::render::SqlWriter;
use crate::Result;

/// The select list. A lone `*` over joined tables expands to one
/// `alias.*` per registered table so unqualified columns cannot collide.
fn select_list(spec: &QuerySpec) -> String {
    let columns = match &spec.payload {
        Payload::Columns(columns) if !columns.is_empty() => columns.clone(),
        _ => vec!["*".to_string()],
    };

    if columns.len() == 1 && columns[0] == "*" && !spec.joins.is_empty() {
        return spec
            .registered_tables()
            .keys()
            .map(|alias| format!("{}.*", alias))
            .collect::<Vec<_>>()
            .join(", ");
    }

    columns.join(", ")
}

pub(super) fn render(spec: &QuerySpec, writer: &mut SqlWriter) -> Result<String> {
    let table = spec.require_table()?;

    let mut sql = String::new();

    // SELECT ... FROM clause
    sql.push_str("SELECT ");
    sql.push_str(&select_list(spec));
    sql.push_str(" FROM ");
    sql.push_str(&table.to_sql());

    // JOIN clauses
    for (join_type, joined, criteria) in spec.joins.iter() {
        sql.push(' ');
        sql.push_str(&join_type.to_string());
        sql.push_str(" JOIN ");
        sql.push_str(&joined.to_sql());

        if !criteria.is_empty() {
            sql.push_str(" ON ");
            let conditions: Vec<String> = criteria
                .iter()
                .map(|(left, right)| format!("{} = {}", left, right))
                .collect();
            sql.push_str(&conditions.join(" AND "));
        }
    }

    // WHERE clause
    let where_clause = writer.where_clause(spec);
    if !where_clause.is_empty() {
        sql.push(' ');
        sql.push_str(&where_clause);
    }

    // GROUP BY clause
    if let Some(group_by) = &spec.group_by {
        sql.push_str(" GROUP BY ");
        sql.push_str(group_by);
    }

    // ORDER BY clause
    if let Some(order_by) = &spec.order_by {
        sql.push_str(&format!(" ORDER BY {} {}", order_by.column, order_by.direction));
    }

    // LIMIT clause
    match spec.limit {
        Some(LimitClause::Rows(0)) | None => {}
        Some(LimitClause::Rows(count)) => sql.push_str(&format!(" LIMIT {}", count)),
        Some(LimitClause::Page { offset, count }) => {
            sql.push_str(&format!(" LIMIT {}, {}", offset, count))
        }
    }

    Ok(sql)
}
