//! UPDATE rendering

use super::common::{Payload, QuerySpec};
use super::render::SqlWriter;
use crate::{Error, Result};

/// Renders `UPDATE <table> SET ...` followed by whatever WHERE clause was
/// registered. An identifying predicate is the caller's responsibility.
pub(super) fn render(spec: &QuerySpec, writer: &mut SqlWriter) -> Result<String> {
    let table = spec.require_table()?;

    let assignments = match &spec.payload {
        Payload::Assignments(assignments) if !assignments.is_empty() => assignments,
        _ => return Err(Error::configuration("UPDATE requires at least one SET column")),
    };

    let mut sql = String::new();

    // UPDATE clause
    sql.push_str("UPDATE ");
    sql.push_str(&table.to_sql());

    // SET clause
    sql.push_str(" SET ");
    let set_parts: Vec<String> = assignments
        .iter()
        .map(|(column, value)| format!("{} = {}", column, writer.value(value)))
        .collect();
    sql.push_str(&set_parts.join(", "));

    // WHERE clause
    let where_clause = writer.where_clause(spec);
    if !where_clause.is_empty() {
        sql.push(' ');
        sql.push_str(&where_clause);
    }

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use crate::builder::common::WhereConnector;
    use crate::operator::op;
    use crate::{QueryBuilder, Value};

    #[test]
    fn test_update_builder() {
        let sql = QueryBuilder::new()
            .update("users", "name", "Jane")
            .update("users", "age", 25)
            .where_(WhereConnector::None, "id", op::EQ, 1)
            .render()
            .unwrap();
        assert_eq!(sql, "UPDATE users SET name = 'Jane', age = 25 WHERE id = '1'");
    }

    #[test]
    fn test_update_without_where_is_rendered() {
        let sql = QueryBuilder::new()
            .update("users", "active", false)
            .render()
            .unwrap();
        assert_eq!(sql, "UPDATE users SET active = 0");
    }

    #[test]
    fn test_kind_round_trip_drops_earlier_assignments() {
        let query = QueryBuilder::new()
            .update("users", "email", "x@y.z")
            .delete("users")
            .where_(WhereConnector::None, "id", op::EQ, 1)
            .update("users", "name", "y");
        // the DELETE in between dropped the email assignment, not the predicate
        assert_eq!(
            query.render().unwrap(),
            "UPDATE users SET name = 'y' WHERE id = '1'"
        );
    }

    #[test]
    fn test_insert_then_update_reuses_predicates() {
        let query = QueryBuilder::new()
            .where_(WhereConnector::None, "email", op::EQ, "a@b.c")
            .insert("users", "email", "a@b.c")
            .insert("users", "visits", 1);
        assert_eq!(
            query.render().unwrap(),
            "INSERT INTO users (email, visits) VALUES ('a@b.c', 1)"
        );

        let query = query.update("users", "visits", Value::expr("visits + 1"));
        assert_eq!(
            query.render().unwrap(),
            "UPDATE users SET visits = visits + 1 WHERE email = 'a@b.c'"
        );
    }

    #[test]
    fn test_update_with_alias_and_bound() {
        let bound = QueryBuilder::new()
            .update("users:u", "u.name", "Kim")
            .where_(WhereConnector::None, "u.id", op::EQ, 9)
            .render_bound()
            .unwrap();
        assert_eq!(bound.sql, "UPDATE users AS u SET u.name = ? WHERE u.id = ?");
        assert_eq!(bound.params, vec![Value::from("Kim"), Value::I32(9)]);
    }
}
