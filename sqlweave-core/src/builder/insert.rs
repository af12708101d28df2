//! INSERT rendering

use super::common::{Payload, QuerySpec};
use super::render::SqlWriter;
use crate::{Error, Result};

pub(super) fn render(spec: &QuerySpec, writer: &mut SqlWriter) -> Result<String> {
    let table = spec.require_table()?;

    let assignments = match &spec.payload {
        Payload::Assignments(assignments) if !assignments.is_empty() => assignments,
        _ => return Err(Error::configuration("INSERT requires at least one column value")),
    };

    let mut sql = String::new();

    // INSERT INTO clause
    sql.push_str("INSERT ");
    if spec.ignore_duplicates {
        sql.push_str("IGNORE ");
    }
    sql.push_str("INTO ");
    sql.push_str(&table.name);

    // Columns
    let columns: Vec<&str> = assignments.keys().map(|column| column.as_str()).collect();
    sql.push_str(" (");
    sql.push_str(&columns.join(", "));
    sql.push(')');

    // VALUES clause
    let values: Vec<String> = assignments.values().map(|value| writer.value(value)).collect();
    sql.push_str(" VALUES (");
    sql.push_str(&values.join(", "));
    sql.push(')');

    Ok(sql)
}
