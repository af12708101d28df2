//! DELETE rendering

use super::common::QuerySpec;
use super::render::SqlWriter;
use crate::{Error, Result};

pub(super) fn render(spec: &QuerySpec, writer: &mut SqlWriter) -> Result<String> {
    let table = spec.require_table()?;

    if spec.predicates.is_empty() {
        return Err(Error::configuration(format!(
            "DELETE FROM {} requires a WHERE condition for safety",
            table.name
        )));
    }

    let mut sql = String::new();

    // DELETE FROM clause
    sql.push_str("DELETE FROM ");
    sql.push_str(&table.to_sql());

    // WHERE clause
    sql.push(' ');
    sql.push_str(&writer.where_clause(spec));

    Ok(sql)
}
