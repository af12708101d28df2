//! Conversion of driver rows into records and typed models
//!
//! Rows arrive as positional `(value, column metadata)` pairs. When a
//! statement reads from several tables, columns are keyed as `alias.column`
//! so identically named columns of joined tables do not overwrite each
//! other.

pub mod model;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::resolver::AliasMap;
use crate::{Error, Result, Value};

pub use model::{
    descriptor_of, project_records, project_to_model, FieldDescriptor, FieldType, Model,
    ModelDescriptor,
};

/// One materialized row: key -> value in column order
pub type Record = IndexMap<String, Value>;

/// Column metadata reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Display name of the column
    pub name: String,
    /// Physical table the column was read from, when the driver knows it
    pub table: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, table: Option<&str>) -> Self {
        Self {
            name: name.into(),
            table: table.map(str::to_string),
        }
    }
}

/// A fetched row: values in select-list order with their metadata
pub type RawRow = Vec<(Value, ColumnMeta)>;

/// The key a column gets in a record
fn record_key(column: &ColumnMeta, aliases: &AliasMap) -> String {
    if aliases.len() < 2 {
        return column.name.clone();
    }
    let Some(table) = column.table.as_deref() else {
        return column.name.clone();
    };

    match aliases.iter().find(|(_, physical)| physical.as_str() == table) {
        Some((alias, _)) if alias != table => format!("{}.{}", alias, column.name),
        _ => column.name.clone(),
    }
}

/// Key every row's columns, prefixing with the alias where tables collide.
///
/// A single-table row keeps the later of two equal keys. When several
/// tables are read, a key that still repeats (the driver did not report
/// the column's table) fails the batch instead of dropping a column.
pub fn materialize_rows(rows: Vec<RawRow>, aliases: &AliasMap) -> Result<Vec<Record>> {
    let joined = aliases.len() >= 2;
    rows.into_iter()
        .map(|row| {
            let mut record = Record::with_capacity(row.len());
            for (value, column) in row {
                let key = record_key(&column, aliases);
                if joined && record.contains_key(&key) {
                    return Err(Error::materialization(
                        key,
                        "column name is ambiguous across joined tables; select it under a distinct name",
                    ));
                }
                record.insert(key, value);
            }
            Ok(record)
        })
        .collect()
}
