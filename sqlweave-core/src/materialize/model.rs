//! Typed projection of records into models
//!
//! A model registers its fields once through [`Model::descriptor`]. Each
//! field names the semantic type its raw value is coerced to before the
//! record is deserialized into the model with serde.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;

use super::Record;
use crate::resolver::AliasMap;
use crate::{Error, Result, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Semantic type of a model property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    DateTime,
    /// Passed through without coercion
    Unknown,
}

/// One declared model property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Alias (or table name) the property is read from, if pinned
    pub source: Option<String>,
}

/// Ordered property table of a model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDescriptor {
    fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property
    pub fn field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            field_type,
            source: None,
        });
        self
    }

    /// Declare a property read from the columns of `alias`
    pub fn aliased_field(mut self, alias: &str, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            field_type,
            source: Some(alias.to_string()),
        });
        self
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// A type rows can be projected into
///
/// ```
/// use serde::Deserialize;
/// use sqlweave_core::{FieldType, Model, ModelDescriptor};
///
/// #[derive(Deserialize)]
/// struct Customer {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for Customer {
///     fn descriptor() -> ModelDescriptor {
///         ModelDescriptor::new()
///             .field("id", FieldType::Integer)
///             .field("name", FieldType::String)
///     }
/// }
/// ```
pub trait Model: DeserializeOwned + 'static {
    fn descriptor() -> ModelDescriptor;
}

/// The descriptor of `M`, derived on first use and shared afterwards
pub fn descriptor_of<M: Model>() -> &'static ModelDescriptor {
    static CACHE: OnceLock<Mutex<HashMap<TypeId, &'static ModelDescriptor>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let key = TypeId::of::<M>();
    if let Some(cached) = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .copied()
    {
        return cached;
    }

    // Build outside the lock; M::descriptor() is user code.
    let computed = M::descriptor();

    // Leak only when this thread's descriptor is the one stored.
    let mut map = cache.lock().unwrap_or_else(PoisonError::into_inner);
    *map.entry(key).or_insert_with(|| &*Box::leak(Box::new(computed)))
}

/// Record key a property is read from.
///
/// A pinned source wins; otherwise the longest known alias that prefixes
/// the property name followed by `_` splits it into `alias.rest`.
fn lookup_key(field: &FieldDescriptor, aliases: &AliasMap) -> String {
    if let Some(source) = &field.source {
        return format!("{}.{}", source, field.name);
    }

    aliases
        .iter()
        .flat_map(|(alias, table)| [alias, table])
        .filter_map(|known| {
            field
                .name
                .strip_prefix(known.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|rest| !rest.is_empty())
                .map(|rest| (known.len(), format!("{}.{}", known, rest)))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, key)| key)
        .unwrap_or_else(|| field.name.clone())
}

/// Leading integer of a string, `0` when there is none
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..digits_end].parse().unwrap_or(0)
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn from_timestamp(seconds: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}

/// Coerce a raw value to the declared property type
fn coerce(key: &str, value: &Value, field_type: FieldType) -> Result<Value> {
    let coerced = match field_type {
        FieldType::Unknown => value.clone(),
        FieldType::String => Value::String(value.as_text()),
        FieldType::Integer => Value::I64(match value {
            Value::Bool(b) => *b as i64,
            Value::I32(i) => *i as i64,
            Value::I64(i) => *i,
            Value::F32(f) => *f as i64,
            Value::F64(f) => *f as i64,
            Value::String(s) => leading_integer(s),
            Value::DateTime(dt) => dt.and_utc().timestamp(),
            _ => 0,
        }),
        FieldType::Boolean => Value::Bool(match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::I32(i) => *i != 0,
            Value::I64(i) => *i != 0,
            Value::F32(f) => *f != 0.0,
            Value::F64(f) => *f != 0.0,
            Value::String(s) | Value::Expr(s) => !(s.is_empty() || s == "0"),
            Value::Bytes(b) => !b.is_empty(),
            Value::Json(j) => !j.is_null(),
            Value::DateTime(_) => true,
        }),
        FieldType::DateTime => match value {
            Value::Null => Value::Null,
            Value::DateTime(_) => value.clone(),
            Value::I32(i) => from_timestamp(*i as i64)
                .map(Value::DateTime)
                .ok_or_else(|| Error::materialization(key, "timestamp out of range"))?,
            Value::I64(i) => from_timestamp(*i)
                .map(Value::DateTime)
                .ok_or_else(|| Error::materialization(key, "timestamp out of range"))?,
            other => parse_datetime(&other.as_text())
                .map(Value::DateTime)
                .ok_or_else(|| {
                    Error::materialization(
                        key,
                        format!("cannot parse '{}' as a datetime", other.as_text()),
                    )
                })?,
        },
    };
    Ok(coerced)
}

/// Project records onto a descriptor: property name -> coerced value.
///
/// A key missing from any row fails the whole batch. When several tables
/// are known, an `alias.column` key never falls back to the bare column.
pub fn project_records(
    records: &[Record],
    descriptor: &ModelDescriptor,
    aliases: &AliasMap,
) -> Result<Vec<Record>> {
    let keys: Vec<String> = descriptor
        .fields()
        .iter()
        .map(|field| lookup_key(field, aliases))
        .collect();
    // Bare names are only unambiguous when a single table is read.
    let bare_fallback = aliases.len() < 2;

    records
        .iter()
        .map(|record| {
            descriptor
                .fields()
                .iter()
                .zip(&keys)
                .map(|(field, key)| -> Result<(String, Value)> {
                    let raw = record
                        .get(key)
                        .or_else(|| bare_fallback.then(|| record.get(&field.name)).flatten())
                        .ok_or_else(|| Error::materialization(key, "column missing from row"))?;
                    Ok((field.name.clone(), coerce(key, raw, field.field_type)?))
                })
                .collect::<Result<Record>>()
        })
        .collect()
}

/// Project records and deserialize each into `M`
pub fn project_to_model<M: Model>(records: &[Record], aliases: &AliasMap) -> Result<Vec<M>> {
    project_records(records, descriptor_of::<M>(), aliases)?
        .into_iter()
        .map(|projected| -> Result<M> {
            let object: serde_json::Map<String, serde_json::Value> = projected
                .into_iter()
                .map(|(name, value)| (name, value.to_json()))
                .collect();
            Ok(serde_json::from_value(serde_json::Value::Object(object))?)
        })
        .collect()
}
