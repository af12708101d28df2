//! Value types for column payloads, predicates and fetched rows

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A SQL value: a payload column, a predicate operand or a fetched cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Bytes value
    Bytes(Vec<u8>),
    /// JSON value
    Json(serde_json::Value),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// Pre-escaped SQL expression, emitted verbatim (`NOW()`, `count + 1`)
    Expr(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Build an expression value that is rendered without quoting
    pub fn expr(sql: impl Into<String>) -> Self {
        Value::Expr(sql.into())
    }

    /// Render as an INSERT/UPDATE literal.
    ///
    /// Text is slash-escaped and single-quoted; numbers, booleans and
    /// expressions are emitted bare.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::I32(i) => i.to_string(),
            Value::I64(i) => i.to_string(),
            Value::F32(f) => f.to_string(),
            Value::F64(f) => f.to_string(),
            Value::String(s) => quote(s),
            Value::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
                format!("X'{}'", hex)
            }
            Value::Json(j) => quote(&j.to_string()),
            Value::DateTime(dt) => quote(&dt.format(DATETIME_FORMAT).to_string()),
            Value::Expr(e) => e.clone(),
        }
    }

    /// Plain textual form, without quoting or escaping
    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::I32(i) => i.to_string(),
            Value::I64(i) => i.to_string(),
            Value::F32(f) => f.to_string(),
            Value::F64(f) => f.to_string(),
            Value::String(s) | Value::Expr(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Json(j) => j.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Convert into a JSON value for model deserialization
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::I32(i) => serde_json::Value::from(*i),
            Value::I64(i) => serde_json::Value::from(*i),
            Value::F32(f) => serde_json::Number::from_f64(*f as f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::F64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) | Value::Expr(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
            ),
            Value::Json(j) => j.clone(),
            Value::DateTime(dt) => serde_json::to_value(dt).unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Backslash-escape quotes, backslashes and NUL bytes.
///
/// This mirrors the textual escaping legacy callers rely on. It is not a
/// defense against injection; prefer bound rendering.
pub fn escape_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

fn quote(input: &str) -> String {
    format!("'{}'", escape_slashes(input))
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(val: $ty) -> Self {
                    Value::$variant(val)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
    NaiveDateTime => DateTime,
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::I64(val.into())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_owned())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7), Value::I32(7));
        assert_eq!(Value::from(7u32), Value::I64(7));
        assert_eq!(Value::from("x"), Value::String("x".into()));
        assert_eq!(Value::from(()), Value::Null);
        assert_eq!(Value::from(vec![1u8]), Value::Bytes(vec![1]));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(Some(42i64)), Value::I64(42));
        assert!(Value::from(None::<&str>).is_null());
    }

    #[test]
    fn test_string_literal_is_escaped_and_quoted() {
        assert_eq!(Value::from("O'Brien").to_sql_literal(), "'O\\'Brien'");
        assert_eq!(Value::from("a\\b").to_sql_literal(), "'a\\\\b'");
        assert_eq!(Value::from("say \"hi\"").to_sql_literal(), "'say \\\"hi\\\"'");
    }

    #[test]
    fn test_bare_literals() {
        assert_eq!(Value::I32(7).to_sql_literal(), "7");
        assert_eq!(Value::F64(2.5).to_sql_literal(), "2.5");
        assert_eq!(Value::Bool(false).to_sql_literal(), "0");
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
        assert_eq!(Value::expr("NOW()").to_sql_literal(), "NOW()");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_sql_literal(), "X'DEAD'");
    }

    #[test]
    fn test_datetime_literal() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(Value::from(dt).to_sql_literal(), "'2024-03-09 14:05:00'");
    }

    #[test]
    fn test_as_text_is_unquoted() {
        assert_eq!(Value::I64(5).as_text(), "5");
        assert_eq!(Value::from("it's").as_text(), "it's");
        assert_eq!(Value::Null.as_text(), "");
    }
}
