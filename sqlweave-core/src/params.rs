//! Textual `?name` parameter substitution
//!
//! This is a text pre-pass that writes escaped literals into the statement.
//! It is kept for hand-written templates. Escaping is not a defense against
//! injection; use [`QueryBuilder::render_bound`](crate::QueryBuilder::render_bound)
//! for anything built from untrusted input.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::{Error, Result, Value};

/// Named values for a `?name` template
pub type Params = IndexMap<String, Value>;

fn token_pattern() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\?(\w+)").expect("invalid built-in parameter regex"))
}

/// Replace every `?name` token with the literal of `params[name]`.
///
/// Strings are slash-escaped and single-quoted; everything else is written
/// bare. A token without a value fails with [`Error::Parameter`].
pub fn substitute(template: &str, params: &Params) -> Result<String> {
    let mut sql = String::with_capacity(template.len());
    let mut last = 0;

    for captures in token_pattern().captures_iter(template) {
        let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = params
            .get(name.as_str())
            .ok_or_else(|| Error::parameter(name.as_str()))?;

        sql.push_str(&template[last..token.start()]);
        sql.push_str(&value.to_sql_literal());
        last = token.end();
    }
    sql.push_str(&template[last..]);

    Ok(sql)
}
