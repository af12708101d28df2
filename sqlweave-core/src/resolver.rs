//! Best-effort extraction of table aliases from SQL text
//!
//! The resolver scans `FROM <table>` and `JOIN <table>` occurrences, each
//! optionally followed by `AS <alias>` or a bare alias. It does not parse
//! SQL: subqueries, CTEs and comma joins yield an incomplete map rather than
//! an error.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

/// alias (or bare table name) -> physical table name
pub type AliasMap = IndexMap<String, String>;

/// Words that can follow a table reference without being its alias
const RESERVED: &[&str] = &[
    "AS", "CROSS", "FOR", "FORCE", "FULL", "GROUP", "HAVING", "IGNORE", "INNER", "JOIN", "LEFT",
    "LIMIT", "LOCK", "NATURAL", "ON", "ORDER", "OUTER", "RIGHT", "SET", "STRAIGHT_JOIN", "UNION",
    "USE", "USING", "VALUES", "WHERE", "WINDOW",
];

fn table_pattern() -> &'static Regex {
    static TABLE_RE: OnceLock<Regex> = OnceLock::new();
    TABLE_RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:FROM|JOIN)\s+([`"\[\]\w.]+)"#).expect("invalid built-in table regex")
    })
}

fn alias_pattern() -> &'static Regex {
    static ALIAS_RE: OnceLock<Regex> = OnceLock::new();
    ALIAS_RE.get_or_init(|| {
        Regex::new(r#"(?i)^\s+(?:AS\s+)?([`"\[\]\w]+)"#).expect("invalid built-in alias regex")
    })
}

fn unquote(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !matches!(c, '`' | '"' | '[' | ']'))
        .collect()
}

fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// Build the alias map of a statement.
///
/// A table without an alias maps to itself. When an alias appears twice the
/// last occurrence wins.
pub fn resolve_aliases(sql: &str) -> AliasMap {
    let mut aliases = AliasMap::new();

    for captures in table_pattern().captures_iter(sql) {
        let Some(table_match) = captures.get(1) else {
            continue;
        };
        let table = unquote(table_match.as_str());
        if table.is_empty() || is_reserved(&table) {
            continue;
        }

        let alias = alias_pattern()
            .captures(&sql[table_match.end()..])
            .and_then(|c| c.get(1))
            .map(|m| unquote(m.as_str()))
            .filter(|alias| !alias.is_empty() && !is_reserved(alias))
            .unwrap_or_else(|| table.clone());

        aliases.insert(alias, table);
    }

    tracing::trace!(target: "sqlweave::resolve", ?aliases, "resolved table aliases");
    aliases
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(map: &AliasMap) -> Vec<(&str, &str)> {
        map.iter().map(|(a, t)| (a.as_str(), t.as_str())).collect()
    }

    #[test]
    fn test_bare_and_as_aliases() {
        let map = resolve_aliases(
            "SELECT o.id, c.name FROM orders o JOIN customers AS c ON o.customer_id = c.id",
        );
        assert_eq!(pairs(&map), vec![("o", "orders"), ("c", "customers")]);
    }

    #[test]
    fn test_unaliased_table_maps_to_itself() {
        let map = resolve_aliases("SELECT * FROM users WHERE id = 1");
        assert_eq!(pairs(&map), vec![("users", "users")]);

        let map = resolve_aliases("select * from users");
        assert_eq!(pairs(&map), vec![("users", "users")]);
    }

    #[test]
    fn test_join_keyword_is_not_taken_as_alias() {
        let map = resolve_aliases("SELECT * FROM orders JOIN customers c ON orders.cid = c.id");
        assert_eq!(pairs(&map), vec![("orders", "orders"), ("c", "customers")]);

        let map = resolve_aliases(
            "SELECT * FROM orders LEFT JOIN notes n ON n.oid = orders.id INNER JOIN tags t ON t.oid = orders.id",
        );
        assert_eq!(
            pairs(&map),
            vec![("orders", "orders"), ("n", "notes"), ("t", "tags")]
        );
    }

    #[test]
    fn test_index_hints_are_not_taken_as_alias() {
        let map = resolve_aliases("SELECT * FROM users FORCE INDEX (ix_email) WHERE id = 1");
        assert_eq!(pairs(&map), vec![("users", "users")]);

        let map = resolve_aliases(
            "SELECT * FROM orders USE INDEX (ix_date) JOIN notes IGNORE INDEX (ix_body) ON notes.oid = orders.id",
        );
        assert_eq!(pairs(&map), vec![("orders", "orders"), ("notes", "notes")]);
    }

    #[test]
    fn test_quoted_identifiers_are_stripped() {
        let map = resolve_aliases("SELECT * FROM `orders` AS `o` JOIN [customers] c ON o.cid = c.id");
        assert_eq!(pairs(&map), vec![("o", "orders"), ("c", "customers")]);
    }

    #[test]
    fn test_schema_qualified_table() {
        let map = resolve_aliases("SELECT * FROM shop.orders o");
        assert_eq!(pairs(&map), vec![("o", "shop.orders")]);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let map = resolve_aliases("SELECT * FROM orders x JOIN customers x ON x.id = x.id");
        assert_eq!(map.len(), 1);
        assert_eq!(map["x"], "customers");
    }

    #[test]
    fn test_subquery_degrades_without_failing() {
        let map = resolve_aliases(
            "SELECT t.n FROM (SELECT COUNT(*) AS n FROM orders) t WHERE t.n > 1",
        );
        // the derived table is invisible; only the inner FROM is found
        assert_eq!(pairs(&map), vec![("orders", "orders")]);

        let map = resolve_aliases("WITH recent AS (SELECT 1) SELECT 2");
        assert!(map.is_empty());
    }

    #[test]
    fn test_identifiers_containing_from_are_ignored() {
        let map = resolve_aliases("SELECT date_from, valid_from FROM periods p");
        assert_eq!(pairs(&map), vec![("p", "periods")]);
    }
}
