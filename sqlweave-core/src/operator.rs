//! Comparison operators for WHERE predicates

use std::fmt::{self, Display};

/// SQL comparison operator used by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("=");
    pub const NEQ: Self = Operator("!=");
    pub const GT: Self = Operator(">");
    pub const LT: Self = Operator("<");
    pub const GTE: Self = Operator(">=");
    pub const LTE: Self = Operator("<=");
    /// Substring match; the predicate value is wrapped in `%...%`
    pub const LIKE: Self = Operator("LIKE");

    /// Create a custom operator for database-specific comparisons
    ///
    /// # Examples
    /// ```
    /// use sqlweave_core::Operator;
    ///
    /// // MySQL regular expression match
    /// let regexp = Operator::custom("REGEXP");
    /// assert_eq!(regexp.as_str(), "REGEXP");
    /// ```
    pub const fn custom(op: &'static str) -> Self {
        Operator(op)
    }

    /// The operator as written in SQL
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether values compared with this operator get wildcard wrapping
    pub fn is_like(&self) -> bool {
        *self == Self::LIKE
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything a predicate accepts in operator position
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

/// Allow string literals for the common operators
///
/// # Panics
/// Panics on an unknown operator string. Use [`Operator::custom`] for
/// anything outside the built-in set.
impl IntoOperator for &str {
    fn into_operator(self) -> Operator {
        match self {
            "=" => Operator::EQ,
            "!=" | "<>" => Operator::NEQ,
            ">" => Operator::GT,
            "<" => Operator::LT,
            ">=" => Operator::GTE,
            "<=" => Operator::LTE,
            "LIKE" | "like" => Operator::LIKE,
            _ => panic!(
                "Unknown operator '{}'. Use the Operator constants or Operator::custom(\"{}\").",
                self, self
            ),
        }
    }
}

/// Short names for the built-in operators: `op::EQ`, `op::LIKE`
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
}
