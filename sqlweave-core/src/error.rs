//! Error types for sqlweave

use thiserror::Error;

/// The main error type for sqlweave operations
#[derive(Error, Debug)]
pub enum Error {
    /// The builder state cannot produce a statement (missing table,
    /// unaliased join, DELETE without WHERE, empty payload)
    #[error("Invalid query configuration: {message}")]
    Configuration { message: String },

    /// The renderer could not determine what to produce
    #[error("Render error: {message}")]
    Render { message: String },

    /// A fetched row does not fit the requested shape
    #[error("Materialization error on '{key}': {message}")]
    Materialization { key: String, message: String },

    /// The execution collaborator rejected a statement
    #[error("Execution error: {message} (statement: {sql})")]
    Execution { message: String, sql: String },

    /// Pool or connection level failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A `?name` token without a supplied value
    #[error("No value supplied for parameter '{name}'")]
    Parameter { name: String },
}

/// Convenience Result type for sqlweave operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new materialization error for a row key
    pub fn materialization(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Materialization {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new execution error carrying the statement that failed
    pub fn execution(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// Create a new missing parameter error
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter { name: name.into() }
    }

    /// True for errors raised before any SQL text was produced
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let err = Error::configuration("DELETE requires a WHERE clause");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Invalid query configuration: DELETE requires a WHERE clause"
        );
    }

    #[test]
    fn test_render_error() {
        let err = Error::render("no statement kind");
        assert!(matches!(err, Error::Render { .. }));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_materialization_error() {
        let err = Error::materialization("o.id", "missing from row");
        assert_eq!(err.to_string(), "Materialization error on 'o.id': missing from row");
    }

    #[test]
    fn test_execution_error_keeps_statement() {
        let err = Error::execution("table 'x' doesn't exist", "SELECT * FROM x");
        match err {
            Error::Execution { message, sql } => {
                assert_eq!(message, "table 'x' doesn't exist");
                assert_eq!(sql, "SELECT * FROM x");
            }
            _ => panic!("Expected Execution error"),
        }
    }

    #[test]
    fn test_parameter_error() {
        let err = Error::parameter("id");
        assert_eq!(err.to_string(), "No value supplied for parameter 'id'");
    }
}
