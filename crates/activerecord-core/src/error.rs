//! Error types for ActiveRecord Rust.
//!
//! Two families live here:
//!
//! - [`Error`]: configuration, lifecycle and persistence failures. These are
//!   propagated with `?` and are never partially applied.
//! - [`ValidationError`]: field-level feedback produced by the AutoApi layer.
//!   These are returned as data so a handler can render all of them at once.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

/// The primary error type for all ActiveRecord operations.
#[derive(Debug)]
pub enum Error {
    /// A read or fetch matched zero rows.
    NotFound {
        table: String,
        id: Option<i64>,
    },
    /// An operation was invoked in the wrong lifecycle state.
    InvalidState(String),
    /// A column's SQL type could not be resolved.
    InvalidColumnType { column: String, message: String },
    /// A relation column is misconfigured or does not resolve to a table.
    InvalidRelation { column: String, message: String },
    /// A column name is not part of the table definition.
    UnknownColumn { column: String },
    /// A column was declared twice (or `id` was declared explicitly).
    DuplicateColumn { column: String },
    /// A hook is already registered for this (action, column) pair.
    DuplicateHook { action: &'static str, column: String },
    /// The supplied hook cannot be invoked for this action.
    NotCallable { action: &'static str, column: String },
    /// A driver failure while executing a record operation.
    Persistence {
        message: String,
        source: Box<Error>,
    },
    /// Driver-level query error.
    Query(QueryError),
    /// Custom error with message.
    Custom(String),
}

/// Driver-level failure reported by a [`Connection`](crate::Connection).
#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
    pub sql: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Generic database error.
    Database,
    /// Unique, not-null or foreign key violation.
    Constraint,
    /// The connection could not be opened or was lost.
    Connection,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sql: None,
        }
    }

    /// Attach the statement that failed.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.kind == QueryErrorKind::Constraint
    }
}

impl Error {
    /// Wrap a driver failure with a message naming the operation.
    pub fn persistence(message: impl Into<String>, source: Error) -> Self {
        Error::Persistence {
            message: message.into(),
            source: Box::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True if this (possibly wrapped) error is a constraint violation.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Error::Query(q) => q.is_constraint_violation(),
            Error::Persistence { source, .. } => source.is_constraint_violation(),
            _ => false,
        }
    }

    /// SQL that caused the error, if known.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            Error::Persistence { source, .. } => source.sql(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { table, id: Some(id) } => {
                write!(f, "No active record entry with id {} in the `{}` table", id, table)
            }
            Error::NotFound { table, id: None } => {
                write!(f, "No active record entry found in the `{}` table", table)
            }
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::InvalidColumnType { column, message } => {
                write!(f, "Invalid type for column `{}`: {}", column, message)
            }
            Error::InvalidRelation { column, message } => {
                write!(f, "Invalid relation on column `{}`: {}", column, message)
            }
            Error::UnknownColumn { column } => write!(f, "Unknown column `{}`", column),
            Error::DuplicateColumn { column } => {
                write!(f, "Column `{}` is already defined", column)
            }
            Error::DuplicateHook { action, column } => write!(
                f,
                "Hook is trying to register on an already registered column `{}` for {}",
                column, action
            ),
            Error::NotCallable { action, column } => write!(
                f,
                "Hook for column `{}` is not callable for the {} action",
                column, action
            ),
            Error::Persistence { message, source } => write!(f, "{}: {}", message, source),
            Error::Query(q) => write!(f, "{}", q),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query error: {}", self.message)?;
        if let Some(sql) = &self.sql {
            write!(f, " (sql: {})", sql)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Persistence { source, .. } => Some(source.as_ref()),
            Error::Query(q) => Some(q),
            _ => None,
        }
    }
}

impl StdError for QueryError {}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

/// Result type alias for ActiveRecord operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Input named a column that does not exist.
    UnknownField,
    /// Input tried to write an immutable column.
    Immutable,
    /// A validator, setter or relation check rejected the value.
    Invalid,
    /// A required column has no value.
    Missing,
    /// The addressed record does not exist.
    NotFound,
}

/// A single field-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Aggregated field-level failures, keyed by column name.
///
/// The first error recorded for a column wins; later ones are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    errors: BTreeMap<String, FieldValidationError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unless the column already has one.
    pub fn add(
        &mut self,
        column: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) {
        self.errors
            .entry(column.into())
            .or_insert_with(|| FieldValidationError::new(kind, message));
    }

    /// Merge another set of errors; existing entries take precedence.
    pub fn merge(&mut self, other: ValidationError) {
        for (column, err) in other.errors {
            self.errors.entry(column).or_insert(err);
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValidationError> {
        self.errors.get(column)
    }

    pub fn kind_of(&self, column: &str) -> Option<ValidationErrorKind> {
        self.errors.get(column).map(|e| e.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValidationError)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (column, err) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", column, err.message)?;
        }
        Ok(())
    }
}

impl StdError for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_wins() {
        let mut errors = ValidationError::new();
        errors.add("name", ValidationErrorKind::UnknownField, "Unknown input field");
        errors.add("name", ValidationErrorKind::Missing, "missing");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.kind_of("name"), Some(ValidationErrorKind::UnknownField));
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut a = ValidationError::new();
        a.add("x", ValidationErrorKind::Invalid, "bad");
        let mut b = ValidationError::new();
        b.add("x", ValidationErrorKind::Missing, "missing");
        b.add("y", ValidationErrorKind::Missing, "missing");
        a.merge(b);
        assert_eq!(a.kind_of("x"), Some(ValidationErrorKind::Invalid));
        assert_eq!(a.kind_of("y"), Some(ValidationErrorKind::Missing));
    }

    #[test]
    fn test_validation_error_serializes_as_map() {
        let mut errors = ValidationError::new();
        errors.add("name", ValidationErrorKind::Missing, "The required field \"name\" is missing");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": {"type": "missing", "message": "The required field \"name\" is missing"}
            })
        );
    }

    #[test]
    fn test_persistence_wraps_source() {
        let err = Error::persistence(
            "Can not create a new active record entry in the `users` table.",
            Error::Query(
                QueryError::new(QueryErrorKind::Constraint, "UNIQUE constraint failed")
                    .with_sql("INSERT INTO users"),
            ),
        );
        assert!(err.is_constraint_violation());
        assert_eq!(err.sql(), Some("INSERT INTO users"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            table: "users".to_string(),
            id: Some(3),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No active record entry with id 3 in the `users` table");
    }
}
