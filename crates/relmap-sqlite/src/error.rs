//! SQLite engine errors.

use relmap_core::EngineError;
use thiserror::Error;

/// Result alias for engine internals.
pub type Result<T> = std::result::Result<T, Error>;

/// Field reported for foreign key failures; SQLite does not name the column.
pub const FOREIGN_KEY_FIELD: &str = "foreign_key";

/// Failures inside the SQLite engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("cannot bind value: {0}")]
    Bind(String),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Column named by a constraint failure, if this is one.
    pub fn violated_field(&self) -> Option<String> {
        match self {
            Error::Sqlite(rusqlite::Error::SqliteFailure(failure, Some(message)))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                constraint_field(message)
            }
            _ => None,
        }
    }
}

/// Extract the offending column from an SQLite constraint message.
///
/// `UNIQUE constraint failed: User.email` and
/// `NOT NULL constraint failed: User.email` name `email`; composite unique
/// failures name their first column.
pub fn constraint_field(message: &str) -> Option<String> {
    if message.starts_with("FOREIGN KEY constraint failed") {
        return Some(FOREIGN_KEY_FIELD.to_string());
    }

    let (_, columns) = message.split_once("constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let field = first.rsplit_once('.').map_or(first, |(_, column)| column);

    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

impl From<Error> for EngineError {
    fn from(error: Error) -> Self {
        let violation = error.violated_field();
        let engine = EngineError::new(error.to_string());
        let engine = match violation {
            Some(field) => engine.with_violation(field),
            None => engine,
        };
        engine.with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field() {
        assert_eq!(
            constraint_field("UNIQUE constraint failed: User.email").as_deref(),
            Some("email")
        );
        assert_eq!(
            constraint_field("NOT NULL constraint failed: Pet.name").as_deref(),
            Some("name")
        );
        assert_eq!(
            constraint_field("UNIQUE constraint failed: T.a, T.b").as_deref(),
            Some("a")
        );
        assert_eq!(
            constraint_field("FOREIGN KEY constraint failed").as_deref(),
            Some("foreign_key")
        );
        assert_eq!(constraint_field("database is locked"), None);
    }

    #[test]
    fn test_non_constraint_errors_have_no_violation() {
        let engine = EngineError::from(Error::InvalidIdentifier("a b".into()));
        assert!(engine.violation().is_none());
        assert_eq!(engine.message(), "invalid identifier 'a b'");
    }
}
