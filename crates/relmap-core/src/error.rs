//! Core error types.

use serde::Serialize;
use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Core adapter errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A type name that is not part of the schema.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// A property name that is not declared on the type.
    #[error("unknown property '{property}' on type '{type_name}'")]
    UnknownProperty {
        /// Type the lookup ran against.
        type_name: String,
        /// Offending property name.
        property: String,
    },

    /// A filter string that does not follow `name<op>value`.
    #[error("invalid filter '{0}'")]
    InvalidFilter(String),

    /// A schema that cannot be mapped onto tables.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Input data whose shape does not fit the declared property.
    #[error("invalid value for '{property}': {reason}")]
    InvalidValue {
        /// Property the value was supplied for.
        property: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two or more distinct types reference each other.
    #[error("cyclic type dependency: {}", path.join(" -> "))]
    CycleDetected {
        /// Type names around the cycle; the first name is repeated at the end.
        path: Vec<String>,
    },

    /// The engine answered a statement with the wrong kind of outcome.
    #[error("unexpected engine outcome, expected {expected}")]
    UnexpectedOutcome {
        /// Outcome kind the statement should have produced.
        expected: &'static str,
    },

    /// Failure reported by the storage engine, passed through unmodified.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A declared constraint an engine recognised as violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Column (field) the constraint is declared on.
    pub field: String,
}

/// Error channel of the storage engine collaborator.
///
/// Engines report every failure through this one type. The optional
/// constraint hint is for the classification layer; the core never looks at it.
#[derive(Debug, Error)]
#[error("engine error: {message}")]
pub struct EngineError {
    message: String,
    violation: Option<ConstraintViolation>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    /// Create an engine error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            violation: None,
            source: None,
        }
    }

    /// Attach the underlying driver error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach a constraint violation hint.
    pub fn with_violation(mut self, field: impl Into<String>) -> Self {
        self.violation = Some(ConstraintViolation {
            field: field.into(),
        });
        self
    }

    /// Engine message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Constraint violation hint, if the engine recognised one.
    pub fn violation(&self) -> Option<&ConstraintViolation> {
        self.violation.as_ref()
    }
}

/// A write violated a declared constraint (uniqueness, not-null, foreign key).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("constraint_violation")]
pub struct ConstraintError {
    /// Offending field.
    pub field: String,
}

/// Any other failure. Carries no detail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown_error")]
pub struct UnknownError;

/// Serializable body of a classified error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Error code.
    pub code: &'static str,
    /// Offending field, for constraint violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// The two error kinds callers of the adapter get to distinguish.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Client-caused, not retriable.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    /// Operational failure.
    #[error(transparent)]
    Unknown(#[from] UnknownError),
}

impl ConstraintError {
    /// Error code.
    pub const CODE: &'static str = "constraint_violation";

    /// Serializable body.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: Self::CODE,
            field: Some(self.field.clone()),
        }
    }
}

impl UnknownError {
    /// Error code.
    pub const CODE: &'static str = "unknown_error";

    /// Serializable body.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: Self::CODE,
            field: None,
        }
    }
}

impl ClientError {
    /// Map a core error onto one of the two client-facing kinds.
    pub fn classify(error: &Error) -> Self {
        match error {
            Error::Engine(engine) => match engine.violation() {
                Some(violation) => ClientError::Constraint(ConstraintError {
                    field: violation.field.clone(),
                }),
                None => ClientError::Unknown(UnknownError),
            },
            _ => ClientError::Unknown(UnknownError),
        }
    }

    /// Error code.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Constraint(_) => ConstraintError::CODE,
            ClientError::Unknown(_) => UnknownError::CODE,
        }
    }

    /// Serializable body.
    pub fn body(&self) -> ErrorBody {
        match self {
            ClientError::Constraint(e) => e.body(),
            ClientError::Unknown(e) => e.body(),
        }
    }
}

impl From<Error> for ClientError {
    fn from(error: Error) -> Self {
        ClientError::classify(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_constraint_violation() {
        let error = Error::from(EngineError::new("UNIQUE constraint failed").with_violation("email"));
        let client = ClientError::classify(&error);

        assert_eq!(
            client,
            ClientError::Constraint(ConstraintError {
                field: "email".into()
            })
        );
        assert_eq!(client.code(), "constraint_violation");
        assert_eq!(
            serde_json::to_value(client.body()).unwrap(),
            serde_json::json!({"code": "constraint_violation", "field": "email"})
        );
    }

    #[test]
    fn test_classify_everything_else_as_unknown() {
        let engine = Error::from(EngineError::new("disk I/O error"));
        let cycle = Error::CycleDetected {
            path: vec!["A".into(), "B".into(), "A".into()],
        };

        for error in [engine, cycle] {
            let client = ClientError::from(error);
            assert_eq!(client, ClientError::Unknown(UnknownError));
            assert_eq!(
                serde_json::to_value(client.body()).unwrap(),
                serde_json::json!({"code": "unknown_error"})
            );
        }
    }

    #[test]
    fn test_display() {
        let cycle = Error::CycleDetected {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(cycle.to_string(), "cyclic type dependency: A -> B -> A");
        assert_eq!(UnknownError.to_string(), "unknown_error");
    }
}
