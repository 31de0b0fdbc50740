//! Errors returned by record operations

use crate::schema::EntityKind;
use sea_orm::DbErr;
use std::fmt;

/// A problem with one input field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldProblem {
    /// Required field absent, blank, or empty after sanitizing
    Missing(String),
    /// Malformed optional input (strict mode only)
    Invalid { field: String, reason: String },
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing(field) => write!(f, "{} is required", field),
            FieldProblem::Invalid { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

/// Input rejected before reaching storage. Lists every offending field so
/// the caller can re-prompt once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub entity: EntityKind,
    pub problems: Vec<FieldProblem>,
}

impl ValidationError {
    pub fn missing_fields(&self) -> impl Iterator<Item = &str> {
        self.problems.iter().filter_map(|p| match p {
            FieldProblem::Missing(field) => Some(field.as_str()),
            FieldProblem::Invalid { .. } => None,
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: ", self.entity)?;
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Record operation errors.
#[derive(Debug)]
pub enum RecordError {
    /// Required input missing (or malformed, in strict mode)
    Validation(ValidationError),
    /// The targeted record does not exist
    NotFound { entity: EntityKind, id: i32 },
    /// The store rejected the operation
    Persistence(DbErr),
}

impl RecordError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Validation(e) => write!(f, "{}", e),
            RecordError::NotFound { entity, id } => write!(f, "{} {} not found", entity, id),
            RecordError::Persistence(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Validation(e) => Some(e),
            RecordError::NotFound { .. } => None,
            RecordError::Persistence(e) => Some(e),
        }
    }
}

impl From<ValidationError> for RecordError {
    fn from(e: ValidationError) -> Self {
        RecordError::Validation(e)
    }
}

impl From<DbErr> for RecordError {
    fn from(e: DbErr) -> Self {
        RecordError::Persistence(e)
    }
}
