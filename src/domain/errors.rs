use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Reject a string field longer than `max` characters.
pub(crate) fn check_max_len(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::ValidationError(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Same as [`check_max_len`] for optional fields.
pub(crate) fn check_optional_max_len(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> DomainResult<()> {
    match value {
        Some(v) => check_max_len(field, v, max),
        None => Ok(()),
    }
}
