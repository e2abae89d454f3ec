use thiserror::Error;

/// Errors raised when user input fails boundary validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Event name cannot be empty")]
    EmptyName,
    #[error("Event name too long (max 200 characters)")]
    NameTooLong,
    #[error("{0} text cannot be empty")]
    EmptyText(&'static str),
    #[error("{0} text too long (max 200 characters)")]
    TextTooLong(&'static str),
}
