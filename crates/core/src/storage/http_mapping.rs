//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! This module provides HTTP status code mappings for [`RepositoryError`] variants,
//! following the Functional Core pattern - pure functions with no side effects.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// Context wrappers are looked through, so a `NotFound` raised deep inside a
/// cascade still maps to 404:
///
/// - `NotFound` -> 404 (Not Found)
/// - `StoreUnavailable` -> 503 (Service Unavailable)
/// - `DuplicateRecord`, `MalformedRecord`, `QueryFailed` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use planzoco_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Event",
///     id: "aB3xYz".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error.root() {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::StoreUnavailable(_) => 503,
        RepositoryError::DuplicateRecord { .. } => 500,
        RepositoryError::MalformedRecord(_) => 500,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Operation { .. } => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::NotFound {
            entity_type: "Event",
            id: "ev1".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_wrapped_not_found_maps_to_404() {
        let error = RepositoryError::NotFound {
            entity_type: "Option",
            id: "o1".to_string(),
        }
        .context("vote on", "Option");
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let error = RepositoryError::StoreUnavailable("connection reset".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_query_failed_maps_to_500() {
        let error = RepositoryError::QueryFailed("Table not found".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_malformed_record_maps_to_500() {
        let error = RepositoryError::MalformedRecord("missing votes".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_duplicate_record_maps_to_500() {
        let error = RepositoryError::DuplicateRecord {
            entity_type: "Question",
            id: "q1".to_string(),
            count: 2,
        };
        assert_eq!(repository_error_to_status_code(&error), 500);
    }
}
