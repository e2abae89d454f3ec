use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{count} {entity_type} records share id {id}")]
    DuplicateRecord {
        entity_type: &'static str,
        id: String,
        count: usize,
    },
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Failed to {operation} {entity_type}: {source}")]
    Operation {
        operation: &'static str,
        entity_type: &'static str,
        #[source]
        source: Box<RepositoryError>,
    },
}

impl RepositoryError {
    /// Wraps a store failure with the operation and entity it belongs to.
    pub fn context(self, operation: &'static str, entity_type: &'static str) -> Self {
        RepositoryError::Operation {
            operation,
            entity_type,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through context wrappers.
    pub fn root(&self) -> &RepositoryError {
        match self {
            RepositoryError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the error (or the error it wraps) is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), RepositoryError::NotFound { .. })
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
