use copejem_core::error::CoreError;

/// Error type for every store, repository, and service operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (not found, validation, immutability, forbidden).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The remote backend failed or is unreachable.
    #[error("Backend unavailable: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The local slot directory could not be read or written.
    #[error("Local storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be (de)serialized.
    #[error("Corrupt record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            StoreError::Core(core) => Some(core),
            _ => None,
        }
    }

    /// Whether the caller may retry the operation unchanged.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, StoreError::Backend(_) | StoreError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn domain_errors_are_exposed_and_not_retryable() {
        let err = StoreError::from(CoreError::Forbidden("admin only".into()));
        assert_matches!(err.as_core(), Some(CoreError::Forbidden(_)));
        assert!(!err.is_backend_failure());
    }

    #[test]
    fn io_failures_are_retryable() {
        let err = StoreError::from(std::io::Error::other("disk full"));
        assert!(err.as_core().is_none());
        assert!(err.is_backend_failure());
    }

    #[test]
    fn corrupt_records_are_not_retryable() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(json_err);
        assert!(err.as_core().is_none());
        assert!(!err.is_backend_failure());
    }
}
