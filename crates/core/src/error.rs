use crate::types::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A protected historical record was targeted by a destructive operation.
    #[error(
        "{entity} {id} from {year} is part of the institutional record and cannot be deleted"
    )]
    ImmutableRecord {
        entity: &'static str,
        id: EntityId,
        year: i32,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
