use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("User {id} not found")]
    NotFound { id: Uuid },

    #[error("User {id} already exists")]
    AlreadyExists { id: Uuid },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl ProfileError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn already_exists(id: Uuid) -> Self {
        Self::AlreadyExists { id }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
