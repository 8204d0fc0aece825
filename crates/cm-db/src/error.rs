use cm_core::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("resource not found")]
    NotFound,
    #[error("duplicate id: {id}")]
    DuplicateId { id: String },
    #[error("invalid body: {message}")]
    InvalidBody { message: String },
    #[error("database io failed: {message}")]
    Io { message: String },
    #[error("json decode failed: {message}")]
    Decode { message: String },
    #[error("json encode failed: {message}")]
    Encode { message: String },
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io {
            message: value.to_string(),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Io { message } => Self::Io { message },
            DbError::Encode { message } => Self::Encode { message },
            other => Self::Decode {
                message: other.to_string(),
            },
        }
    }
}
