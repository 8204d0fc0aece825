use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io failed: {message}")]
    Io { message: String },
    #[error("stored data could not be decoded: {message}")]
    Decode { message: String },
    #[error("record could not be encoded: {message}")]
    Encode { message: String },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

impl From<serde_json::Error> for IngestError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidBody {
            message: value.to_string(),
        }
    }
}
