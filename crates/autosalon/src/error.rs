use thiserror::Error;

/// Failure reported by a remote persistence provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Failure reported by the local fallback store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("quota exceeded writing '{key}': {size} bytes (limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    #[error("Car not found: {0}")]
    NotFound(String),

    #[error("local car store is read-only: {0}")]
    ReadOnly(String),

    #[error("Store error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AutosalonError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl AutosalonError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AutosalonError::Provider(ProviderError::NotFound(_))
                | AutosalonError::Storage(StorageError::NotFound(_))
        )
    }
}

impl From<std::io::Error> for AutosalonError {
    fn from(e: std::io::Error) -> Self {
        AutosalonError::Storage(StorageError::Io(e))
    }
}

pub type Result<T> = std::result::Result<T, AutosalonError>;
