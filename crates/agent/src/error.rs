use cobot_catalog::CatalogError;
use cobot_vector_store::VectorStoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Missing catalog entry or cache file.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// Catalog or cache filesystem cannot be used; fatal to initialization.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid minimum score {0}: must be finite and non-negative")]
    InvalidScore(f64),
}

impl AgentError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::StorageUnavailable(err.to_string()),
        }
    }
}

impl From<VectorStoreError> for AgentError {
    fn from(err: VectorStoreError) -> Self {
        match err {
            VectorStoreError::IoError(io) => io.into(),
            VectorStoreError::Corrupt(msg) => Self::Corrupt(msg),
            err @ VectorStoreError::InvalidDimension { .. } => Self::Corrupt(err.to_string()),
        }
    }
}

impl From<CatalogError> for AgentError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(path) => Self::NotFound(path),
            CatalogError::Unavailable(msg) => Self::StorageUnavailable(msg),
            err @ CatalogError::InvalidDefinition { .. } => Self::ConfigInvalid(err.to_string()),
            err @ CatalogError::InvalidPattern { .. } => Self::ConfigInvalid(err.to_string()),
            CatalogError::IoError(io) => Self::StorageUnavailable(io.to_string()),
        }
    }
}
