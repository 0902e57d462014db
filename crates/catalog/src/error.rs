use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backing repository or filesystem cannot be used at all.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid definition in {path}: {reason}")]
    InvalidDefinition { path: String, reason: String },

    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CatalogError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_definition(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidDefinition {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
