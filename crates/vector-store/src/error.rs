use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),

    /// The byte stream does not describe a valid artifact (truncated, bad length field,
    /// width mismatch). Callers treat this as a cache miss and rebuild.
    #[error("Corrupt artifact: {0}")]
    Corrupt(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

impl VectorStoreError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

impl From<std::io::Error> for VectorStoreError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Corrupt(format!("unexpected end of stream: {err}"))
        } else {
            Self::IoError(err)
        }
    }
}
