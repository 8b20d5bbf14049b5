//! Error taxonomy shared by the persistence facade and session handling

use thiserror::Error;

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Failure of a single library operation
///
/// Every variant is scoped to the operation that produced it; nothing here is
/// fatal to the process and nothing is retried.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// No authenticated session where one is required
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity is absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Client input rejected before reaching storage
    #[error("{0}")]
    Validation(String),

    /// Opaque failure reported by the hosted backend
    #[error("{0}")]
    Remote(String),

    /// Local storage could not be read or written
    #[error("Local storage error: {0}")]
    Storage(String),
}

impl LibraryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }
}

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("corrupt snapshot: {}", err))
    }
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(LibraryError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            LibraryError::NotFound("Playlist").to_string(),
            "Playlist not found"
        );
        assert_eq!(
            LibraryError::remote("duplicate key value").to_string(),
            "duplicate key value"
        );
    }

    #[test]
    fn test_corrupt_json_is_storage_error() {
        let err: LibraryError = serde_json::from_str::<Vec<u32>>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, LibraryError::Storage(_)));
    }
}
