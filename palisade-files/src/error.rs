//! Error types for static file serving

use palisade_core::HttpResponse;
use thiserror::Error;

/// Static file error types
#[derive(Error, Debug)]
pub enum FileError {
    /// File or base directory does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// File exists but may not be served
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request did not name a file
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FileError {
    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FileError::NotFound(_) => 404,
            FileError::Forbidden(_) => 403,
            FileError::BadRequest(_) => 400,
            FileError::Io(_) => 500,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::new(self.status_code())
    }
}

/// Result type for file operations
pub type FileResult<T> = Result<T, FileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(FileError::NotFound("a".into()).status_code(), 404);
        assert_eq!(FileError::Forbidden("a".into()).status_code(), 403);
        assert_eq!(FileError::BadRequest("a".into()).status_code(), 400);
        let io = FileError::from(std::io::Error::other("disk"));
        assert_eq!(io.into_response().status, 500);
    }
}
