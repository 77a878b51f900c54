use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no database connection string configured (set DB or app.database)")]
    MissingConnectionString,
    #[error("unterminated placeholder at byte {0}")]
    UnterminatedPlaceholder(usize),
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Outcomes a book handler reports back to the caller instead of a record.
///
/// Every variant is rendered as `200 OK` with a plain-text body; clients
/// tell failures apart by the message, not the status code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("no book exists")]
    NotFound,
    #[error("there was an error saving")]
    SaveFailed,
    #[error("error")]
    DeleteFailed,
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_error_messages() {
        assert_eq!(
            BookError::MissingField("title").to_string(),
            "missing required field title"
        );
        assert_eq!(
            BookError::MissingField("comment").to_string(),
            "missing required field comment"
        );
        assert_eq!(BookError::NotFound.to_string(), "no book exists");
        assert_eq!(BookError::SaveFailed.to_string(), "there was an error saving");
        assert_eq!(BookError::DeleteFailed.to_string(), "error");
    }

    #[test]
    fn test_book_error_is_ok_status() {
        let response = BookError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
