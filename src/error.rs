use axum::http::StatusCode;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete request; the message is surfaced to the caller verbatim
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Row mapping error: {0}")]
    RowMapping(String),
}

impl AppError {
    /// Status code reported in the response envelope
    ///
    /// Validation failures are the caller's fault; everything else happened while
    /// reaching the store or the embedding model.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::HttpClient(_)
            | AppError::Embedding(_)
            | AppError::RowMapping(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::validation("'limit' query parameter is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "'limit' query parameter is required");
    }

    #[test]
    fn test_execution_errors_map_to_internal() {
        let err = AppError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Database error:"));

        let err = AppError::Embedding("empty vector".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::RowMapping("release_date is NULL".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
