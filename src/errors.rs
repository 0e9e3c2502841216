use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("{operation} timed out")]
    TimedOut { operation: &'static str },
}

/// Failure of the save workflow. Either the replace never landed, or it
/// landed and the follow-up reload failed.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to save habits for {period}: {source}")]
    Persist { period: String, source: StoreError },
    #[error("habits for {period} were saved but could not be reloaded: {source}")]
    Reload { period: String, source: StoreError },
}

impl SaveError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            SaveError::Persist { source, .. } | SaveError::Reload { source, .. } => source,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TimedOut { .. } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: err.to_string(),
            },
            other => Self::internal(other),
        }
    }
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        let status = match err.store_error() {
            StoreError::TimedOut { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
