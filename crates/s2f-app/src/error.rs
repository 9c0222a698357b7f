//! Error types for the s2f-app client layer.

/// Application error type that wraps errors from the lower crates and the
/// HTTP transport and provides one error interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Service returned {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Backend worker stopped")]
    WorkerStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for s2f-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// True for a 404 from the service.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Http { status: 404, .. })
    }
}

impl From<s2f_core::CoreError> for AppError {
    fn from(err: s2f_core::CoreError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<s2f_results::ResultsError> for AppError {
    fn from(err: s2f_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Settings(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}
