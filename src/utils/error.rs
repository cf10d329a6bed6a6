use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Backend unreachable: {message}")]
    ConnectivityError { message: String },

    #[error("Unexpected error in {context}: {message}")]
    UnexpectedError { context: String, message: String },
}

/// 錯誤分類，用於決定日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Internal,
}

impl DiagError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DiagError::ConfigError { .. }
            | DiagError::InvalidConfigValueError { .. }
            | DiagError::TomlError(_) => ErrorCategory::Configuration,
            DiagError::HttpError(_) | DiagError::ConnectivityError { .. } => ErrorCategory::Network,
            DiagError::SerializationError(_)
            | DiagError::UnexpectedError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DiagError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            DiagError::ConnectivityError { message } => {
                format!("Could not reach the data backend: {}", message)
            }
            DiagError::HttpError(e) if e.is_timeout() => {
                "The data backend did not answer in time".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the --url / SUPABASE_URL value and the configuration file"
            }
            ErrorCategory::Network => {
                "Check network access, the API key and that the project is running"
            }
            ErrorCategory::Internal => "Re-run with --verbose and inspect the log output",
        }
    }

    pub fn unexpected(context: impl Into<String>, message: impl ToString) -> Self {
        DiagError::UnexpectedError {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiagError>;
