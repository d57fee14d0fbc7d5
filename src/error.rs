use thiserror::Error;

/// Error taxonomy for the society core. Every variant carries the
/// human-readable message that the UI surfaces verbatim.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateRegistration(String),

    #[error("{0}")]
    DuplicateEmail(String),

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Email error: {0}")]
    Email(String),
}

impl AppError {
    /// Stable machine-readable code, logged alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DuplicateRegistration(_) => "DUPLICATE_REGISTRATION",
            AppError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Crypto(_) => "CRYPTO_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Email(_) => "EMAIL_ERROR",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_surface_verbatim() {
        let err = AppError::Validation("Full Name is required.".to_string());
        assert_eq!(err.to_string(), "Full Name is required.");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn io_errors_map_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
