use thiserror::Error;

/// Top-level error type for the Broadsheet pipeline.
#[derive(Debug, Error)]
pub enum BroadsheetError {
    /// Network, auth, quota or timeout failure from the model or the OCR backend.
    #[error("external service error ({service}): {message}")]
    ExternalService { service: String, message: String },

    /// The service answered, but its payload could not be parsed.
    #[error("malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("file access error ({path}): {message}")]
    FileAccess { path: String, message: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = BroadsheetError> = std::result::Result<T, E>;

impl BroadsheetError {
    pub fn external(service: impl Into<String>, message: impl ToString) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(service: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedResponse {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn file_access(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::FileAccess {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_external_failures_are_transient() {
        assert!(BroadsheetError::external("gemini", "503").is_transient());
        assert!(!BroadsheetError::malformed("gemini", "eof").is_transient());
        assert!(!BroadsheetError::file_access("/nope.png", "denied").is_transient());
        assert!(!BroadsheetError::ConfigError("bad".into()).is_transient());
    }

    #[test]
    fn display_names_the_service() {
        let err = BroadsheetError::external("ocr", "connection refused");
        assert_eq!(err.to_string(), "external service error (ocr): connection refused");
    }
}
