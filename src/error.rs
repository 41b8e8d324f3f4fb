use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("External classifier failed: {0}")]
    ExternalServiceError(String),

    #[error("Could not parse classifier response: {0}")]
    ResponseParseError(String),

    #[error("External classifier timed out after {0}s")]
    TimeoutError(u64),

    #[error("Frame is cross-origin: {0}")]
    CrossOriginAccessDenied(String),

    #[error("Messaging channel unavailable")]
    MessagingUnavailable,

    #[error("Unknown message action: {0}")]
    UnknownAction(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ScanError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ScanError::HttpError(_) => Some(
                "Check your internet connection, or analyze a saved copy:\n  jobscan analyze page.html"
            ),
            ScanError::ExternalServiceError(_) | ScanError::TimeoutError(_) => Some(
                "Keyword results are still available. Disable AI with:\n  jobscan settings set --enable-ai false"
            ),
            ScanError::ConfigError(_) => Some(
                "Check your settings with `jobscan settings show`"
            ),
            ScanError::UnknownAction(_) => Some(
                "The only supported action is \"getAnalysis\""
            ),
            _ => None,
        }
    }

    /// Whether this error came from the external classifier path.
    /// These never reach the user; the caller falls back to keyword results.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            ScanError::ExternalServiceError(_)
                | ScanError::ResponseParseError(_)
                | ScanError::TimeoutError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_errors_are_flagged() {
        assert!(ScanError::TimeoutError(15).is_external());
        assert!(ScanError::ResponseParseError("no json".into()).is_external());
        assert!(!ScanError::MessagingUnavailable.is_external());
    }

    #[test]
    fn test_hint_for_unknown_action() {
        let err = ScanError::UnknownAction("ping".into());
        assert!(err.hint().unwrap().contains("getAnalysis"));
    }
}
