//! Request/response messages exchanged with the popup.

use serde::{Deserialize, Serialize};

use crate::analysis::ClassificationResult;
use crate::error::{Result, ScanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// `{"action": "getAnalysis"}`
    GetAnalysis,
}

#[derive(Deserialize)]
struct RawRequest {
    action: String,
}

impl Request {
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawRequest = serde_json::from_str(json)?;
        match raw.action.as_str() {
            "getAnalysis" => Ok(Request::GetAnalysis),
            other => Err(ScanError::UnknownAction(other.to_string())),
        }
    }
}

/// `{"analysis": <result> | null}`; null means no analysis yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub analysis: Option<ClassificationResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_analysis() {
        assert_eq!(Request::parse(r#"{"action": "getAnalysis"}"#).unwrap(), Request::GetAnalysis);
    }

    #[test]
    fn test_unknown_action() {
        let err = Request::parse(r#"{"action": "reset"}"#).unwrap_err();
        assert!(matches!(err, ScanError::UnknownAction(ref a) if a == "reset"));
    }

    #[test]
    fn test_empty_response_is_null() {
        let json = serde_json::to_string(&Response { analysis: None }).unwrap();
        assert_eq!(json, r#"{"analysis":null}"#);
    }
}
