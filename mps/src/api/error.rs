use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("[TencentCloudSDKError] Code={code}, Message={message}, RequestId={request_id}")]
    ServiceError {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Failed to sign request: {0}")]
    SigningError(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ApiError {
    /// Service error code, e.g. `ResourceNotFound.FlowNotExist`
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::ServiceError { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code()
            .is_some_and(|code| code.contains("NotFound") || code.contains("NotExist"))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            ApiError::RequestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(code: &str) -> ApiError {
        ApiError::ServiceError {
            code: code.to_string(),
            message: "message".to_string(),
            request_id: "req-1".to_string(),
        }
    }

    #[test]
    fn not_found_matches_both_spellings() {
        assert!(service("ResourceNotFound.FlowNotExist").is_not_found());
        assert!(service("InvalidParameter.TaskNotExist").is_not_found());
        assert!(!service("InvalidParameter.Name").is_not_found());
        assert!(!ApiError::ParseError("x".into()).is_not_found());
    }

    #[test]
    fn display_includes_code_and_request_id() {
        let text = service("InternalError").to_string();
        assert!(text.contains("Code=InternalError"));
        assert!(text.contains("RequestId=req-1"));
    }
}
