//! Classification of MPS failures for [`RetryPolicy`]

use std::future::Future;
use tfplug::retry::{RetryError, RetryPolicy};

use crate::api::ApiError;

/// Service error codes, or code prefixes before the first `.`, that are
/// transient on the MPS side.
const RETRYABLE_CODES: &[&str] = &[
    "FailedOperation",
    "InternalError",
    "RequestLimitExceeded",
    "ResourceInUse",
    "ResourceInsufficient",
    "ResourceUnavailable",
    "ResourceBusy",
];

pub fn retryable(err: &ApiError) -> bool {
    match err {
        ApiError::RequestError(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| transient_status(s.as_u16()))
        }
        ApiError::HttpError { status, .. } => transient_status(*status),
        ApiError::ServiceError { code, .. } => {
            let prefix = code.split('.').next().unwrap_or(code);
            RETRYABLE_CODES.contains(&code.as_str()) || RETRYABLE_CODES.contains(&prefix)
        }
        ApiError::ParseError(_) | ApiError::SigningError(_) | ApiError::InvalidEndpoint(_) => false,
    }
}

fn transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

pub fn classify(err: ApiError) -> RetryError<ApiError> {
    if retryable(&err) {
        RetryError::Retryable(err)
    } else {
        RetryError::NonRetryable(err)
    }
}

/// Runs one MPS call under `policy`, retrying transient failures.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    policy
        .run(|| {
            let attempt = operation();
            async move { attempt.await.map_err(classify) }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn service(code: &str) -> ApiError {
        ApiError::ServiceError {
            code: code.to_string(),
            message: String::new(),
            request_id: String::new(),
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(500),
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    #[test]
    fn transient_codes_and_prefixes_are_retryable() {
        assert!(retryable(&service("InternalError")));
        assert!(retryable(&service("RequestLimitExceeded")));
        assert!(retryable(&service("ResourceUnavailable.Busy")));
        assert!(retryable(&service("FailedOperation.FlowRunning")));
        assert!(!retryable(&service("InvalidParameter.Definition")));
        assert!(!retryable(&service("ResourceNotFound.FlowNotExist")));
        assert!(!retryable(&service("AuthFailure.SignatureFailure")));
    }

    #[test]
    fn throttling_and_server_errors_are_retryable() {
        let http = |status| ApiError::HttpError {
            status,
            message: String::new(),
        };
        assert!(retryable(&http(429)));
        assert!(retryable(&http(503)));
        assert!(!retryable(&http(400)));
        assert!(!retryable(&ApiError::ParseError("bad json".into())));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(service("InternalError"))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(service("InvalidParameterValue.Name"))
        })
        .await;

        assert_eq!(result.unwrap_err().code(), Some("InvalidParameterValue.Name"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
