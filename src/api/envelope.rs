//! Outcome of a single remote call and its normalization into [`CampusError`].

use serde::Deserialize;

use crate::constants::MSG_UNPARSEABLE_ERROR;
use crate::utils::{CampusError, Result};

/// Raw outcome of one remote invocation
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResponse<T> {
    /// 2xx exchange; `None` when the body (or its `data` payload) was empty
    Success(Option<T>),
    /// Completed exchange with a non-2xx status
    HttpError { status: u16, body: Option<String> },
    /// The exchange never completed (connect, timeout, DNS, body read)
    TransportError(String),
}

/// `{ "data": ... }` wrapper around every successful payload
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// `{ "error": "..." }` wrapper around failures
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Message carried by an error body, or the fixed fallback
pub fn error_message(body: Option<&str>) -> String {
    body.and_then(|b| serde_json::from_str::<ErrorEnvelope>(b).ok())
        .map(|envelope| envelope.error)
        .unwrap_or_else(|| MSG_UNPARSEABLE_ERROR.to_string())
}

impl<T> RemoteResponse<T> {
    /// Normalize into a typed result where a payload is required
    pub fn into_result(self) -> Result<T> {
        match self {
            RemoteResponse::Success(Some(value)) => Ok(value),
            RemoteResponse::Success(None) => Err(CampusError::EmptyBody),
            other => Err(other.failure()),
        }
    }

    /// Normalize where success carries no meaningful payload (deletes)
    pub fn into_ack(self) -> Result<()> {
        match self {
            RemoteResponse::Success(_) => Ok(()),
            other => Err(other.failure()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RemoteResponse<U> {
        match self {
            RemoteResponse::Success(value) => RemoteResponse::Success(value.map(f)),
            RemoteResponse::HttpError { status, body } => RemoteResponse::HttpError { status, body },
            RemoteResponse::TransportError(message) => RemoteResponse::TransportError(message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RemoteResponse::Success(_))
    }

    fn failure(self) -> CampusError {
        match self {
            RemoteResponse::Success(_) => CampusError::EmptyBody,
            RemoteResponse::HttpError { status, body } => CampusError::Api {
                status,
                message: error_message(body.as_deref()),
            },
            RemoteResponse::TransportError(message) => CampusError::Transport(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_with_body() {
        let response = RemoteResponse::Success(Some(vec![1, 2, 3]));
        assert_eq!(response.into_result(), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn test_success_without_body_is_empty_body_failure() {
        let response: RemoteResponse<u32> = RemoteResponse::Success(None);
        let err = response.into_result().unwrap_err();
        assert_eq!(err, CampusError::EmptyBody);
        assert_eq!(err.message(), "empty response body");
    }

    #[test]
    fn test_http_error_uses_envelope_message() {
        let response: RemoteResponse<u32> = RemoteResponse::HttpError {
            status: 403,
            body: Some(r#"{"error":"not enrolled in this class"}"#.to_string()),
        };
        assert_eq!(
            response.into_result(),
            Err(CampusError::Api {
                status: 403,
                message: "not enrolled in this class".to_string()
            })
        );
    }

    #[test]
    fn test_unparseable_or_missing_error_body_falls_back() {
        for body in [
            None,
            Some("<html>Bad Gateway</html>".to_string()),
            Some(r#"{"message":"wrong field"}"#.to_string()),
            Some(String::new()),
        ] {
            let response: RemoteResponse<u32> = RemoteResponse::HttpError { status: 502, body };
            let err = response.into_result().unwrap_err();
            assert_eq!(err.message(), "failed to parse error response");
        }
    }

    #[test]
    fn test_transport_error_keeps_message() {
        let response: RemoteResponse<u32> =
            RemoteResponse::TransportError("operation timed out".to_string());
        assert_eq!(
            response.into_result(),
            Err(CampusError::Transport("operation timed out".to_string()))
        );
    }

    #[test]
    fn test_ack_accepts_empty_success() {
        let response: RemoteResponse<serde_json::Value> = RemoteResponse::Success(None);
        assert_eq!(response.into_ack(), Ok(()));

        let response: RemoteResponse<serde_json::Value> = RemoteResponse::HttpError {
            status: 404,
            body: Some(r#"{"error":"gone"}"#.to_string()),
        };
        assert_eq!(response.into_ack().unwrap_err().message(), "gone");
    }

    #[test]
    fn test_map_preserves_failures() {
        let response: RemoteResponse<u32> = RemoteResponse::Success(Some(2));
        assert_eq!(response.map(|v| v * 10), RemoteResponse::Success(Some(20)));

        let response: RemoteResponse<u32> = RemoteResponse::TransportError("x".into());
        assert_eq!(
            response.map(|v| v * 10),
            RemoteResponse::TransportError("x".into())
        );
    }
}
