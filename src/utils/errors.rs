use thiserror::Error;

use crate::constants::{MSG_BLANK_URL, MSG_EMPTY_RESPONSE_BODY};

/// Main error type for Campus
///
/// Every failure that crosses a component boundary is one of these. The
/// `Display` output is the message the UI shows to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CampusError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{}", MSG_EMPTY_RESPONSE_BODY)]
    EmptyBody,

    #[error("{}", MSG_BLANK_URL)]
    BlankUrl,

    #[error("image download failed: {0}")]
    ImageNetwork(String),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CampusError {
    /// Human-readable message for display
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status for application-level failures
    pub fn status(&self) -> Option<u16> {
        match self {
            CampusError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CampusError::Api { status: 401, .. })
    }
}

impl From<std::io::Error> for CampusError {
    fn from(err: std::io::Error) -> Self {
        CampusError::Io(err.to_string())
    }
}

/// Result alias used at component boundaries
pub type Result<T> = std::result::Result<T, CampusError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MSG_UNPARSEABLE_ERROR;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(CampusError::EmptyBody.message(), "empty response body");
        assert_eq!(
            CampusError::Api {
                status: 500,
                message: MSG_UNPARSEABLE_ERROR.to_string()
            }
            .message(),
            "failed to parse error response"
        );
        assert_eq!(
            CampusError::Transport("connection refused".into()).message(),
            "connection refused"
        );
    }

    #[test]
    fn test_status_helpers() {
        let err = CampusError::Api {
            status: 401,
            message: "unauthorized".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
        assert_eq!(CampusError::EmptyBody.status(), None);
    }
}
