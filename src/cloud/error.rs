// ABOUTME: Error type returned by every provisioning, identity, and asset collaborator.
// ABOUTME: Classifies failures so expired credentials can be recognized and passed through untouched.

use std::fmt;

/// Classification of a collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudErrorKind {
    /// The caller's own credentials have expired. Never retried or rewrapped.
    ExpiredToken,
    /// The principal is not allowed to perform the call.
    AccessDenied,
    /// The addressed resource does not exist.
    NotFound,
    /// The service throttled the request.
    Throttled,
    /// Anything else.
    Other,
}

impl CloudErrorKind {
    /// Service-style error code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            CloudErrorKind::ExpiredToken => "ExpiredToken",
            CloudErrorKind::AccessDenied => "AccessDenied",
            CloudErrorKind::NotFound => "NotFound",
            CloudErrorKind::Throttled => "Throttling",
            CloudErrorKind::Other => "Error",
        }
    }
}

impl fmt::Display for CloudErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CloudError {
    pub kind: CloudErrorKind,
    pub message: String,
}

impl CloudError {
    pub fn new(kind: CloudErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::new(CloudErrorKind::ExpiredToken, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(CloudErrorKind::AccessDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CloudErrorKind::NotFound, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(CloudErrorKind::Other, message)
    }

    pub fn is_expired_token(&self) -> bool {
        self.kind == CloudErrorKind::ExpiredToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = CloudError::expired_token("The security token included in the request is expired");
        assert_eq!(
            err.to_string(),
            "ExpiredToken: The security token included in the request is expired"
        );
        assert!(err.is_expired_token());
    }

    #[test]
    fn other_kinds_are_not_expired_tokens() {
        assert!(!CloudError::access_denied("nope").is_expired_token());
        assert!(!CloudError::not_found("Stack with id app does not exist").is_expired_token());
        assert!(!CloudError::other("boom").is_expired_token());
    }
}
