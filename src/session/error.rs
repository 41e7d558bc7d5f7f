//! Session error types and their mapping onto cloud anchor states

use crate::core::CloudAnchorState;
use std::fmt;

/// Errors raised synchronously by an AR session when a task is submitted
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Session is paused and cannot accept tasks
    SessionPaused,
    /// Camera is not tracking, anchors cannot be hosted
    NotTracking,
    /// Cloud anchor mode is disabled in the session configuration
    CloudAnchorsNotConfigured,
    /// Credentials rejected by the hosting service
    NotAuthorized { details: String },
    /// Too many concurrent tasks or quota exceeded
    ResourceExhausted { details: String },
    /// Hosting service cannot be reached
    ServiceUnavailable { details: String },
    /// Argument rejected by the session
    InvalidArgument { parameter: String, reason: String },
    /// Unclassified session failure
    Internal { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::SessionPaused => write!(f, "Session is paused"),
            SessionError::NotTracking => write!(f, "Session is not tracking"),
            SessionError::CloudAnchorsNotConfigured => {
                write!(f, "Cloud anchor mode is not enabled in the session configuration")
            }
            SessionError::NotAuthorized { details } => {
                write!(f, "Not authorized: {}", details)
            }
            SessionError::ResourceExhausted { details } => {
                write!(f, "Resource exhausted: {}", details)
            }
            SessionError::ServiceUnavailable { details } => {
                write!(f, "Hosting service unavailable: {}", details)
            }
            SessionError::InvalidArgument { parameter, reason } => {
                write!(f, "Invalid argument {}: {}", parameter, reason)
            }
            SessionError::Internal { details } => {
                write!(f, "Internal session error: {}", details)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Outcome state reported to listeners when a submission is rejected
    pub fn as_cloud_anchor_state(&self) -> CloudAnchorState {
        match self {
            SessionError::NotAuthorized { .. } => CloudAnchorState::ErrorNotAuthorized,
            SessionError::ResourceExhausted { .. } => CloudAnchorState::ErrorResourceExhausted,
            SessionError::ServiceUnavailable { .. } => CloudAnchorState::ErrorHostingServiceUnavailable,
            SessionError::SessionPaused
            | SessionError::NotTracking
            | SessionError::CloudAnchorsNotConfigured
            | SessionError::InvalidArgument { .. }
            | SessionError::Internal { .. } => CloudAnchorState::ErrorInternal,
        }
    }
}
