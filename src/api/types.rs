//! Common API types: request bookkeeping, normalized outcomes and errors

use crate::core::{AnchorHandle, CloudAnchorState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No registry entry with this name
    UnknownAnchor { name: String },
    /// Registry entry with this name already exists
    DuplicateAnchor { name: String },
    /// Requested lifetime outside the hosting service limits
    InvalidTtl { ttl_days: u32, min: u32, max: u32 },
    /// Flattened transform could not be interpreted
    InvalidTransform { reason: String },
    /// Record could not be converted to its wire form
    SerializationError { message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnknownAnchor { name } => write!(f, "Unknown anchor '{}'", name),
            ApiError::DuplicateAnchor { name } => write!(f, "Anchor '{}' already registered", name),
            ApiError::InvalidTtl { ttl_days, min, max } => {
                write!(f, "TTL of {} days outside allowed range {}..={}", ttl_days, min, max)
            }
            ApiError::InvalidTransform { reason } => write!(f, "Invalid transform: {}", reason),
            ApiError::SerializationError { message } => write!(f, "Serialization error: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Request handle for correlating submissions with outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Id carried by outcomes that did not come from a coordinator request
    pub const UNTRACKED: RequestId = RequestId(0);

    pub(crate) fn new(id: u64) -> Self {
        RequestId(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Host,
    Resolve,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Host => f.write_str("host"),
            RequestKind::Resolve => f.write_str("resolve"),
        }
    }
}

/// Lifecycle phase of a request.
///
/// `Created -> Submitted -> Completed -> Delivered`, after which the
/// coordinator forgets the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Created,
    Submitted,
    Completed,
    Delivered,
}

/// A single hosting or resolving request
#[derive(Debug, Clone, PartialEq)]
pub enum CloudAnchorRequest {
    Host {
        name: String,
        anchor: AnchorHandle,
        ttl_days: u32,
    },
    Resolve {
        cloud_anchor_id: String,
    },
}

impl CloudAnchorRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            CloudAnchorRequest::Host { .. } => RequestKind::Host,
            CloudAnchorRequest::Resolve { .. } => RequestKind::Resolve,
        }
    }

    /// Label handed back to the listener: the anchor name for hosting,
    /// the cloud anchor id for resolving
    pub fn correlation_label(&self) -> &str {
        match self {
            CloudAnchorRequest::Host { name, .. } => name,
            CloudAnchorRequest::Resolve { cloud_anchor_id } => cloud_anchor_id,
        }
    }
}

/// Tagged terminal result of a request
#[derive(Debug, Clone, PartialEq)]
pub enum CloudTaskResult {
    Success(AnchorHandle),
    Failure(CloudAnchorState),
}

impl CloudTaskResult {
    pub fn state(&self) -> CloudAnchorState {
        match self {
            CloudTaskResult::Success(_) => CloudAnchorState::Success,
            CloudTaskResult::Failure(state) => *state,
        }
    }
}

/// Normalized outcome of a request.
///
/// `anchor` is present if and only if `state` is `Success`.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAnchorOutcome {
    pub request_id: RequestId,
    pub kind: RequestKind,
    /// Anchor name for hosting, cloud anchor id for resolving
    pub correlation_id: String,
    pub state: CloudAnchorState,
    pub anchor: Option<AnchorHandle>,
    pub cloud_anchor_id: String,
}

impl CloudAnchorOutcome {
    /// Build an outcome from a raw session payload.
    ///
    /// A `Success` without an anchor becomes `ErrorInternal`; any other state
    /// drops the anchor.
    pub fn from_raw(
        request_id: RequestId,
        kind: RequestKind,
        correlation_id: String,
        anchor: Option<AnchorHandle>,
        state: CloudAnchorState,
        cloud_anchor_id: String,
    ) -> Self {
        let (state, anchor) = match (state, anchor) {
            (CloudAnchorState::Success, Some(anchor)) => (CloudAnchorState::Success, Some(anchor)),
            (CloudAnchorState::Success, None) => (CloudAnchorState::ErrorInternal, None),
            (state, _) => (state, None),
        };

        Self {
            request_id,
            kind,
            correlation_id,
            state,
            anchor,
            cloud_anchor_id,
        }
    }

    /// Rebuild an outcome from the four listener arguments.
    ///
    /// Resolve notifications carry the cloud anchor id as their name, which
    /// is how the kind is recovered. The request id is `RequestId::UNTRACKED`.
    pub fn from_notification(
        anchor_name: Option<&str>,
        anchor: Option<&AnchorHandle>,
        state: CloudAnchorState,
        cloud_anchor_id: &str,
    ) -> Self {
        let kind = match anchor_name {
            Some(name) if !cloud_anchor_id.is_empty() && name == cloud_anchor_id => {
                RequestKind::Resolve
            }
            _ => RequestKind::Host,
        };
        Self::from_raw(
            RequestId::UNTRACKED,
            kind,
            anchor_name.unwrap_or_default().to_string(),
            anchor.cloned(),
            state,
            cloud_anchor_id.to_string(),
        )
    }

    /// Same outcome with the state forced to `ErrorInternal`
    pub fn into_internal_error(self) -> Self {
        Self {
            state: CloudAnchorState::ErrorInternal,
            anchor: None,
            ..self
        }
    }

    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }

    pub fn result(&self) -> CloudTaskResult {
        match (&self.anchor, self.state) {
            (Some(anchor), CloudAnchorState::Success) => CloudTaskResult::Success(anchor.clone()),
            (_, CloudAnchorState::Success) => CloudTaskResult::Failure(CloudAnchorState::ErrorInternal),
            (_, state) => CloudTaskResult::Failure(state),
        }
    }
}

/// Coordinator counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Requests handed to the session, rejected submissions included
    pub submitted: u64,
    /// Requests ignored by the absent-input policy
    pub ignored: u64,
    /// Outcomes delivered with `Success`
    pub succeeded: u64,
    /// Outcomes delivered with an error state
    pub failed: u64,
    /// Terminal completions not delivered (host failures, stale completions)
    pub dropped: u64,
    /// Submissions the session refused; retired without a notification
    pub rejected: u64,
    /// Listener invocations that panicked
    pub listener_faults: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose;

    fn outcome(anchor: Option<AnchorHandle>, state: CloudAnchorState) -> CloudAnchorOutcome {
        CloudAnchorOutcome::from_raw(
            RequestId::new(1),
            RequestKind::Resolve,
            "cloud-1".to_string(),
            anchor,
            state,
            "cloud-1".to_string(),
        )
    }

    #[test]
    fn test_success_without_anchor_is_internal_error() {
        let outcome = outcome(None, CloudAnchorState::Success);
        assert_eq!(outcome.state, CloudAnchorState::ErrorInternal);
        assert!(outcome.anchor.is_none());
        assert_eq!(outcome.result(), CloudTaskResult::Failure(CloudAnchorState::ErrorInternal));
    }

    #[test]
    fn test_failure_drops_anchor() {
        let anchor = AnchorHandle::new(3, Pose::identity());
        let outcome = outcome(Some(anchor), CloudAnchorState::ErrorCloudIdNotFound);
        assert!(outcome.anchor.is_none());
        assert_eq!(outcome.result().state(), CloudAnchorState::ErrorCloudIdNotFound);
    }

    #[test]
    fn test_success_keeps_anchor() {
        let anchor = AnchorHandle::new(3, Pose::identity());
        let outcome = outcome(Some(anchor.clone()), CloudAnchorState::Success);
        assert!(outcome.is_success());
        assert_eq!(outcome.result(), CloudTaskResult::Success(anchor));

        let failed = outcome.into_internal_error();
        assert_eq!(failed.state, CloudAnchorState::ErrorInternal);
        assert!(failed.anchor.is_none());
    }

    #[test]
    fn test_request_label() {
        let request = CloudAnchorRequest::Resolve { cloud_anchor_id: "abc".to_string() };
        assert_eq!(request.kind(), RequestKind::Resolve);
        assert_eq!(request.correlation_label(), "abc");
    }

    #[test]
    fn test_from_notification_recovers_kind() {
        let anchor = AnchorHandle::new(4, Pose::identity());

        let resolved = CloudAnchorOutcome::from_notification(
            Some("cloud-4"),
            Some(&anchor),
            CloudAnchorState::Success,
            "cloud-4",
        );
        assert_eq!(resolved.kind, RequestKind::Resolve);
        assert_eq!(resolved.request_id, RequestId::UNTRACKED);
        assert_eq!(resolved.anchor, Some(anchor.clone()));

        let hosted = CloudAnchorOutcome::from_notification(
            Some("table"),
            Some(&anchor),
            CloudAnchorState::Success,
            "cloud-4",
        );
        assert_eq!(hosted.kind, RequestKind::Host);
        assert_eq!(hosted.correlation_id, "table");

        let failed = CloudAnchorOutcome::from_notification(None, None, CloudAnchorState::ErrorInternal, "");
        assert_eq!(failed.kind, RequestKind::Host);
        assert_eq!(failed.correlation_id, "");
    }
}
