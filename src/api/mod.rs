//! Cloud anchor coordination API
//!
//! This module provides the lifecycle coordinator, the listener interfaces
//! it delivers to, and the request/outcome types shared with callers.

pub mod coordinator;
pub mod listener;
pub mod types;

// Re-export commonly used API types
pub use types::{
    ApiError, ApiResult, CloudAnchorOutcome, CloudAnchorRequest, CloudTaskResult,
    CoordinatorStats, RequestId, RequestKind, RequestPhase,
};
pub use coordinator::CloudAnchorCoordinator;
pub use listener::{listener_fn, ChannelListener, CloudAnchorListener, FnListener};
