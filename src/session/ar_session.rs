//! External AR session collaborator trait

use crate::core::{AnchorHandle, CloudAnchorState};
use crate::session::SessionResult;

/// Completion invoked by the session when a hosting task finishes.
/// Receives the generated cloud anchor id (empty on failure) and the state.
pub type HostCompletion = Box<dyn FnOnce(String, CloudAnchorState) + Send + 'static>;

/// Completion invoked by the session when a resolving task finishes.
/// Receives the resolved anchor, if any, and the state.
pub type ResolveCompletion = Box<dyn FnOnce(Option<AnchorHandle>, CloudAnchorState) + Send + 'static>;

/// Asynchronous cloud anchor primitives of an AR session.
///
/// Both methods must return as soon as the task is enqueued. The completion
/// may run later on any thread the session chooses, or never.
pub trait ArSession: Send + Sync {
    /// Submit a hosting task for `anchor` with the requested lifetime
    /// Returns Err(error) if the session rejects the task up front; in that
    /// case `completion` is dropped without being called
    fn host_cloud_anchor_async(
        &self,
        anchor: &AnchorHandle,
        ttl_days: u32,
        completion: HostCompletion,
    ) -> SessionResult<()>;

    /// Submit a resolving task for `cloud_anchor_id`
    /// Same rejection contract as [`ArSession::host_cloud_anchor_async`]
    fn resolve_cloud_anchor_async(
        &self,
        cloud_anchor_id: &str,
        completion: ResolveCompletion,
    ) -> SessionResult<()>;
}
