//! Mock AR session for testing and development

use crate::core::{AnchorHandle, CloudAnchorState};
use crate::session::{ArSession, HostCompletion, ResolveCompletion, SessionError, SessionResult};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Hosting task captured by the mock, completed on demand
pub struct PendingHostTask {
    pub anchor: AnchorHandle,
    pub ttl_days: u32,
    completion: HostCompletion,
}

impl PendingHostTask {
    /// Fire the session completion with the given payload
    pub fn complete(self, cloud_anchor_id: &str, state: CloudAnchorState) {
        (self.completion)(cloud_anchor_id.to_string(), state);
    }
}

/// Resolving task captured by the mock, completed on demand
pub struct PendingResolveTask {
    pub cloud_anchor_id: String,
    completion: ResolveCompletion,
}

impl PendingResolveTask {
    pub fn complete(self, anchor: Option<AnchorHandle>, state: CloudAnchorState) {
        (self.completion)(anchor, state);
    }
}

#[derive(Default)]
struct MockState {
    host_tasks: VecDeque<PendingHostTask>,
    resolve_tasks: VecDeque<PendingResolveTask>,
    host_submissions: usize,
    resolve_submissions: usize,
    next_error: Option<SessionError>,
}

/// Mock session that queues submitted tasks until a test completes them
#[derive(Default)]
pub struct MockSession {
    state: Mutex<MockState>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reject the next submission (host or resolve) with `error`
    pub fn fail_next_submission(&self, error: SessionError) {
        self.lock().next_error = Some(error);
    }

    /// Total hosting tasks accepted so far
    pub fn host_submission_count(&self) -> usize {
        self.lock().host_submissions
    }

    /// Total resolving tasks accepted so far
    pub fn resolve_submission_count(&self) -> usize {
        self.lock().resolve_submissions
    }

    pub fn queued_host_count(&self) -> usize {
        self.lock().host_tasks.len()
    }

    pub fn queued_resolve_count(&self) -> usize {
        self.lock().resolve_tasks.len()
    }

    /// Remove the oldest queued hosting task, e.g. to complete it on another thread
    pub fn take_host_task(&self) -> Option<PendingHostTask> {
        self.lock().host_tasks.pop_front()
    }

    pub fn take_resolve_task(&self) -> Option<PendingResolveTask> {
        self.lock().resolve_tasks.pop_front()
    }

    /// Complete the oldest hosting task. Returns false if none is queued.
    pub fn complete_next_host(&self, cloud_anchor_id: &str, state: CloudAnchorState) -> bool {
        // Lock released before the completion runs
        match self.take_host_task() {
            Some(task) => {
                task.complete(cloud_anchor_id, state);
                true
            }
            None => false,
        }
    }

    /// Complete the oldest resolving task. Returns false if none is queued.
    pub fn complete_next_resolve(&self, anchor: Option<AnchorHandle>, state: CloudAnchorState) -> bool {
        match self.take_resolve_task() {
            Some(task) => {
                task.complete(anchor, state);
                true
            }
            None => false,
        }
    }
}

impl ArSession for MockSession {
    fn host_cloud_anchor_async(
        &self,
        anchor: &AnchorHandle,
        ttl_days: u32,
        completion: HostCompletion,
    ) -> SessionResult<()> {
        let mut state = self.lock();
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state.host_submissions += 1;
        state.host_tasks.push_back(PendingHostTask {
            anchor: anchor.clone(),
            ttl_days,
            completion,
        });
        Ok(())
    }

    fn resolve_cloud_anchor_async(
        &self,
        cloud_anchor_id: &str,
        completion: ResolveCompletion,
    ) -> SessionResult<()> {
        let mut state = self.lock();
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state.resolve_submissions += 1;
        state.resolve_tasks.push_back(PendingResolveTask {
            cloud_anchor_id: cloud_anchor_id.to_string(),
            completion,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose;
    use std::sync::Arc;

    #[test]
    fn test_mock_session_creation() {
        let session = MockSession::new();
        assert_eq!(session.host_submission_count(), 0);
        assert_eq!(session.resolve_submission_count(), 0);
        assert!(!session.complete_next_host("id", CloudAnchorState::Success));
    }

    #[test]
    fn test_host_task_queue() {
        let session = MockSession::new();
        let received = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let anchor = AnchorHandle::new(7, Pose::identity());

        session
            .host_cloud_anchor_async(
                &anchor,
                30,
                Box::new(move |id, state| {
                    *sink.lock().unwrap() = Some((id, state));
                }),
            )
            .unwrap();
        assert_eq!(session.queued_host_count(), 1);

        let task = session.take_host_task().unwrap();
        assert_eq!(task.ttl_days, 30);
        assert_eq!(task.anchor.id, 7);
        task.complete("cloud-1", CloudAnchorState::Success);

        assert_eq!(
            *received.lock().unwrap(),
            Some(("cloud-1".to_string(), CloudAnchorState::Success))
        );
    }

    #[test]
    fn test_rejected_submission() {
        let session = MockSession::new();
        session.fail_next_submission(SessionError::SessionPaused);

        let result = session.resolve_cloud_anchor_async("abc", Box::new(|_, _| {}));
        assert_eq!(result, Err(SessionError::SessionPaused));
        assert_eq!(session.resolve_submission_count(), 0);

        // Only the next submission fails
        assert!(session.resolve_cloud_anchor_async("abc", Box::new(|_, _| {})).is_ok());
        assert_eq!(session.queued_resolve_count(), 1);
    }
}
