//! Cloud anchor lifecycle coordinator
//!
//! Submits hosting and resolving tasks to an [`ArSession`], keeps track of
//! outstanding requests and delivers one normalized outcome per accepted
//! request to the registered [`CloudAnchorListener`].
//!
//! Delivery policy:
//! - hosting: `Success` is delivered; failures are logged and dropped unless
//!   `CoordinatorConfig::notify_host_failures` is set
//! - resolving: every terminal state is delivered, `Success` without an
//!   anchor is delivered as `ErrorInternal`
//! - a panic while handling a completion never reaches the session; the
//!   listener gets a best-effort `ErrorInternal` notification instead
//! - a submission the session refuses is logged, counted and retired; the
//!   listener is never called from inside `host_anchor`/`resolve_anchor`

use crate::api::listener::CloudAnchorListener;
use crate::api::types::{
    CloudAnchorOutcome, CloudAnchorRequest, CoordinatorStats, RequestId, RequestKind, RequestPhase,
};
use crate::core::{AnchorHandle, CloudAnchorState};
use crate::session::{ArSession, HostCompletion, ResolveCompletion};
use crate::utils::config::CoordinatorConfig;
use log::{debug, error, info, warn};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

/// Bookkeeping for a request that has not been delivered yet
#[derive(Debug, Clone)]
struct PendingRequest {
    kind: RequestKind,
    label: String,
    phase: RequestPhase,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    request_counter: u64,
    pending: HashMap<RequestId, PendingRequest>,
    stats: CoordinatorStats,
}

/// State shared between the coordinator and completions in flight
struct Shared {
    state: Mutex<CoordinatorState>,
    listener: Arc<dyn CloudAnchorListener>,
    config: CoordinatorConfig,
}

impl Shared {
    /// The lock only guards bookkeeping, so a poisoned guard is still consistent
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, kind: RequestKind, label: &str) -> RequestId {
        let mut state = self.lock();
        state.request_counter += 1;
        let request_id = RequestId::new(state.request_counter);
        state.pending.insert(
            request_id,
            PendingRequest {
                kind,
                label: label.to_string(),
                phase: RequestPhase::Created,
            },
        );
        request_id
    }

    fn mark_submitted(&self, request_id: RequestId) {
        let mut state = self.lock();
        state.stats.submitted += 1;
        if let Some(pending) = state.pending.get_mut(&request_id) {
            pending.phase = RequestPhase::Submitted;
        }
    }

    fn record_ignored(&self, kind: RequestKind) {
        self.lock().stats.ignored += 1;
        debug!("event=cloud_task module=coordinator status=ignored kind={}", kind);
    }

    fn is_pending(&self, request_id: RequestId) -> bool {
        self.lock().pending.contains_key(&request_id)
    }

    /// Fault boundary around completion handling. If `work` panics and the
    /// request is still pending, `fallback` is delivered as `ErrorInternal`.
    fn guarded<F: FnOnce()>(&self, fallback: CloudAnchorOutcome, work: F) {
        let request_id = fallback.request_id;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
            error!(
                "event=cloud_task module=coordinator status=fault request={} panic={}",
                request_id,
                panic_message(payload.as_ref())
            );
            if self.is_pending(request_id) {
                self.deliver(fallback.into_internal_error());
            }
        }
    }

    /// Retire a request the session refused. The listener is not called.
    fn retire_rejected(&self, request_id: RequestId) {
        let mut state = self.lock();
        state.stats.rejected += 1;
        state.pending.remove(&request_id);
    }

    fn handle_completion(&self, outcome: CloudAnchorOutcome) {
        let should_deliver = {
            let mut state = self.lock();
            match state.pending.get_mut(&outcome.request_id) {
                Some(pending) => pending.phase = RequestPhase::Completed,
                None => {
                    state.stats.dropped += 1;
                    warn!(
                        "event=cloud_task module=coordinator status=stale request={} state={}",
                        outcome.request_id, outcome.state
                    );
                    return;
                }
            }

            let should_deliver = match outcome.kind {
                RequestKind::Host => outcome.is_success() || self.config.notify_host_failures,
                RequestKind::Resolve => true,
            };
            if !should_deliver {
                state.pending.remove(&outcome.request_id);
                state.stats.dropped += 1;
            }
            should_deliver
        };

        info!(
            "event=cloud_task module=coordinator status=complete kind={} request={} label={} cloud_anchor_id={} state={}",
            outcome.kind, outcome.request_id, outcome.correlation_id, outcome.cloud_anchor_id, outcome.state
        );

        if should_deliver {
            self.deliver(outcome);
        } else {
            warn!(
                "event=cloud_task module=coordinator status=dropped kind={} request={} state={}",
                outcome.kind, outcome.request_id, outcome.state
            );
        }
    }

    /// Invoke the listener outside the lock, then retire the request
    fn deliver(&self, outcome: CloudAnchorOutcome) {
        let request_id = outcome.request_id;
        let mut delivered_state = outcome.state;
        let mut faults = 0;

        let first = panic::catch_unwind(AssertUnwindSafe(|| self.listener.on_outcome(&outcome)));
        if let Err(payload) = first {
            faults += 1;
            error!(
                "event=listener_fault module=coordinator request={} state={} panic={}",
                request_id,
                outcome.state,
                panic_message(payload.as_ref())
            );

            delivered_state = CloudAnchorState::ErrorInternal;
            let fallback = outcome.into_internal_error();
            let second = panic::catch_unwind(AssertUnwindSafe(|| self.listener.on_outcome(&fallback)));
            if let Err(payload) = second {
                faults += 1;
                error!(
                    "event=listener_fault module=coordinator request={} state={} panic={}",
                    request_id,
                    CloudAnchorState::ErrorInternal,
                    panic_message(payload.as_ref())
                );
            }
        }

        let mut state = self.lock();
        state.stats.listener_faults += faults;
        if delivered_state.is_success() {
            state.stats.succeeded += 1;
        } else {
            state.stats.failed += 1;
        }
        if let Some(mut pending) = state.pending.remove(&request_id) {
            pending.phase = RequestPhase::Delivered;
            debug!(
                "event=cloud_task module=coordinator status=delivered kind={} request={} label={} phase={:?}",
                pending.kind, request_id, pending.label, pending.phase
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    message.chars().take(MAX_PANIC_PAYLOAD_CHARS).collect()
}

/// Coordinates cloud anchor hosting and resolving against an AR session
pub struct CloudAnchorCoordinator<S: ArSession> {
    session: Arc<S>,
    shared: Arc<Shared>,
}

impl<S: ArSession> CloudAnchorCoordinator<S> {
    /// Create a coordinator with the default configuration
    pub fn new(session: Arc<S>, listener: Arc<dyn CloudAnchorListener>) -> Self {
        Self::with_config(session, listener, CoordinatorConfig::default())
    }

    pub fn with_config(
        session: Arc<S>,
        listener: Arc<dyn CloudAnchorListener>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            session,
            shared: Arc::new(Shared {
                state: Mutex::new(CoordinatorState::default()),
                listener,
                config,
            }),
        }
    }

    /// Host `anchor` under `name` for `ttl_days`.
    ///
    /// Returns `None` without touching the session when `anchor` is absent.
    /// The outcome arrives later through the listener, never from this call.
    pub fn host_anchor(
        &self,
        name: &str,
        anchor: Option<&AnchorHandle>,
        ttl_days: u32,
    ) -> Option<RequestId> {
        let anchor = match anchor {
            Some(anchor) => anchor,
            None => {
                self.shared.record_ignored(RequestKind::Host);
                return None;
            }
        };

        let request_id = self.shared.register(RequestKind::Host, name);

        let shared = Arc::clone(&self.shared);
        let label = name.to_string();
        let hosted = anchor.clone();
        let completion: HostCompletion = Box::new(move |cloud_anchor_id, state| {
            let fallback = CloudAnchorOutcome::from_raw(
                request_id,
                RequestKind::Host,
                label.clone(),
                None,
                CloudAnchorState::ErrorInternal,
                cloud_anchor_id.clone(),
            );
            shared.guarded(fallback, || {
                shared.handle_completion(CloudAnchorOutcome::from_raw(
                    request_id,
                    RequestKind::Host,
                    label,
                    Some(hosted),
                    state,
                    cloud_anchor_id,
                ))
            });
        });

        self.shared.mark_submitted(request_id);
        debug!(
            "event=cloud_task module=coordinator status=submit kind=host request={} label={} ttl_days={}",
            request_id, name, ttl_days
        );

        if let Err(e) = self.session.host_cloud_anchor_async(anchor, ttl_days, completion) {
            warn!(
                "event=cloud_task module=coordinator status=rejected kind=host request={} label={} state={} error={}",
                request_id,
                name,
                e.as_cloud_anchor_state(),
                e
            );
            self.shared.retire_rejected(request_id);
        }

        Some(request_id)
    }

    /// Host with the configured default TTL
    pub fn host_anchor_with_default_ttl(
        &self,
        name: &str,
        anchor: Option<&AnchorHandle>,
    ) -> Option<RequestId> {
        self.host_anchor(name, anchor, self.shared.config.default_ttl_days)
    }

    /// Resolve a previously hosted anchor by its cloud id.
    ///
    /// Returns `None` without touching the session when the id is absent or empty.
    pub fn resolve_anchor(&self, cloud_anchor_id: Option<&str>) -> Option<RequestId> {
        let cloud_anchor_id = match cloud_anchor_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                self.shared.record_ignored(RequestKind::Resolve);
                return None;
            }
        };

        let request_id = self.shared.register(RequestKind::Resolve, cloud_anchor_id);

        let shared = Arc::clone(&self.shared);
        let label = cloud_anchor_id.to_string();
        let completion: ResolveCompletion = Box::new(move |anchor, state| {
            let fallback = CloudAnchorOutcome::from_raw(
                request_id,
                RequestKind::Resolve,
                label.clone(),
                None,
                CloudAnchorState::ErrorInternal,
                label.clone(),
            );
            shared.guarded(fallback, || {
                shared.handle_completion(CloudAnchorOutcome::from_raw(
                    request_id,
                    RequestKind::Resolve,
                    label.clone(),
                    anchor,
                    state,
                    label,
                ))
            });
        });

        self.shared.mark_submitted(request_id);
        debug!(
            "event=cloud_task module=coordinator status=submit kind=resolve request={} cloud_anchor_id={}",
            request_id, cloud_anchor_id
        );

        if let Err(e) = self.session.resolve_cloud_anchor_async(cloud_anchor_id, completion) {
            warn!(
                "event=cloud_task module=coordinator status=rejected kind=resolve request={} cloud_anchor_id={} state={} error={}",
                request_id,
                cloud_anchor_id,
                e.as_cloud_anchor_state(),
                e
            );
            self.shared.retire_rejected(request_id);
        }

        Some(request_id)
    }

    /// Submit a prepared request
    pub fn submit(&self, request: &CloudAnchorRequest) -> Option<RequestId> {
        match request {
            CloudAnchorRequest::Host { name, anchor, ttl_days } => {
                self.host_anchor(name, Some(anchor), *ttl_days)
            }
            CloudAnchorRequest::Resolve { cloud_anchor_id } => {
                self.resolve_anchor(Some(cloud_anchor_id))
            }
        }
    }

    /// Per-frame update hook. Completions are callback driven, so this only
    /// keeps the interface for existing frame loops.
    pub fn on_update(&self, _updated_anchors: &[AnchorHandle]) {
        let _state = self.shared.lock();
    }

    /// Number of requests submitted but not yet delivered or dropped
    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.shared.is_pending(request_id)
    }

    /// Lifecycle phase of an outstanding request
    pub fn request_phase(&self, request_id: RequestId) -> Option<RequestPhase> {
        self.shared.lock().pending.get(&request_id).map(|p| p.phase)
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.shared.lock().stats.clone()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }
}
