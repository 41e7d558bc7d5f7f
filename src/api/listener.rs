//! Listener interfaces for cloud anchor task completion

use crate::api::types::CloudAnchorOutcome;
use crate::core::{AnchorHandle, CloudAnchorState};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Receives exactly one notification per accepted request.
///
/// May be called from any thread the AR session completes tasks on.
pub trait CloudAnchorListener: Send + Sync {
    /// Called when a cloud anchor task finishes.
    ///
    /// `anchor_name` is the hosted anchor's name, or the cloud anchor id
    /// for resolve requests.
    fn on_cloud_task_complete(
        &self,
        anchor_name: Option<&str>,
        anchor: Option<&AnchorHandle>,
        state: CloudAnchorState,
        cloud_anchor_id: &str,
    );

    /// Full outcome hook, forwards to `on_cloud_task_complete` by default.
    ///
    /// The coordinator always calls this one. Listeners that override it
    /// should rebuild an outcome in `on_cloud_task_complete` so both entry
    /// points deliver.
    fn on_outcome(&self, outcome: &CloudAnchorOutcome) {
        self.on_cloud_task_complete(
            Some(&outcome.correlation_id),
            outcome.anchor.as_ref(),
            outcome.state,
            &outcome.cloud_anchor_id,
        );
    }
}

/// Listener backed by a closure over the full outcome
pub struct FnListener<F> {
    callback: F,
}

/// Wrap a closure as a listener
pub fn listener_fn<F>(callback: F) -> FnListener<F>
where
    F: Fn(&CloudAnchorOutcome) + Send + Sync,
{
    FnListener { callback }
}

impl<F> CloudAnchorListener for FnListener<F>
where
    F: Fn(&CloudAnchorOutcome) + Send + Sync,
{
    fn on_cloud_task_complete(
        &self,
        anchor_name: Option<&str>,
        anchor: Option<&AnchorHandle>,
        state: CloudAnchorState,
        cloud_anchor_id: &str,
    ) {
        self.on_outcome(&CloudAnchorOutcome::from_notification(
            anchor_name,
            anchor,
            state,
            cloud_anchor_id,
        ));
    }

    fn on_outcome(&self, outcome: &CloudAnchorOutcome) {
        (self.callback)(outcome);
    }
}

/// Listener that forwards owned outcomes over a channel
pub struct ChannelListener {
    sender: Mutex<Sender<CloudAnchorOutcome>>,
}

impl ChannelListener {
    /// Create a listener together with the receiving end of its channel
    pub fn new() -> (Self, Receiver<CloudAnchorOutcome>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender: Mutex::new(sender) }, receiver)
    }
}

impl CloudAnchorListener for ChannelListener {
    fn on_cloud_task_complete(
        &self,
        anchor_name: Option<&str>,
        anchor: Option<&AnchorHandle>,
        state: CloudAnchorState,
        cloud_anchor_id: &str,
    ) {
        self.on_outcome(&CloudAnchorOutcome::from_notification(
            anchor_name,
            anchor,
            state,
            cloud_anchor_id,
        ));
    }

    fn on_outcome(&self, outcome: &CloudAnchorOutcome) {
        let sender = match self.sender.lock() {
            Ok(sender) => sender,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Receiver dropped means nobody is waiting any more
        let _ = sender.send(outcome.clone());
    }
}
