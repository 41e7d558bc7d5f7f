//! Anchor registry: local anchor names, cloud anchor ids and scene children
//!
//! The caller owns the registry. [`RegistryListener`] keeps it in step with
//! coordinator outcomes before passing them on.

use crate::api::listener::CloudAnchorListener;
use crate::api::types::{ApiError, ApiResult, CloudAnchorOutcome, RequestKind};
use crate::codec::{
    serialize_anchor, serialize_geospatial_anchor, AnchorKind, AnchorNode, GeodeticPose,
    SerializedAnchorRecord,
};
use crate::core::{AnchorHandle, CloudAnchorState};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One named anchor and everything known about it
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub node: AnchorNode,
    pub anchor: Option<AnchorHandle>,
    pub cloud_anchor_id: Option<String>,
    pub geodetic: Option<GeodeticPose>,
}

impl RegistryEntry {
    pub fn kind(&self) -> AnchorKind {
        if self.geodetic.is_some() {
            AnchorKind::Geospatial
        } else {
            AnchorKind::Plane
        }
    }

    /// Wire record snapshot of this entry
    pub fn to_record(&self) -> SerializedAnchorRecord {
        match (&self.anchor, &self.geodetic) {
            (Some(anchor), Some(geodetic)) => serialize_geospatial_anchor(
                anchor,
                &self.node,
                &self.node.name,
                geodetic,
                self.cloud_anchor_id.as_deref(),
            ),
            _ => serialize_anchor(&self.node, self.anchor.as_ref(), self.cloud_anchor_id.as_deref()),
        }
    }
}

#[derive(Debug, Default)]
pub struct AnchorRegistry {
    entries: HashMap<String, RegistryEntry>,
    /// cloud anchor id -> entry name
    names_by_cloud_id: HashMap<String, String>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: &str, entry: RegistryEntry) -> ApiResult<()> {
        if self.entries.contains_key(name) {
            return Err(ApiError::DuplicateAnchor { name: name.to_string() });
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    fn entry_mut(&mut self, name: &str) -> ApiResult<&mut RegistryEntry> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| ApiError::UnknownAnchor { name: name.to_string() })
    }

    /// Register a plane anchor. `anchor` may be absent until the session
    /// provides one.
    pub fn add_anchor(&mut self, name: &str, anchor: Option<AnchorHandle>) -> ApiResult<()> {
        self.insert(
            name,
            RegistryEntry {
                node: AnchorNode::new(name),
                anchor,
                cloud_anchor_id: None,
                geodetic: None,
            },
        )
    }

    pub fn add_geospatial_anchor(
        &mut self,
        name: &str,
        anchor: AnchorHandle,
        geodetic: GeodeticPose,
    ) -> ApiResult<()> {
        self.insert(
            name,
            RegistryEntry {
                node: AnchorNode::new(name),
                anchor: Some(anchor),
                cloud_anchor_id: None,
                geodetic: Some(geodetic),
            },
        )
    }

    /// Attach a child scene node name to an anchor
    pub fn add_child(&mut self, name: &str, child: &str) -> ApiResult<()> {
        self.entry_mut(name)?.node.child_names.push(child.to_string());
        Ok(())
    }

    pub fn set_anchor(&mut self, name: &str, anchor: AnchorHandle) -> ApiResult<()> {
        self.entry_mut(name)?.anchor = Some(anchor);
        Ok(())
    }

    pub fn set_cloud_anchor_id(&mut self, name: &str, cloud_anchor_id: &str) -> ApiResult<()> {
        let entry = self.entry_mut(name)?;
        let previous = entry.cloud_anchor_id.replace(cloud_anchor_id.to_string());
        if let Some(previous) = previous {
            self.names_by_cloud_id.remove(&previous);
        }
        self.names_by_cloud_id
            .insert(cloud_anchor_id.to_string(), name.to_string());
        Ok(())
    }

    pub fn name_for_cloud_id(&self, cloud_anchor_id: &str) -> Option<&str> {
        self.names_by_cloud_id.get(cloud_anchor_id).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<RegistryEntry> {
        let entry = self.entries.remove(name)?;
        if let Some(cloud_anchor_id) = &entry.cloud_anchor_id {
            self.names_by_cloud_id.remove(cloud_anchor_id);
        }
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn serialize_anchor(&self, name: &str) -> ApiResult<SerializedAnchorRecord> {
        self.entries
            .get(name)
            .map(RegistryEntry::to_record)
            .ok_or_else(|| ApiError::UnknownAnchor { name: name.to_string() })
    }

    /// Records for every entry, ordered by name
    pub fn serialize_all(&self) -> Vec<SerializedAnchorRecord> {
        self.names()
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(RegistryEntry::to_record)
            .collect()
    }

    /// Apply a delivered outcome.
    ///
    /// Hosting success stores the generated cloud id on the named entry.
    /// Resolving success stores the anchor on the entry known for that cloud
    /// id, or registers a new entry named after the cloud id. Returns the
    /// name of the updated entry.
    pub fn record_outcome(&mut self, outcome: &CloudAnchorOutcome) -> Option<String> {
        if outcome.state != CloudAnchorState::Success {
            return None;
        }

        let name = match outcome.kind {
            RequestKind::Host => {
                let name = outcome.correlation_id.clone();
                self.set_cloud_anchor_id(&name, &outcome.cloud_anchor_id).ok()?;
                name
            }
            RequestKind::Resolve => {
                let anchor = outcome.anchor.clone()?;
                let name = match self.name_for_cloud_id(&outcome.cloud_anchor_id) {
                    Some(name) => name.to_string(),
                    None => {
                        let name = outcome.cloud_anchor_id.clone();
                        if !self.entries.contains_key(&name) {
                            self.add_anchor(&name, None).ok()?;
                        }
                        self.set_cloud_anchor_id(&name, &outcome.cloud_anchor_id).ok()?;
                        name
                    }
                };
                self.set_anchor(&name, anchor).ok()?;
                name
            }
        };

        debug!(
            "event=registry_update module=registry kind={} name={} cloud_anchor_id={}",
            outcome.kind, name, outcome.cloud_anchor_id
        );
        Some(name)
    }
}

/// Listener that records outcomes in a shared registry, then forwards them
pub struct RegistryListener {
    registry: Arc<Mutex<AnchorRegistry>>,
    downstream: Arc<dyn CloudAnchorListener>,
}

impl RegistryListener {
    pub fn new(registry: Arc<Mutex<AnchorRegistry>>, downstream: Arc<dyn CloudAnchorListener>) -> Self {
        Self { registry, downstream }
    }
}

impl CloudAnchorListener for RegistryListener {
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
        {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.record_outcome(outcome);
        }
        self.downstream.on_outcome(outcome);
    }
}
