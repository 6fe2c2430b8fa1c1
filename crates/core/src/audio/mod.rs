use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    time::Duration,
};

use serde::Serialize;

use crate::{Result, TimelineError};

/// Handle to a resource created by an [`AudioBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Platform playback surface, one resource per track instance.
///
/// Resources are never reused across tracks: callers `load` a fresh one per
/// track and `release` it once it is no longer needed.
pub trait AudioBackend {
    /// Creates a paused resource at volume zero.
    fn load(&mut self, address: &str, looped: bool) -> Result<ResourceId>;

    /// Starts or resumes playback. Fails with
    /// [`TimelineError::AutoplayBlocked`] when the platform wants a user
    /// gesture first.
    fn play(&mut self, id: ResourceId) -> Result<()>;

    fn pause(&mut self, id: ResourceId);

    fn seek(&mut self, id: ResourceId, position: Duration);

    fn set_volume(&mut self, id: ResourceId, volume: f32);

    /// Stops and detaches the resource. The id is invalid afterwards.
    fn release(&mut self, id: ResourceId);

    /// Called when the user interacts with the page.
    fn user_gesture(&mut self) {}
}

/// Observable state of one live resource inside [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceState {
    pub id: ResourceId,
    pub address: String,
    pub looped: bool,
    pub volume: f32,
    pub playing: bool,
    pub position: Duration,
}

/// How many loaded addresses [`RecordingBackend`] remembers.
pub const RECENT_LOAD_LIMIT: usize = 64;

/// In-memory backend that tracks the resources it hands out.
///
/// Released resources are dropped, so memory stays bounded by the live set
/// plus the last [`RECENT_LOAD_LIMIT`] loaded addresses. It can simulate the
/// browser autoplay policy and missing assets, which makes it the backend of
/// choice for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    resources: BTreeMap<ResourceId, ResourceState>,
    recent_loads: VecDeque<String>,
    next_id: u64,
    gesture_required: bool,
    gesture_seen: bool,
    missing: Vec<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse `play` until [`AudioBackend::user_gesture`] has been called.
    pub fn with_autoplay_blocked(mut self) -> Self {
        self.gesture_required = true;
        self
    }

    /// Fail `load` for any address containing `pattern`.
    pub fn fail_loading(&mut self, pattern: impl Into<String>) {
        self.missing.push(pattern.into());
    }

    /// State of a resource that has not been released yet.
    pub fn resource(&self, id: ResourceId) -> Option<&ResourceState> {
        self.resources.get(&id)
    }

    /// `true` once `id` was handed out and then released.
    pub fn is_released(&self, id: ResourceId) -> bool {
        id.0 < self.next_id && !self.resources.contains_key(&id)
    }

    /// Resources that are loaded and not yet released.
    pub fn live(&self) -> impl Iterator<Item = &ResourceState> {
        self.resources.values()
    }

    /// Resources that are currently audible or at least running.
    pub fn playing(&self) -> impl Iterator<Item = &ResourceState> {
        self.resources.values().filter(|resource| resource.playing)
    }

    /// Running resources whose address contains `pattern`.
    pub fn playing_matching<'a>(
        &'a self,
        pattern: &'a str,
    ) -> impl Iterator<Item = &'a ResourceState> + 'a {
        self.playing()
            .filter(move |resource| resource.address.contains(pattern))
    }

    /// Most recently loaded addresses, oldest first.
    pub fn recent_loads(&self) -> impl Iterator<Item = &str> {
        self.recent_loads.iter().map(String::as_str)
    }

    /// Total number of resources ever loaded.
    pub fn loaded_count(&self) -> u64 {
        self.next_id
    }
}

impl AudioBackend for RecordingBackend {
    fn load(&mut self, address: &str, looped: bool) -> Result<ResourceId> {
        if self.missing.iter().any(|pattern| address.contains(pattern)) {
            return Err(TimelineError::ResourceLoad {
                address: address.to_string(),
                reason: "not found".to_string(),
            });
        }

        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.resources.insert(
            id,
            ResourceState {
                id,
                address: address.to_string(),
                looped,
                volume: 0.0,
                playing: false,
                position: Duration::ZERO,
            },
        );
        if self.recent_loads.len() == RECENT_LOAD_LIMIT {
            self.recent_loads.pop_front();
        }
        self.recent_loads.push_back(address.to_string());
        tracing::debug!(%id, address, looped, "resource loaded");
        Ok(id)
    }

    fn play(&mut self, id: ResourceId) -> Result<()> {
        let blocked = self.gesture_required && !self.gesture_seen;
        let resource = self
            .resources
            .get_mut(&id)
            .ok_or_else(|| TimelineError::msg(format!("unknown resource {id}")))?;
        if blocked {
            return Err(TimelineError::AutoplayBlocked {
                address: resource.address.clone(),
            });
        }
        resource.playing = true;
        Ok(())
    }

    fn pause(&mut self, id: ResourceId) {
        if let Some(resource) = self.resources.get_mut(&id) {
            resource.playing = false;
        }
    }

    fn seek(&mut self, id: ResourceId, position: Duration) {
        if let Some(resource) = self.resources.get_mut(&id) {
            resource.position = position;
        }
    }

    fn set_volume(&mut self, id: ResourceId, volume: f32) {
        if let Some(resource) = self.resources.get_mut(&id) {
            resource.volume = volume.clamp(0.0, 1.0);
        }
    }

    fn release(&mut self, id: ResourceId) {
        if self.resources.remove(&id).is_some() {
            tracing::debug!(%id, "resource released");
        }
    }

    fn user_gesture(&mut self) {
        self.gesture_seen = true;
    }
}
