//! Collaborators that keep handles in memory without a renderer or physics
//! engine. Used by tests, benchmarks and tools.

use std::collections::{HashMap, HashSet};

use crate::core::types::Vec3;
use crate::generation::{BuildingId, ChunkContent};
use crate::streaming::collaborators::{ContentFactory, PhysicsCollaborator, SceneCollaborator};
use crate::world::{PhysicsHandle, VisualGroup, VisualHandle};

/// Records static bodies by handle
#[derive(Debug, Default)]
pub struct HeadlessPhysics {
    next_id: u64,
    bodies: HashMap<PhysicsHandle, BuildingId>,
    /// Bodies created over the lifetime of this collaborator
    pub created: usize,
    /// Bodies removed over the lifetime of this collaborator
    pub removed: usize,
}

impl HeadlessPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies currently alive
    pub fn live_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Building that owns `handle`, if the body is alive
    pub fn body_owner(&self, handle: PhysicsHandle) -> Option<BuildingId> {
        self.bodies.get(&handle).copied()
    }
}

impl PhysicsCollaborator for HeadlessPhysics {
    fn create_static_body(
        &mut self,
        id: BuildingId,
        _width: f32,
        _height: f32,
        _depth: f32,
        _position: Vec3,
    ) -> PhysicsHandle {
        self.next_id += 1;
        let handle = PhysicsHandle::from_raw(self.next_id);
        self.bodies.insert(handle, id);
        self.created += 1;
        handle
    }

    fn remove_body(&mut self, handle: PhysicsHandle) {
        if self.bodies.remove(&handle).is_none() {
            log::warn!("removing unknown {}", handle);
            return;
        }
        self.removed += 1;
    }
}

/// Tracks attached nodes
#[derive(Debug, Default)]
pub struct HeadlessScene {
    attached: HashSet<VisualHandle>,
    /// Nodes detached and disposed
    pub disposed: usize,
    released: bool,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_nodes(&self) -> usize {
        self.attached.len()
    }

    pub fn is_attached(&self, node: VisualHandle) -> bool {
        self.attached.contains(&node)
    }

    /// Whether the chunk container has been released
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl SceneCollaborator for HeadlessScene {
    fn attach(&mut self, node: VisualHandle) {
        if !self.attached.insert(node) {
            log::warn!("{} attached twice", node);
        }
    }

    fn detach(&mut self, node: VisualHandle) {
        if !self.attached.remove(&node) {
            log::warn!("detaching unknown {}", node);
            return;
        }
        self.disposed += 1;
    }

    fn release_container(&mut self) {
        self.released = true;
    }
}

/// Hands out sequential visual handles
#[derive(Debug, Default)]
pub struct HeadlessFactory {
    next_id: u64,
    /// Groups built over the lifetime of this factory
    pub built: usize,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentFactory for HeadlessFactory {
    fn build_group(&mut self, group: VisualGroup, content: &ChunkContent) -> VisualHandle {
        self.next_id += 1;
        self.built += 1;
        log::trace!("chunk {}: built {:?} group", content.coord, group);
        VisualHandle::from_raw(self.next_id)
    }
}
