//! Interfaces to the systems that own render and physics resources.
//!
//! The chunk manager holds no global state: each collaborator is injected at
//! construction and called serially from the update thread.

use crate::core::types::Vec3;
use crate::generation::{BuildingId, ChunkContent};
use crate::world::{PhysicsHandle, VisualGroup, VisualHandle};

/// Static collision bodies for active chunks
pub trait PhysicsCollaborator {
    /// Create a box body for one building and return its handle
    fn create_static_body(
        &mut self,
        id: BuildingId,
        width: f32,
        height: f32,
        depth: f32,
        position: Vec3,
    ) -> PhysicsHandle;

    fn remove_body(&mut self, handle: PhysicsHandle);
}

/// Scene graph that displays resident chunks
pub trait SceneCollaborator {
    fn attach(&mut self, node: VisualHandle);

    /// Detach a node and dispose of its GPU resources
    fn detach(&mut self, node: VisualHandle);

    /// Release the container node that holds all chunk groups
    fn release_container(&mut self) {}
}

/// Builds visual nodes from content definitions
pub trait ContentFactory {
    fn build_group(&mut self, group: VisualGroup, content: &ChunkContent) -> VisualHandle;
}

/// Source of the player's world position, polled once per update
pub trait PositionProvider {
    /// `None` when no position is available this tick
    fn position(&self) -> Option<Vec3>;
}

impl PositionProvider for Vec3 {
    fn position(&self) -> Option<Vec3> {
        Some(*self)
    }
}

impl PositionProvider for Option<Vec3> {
    fn position(&self) -> Option<Vec3> {
        *self
    }
}
