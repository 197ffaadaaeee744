//! Opaque handles to resources owned by external collaborators.
//!
//! The streaming core never inspects these; it stores them while a chunk is
//! resident and hands them back to the collaborator that issued them.

use std::fmt;

/// Handle to a visual node created by a content factory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(u64);

impl VisualHandle {
    /// Wrap a collaborator-defined identifier
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Collaborator-defined identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VisualHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visual#{}", self.0)
    }
}

/// Handle to a static collision body created by the physics collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PhysicsHandle(u64);

impl PhysicsHandle {
    /// Wrap a collaborator-defined identifier
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Collaborator-defined identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PhysicsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Which visual group of a chunk a node belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualGroup {
    Buildings,
    Roads,
    Details,
}

/// The visual groups attached to the scene for one resident chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkVisuals {
    pub buildings: VisualHandle,
    pub roads: VisualHandle,
    pub details: VisualHandle,
}

impl ChunkVisuals {
    /// Handles in attach order
    pub fn handles(&self) -> [VisualHandle; 3] {
        [self.buildings, self.roads, self.details]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(VisualHandle::from_raw(42).raw(), 42);
        assert_eq!(PhysicsHandle::from_raw(u64::MAX).raw(), u64::MAX);
        assert_ne!(VisualHandle::from_raw(1), VisualHandle::from_raw(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(VisualHandle::from_raw(7).to_string(), "visual#7");
        assert_eq!(PhysicsHandle::from_raw(7).to_string(), "body#7");
    }

    #[test]
    fn test_handles_in_attach_order() {
        let visuals = ChunkVisuals {
            buildings: VisualHandle::from_raw(10),
            roads: VisualHandle::from_raw(11),
            details: VisualHandle::from_raw(12),
        };
        let raw: Vec<u64> = visuals.handles().iter().map(|h| h.raw()).collect();
        assert_eq!(raw, vec![10, 11, 12]);
    }
}
