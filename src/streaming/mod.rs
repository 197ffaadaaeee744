//! Chunk streaming: lifecycle management, load/unload queues and budgets

pub mod config;
pub mod collaborators;
pub mod scheduler;
pub mod queue;
pub mod budget;
pub mod stats;
pub mod headless;
pub mod manager;

pub use config::{Platform, StreamingConfig};
pub use collaborators::{ContentFactory, PhysicsCollaborator, PositionProvider, SceneCollaborator};
pub use scheduler::{IdleScheduler, ImmediateScheduler, Job, Scheduler, WorkerScheduler};
pub use queue::{LoadQueue, QueuedLoad, UnloadQueue};
pub use budget::MemoryBudget;
pub use stats::{LoadLatency, StreamingStats};
pub use headless::{HeadlessFactory, HeadlessPhysics, HeadlessScene};
pub use manager::{ChunkManager, UpdateReport};
