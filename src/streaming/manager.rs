//! Chunk manager: registry, queues and the per-tick streaming pipeline.
//!
//! Each `update`:
//! 1. Finalize generations that completed since the last tick
//! 2. Map the player position to a chunk; on change, enqueue load candidates
//!    (nearest first) and unload candidates beyond `unload_radius`
//! 3. Drain the load queue under the concurrency cap and frame budget
//! 4. Tear down at most one queued unload
//! 5. Promote `Loaded -> Active` / demote `Active -> Loaded` by distance
//! 6. Refresh statistics
//!
//! The manager is the only writer of the registry. A load reserves its
//! placeholder record before the job reaches the scheduler, and finished
//! content comes back over a channel drained by the manager, so no scheduler
//! can cause a coordinate to load twice.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::core::types::{Result, Vec3};
use crate::generation::{ChunkContent, ContentGenerator, GenerationConfig};
use crate::streaming::budget::MemoryBudget;
use crate::streaming::collaborators::{ContentFactory, PhysicsCollaborator, PositionProvider, SceneCollaborator};
use crate::streaming::config::StreamingConfig;
use crate::streaming::queue::{LoadQueue, QueuedLoad, UnloadQueue};
use crate::streaming::scheduler::{ImmediateScheduler, Scheduler};
use crate::streaming::stats::{LoadLatency, StreamingStats};
use crate::world::{
    ChunkCoord, ChunkRecord, ChunkState, ChunkVisuals, VisualGroup,
    chunks_in_radius, distance, world_to_chunk,
};

/// Content produced by a scheduled generation job
struct GeneratedChunk {
    coord: ChunkCoord,
    content: ChunkContent,
}

/// What one `update` call did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// The player entered a different chunk this tick
    pub chunk_changed: bool,
    /// Placeholders reserved and handed to the scheduler
    pub loads_started: usize,
    /// Generations finalized into `Loaded`
    pub loads_completed: usize,
    /// Records torn down and removed
    pub unloaded: usize,
    pub promoted: usize,
    pub demoted: usize,
}

/// Streams chunks around the player.
///
/// Collaborators are injected at construction; the manager calls them
/// serially from whichever thread drives `update`.
pub struct ChunkManager<P, S, F> {
    config: StreamingConfig,
    generator: Arc<ContentGenerator>,
    scheduler: Arc<dyn Scheduler>,
    physics: P,
    scene: S,
    factory: F,

    chunks: HashMap<ChunkCoord, ChunkRecord>,
    load_queue: LoadQueue,
    unload_queue: UnloadQueue,
    /// Records currently in `Loading`
    loading: usize,

    completed_tx: mpsc::UnboundedSender<GeneratedChunk>,
    completed_rx: mpsc::UnboundedReceiver<GeneratedChunk>,

    last_chunk: Option<ChunkCoord>,
    latency: LoadLatency,
    budget: MemoryBudget,
    stats: StreamingStats,
}

impl<P, S, F> ChunkManager<P, S, F>
where
    P: PhysicsCollaborator,
    S: SceneCollaborator,
    F: ContentFactory,
{
    /// Create a manager that generates inline until another scheduler is set
    pub fn new(
        config: StreamingConfig,
        generation: GenerationConfig,
        physics: P,
        scene: S,
        factory: F,
    ) -> Result<Self> {
        config.validate()?;
        generation.validate()?;

        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        let generator = Arc::new(ContentGenerator::new(generation, config.chunk_size));
        let budget = MemoryBudget::new(config.memory_budget_mb);

        log::info!(
            "chunk manager: chunk_size={} radii active/load/unload={}/{}/{} max_loads={} budget={}ms",
            config.chunk_size,
            config.active_radius,
            config.load_radius,
            config.unload_radius,
            config.max_concurrent_loads,
            config.frame_budget_ms,
        );

        let mut manager = Self {
            config,
            generator,
            scheduler: Arc::new(ImmediateScheduler),
            physics,
            scene,
            factory,
            chunks: HashMap::new(),
            load_queue: LoadQueue::new(),
            unload_queue: UnloadQueue::new(),
            loading: 0,
            completed_tx,
            completed_rx,
            last_chunk: None,
            latency: LoadLatency::default(),
            budget,
            stats: StreamingStats::default(),
        };
        manager.refresh_stats();
        Ok(manager)
    }

    /// Builder form of [`ChunkManager::set_scheduler`]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.set_scheduler(scheduler);
        self
    }

    /// Swap the scheduler used for subsequent loads. Jobs already handed to
    /// the previous scheduler still report back to this manager.
    pub fn set_scheduler(&mut self, scheduler: Arc<dyn Scheduler>) {
        log::debug!("scheduler: {} -> {}", self.scheduler.name(), scheduler.name());
        self.scheduler = scheduler;
    }

    /// Drive one tick from a position provider
    pub fn update_from<T: PositionProvider + ?Sized>(&mut self, provider: &T) -> UpdateReport {
        self.tick(provider.position())
    }

    /// Drive one tick with the player's world position
    pub fn update(&mut self, position: Vec3) -> UpdateReport {
        self.tick(Some(position))
    }

    fn tick(&mut self, position: Option<Vec3>) -> UpdateReport {
        let mut report = UpdateReport {
            loads_completed: self.poll_completed(),
            ..Default::default()
        };

        let current = match position {
            Some(p) if p.is_finite() => world_to_chunk(p.x, p.z, self.config.chunk_size),
            Some(p) => {
                log::warn!("ignoring malformed player position {:?}", p);
                match self.last_chunk {
                    Some(chunk) => chunk,
                    None => return self.finish_tick(report),
                }
            }
            None => match self.last_chunk {
                Some(chunk) => chunk,
                None => return self.finish_tick(report),
            },
        };

        if self.last_chunk != Some(current) {
            self.enqueue_around(current);
            self.last_chunk = Some(current);
            report.chunk_changed = true;
        }

        self.drain_loads(current, &mut report);
        report.unloaded = self.drain_one_unload(current);

        let (promoted, demoted) = self.rescan(current);
        report.promoted = promoted;
        report.demoted = demoted;

        self.finish_tick(report)
    }

    fn finish_tick(&mut self, report: UpdateReport) -> UpdateReport {
        self.refresh_stats();
        if report != UpdateReport::default() {
            log::debug!(
                "tick: started={} completed={} unloaded={} promoted={} demoted={} queued={}/{}",
                report.loads_started,
                report.loads_completed,
                report.unloaded,
                report.promoted,
                report.demoted,
                self.load_queue.len(),
                self.unload_queue.len(),
            );
        }
        report
    }

    /// Queue loads for the new neighborhood and unloads for records left
    /// beyond the hysteresis band
    fn enqueue_around(&mut self, current: ChunkCoord) {
        let candidates: Vec<ChunkCoord> = chunks_in_radius(current, self.config.load_radius)
            .into_iter()
            .filter(|coord| !self.chunks.contains_key(coord) && !self.load_queue.contains(*coord))
            .collect();
        let queued = self.load_queue.push_batch(candidates, current);

        let unload_radius = self.config.unload_radius as i32;
        let mut leaving: Vec<(i32, ChunkCoord)> = self
            .chunks
            .values()
            .filter(|record| record.state().is_resident())
            .map(|record| (distance(record.coord(), current), record.coord()))
            .filter(|&(d, _)| d > unload_radius)
            .collect();
        // Farthest first, then by coordinate so runs are reproducible
        leaving.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut unloads = 0;
        for (_, coord) in leaving {
            if self.unload_queue.push(coord) {
                unloads += 1;
            }
        }

        log::debug!("entered chunk {}: queued {} loads, {} unloads", current, queued, unloads);
    }

    fn drain_loads(&mut self, current: ChunkCoord, report: &mut UpdateReport) {
        let start = Instant::now();
        let budget = Duration::from_secs_f32(self.config.frame_budget_ms / 1000.0);
        let unload_radius = self.config.unload_radius as i32;

        loop {
            report.loads_completed += self.poll_completed();

            if self.load_queue.is_empty()
                || self.loading >= self.config.max_concurrent_loads
                || start.elapsed() >= budget
            {
                break;
            }
            let Some(entry) = self.load_queue.pop() else {
                break;
            };

            if self.chunks.contains_key(&entry.coord) {
                continue;
            }
            if distance(entry.coord, current) > unload_radius {
                log::trace!("chunk {}: dropped stale load", entry.coord);
                continue;
            }

            self.start_load(entry);
            report.loads_started += 1;
        }
    }

    /// Reserve the placeholder, then hand generation to the scheduler
    fn start_load(&mut self, entry: QueuedLoad) {
        let coord = entry.coord;
        self.chunks.insert(coord, ChunkRecord::placeholder(coord, self.config.chunk_size, entry.rank));
        self.loading += 1;
        log::trace!("chunk {}: loading (distance {}, rank {})", coord, entry.distance, entry.rank);

        let generator = Arc::clone(&self.generator);
        let completed = self.completed_tx.clone();
        self.scheduler.schedule(Box::new(move || {
            let content = generator.generate(coord);
            // A closed channel means the manager is gone; nothing to finalize
            let _ = completed.send(GeneratedChunk { coord, content });
        }));
    }

    /// Finalize every generation that has completed. Returns the number of
    /// chunks that became `Loaded`.
    pub fn poll_completed(&mut self) -> usize {
        let mut finalized = 0;
        while let Ok(generated) = self.completed_rx.try_recv() {
            if self.finalize(generated) {
                finalized += 1;
            }
        }
        finalized
    }

    fn finalize(&mut self, generated: GeneratedChunk) -> bool {
        let GeneratedChunk { coord, content } = generated;

        let Some(record) = self.chunks.get_mut(&coord) else {
            log::debug!("chunk {}: completion for a discarded placeholder", coord);
            return false;
        };
        if record.state() != ChunkState::Loading {
            log::warn!("chunk {}: completion while {:?}, ignored", coord, record.state());
            return false;
        }
        if let Err(err) = record.transition(ChunkState::Loaded) {
            log::warn!("{}", err);
            return false;
        }
        self.loading = self.loading.saturating_sub(1);

        record.memory_estimate_bytes = content.memory_estimate_bytes();
        record.content = content;

        let visuals = ChunkVisuals {
            buildings: self.factory.build_group(VisualGroup::Buildings, &record.content),
            roads: self.factory.build_group(VisualGroup::Roads, &record.content),
            details: self.factory.build_group(VisualGroup::Details, &record.content),
        };
        for node in visuals.handles() {
            self.scene.attach(node);
        }
        record.visuals = Some(visuals);

        let latency = record.load_started.elapsed();
        self.latency.record(latency);
        log::trace!(
            "chunk {}: loaded {} buildings in {:.2} ms",
            coord,
            record.buildings().len(),
            latency.as_secs_f32() * 1000.0
        );

        // Finished after the player moved away: catch it now rather than on
        // the next chunk change
        if let Some(current) = self.last_chunk
            && distance(coord, current) > self.config.unload_radius as i32
        {
            self.unload_queue.push(coord);
        }

        true
    }

    /// Tear down the first queue entry that is still eligible
    fn drain_one_unload(&mut self, current: ChunkCoord) -> usize {
        let unload_radius = self.config.unload_radius as i32;

        while let Some(coord) = self.unload_queue.pop() {
            let eligible = self.chunks.get(&coord).is_some_and(|record| {
                record.state().is_resident() && distance(coord, current) > unload_radius
            });
            if !eligible {
                log::trace!("chunk {}: dropped stale unload", coord);
                continue;
            }
            return usize::from(self.unload(coord));
        }
        0
    }

    fn rescan(&mut self, current: ChunkCoord) -> (usize, usize) {
        let active_radius = self.config.active_radius as i32;
        let load_radius = self.config.load_radius as i32;
        let (mut promoted, mut demoted) = (0, 0);

        for record in self.chunks.values_mut() {
            let d = distance(record.coord(), current);
            if d <= load_radius {
                record.touch();
            }

            let result = match record.state() {
                ChunkState::Loaded if d <= active_radius => {
                    activate(record, &mut self.physics).map(|_| promoted += 1)
                }
                ChunkState::Active if d > active_radius => {
                    deactivate(record, &mut self.physics).map(|_| demoted += 1)
                }
                _ => Ok(()),
            };
            if let Err(err) = result {
                log::warn!("{}", err);
            }
        }

        (promoted, demoted)
    }

    /// Create physics bodies for a `Loaded` chunk. Returns `Ok(false)` if
    /// the chunk is not registered.
    pub fn activate(&mut self, coord: ChunkCoord) -> Result<bool> {
        match self.chunks.get_mut(&coord) {
            Some(record) => activate(record, &mut self.physics).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove physics bodies from an `Active` chunk. Returns `Ok(false)` if
    /// the chunk is not registered.
    pub fn deactivate(&mut self, coord: ChunkCoord) -> Result<bool> {
        match self.chunks.get_mut(&coord) {
            Some(record) => deactivate(record, &mut self.physics).map(|_| true),
            None => Ok(false),
        }
    }

    /// Deactivate if needed, detach visuals and remove the record.
    ///
    /// No-op (returns `false`) for missing, `Loading` or `Unloading` chunks.
    pub fn unload(&mut self, coord: ChunkCoord) -> bool {
        let Some(record) = self.chunks.get_mut(&coord) else {
            return false;
        };
        if !record.state().is_resident() {
            log::trace!("chunk {}: unload skipped while {:?}", coord, record.state());
            return false;
        }

        if record.state() == ChunkState::Active
            && let Err(err) = deactivate(record, &mut self.physics)
        {
            log::warn!("{}", err);
            return false;
        }
        if let Err(err) = record.transition(ChunkState::Unloading) {
            log::warn!("{}", err);
            return false;
        }

        if let Some(visuals) = record.visuals.take() {
            for node in visuals.handles() {
                self.scene.detach(node);
            }
        }
        record.content.clear();
        record.memory_estimate_bytes = 0;

        if let Err(err) = record.transition(ChunkState::Unloaded) {
            log::warn!("{}", err);
        }
        self.chunks.remove(&coord);
        log::trace!("chunk {}: removed", coord);
        true
    }

    /// Load the whole neighborhood of `position` before returning.
    ///
    /// Generation runs in parallel and ignores the frame budget and the
    /// concurrency cap. Afterwards chunks near the player are activated.
    /// Returns the number of chunks loaded.
    pub fn preload(&mut self, position: Vec3) -> usize {
        if !position.is_finite() {
            log::warn!("ignoring malformed preload position {:?}", position);
            return 0;
        }

        let start = Instant::now();
        let current = world_to_chunk(position.x, position.z, self.config.chunk_size);

        let mut batch = LoadQueue::new();
        batch.push_batch(
            chunks_in_radius(current, self.config.load_radius)
                .into_iter()
                .filter(|coord| !self.chunks.contains_key(coord)),
            current,
        );

        let mut coords = Vec::with_capacity(batch.len());
        while let Some(entry) = batch.pop() {
            self.load_queue.remove(entry.coord);
            self.chunks.insert(entry.coord, ChunkRecord::placeholder(entry.coord, self.config.chunk_size, entry.rank));
            self.loading += 1;
            coords.push(entry.coord);
        }

        let contents = self.generator.generate_region(&coords);
        let mut loaded = 0;
        for (coord, content) in coords.into_iter().zip(contents) {
            if self.finalize(GeneratedChunk { coord, content }) {
                loaded += 1;
            }
        }

        if self.last_chunk != Some(current) {
            self.enqueue_around(current);
            self.last_chunk = Some(current);
        }
        let (promoted, _) = self.rescan(current);
        self.refresh_stats();

        log::info!(
            "preloaded {} chunks around {} in {:.1} ms ({} active)",
            loaded,
            current,
            start.elapsed().as_secs_f32() * 1000.0,
            promoted,
        );
        loaded
    }

    /// Unload every resident chunk and release the scene container.
    ///
    /// Placeholders still generating are discarded; their results are
    /// ignored when they arrive.
    pub fn dispose(&mut self) {
        let mut resident: Vec<ChunkCoord> = self
            .chunks
            .values()
            .filter(|record| record.state().is_resident())
            .map(ChunkRecord::coord)
            .collect();
        resident.sort();

        let unloaded = resident.into_iter().filter(|&coord| self.unload(coord)).count();
        let discarded = self.chunks.len();

        self.chunks.clear();
        self.loading = 0;
        self.load_queue.clear();
        self.unload_queue.clear();
        self.last_chunk = None;
        self.latency.clear();
        self.scene.release_container();
        self.refresh_stats();

        log::info!("chunk manager disposed: {} unloaded, {} pending discarded", unloaded, discarded);
    }

    fn refresh_stats(&mut self) {
        let mut stats = StreamingStats {
            total_chunks: self.chunks.len(),
            queued_loads: self.load_queue.len(),
            queued_unloads: self.unload_queue.len(),
            ..Default::default()
        };

        let mut bytes = 0;
        for record in self.chunks.values() {
            match record.state() {
                ChunkState::Loading => stats.loading_chunks += 1,
                ChunkState::Loaded => stats.loaded_chunks += 1,
                ChunkState::Active => {
                    stats.loaded_chunks += 1;
                    stats.active_chunks += 1;
                }
                ChunkState::Unloaded | ChunkState::Unloading => {}
            }
            bytes += record.memory_estimate_bytes;
        }

        self.budget.set_usage(bytes);
        stats.memory_usage_mb = self.budget.used_mb();
        stats.memory_budget_mb = self.budget.budget_mb();
        stats.memory_pressure = self.budget.pressure();
        stats.avg_load_time_ms = self.latency.average_ms();
        self.stats = stats;
    }

    // --- Queries ---

    pub fn get_stats(&self) -> StreamingStats {
        self.stats.clone()
    }

    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.chunks.get(&coord)
    }

    /// Record covering world position `(x, z)`; marks it accessed
    pub fn get_chunk_at_position(&mut self, x: f32, z: f32) -> Option<&ChunkRecord> {
        if !(x.is_finite() && z.is_finite()) {
            return None;
        }
        let coord = world_to_chunk(x, z, self.config.chunk_size);
        let record = self.chunks.get_mut(&coord)?;
        record.touch();
        Some(&*record)
    }

    /// Records in `Loaded` or `Active`, ordered by coordinate
    pub fn get_loaded_chunks(&self) -> Vec<&ChunkRecord> {
        let mut loaded: Vec<&ChunkRecord> = self
            .chunks
            .values()
            .filter(|record| record.state().is_resident())
            .collect();
        loaded.sort_by_key(|record| record.coord());
        loaded
    }

    /// All records, any state
    pub fn chunks(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.chunks.values()
    }

    /// `Unloaded` for coordinates without a record
    pub fn state_of(&self, coord: ChunkCoord) -> ChunkState {
        self.chunks.get(&coord).map_or(ChunkState::Unloaded, ChunkRecord::state)
    }

    pub fn is_queued_for_load(&self, coord: ChunkCoord) -> bool {
        self.load_queue.contains(coord)
    }

    pub fn is_queued_for_unload(&self, coord: ChunkCoord) -> bool {
        self.unload_queue.contains(coord)
    }

    /// Pending loads in the order they will start
    pub fn queued_loads(&self) -> Vec<ChunkCoord> {
        self.load_queue.iter().map(|entry| entry.coord).collect()
    }

    /// Chunk of the last valid player position
    pub fn current_chunk(&self) -> Option<ChunkCoord> {
        self.last_chunk
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

/// One static body per building, then `Loaded -> Active`
fn activate<P: PhysicsCollaborator>(record: &mut ChunkRecord, physics: &mut P) -> Result<()> {
    record.transition(ChunkState::Active)?;
    for building in record.content.buildings.values() {
        let handle = physics.create_static_body(
            building.id,
            building.width,
            building.height,
            building.depth,
            building.position,
        );
        record.physics.push(handle);
    }
    log::trace!("chunk {}: {} bodies", record.key(), record.physics.len());
    Ok(())
}

/// Remove every body, then `Active -> Loaded`
fn deactivate<P: PhysicsCollaborator>(record: &mut ChunkRecord, physics: &mut P) -> Result<()> {
    record.transition(ChunkState::Loaded)?;
    for handle in record.physics.drain(..) {
        physics.remove_body(handle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{DistrictKind, DistrictMap};
    use crate::math::Rect;
    use crate::streaming::headless::{HeadlessFactory, HeadlessPhysics, HeadlessScene};
    use crate::streaming::scheduler::{IdleScheduler, Job, WorkerScheduler};

    type TestManager = ChunkManager<HeadlessPhysics, HeadlessScene, HeadlessFactory>;

    const CHUNK: f32 = 100.0;

    fn config(load: u32, active: u32, unload: u32) -> StreamingConfig {
        StreamingConfig {
            chunk_size: CHUNK,
            load_radius: load,
            active_radius: active,
            unload_radius: unload,
            max_concurrent_loads: 64,
            frame_budget_ms: 10_000.0,
            memory_budget_mb: 512.0,
        }
    }

    /// Every chunk is residential so activation creates bodies
    fn generation() -> GenerationConfig {
        let mut generation = GenerationConfig::with_seed(7);
        generation.districts = DistrictMap::uniform(
            DistrictKind::Residential,
            Rect::from_extents(-1.0e6, 1.0e6, -1.0e6, 1.0e6),
        );
        generation
    }

    fn manager(config: StreamingConfig) -> TestManager {
        manager_with(config, generation())
    }

    fn manager_with(config: StreamingConfig, generation: GenerationConfig) -> TestManager {
        ChunkManager::new(config, generation, HeadlessPhysics::new(), HeadlessScene::new(), HeadlessFactory::new())
            .unwrap()
    }

    /// Center of chunk `(x, z)`
    fn at(x: i32, z: i32) -> Vec3 {
        Vec3::new((x as f32 + 0.5) * CHUNK, 0.0, (z as f32 + 0.5) * CHUNK)
    }

    fn assert_invariants(manager: &TestManager) {
        let mut resident = 0;
        let mut bodies = 0;
        for record in manager.chunks() {
            let state = record.state();
            assert!(matches!(state, ChunkState::Loading | ChunkState::Loaded | ChunkState::Active));
            assert_eq!(record.visuals.is_some(), state.is_resident(), "chunk {}", record.key());
            if state == ChunkState::Active {
                assert_eq!(record.physics.len(), record.buildings().len());
            } else {
                assert!(record.physics.is_empty(), "chunk {} has bodies while {:?}", record.key(), state);
            }
            if state.is_resident() {
                resident += 1;
            }
            bodies += record.physics.len();
        }
        assert_eq!(manager.scene().live_nodes(), resident * 3);
        assert_eq!(manager.physics().live_bodies(), bodies);
    }

    struct SlowScheduler(Duration);

    impl Scheduler for SlowScheduler {
        fn schedule(&self, job: Job) {
            std::thread::sleep(self.0);
            job();
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = ChunkManager::new(
            config(2, 2, 4),
            generation(),
            HeadlessPhysics::new(),
            HeadlessScene::new(),
            HeadlessFactory::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_initial_load_queue() {
        let idle = Arc::new(IdleScheduler::new());
        let mut config = config(2, 1, 4);
        config.max_concurrent_loads = 1;
        let mut manager = manager(config).with_scheduler(idle.clone());

        let report = manager.update(Vec3::new(10.0, 0.0, 10.0));
        assert!(report.chunk_changed);
        assert_eq!(report.loads_started, 1);

        // First in sort order started, the other 24 wait
        assert_eq!(manager.state_of(ChunkCoord::new(0, 0)), ChunkState::Loading);
        let queued = manager.queued_loads();
        assert_eq!(queued.len(), 24);
        assert!(!queued.contains(&ChunkCoord::new(0, 0)));
        let origin = ChunkCoord::new(0, 0);
        assert!(queued.windows(2).all(|w| distance(w[0], origin) <= distance(w[1], origin)));
        assert_eq!(idle.pending(), 1);
    }

    #[test]
    fn test_full_load_with_immediate_scheduler() {
        let mut manager = manager(config(2, 1, 4));
        let report = manager.update(at(0, 0));

        assert_eq!(report.loads_started, 25);
        assert_eq!(report.loads_completed, 25);
        assert_eq!(report.promoted, 9);

        let stats = manager.get_stats();
        assert_eq!(stats.total_chunks, 25);
        assert_eq!(stats.loaded_chunks, 25);
        assert_eq!(stats.active_chunks, 9);
        assert_eq!(stats.loading_chunks, 0);
        assert_eq!(stats.queued_loads, 0);
        assert!(stats.memory_usage_mb > 0.0);
        assert_invariants(&manager);
    }

    #[test]
    fn test_move_enqueues_far_chunks_for_unload() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));

        let report = manager.update(at(5, 0));
        assert!(report.chunk_changed);
        // Columns x = -2..=0 are beyond distance 4; one is torn down this tick
        assert_eq!(report.unloaded, 1);
        assert_eq!(manager.state_of(ChunkCoord::new(-2, -2)), ChunkState::Unloaded);
        assert!(manager.is_queued_for_unload(ChunkCoord::new(0, 0)));
        assert_eq!(manager.get_stats().queued_unloads, 14);

        for z in -2..=2 {
            assert!(!manager.is_queued_for_unload(ChunkCoord::new(1, z)));
            assert!(!manager.is_queued_for_unload(ChunkCoord::new(2, z)));
            assert!(manager.state_of(ChunkCoord::new(1, z)).is_resident());
        }
        assert_invariants(&manager);
    }

    #[test]
    fn test_one_unload_per_tick() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));
        manager.update(at(5, 0));

        for remaining in (0..14).rev() {
            let report = manager.update(at(5, 0));
            assert_eq!(report.unloaded, 1);
            assert_eq!(manager.get_stats().queued_unloads, remaining);
        }
        assert_eq!(manager.update(at(5, 0)).unloaded, 0);

        // 25 around (5, 0) plus the two columns kept by hysteresis
        assert_eq!(manager.get_stats().total_chunks, 35);
        assert_eq!(manager.state_of(ChunkCoord::new(0, 0)), ChunkState::Unloaded);
        assert_invariants(&manager);
    }

    #[test]
    fn test_hysteresis_keeps_band_resident() {
        let mut manager = manager(config(2, 1, 4));
        let watched = ChunkCoord::new(3, 0);

        manager.update(at(1, 0));
        assert_eq!(manager.state_of(watched), ChunkState::Loaded);

        for step in [at(0, 0), at(-1, 0), at(0, 0)] {
            manager.update(step);
            assert_eq!(manager.state_of(watched), ChunkState::Loaded);
            assert!(!manager.is_queued_for_unload(watched));
        }
        assert_invariants(&manager);
    }

    #[test]
    fn test_concurrency_cap() {
        let idle = Arc::new(IdleScheduler::new());
        let mut config = config(2, 1, 4);
        config.max_concurrent_loads = 2;
        let mut manager = manager(config).with_scheduler(idle.clone());

        for _ in 0..40 {
            manager.update(at(0, 0));
            let loading = manager.chunks().filter(|r| r.state() == ChunkState::Loading).count();
            assert!(loading <= 2);
            assert_eq!(manager.get_stats().loading_chunks, loading);
            assert_invariants(&manager);
            idle.run_all();
        }
        assert_eq!(manager.get_stats().loaded_chunks, 25);
    }

    #[test]
    fn test_frame_budget_limits_draining() {
        let mut config = config(2, 1, 4);
        config.frame_budget_ms = 10.0;
        let mut manager = manager(config).with_scheduler(Arc::new(SlowScheduler(Duration::from_millis(4))));

        let report = manager.update(at(0, 0));
        assert!(report.loads_started >= 1);
        assert!(report.loads_started < 25);
        assert_eq!(manager.get_stats().queued_loads, 25 - report.loads_started);

        let mut total = report.loads_started;
        for _ in 0..25 {
            total += manager.update(at(0, 0)).loads_started;
        }
        assert_eq!(total, 25);
        assert_eq!(manager.get_stats().loaded_chunks, 25);
    }

    #[test]
    fn test_loading_chunk_is_never_removed() {
        let idle = Arc::new(IdleScheduler::new());
        let mut config = config(2, 1, 4);
        config.max_concurrent_loads = 2;
        let mut manager = manager(config).with_scheduler(idle.clone());
        let origin = ChunkCoord::new(0, 0);

        manager.update(at(0, 0));
        assert_eq!(manager.state_of(origin), ChunkState::Loading);

        // Walk far away while the origin is still generating
        manager.update(at(20, 0));
        assert_eq!(manager.state_of(origin), ChunkState::Loading);
        assert!(!manager.is_queued_for_unload(origin));
        assert_eq!(manager.physics().live_bodies(), 0);

        // It completes, becomes Loaded, and is then torn down through Unloading
        idle.run_all();
        let report = manager.update(at(20, 0));
        assert_eq!(report.loads_completed, 2);
        assert_eq!(report.unloaded, 1);
        assert_eq!(manager.state_of(origin), ChunkState::Unloaded);
        assert_eq!(manager.physics().created, 0);
        assert_invariants(&manager);
    }

    #[test]
    fn test_malformed_position_keeps_last_chunk() {
        let mut manager = manager(config(2, 1, 4));
        assert_eq!(manager.update(Vec3::NAN), UpdateReport::default());
        assert_eq!(manager.current_chunk(), None);
        assert_eq!(manager.get_stats().total_chunks, 0);

        manager.update(at(1, 1));
        let report = manager.update(Vec3::new(f32::INFINITY, 0.0, 0.0));
        assert!(!report.chunk_changed);
        assert_eq!(manager.current_chunk(), Some(ChunkCoord::new(1, 1)));

        let report = manager.update_from(&None::<Vec3>);
        assert!(!report.chunk_changed);
        assert_eq!(manager.current_chunk(), Some(ChunkCoord::new(1, 1)));
        assert_eq!(manager.get_stats().loaded_chunks, 25);
    }

    #[test]
    fn test_far_position_clips_to_grid_edge() {
        let mut manager = manager(config(2, 1, 4));
        let report = manager.update(Vec3::new(1.0e30, 0.0, -1.0e30));
        let corner = ChunkCoord::new(i32::MAX, i32::MIN);
        assert!(report.chunk_changed);
        assert_eq!(manager.current_chunk(), Some(corner));
        assert_eq!(report.loads_started, 9);

        let stats = manager.get_stats();
        assert_eq!(stats.loaded_chunks, 9);
        assert_eq!(stats.active_chunks, 4);
        assert_eq!(manager.state_of(corner), ChunkState::Active);
        assert_invariants(&manager);

        let mut fresh = manager_with(config(2, 1, 4), generation());
        assert_eq!(fresh.preload(Vec3::new(-1.0e30, 0.0, 1.0e30)), 9);
        assert_eq!(fresh.current_chunk(), Some(ChunkCoord::new(i32::MIN, i32::MAX)));
        assert_invariants(&fresh);
    }

    #[test]
    fn test_chunks_outside_districts_load_empty() {
        let mut generation = GenerationConfig::with_seed(7);
        generation.districts = DistrictMap::empty();
        let mut manager = manager_with(config(2, 1, 4), generation);

        let report = manager.update(at(0, 0));
        assert_eq!(report.loads_completed, 25);
        for record in manager.chunks() {
            assert!(matches!(record.state(), ChunkState::Loaded | ChunkState::Active));
            assert!(record.district().is_none());
            assert!(record.buildings().is_empty());
            assert_eq!(record.memory_estimate_bytes, 0);
            assert!(record.visuals.is_some());
        }

        // Three visual groups per chunk even with nothing in them
        assert_eq!(manager.scene().live_nodes(), 75);
        assert_eq!(manager.physics().live_bodies(), 0);
        let stats = manager.get_stats();
        assert_eq!(stats.active_chunks, 9);
        assert_eq!(stats.memory_usage_mb, 0.0);
        assert_invariants(&manager);
    }

    #[test]
    fn test_duplicate_enqueue_ignored() {
        let idle = Arc::new(IdleScheduler::new());
        let mut config = config(2, 1, 4);
        config.max_concurrent_loads = 1;
        let mut manager = manager(config).with_scheduler(idle.clone());

        manager.update(at(0, 0));
        manager.update(at(1, 0));
        manager.update(at(0, 0));

        let queued = manager.queued_loads();
        let unique: std::collections::HashSet<_> = queued.iter().collect();
        assert_eq!(unique.len(), queued.len());
        // 24 initial plus the new x = 3 column
        assert_eq!(queued.len(), 29);
        assert!(!queued.contains(&ChunkCoord::new(0, 0)));
        assert_eq!(idle.pending(), 1);
    }

    #[test]
    fn test_activation_follows_player() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));
        let watched = ChunkCoord::new(1, 1);
        assert_eq!(manager.state_of(watched), ChunkState::Active);
        assert!(manager.physics().live_bodies() > 0);

        let report = manager.update(at(-1, 0));
        assert!(report.demoted > 0);
        assert_eq!(manager.state_of(watched), ChunkState::Loaded);
        assert!(manager.get_chunk(watched).unwrap().physics.is_empty());
        assert_invariants(&manager);
    }

    #[test]
    fn test_manual_activate_and_unload() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));

        let edge = ChunkCoord::new(2, 2);
        assert_eq!(manager.state_of(edge), ChunkState::Loaded);
        assert!(manager.activate(edge).unwrap());
        assert_eq!(manager.state_of(edge), ChunkState::Active);
        assert!(manager.activate(edge).is_err());

        assert!(manager.unload(edge));
        assert_eq!(manager.state_of(edge), ChunkState::Unloaded);
        assert!(!manager.unload(edge));
        assert!(!manager.activate(ChunkCoord::new(50, 50)).unwrap());
        assert_invariants(&manager);
    }

    #[test]
    fn test_lookups() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));

        let record = manager.get_chunk_at_position(-50.0, 150.0).unwrap();
        assert_eq!(record.coord(), ChunkCoord::new(-1, 1));
        assert!(manager.get_chunk_at_position(5000.0, 0.0).is_none());
        assert!(manager.get_chunk_at_position(f32::NAN, 0.0).is_none());

        let loaded = manager.get_loaded_chunks();
        assert_eq!(loaded.len(), 25);
        assert!(loaded.windows(2).all(|w| w[0].coord() < w[1].coord()));
    }

    #[test]
    fn test_preload_builds_initial_view() {
        let mut manager = manager(config(2, 1, 4));
        assert_eq!(manager.preload(at(3, -2)), 25);

        assert_eq!(manager.current_chunk(), Some(ChunkCoord::new(3, -2)));
        let stats = manager.get_stats();
        assert_eq!(stats.loaded_chunks, 25);
        assert_eq!(stats.active_chunks, 9);
        assert_eq!(stats.queued_loads, 0);

        // Nothing left to do on the first tick
        let report = manager.update(at(3, -2));
        assert!(!report.chunk_changed);
        assert_eq!(report.loads_started, 0);
        assert_invariants(&manager);
    }

    #[test]
    fn test_content_matches_generator() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));

        let coord = ChunkCoord::new(-1, 2);
        let expected = manager.generator().generate(coord);
        let record = manager.get_chunk(coord).unwrap();
        assert_eq!(record.content, expected);
        assert_eq!(record.memory_estimate_bytes, expected.memory_estimate_bytes());
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut manager = manager(config(2, 1, 4));
        manager.update(at(0, 0));
        assert!(manager.scene().live_nodes() > 0);

        manager.dispose();
        assert_eq!(manager.scene().live_nodes(), 0);
        assert_eq!(manager.physics().live_bodies(), 0);
        assert!(manager.scene().is_released());
        assert_eq!(manager.get_stats(), StreamingStats {
            memory_budget_mb: 512.0,
            ..Default::default()
        });
        assert_eq!(manager.current_chunk(), None);
    }

    #[test]
    fn test_worker_scheduler_completes() {
        let worker = WorkerScheduler::new(2).unwrap();
        let mut manager = manager(config(2, 1, 4)).with_scheduler(Arc::new(worker));

        for _ in 0..500 {
            manager.update(at(0, 0));
            if manager.get_stats().loaded_chunks == 25 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        let stats = manager.get_stats();
        assert_eq!(stats.loaded_chunks, 25);
        assert_eq!(stats.active_chunks, 9);
        assert_invariants(&manager);
    }
}
