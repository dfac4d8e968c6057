//! Background chunk streaming around a moving observer.
//!
//! One worker thread builds chunks on private memory and hands them to the
//! main thread over a bounded channel; the main thread merges them into the
//! [`VoxelWorld`] during [`ChunkStreamer::update`]. The worker never sees the
//! world.
//!
//! Shared state is a mutex-guarded [`LoadQueue`], the pending set, and the
//! current target, plus a condvar to wake the worker and an atomic running
//! flag. A position is *pending* from the moment it is enqueued until its
//! result is merged or dropped, so it is never pending and loaded at once and
//! at most one build per position is in flight.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, bounded};
use glam::Vec3;
use rustc_hash::FxHashSet;
use strata_terrain::TerrainGenerator;
use strata_voxel::{Chunk, ChunkPos};

use crate::error::WorldError;
use crate::load_queue::{ChunkLoadRequest, LoadQueue};
use crate::world::{VoxelWorld, build_chunk};

/// Longest the worker sleeps before re-checking the running flag.
const WORKER_WAIT: Duration = Duration::from_millis(50);
/// Longest a blocked result send waits before re-checking the running flag.
const SEND_WAIT: Duration = Duration::from_millis(50);

/// Delay before chunks whose generation failed are requested again.
pub const FAILURE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for the view distance, in chunks.
pub const MAX_VIEW_DISTANCE: u32 = 64;

/// Streaming parameters. All but `result_capacity` can be changed at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamerConfig {
    /// Chebyshev radius, in chunks, of the square kept loaded around the
    /// observer. Clamped to `1..=64`.
    pub view_distance: u32,
    /// Hard cap on loaded chunks. The closest chunks win.
    pub max_loaded_chunks: usize,
    /// Most finished chunks merged into the world per update.
    pub chunks_per_frame: usize,
    /// Extra rings beyond `view_distance` that stay loaded before unloading.
    pub unload_margin: u32,
    /// Capacity of the worker → main thread result channel.
    pub result_capacity: usize,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            view_distance: 8,
            max_loaded_chunks: 1024,
            chunks_per_frame: 4,
            unload_margin: 0,
            result_capacity: 16,
        }
    }
}

impl StreamerConfig {
    fn sanitized(mut self) -> Self {
        self.view_distance = self.view_distance.clamp(1, MAX_VIEW_DISTANCE);
        self.max_loaded_chunks = self.max_loaded_chunks.max(1);
        self.chunks_per_frame = self.chunks_per_frame.max(1);
        self.result_capacity = self.result_capacity.max(1);
        self
    }
}

/// What one [`ChunkStreamer::update`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamTick {
    /// The desired set was recomputed this call.
    pub retargeted: bool,
    /// New load requests queued.
    pub enqueued: usize,
    /// Finished chunks inserted into the world.
    pub loaded: Vec<ChunkPos>,
    /// Finished chunks discarded because they left the target.
    pub dropped: usize,
    /// Chunks removed from the world, including capacity evictions.
    pub unloaded: Vec<ChunkPos>,
}

/// The set of positions the streamer currently wants loaded.
#[derive(Debug, Default)]
struct Target {
    center: ChunkPos,
    desired: FxHashSet<ChunkPos>,
}

#[derive(Debug, Default)]
struct StreamState {
    queue: LoadQueue,
    pending: FxHashSet<ChunkPos>,
    target: Target,
    /// Set by the worker when a build failed since the main thread last looked.
    failed: bool,
}

struct Shared {
    state: Mutex<StreamState>,
    wake: Condvar,
    running: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Loads and unloads chunks around an observer using one worker thread.
pub struct ChunkStreamer {
    config: StreamerConfig,
    shared: Arc<Shared>,
    results: Receiver<Chunk>,
    worker: Option<JoinHandle<()>>,
    last_center: Option<ChunkPos>,
    needs_retarget: bool,
    /// Main-thread copy of the published desired set.
    desired: FxHashSet<ChunkPos>,
    /// When failed builds get requested again.
    retry_at: Option<Instant>,
    /// Chunks to remove on the next update.
    unload_queue: Vec<ChunkPos>,
}

impl ChunkStreamer {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Spawn`] if the thread cannot be created.
    pub fn new(config: StreamerConfig, terrain: Arc<dyn TerrainGenerator>) -> Result<Self, WorldError> {
        let config = config.sanitized();
        let shared = Arc::new(Shared {
            state: Mutex::new(StreamState::default()),
            wake: Condvar::new(),
            running: AtomicBool::new(true),
        });
        let (sender, results) = bounded(config.result_capacity);

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("chunk-streamer".into())
            .spawn(move || worker_loop(&worker_shared, terrain.as_ref(), &sender))?;

        tracing::info!(
            "Chunk streamer started (view distance {}, capacity {}, {} per frame)",
            config.view_distance,
            config.max_loaded_chunks,
            config.chunks_per_frame
        );

        Ok(Self {
            config,
            shared,
            results,
            worker: Some(worker),
            last_center: None,
            needs_retarget: true,
            desired: FxHashSet::default(),
            retry_at: None,
            unload_queue: Vec::new(),
        })
    }

    /// Starts a streamer sharing `world`'s terrain generator.
    pub fn for_world(config: StreamerConfig, world: &VoxelWorld) -> Result<Self, WorldError> {
        Self::new(config, Arc::clone(world.terrain()))
    }

    /// Runs one streaming step for an observer at world-space `observer`.
    ///
    /// Recomputes the target when the observer changed chunk (or a setting
    /// changed), merges up to `chunks_per_frame` finished chunks, performs
    /// queued unloads, then evicts the farthest chunks while over capacity.
    pub fn update(&mut self, observer: Vec3, world: &mut VoxelWorld) -> StreamTick {
        let mut tick = StreamTick::default();
        let center = ChunkPos::from_world_f32(observer.x, observer.z);

        self.schedule_failure_retry();

        if self.worker.is_some() && (self.needs_retarget || self.last_center != Some(center)) {
            tick.enqueued = self.retarget(center, world);
            tick.retargeted = true;
        }

        self.merge_results(world, &mut tick);

        for pos in self.unload_queue.drain(..) {
            if world.unload_chunk(pos).is_some() {
                tick.unloaded.push(pos);
            }
        }

        self.enforce_capacity(center, world, &mut tick);

        if tick.retargeted || !tick.loaded.is_empty() || !tick.unloaded.is_empty() {
            tracing::debug!(
                "Stream tick at {:?}: +{} loaded, -{} unloaded, {} dropped, {} enqueued, {} pending",
                center,
                tick.loaded.len(),
                tick.unloaded.len(),
                tick.dropped,
                tick.enqueued,
                self.pending_count()
            );
        }
        tick
    }

    /// Forces a retarget once [`FAILURE_RETRY_DELAY`] has passed since the
    /// worker last reported a failed build.
    fn schedule_failure_retry(&mut self) {
        let failed = std::mem::take(&mut self.shared.lock().failed);
        let now = Instant::now();
        if failed && self.retry_at.is_none() {
            self.retry_at = Some(now + FAILURE_RETRY_DELAY);
        }
        if self.retry_at.is_some_and(|at| now >= at) {
            tracing::debug!("Retrying failed chunk builds");
            self.retry_at = None;
            self.needs_retarget = true;
        }
    }

    /// Recomputes the desired set, queues missing chunks, publishes the new
    /// target to the worker, and queues unloads. Returns the number enqueued.
    fn retarget(&mut self, center: ChunkPos, world: &VoxelWorld) -> usize {
        let desired_order =
            desired_positions(center, self.config.view_distance, self.config.max_loaded_chunks);
        let desired: FxHashSet<ChunkPos> = desired_order.iter().copied().collect();

        let mut enqueued = 0;
        {
            let mut state = self.shared.lock();

            // Requeue everything against the new center; stale requests lose
            // their pending mark.
            for pos in state.queue.drain() {
                state.pending.remove(&pos);
            }

            for &pos in &desired_order {
                if world.contains(pos) || state.pending.contains(&pos) {
                    continue;
                }
                state.pending.insert(pos);
                state.queue.push(ChunkLoadRequest::new(pos, center));
                enqueued += 1;
            }

            state.target = Target {
                center,
                desired: desired.clone(),
            };
        }
        self.desired = desired;
        self.shared.wake.notify_one();

        let view = self.config.view_distance;
        let keep = view + self.config.unload_margin;
        self.unload_queue = world
            .loaded_positions()
            .into_iter()
            .filter(|&pos| {
                let d = pos.chebyshev_distance(center);
                d > keep || (d <= view && !self.desired.contains(&pos))
            })
            .collect();

        self.last_center = Some(center);
        self.needs_retarget = false;
        enqueued
    }

    fn merge_results(&mut self, world: &mut VoxelWorld, tick: &mut StreamTick) {
        for _ in 0..self.config.chunks_per_frame {
            let Ok(chunk) = self.results.try_recv() else {
                break;
            };
            let pos = chunk.position();

            let wanted = {
                let mut state = self.shared.lock();
                let was_pending = state.pending.remove(&pos);
                debug_assert!(was_pending, "result for {pos:?} that was never pending");
                state.target.desired.contains(&pos)
            };

            if !wanted {
                tracing::trace!("Dropping finished chunk {:?}: left the target", pos);
                tick.dropped += 1;
                continue;
            }
            if world.contains(pos) {
                tracing::debug!("Dropping finished chunk {:?}: already loaded", pos);
                tick.dropped += 1;
                continue;
            }
            world.insert_chunk(chunk);
            tick.loaded.push(pos);
        }
    }

    /// Evicts loaded chunks while above capacity: chunks outside the desired
    /// set first, then desired ones, farthest first within each group.
    fn enforce_capacity(&mut self, center: ChunkPos, world: &mut VoxelWorld, tick: &mut StreamTick) {
        let excess = world
            .chunk_count()
            .saturating_sub(self.config.max_loaded_chunks);
        if excess == 0 {
            return;
        }
        let mut loaded = world.loaded_positions();
        loaded.sort_unstable_by_key(|p| {
            std::cmp::Reverse((!self.desired.contains(p), p.distance_sq(center), *p))
        });

        let mut evicted = 0;
        for pos in loaded.into_iter().take(excess) {
            if world.unload_chunk(pos).is_none() {
                continue;
            }
            if self.desired.contains(&pos) {
                // Wanted but over capacity; ask for it again next update.
                self.needs_retarget = true;
            }
            tick.unloaded.push(pos);
            evicted += 1;
        }
        tracing::debug!("Evicted {} chunks over capacity", evicted);
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    pub fn view_distance(&self) -> u32 {
        self.config.view_distance
    }

    /// Sets the view distance (clamped to `1..=64`).
    pub fn set_view_distance(&mut self, distance: u32) {
        let distance = distance.clamp(1, MAX_VIEW_DISTANCE);
        if distance != self.config.view_distance {
            self.config.view_distance = distance;
            self.needs_retarget = true;
        }
    }

    pub fn max_loaded_chunks(&self) -> usize {
        self.config.max_loaded_chunks
    }

    /// Sets the loaded-chunk cap (at least 1).
    pub fn set_max_loaded_chunks(&mut self, max: usize) {
        let max = max.max(1);
        if max != self.config.max_loaded_chunks {
            self.config.max_loaded_chunks = max;
            self.needs_retarget = true;
        }
    }

    pub fn chunks_per_frame(&self) -> usize {
        self.config.chunks_per_frame
    }

    /// Sets the per-update merge budget (at least 1).
    pub fn set_chunks_per_frame(&mut self, count: usize) {
        self.config.chunks_per_frame = count.max(1);
    }

    pub fn unload_margin(&self) -> u32 {
        self.config.unload_margin
    }

    pub fn set_unload_margin(&mut self, margin: u32) {
        if margin != self.config.unload_margin {
            self.config.unload_margin = margin;
            self.needs_retarget = true;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_chunk_loaded(&self, pos: ChunkPos, world: &VoxelWorld) -> bool {
        world.contains(pos)
    }

    /// `true` from enqueue until the result is merged or dropped.
    pub fn is_pending(&self, pos: ChunkPos) -> bool {
        self.shared.lock().pending.contains(&pos)
    }

    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Requests not yet picked up by the worker.
    pub fn queued_count(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Chunk the last retarget was centred on.
    pub fn target_center(&self) -> Option<ChunkPos> {
        self.last_center
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stops and joins the worker, discarding queued requests. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.running.store(false, Ordering::Release);
        {
            let mut state = self.shared.lock();
            state.queue.drain();
            state.pending.clear();
        }
        self.shared.wake.notify_all();

        if worker.join().is_err() {
            tracing::warn!("Chunk streaming worker panicked during shutdown");
        }
        // Finished chunks still in the channel are discarded with it.
        while self.results.try_recv().is_ok() {}
        tracing::info!("Chunk streamer stopped");
    }
}

impl Drop for ChunkStreamer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Every position within Chebyshev `radius` of `center`, closest first
/// (squared distance, then coordinate), truncated to `max`.
pub fn desired_positions(center: ChunkPos, radius: u32, max: usize) -> Vec<ChunkPos> {
    let r = radius as i32;
    let mut positions: Vec<ChunkPos> = (-r..=r)
        .flat_map(|dx| (-r..=r).map(move |dz| center.offset(dx, dz)))
        .collect();
    positions.sort_unstable_by_key(|p| (p.distance_sq(center), *p));
    positions.truncate(max);
    positions
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

fn worker_loop(shared: &Shared, terrain: &dyn TerrainGenerator, results: &Sender<Chunk>) {
    tracing::debug!("Chunk streaming worker running");
    while let Some(request) = next_request(shared) {
        let pos = request.pos;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| build_chunk(terrain, pos)));
        match outcome {
            Ok(Ok(chunk)) => {
                if !deliver(shared, results, chunk) {
                    break;
                }
            }
            Ok(Err(err)) => {
                tracing::warn!("Terrain generation failed for chunk {:?}: {}", pos, err);
                record_failure(shared, pos);
            }
            Err(_) => {
                tracing::warn!("Terrain generation panicked for chunk {:?}", pos);
                record_failure(shared, pos);
            }
        }
    }
    tracing::debug!("Chunk streaming worker exiting");
}

fn record_failure(shared: &Shared, pos: ChunkPos) {
    let mut state = shared.lock();
    state.pending.remove(&pos);
    state.failed = true;
}

/// Blocks until a request that is still wanted is available, or the streamer
/// stops. Requests that left the target are dropped here.
fn next_request(shared: &Shared) -> Option<ChunkLoadRequest> {
    let mut state = shared.lock();
    loop {
        if !shared.is_running() {
            return None;
        }
        while let Some(request) = state.queue.pop() {
            if state.target.desired.contains(&request.pos) {
                return Some(request);
            }
            state.pending.remove(&request.pos);
            tracing::trace!(
                "Skipping stale request for {:?} (target now {:?})",
                request.pos,
                state.target.center
            );
        }
        state = match shared.wake.wait_timeout(state, WORKER_WAIT) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        };
    }
}

/// Sends a finished chunk, waiting while the channel is full. Returns `false`
/// when the streamer stopped or the receiver is gone.
fn deliver(shared: &Shared, results: &Sender<Chunk>, mut chunk: Chunk) -> bool {
    loop {
        match results.send_timeout(chunk, SEND_WAIT) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => {
                if !shared.is_running() {
                    return false;
                }
                chunk = returned;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_positions_square_and_sorted() {
        let center = ChunkPos::new(3, -2);
        let positions = desired_positions(center, 2, usize::MAX);
        assert_eq!(positions.len(), 25);
        assert_eq!(positions[0], center);
        assert!(positions.iter().all(|p| p.chebyshev_distance(center) <= 2));
        for pair in positions.windows(2) {
            assert!(pair[0].distance_sq(center) <= pair[1].distance_sq(center));
        }
    }

    #[test]
    fn test_desired_positions_truncated_to_closest() {
        let center = ChunkPos::new(0, 0);
        let positions = desired_positions(center, 2, 10);
        assert_eq!(positions.len(), 10);
        // Centre, 4 orthogonal, 4 diagonal, then the first of the distance-2 ring.
        assert!(positions[..9].iter().all(|p| p.chebyshev_distance(center) <= 1));
        assert_eq!(positions[9].distance_sq(center), 4);
    }

    #[test]
    fn test_config_sanitized() {
        let config = StreamerConfig {
            view_distance: 500,
            max_loaded_chunks: 0,
            chunks_per_frame: 0,
            unload_margin: 2,
            result_capacity: 0,
        }
        .sanitized();
        assert_eq!(config.view_distance, MAX_VIEW_DISTANCE);
        assert_eq!(config.max_loaded_chunks, 1);
        assert_eq!(config.chunks_per_frame, 1);
        assert_eq!(config.result_capacity, 1);
        assert_eq!(config.unload_margin, 2);
    }
}
