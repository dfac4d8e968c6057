//! Nearest-first queue of chunk load requests.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use strata_voxel::ChunkPos;

/// A request to build one chunk.
///
/// Ordered by `priority` (squared chunk distance to the observer, lower is
/// sooner), then by coordinate so equal distances pop deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkLoadRequest {
    pub priority: u64,
    pub pos: ChunkPos,
}

impl ChunkLoadRequest {
    /// Request for `pos`, prioritized by squared distance to `center`.
    pub fn new(pos: ChunkPos, center: ChunkPos) -> Self {
        Self {
            priority: pos.distance_sq(center),
            pos,
        }
    }
}

/// Min-heap of [`ChunkLoadRequest`]s with at most one entry per position.
#[derive(Debug, Default)]
pub struct LoadQueue {
    heap: BinaryHeap<Reverse<ChunkLoadRequest>>,
    /// Positions currently queued (dedup guard).
    queued: FxHashSet<ChunkPos>,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a request. Returns `false` if the position is already queued.
    pub fn push(&mut self, request: ChunkLoadRequest) -> bool {
        if !self.queued.insert(request.pos) {
            return false;
        }
        self.heap.push(Reverse(request));
        true
    }

    /// Removes and returns the closest request.
    pub fn pop(&mut self) -> Option<ChunkLoadRequest> {
        let Reverse(request) = self.heap.pop()?;
        self.queued.remove(&request.pos);
        Some(request)
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.queued.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Empties the queue, returning the positions that were queued.
    pub fn drain(&mut self) -> Vec<ChunkPos> {
        self.heap.clear();
        self.queued.drain().collect()
    }
}
