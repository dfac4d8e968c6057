//! Chunk registry, background chunk streaming, and mesh upload tracking.
//!
//! [`VoxelWorld`] owns every loaded chunk and is only ever touched from the
//! main thread. [`ChunkStreamer`] decides which chunks should exist around an
//! observer, builds them on one worker thread, and merges finished chunks into
//! the world during [`ChunkStreamer::update`].

pub mod error;
pub mod load_queue;
pub mod streamer;
pub mod upload;
pub mod world;

pub use error::WorldError;
pub use load_queue::{ChunkLoadRequest, LoadQueue};
pub use streamer::{ChunkStreamer, StreamTick, StreamerConfig};
pub use upload::MeshUploadTracker;
pub use world::VoxelWorld;
