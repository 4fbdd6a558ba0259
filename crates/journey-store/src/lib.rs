//! Journey Store - persistence for the memory timeline
//!
//! Two collaborators the memory workflow coordinates:
//!
//! ```text
//!   JourneyStore (SQLite)            ObjectStore (blobs)
//!   ├── memories                     └── {bucket}/{memory_id}/{file}
//!   └── media ──FK──► memories.id
//! ```
//!
//! Neither side knows about the other; keeping rows and blobs consistent is
//! the workflow's job.

#![forbid(unsafe_code)]

pub mod error;
pub mod objects;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use objects::{
    public_object_url, HttpObjectStore, LocalObjectStore, ObjectStore, DEFAULT_BUCKET,
};
pub use store::JourneyStore;
pub use types::{
    MediaId, MediaItem, MediaKind, Memory, MemoryFilter, MemoryId, MemoryOrder, MemoryPatch,
    MemoryWithMedia, NewMediaItem, NewMemory, UserId,
};
