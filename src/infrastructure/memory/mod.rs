//! In-process storage backend.
//!
//! Used for single-instance deployments and tests. Each owner's collection
//! sits behind its own `RwLock`, which is the exclusive section for
//! position-affecting operations. Click counters are shared atomics so
//! click recording never waits on an owner's lock.

pub mod memory_click_repository;
pub mod memory_link_repository;

pub use memory_click_repository::MemoryClickRepository;
pub use memory_link_repository::MemoryLinkRepository;
