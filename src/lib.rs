//! Set-associative cache simulator with LRU replacement.
//!
//! Replays valgrind memory traces against a tag-only cache model and counts
//! hits, misses and evictions.

pub mod address;
pub mod cache;
pub mod error;
pub mod geometry;
pub mod report;
pub mod sim;
pub mod trace;

pub use address::{decompose, AddressFields};
pub use cache::{CacheLine, CacheModel, CacheSet, Outcome};
pub use error::{GeometryError, SimError, TraceError};
pub use geometry::Geometry;
pub use sim::{Counters, Simulator, Step};
pub use trace::{AccessKind, Trace, TraceOp};
