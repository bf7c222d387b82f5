//! Admission policy: immutable snapshots and the decision engine.

pub mod snapshot;
pub mod engine;

pub use snapshot::{PolicySnapshot, Recommendation, VersionRange};
pub use engine::decide;
