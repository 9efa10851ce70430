//! The synchronization driver: load the persisted history, extend it
//! forward one round at a time through the strategy chain, and commit the
//! result to every mirror.

pub mod report;
pub mod runner;

pub use report::{Boundary, SyncReport};
pub use runner::SyncRunner;
