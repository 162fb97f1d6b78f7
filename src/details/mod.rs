//! Shared object details store.
//!
//! Every subscription reducer writes the details of the ids it owns into one
//! store; renderers read any id from it for random access.

mod storage;

pub use storage::{DetailsStorage, ObjectDetailsStorage, DEFAULT_RETAINED_CAPACITY};
