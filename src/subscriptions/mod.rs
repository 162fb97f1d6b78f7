//! Live subscriptions to server-computed query results.
//!
//! This module provides:
//! - The update protocol pushed by the query engine
//! - An ordered reducer turning updates into a consistent result list
//! - A manager multiplexing subscriptions over one transport
//! - Per-id storages publishing ordered details to consumers
//!
//! # Example
//!
//! ```ignore
//! let manager = Arc::new(SubscriptionManager::new(transport));
//! let storage = ObjectSubscriptionStorage::new(id.clone(), manager.clone());
//!
//! storage.start_or_update_subscription(data, Arc::new(|state| {
//!     println!("{} objects", state.items.len());
//! }))?;
//!
//! // Transport side: route decoded events
//! manager.handle_event(&id, SubscriptionUpdate::Remove { id: "obj".into() })?;
//! ```

mod manager;
pub mod reducer;
mod storage;
mod types;

pub use manager::{InitialDataWaiter, SubscriptionManager, SubscriptionService};
pub use reducer::{apply_to_details, apply_update, ApplyOutcome, Inconsistency, OrderedIds};
pub use storage::{
    ObjectSubscriptionStorage, StorageHandler, SubscriptionStorage, SubscriptionStorageState,
};
pub use types::{
    Filter, FilterCondition, ManagerConfig, ObjectsSubscription, SearchSubscription, Sort,
    SortDirection, SubscriptionCallback, SubscriptionData, SubscriptionStats, SubscriptionUpdate,
    WaitOutcome,
};
