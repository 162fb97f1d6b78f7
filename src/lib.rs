//! # Object Sync
//!
//! A live object synchronization layer: the client keeps local copies of
//! server-side query results up to date from a stream of incremental updates.
//!
//! ## Core Concepts
//!
//! - **Details**: Shared store of object details keyed by id
//! - **Subscriptions**: Live queries whose results arrive as ordered patches
//! - **Storages**: Per-query ordered views published after every event
//! - **Builders**: Pure constructors for common list queries
//! - **Trees**: Expandable link trees backed by one child subscription
//!
//! ## Example
//!
//! ```ignore
//! use object_sync::{
//!     builders, ObjectSubscriptionStorage, SubscriptionId, SubscriptionManager,
//!     SubscriptionStorage,
//! };
//!
//! let manager = Arc::new(SubscriptionManager::new(transport));
//!
//! let id = SubscriptionId::unique("Sets");
//! let storage = ObjectSubscriptionStorage::new(id.clone(), manager.clone());
//! storage.start_or_update_subscription(
//!     builders::sets_subscription(id, "space", None),
//!     Arc::new(|state| println!("{:?}", state.ids())),
//! )?;
//!
//! // Decoded events from the transport
//! manager.handle_event(storage.subscription_id(), update)?;
//! ```

pub mod builders;
pub mod details;
pub mod error;
pub mod subscriptions;
pub mod transport;
pub mod tree;
pub mod types;

// Re-exports
pub use details::{DetailsStorage, ObjectDetailsStorage};
pub use error::{Result, SyncError};
pub use subscriptions::{
    Filter, FilterCondition, InitialDataWaiter, ManagerConfig, ObjectSubscriptionStorage,
    ObjectsSubscription, SearchSubscription, Sort, SortDirection, StorageHandler,
    SubscriptionCallback, SubscriptionData, SubscriptionManager, SubscriptionService,
    SubscriptionStats, SubscriptionStorage, SubscriptionStorageState, SubscriptionUpdate,
    WaitOutcome,
};
pub use transport::SubscriptionTransport;
pub use tree::{TreeConfig, TreeRow, TreeSubscriptionManager, TreeSubscriptions, TreeWidget};
pub use types::*;
