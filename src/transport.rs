//! Boundary to the middleware process that evaluates subscriptions.
//!
//! The transport only registers and unregisters queries. Decoded events
//! flow back through [`crate::SubscriptionManager::handle_event`].

use crate::error::Result;
use crate::subscriptions::SubscriptionData;
use crate::types::SubscriptionId;

/// Registers live queries with the remote query engine.
pub trait SubscriptionTransport: Send + Sync {
    /// Register the query, replacing any registration with the same identifier.
    ///
    /// Fails with [`crate::SyncError::QueryRejected`] when the engine refuses
    /// the query (invalid filter, permission denied).
    fn subscribe(&self, data: &SubscriptionData) -> Result<()>;

    /// Unregister the given subscriptions.
    fn unsubscribe(&self, ids: &[SubscriptionId]) -> Result<()>;
}
