//! Child subscription of a tree widget.

use crate::builders::ObjectsSubscriptionBuilder;
use crate::error::Result;
use crate::subscriptions::{
    ObjectSubscriptionStorage, StorageHandler, SubscriptionService, SubscriptionStorage,
    SubscriptionStorageState,
};
use crate::types::{relation_keys, ObjectId, SubscriptionId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use super::types::{DetailsHandler, TreeConfig};

/// Keeps one subscription scoped to the link targets a tree needs.
pub trait TreeSubscriptions: Send + Sync {
    /// Route child details to `handler`.
    fn set_details_handler(&self, handler: DetailsHandler);

    /// Subscribe to exactly `object_ids`.
    ///
    /// Returns `true` when the subscription changed; the call then blocks until
    /// the first batch reached the handler or the service's wait bound
    /// elapsed. An unchanged id set returns
    /// `false`. An empty set stops the subscription and returns `false`.
    fn start_or_update_subscription(&self, space_id: &str, object_ids: Vec<ObjectId>)
        -> Result<bool>;

    fn stop(&self) -> Result<()>;
}

/// [`TreeSubscriptions`] backed by an [`ObjectSubscriptionStorage`].
pub struct TreeSubscriptionManager {
    storage: ObjectSubscriptionStorage,
    builder: ObjectsSubscriptionBuilder,
    handler: Arc<RwLock<Option<DetailsHandler>>>,
}

impl TreeSubscriptionManager {
    pub fn new(service: Arc<dyn SubscriptionService>) -> Self {
        Self::with_config(service, &TreeConfig::default())
    }

    pub fn with_config(service: Arc<dyn SubscriptionService>, config: &TreeConfig) -> Self {
        let id = SubscriptionId::unique(&config.child_subscription_prefix);
        Self {
            storage: ObjectSubscriptionStorage::new(id, service),
            builder: ObjectsSubscriptionBuilder::with_keys(relation_keys::TREE_KEYS),
            handler: Arc::new(RwLock::new(None)),
        }
    }

    pub fn subscription_id(&self) -> &SubscriptionId {
        self.storage.subscription_id()
    }

    fn storage_handler(&self) -> StorageHandler {
        let handler = Arc::clone(&self.handler);
        Arc::new(move |state: SubscriptionStorageState| {
            let handler = handler.read().clone();
            if let Some(handler) = handler {
                handler(state.items);
            }
        })
    }
}

impl TreeSubscriptions for TreeSubscriptionManager {
    fn set_details_handler(&self, handler: DetailsHandler) {
        *self.handler.write() = Some(handler);
    }

    fn start_or_update_subscription(
        &self,
        space_id: &str,
        object_ids: Vec<ObjectId>,
    ) -> Result<bool> {
        if object_ids.is_empty() {
            self.stop()?;
            return Ok(false);
        }

        let data = self.builder.build(
            self.storage.subscription_id().as_str(),
            space_id,
            object_ids,
            &[],
        );
        let changed = self
            .storage
            .start_or_update_subscription_and_wait(data, self.storage_handler())?;
        if changed {
            debug!(subscription_id = %self.subscription_id(), "tree child subscription updated");
        }
        Ok(changed)
    }

    fn stop(&self) -> Result<()> {
        self.storage.stop_subscription()
    }
}
