//! Per-subscription storage publishing ordered details after every event.

use crate::details::ObjectDetailsStorage;
use crate::error::{Result, SyncError};
use crate::types::{ObjectDetails, SubscriptionId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::manager::SubscriptionService;
use super::reducer::{apply_update, OrderedIds};
use super::types::{
    SubscriptionCallback, SubscriptionData, SubscriptionStats, SubscriptionUpdate, WaitOutcome,
};

/// Ordered result of a subscription as seen by consumers.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionStorageState {
    /// Details in server order (or in the query's order override).
    pub items: Vec<Arc<ObjectDetails>>,
    /// Total results on the server, once reported.
    pub total: Option<usize>,
    /// Set when this state follows a full replace.
    pub is_initial: bool,
}

impl SubscriptionStorageState {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.id.as_str()).collect()
    }
}

/// Receives the published state after every applied event.
pub type StorageHandler = Arc<dyn Fn(SubscriptionStorageState) + Send + Sync>;

/// One logical subscription with a locally maintained ordered result.
pub trait SubscriptionStorage: Send + Sync {
    fn subscription_id(&self) -> &SubscriptionId;

    /// Register the query (or replace a different one) and attach `handler`.
    ///
    /// Identical data is a no-op and returns `false`. On error the storage
    /// keeps its previous query and contents.
    fn start_or_update_subscription(
        &self,
        data: SubscriptionData,
        handler: StorageHandler,
    ) -> Result<bool>;

    /// Like [`SubscriptionStorage::start_or_update_subscription`], but blocks
    /// until the new registration delivered its first batch. The wait is
    /// bounded by the service; a late batch is still published.
    fn start_or_update_subscription_and_wait(
        &self,
        data: SubscriptionData,
        handler: StorageHandler,
    ) -> Result<bool>;

    /// Unregister and clear the ordered list. Idempotent.
    fn stop_subscription(&self) -> Result<()>;

    /// Shared store for random-access lookups outside the ordered result.
    fn details_storage(&self) -> Arc<ObjectDetailsStorage>;

    /// Current ordered result.
    fn state(&self) -> SubscriptionStorageState;
}

struct StorageInner {
    data: Option<SubscriptionData>,
    /// Bumped on every start and stop; events carrying an older
    /// generation come from a replaced registration.
    generation: u64,
    ids: OrderedIds,
    total: Option<usize>,
    stats: SubscriptionStats,
}

impl StorageInner {
    fn snapshot(&self, store: &ObjectDetailsStorage, is_initial: bool) -> SubscriptionStorageState {
        use crate::details::DetailsStorage;

        // Ids without details are skipped.
        let mut items = store.get_many(self.ids.as_slice());
        if let Some(order) = self.data.as_ref().and_then(|d| d.object_order()) {
            items.sort_by_key(|d| order.iter().position(|id| *id == d.id).unwrap_or(usize::MAX));
        }

        SubscriptionStorageState {
            items,
            total: self.total,
            is_initial,
        }
    }

    fn reset(&mut self, store: &ObjectDetailsStorage) {
        self.ids.clear(store);
        self.total = None;
    }
}

/// Subscription storage backed by a [`SubscriptionService`].
pub struct ObjectSubscriptionStorage {
    id: SubscriptionId,
    service: Arc<dyn SubscriptionService>,
    store: Arc<ObjectDetailsStorage>,
    inner: Arc<Mutex<StorageInner>>,
}

impl ObjectSubscriptionStorage {
    pub fn new(id: SubscriptionId, service: Arc<dyn SubscriptionService>) -> Self {
        let store = service.storage();
        Self {
            id,
            service,
            store,
            inner: Arc::new(Mutex::new(StorageInner {
                data: None,
                generation: 0,
                ids: OrderedIds::new(),
                total: None,
                stats: SubscriptionStats::default(),
            })),
        }
    }

    /// Event counters since creation.
    pub fn stats(&self) -> SubscriptionStats {
        self.inner.lock().stats
    }

    /// Query currently registered, if any.
    pub fn data(&self) -> Option<SubscriptionData> {
        self.inner.lock().data.clone()
    }

    fn callback(&self, generation: u64, handler: StorageHandler) -> SubscriptionCallback {
        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(&self.store);

        Arc::new(move |id: &SubscriptionId, update: SubscriptionUpdate| {
            let state = {
                let mut inner = inner.lock();
                if inner.generation != generation {
                    trace!(subscription_id = %id, "ignoring event for superseded query");
                    return;
                }

                let outcome = apply_update(&mut inner.ids, update, &store);
                inner.stats.events_applied += 1;
                for inconsistency in &outcome.inconsistencies {
                    inner.stats.inconsistencies += 1;
                    warn!(
                        subscription_id = %id,
                        total = inner.stats.inconsistencies,
                        "inconsistent subscription event: {}",
                        inconsistency
                    );
                }
                if let Some(count) = outcome.page_count {
                    inner.total = Some(count);
                }
                inner.snapshot(&store, outcome.is_initial)
            };
            handler(state);
        })
    }

    fn start(&self, data: SubscriptionData, handler: StorageHandler, wait: bool) -> Result<bool> {
        if data.identifier() != &self.id {
            return Err(SyncError::InvalidSubscription(format!(
                "query {} routed to storage {}",
                data.identifier(),
                self.id
            )));
        }

        let waiter = {
            let mut inner = self.inner.lock();
            if inner.data.as_ref() == Some(&data) {
                if self.service.active_data(&self.id).as_ref() == Some(&data) {
                    trace!(subscription_id = %self.id, "query unchanged, keeping registration");
                    return Ok(false);
                }
                debug!(subscription_id = %self.id, "registration was stopped elsewhere, restarting");
            }

            let generation = inner.generation + 1;
            let callback = self.callback(generation, handler);
            // Events of the new registration block on `inner` until the
            // swap below completes.
            let waiter = self
                .service
                .start_subscription_with_waiter(data.clone(), callback)?;

            inner.reset(&self.store);
            inner.generation = generation;
            inner.data = Some(data);
            waiter
        };

        if wait {
            match waiter.wait() {
                WaitOutcome::Loaded => {}
                WaitOutcome::Cancelled => {
                    debug!(subscription_id = %self.id, "stopped before initial data arrived");
                }
                WaitOutcome::TimedOut => {
                    warn!(subscription_id = %self.id, "no initial data in time, publishing on arrival");
                }
            }
        }
        Ok(true)
    }
}

impl SubscriptionStorage for ObjectSubscriptionStorage {
    fn subscription_id(&self) -> &SubscriptionId {
        &self.id
    }

    fn start_or_update_subscription(
        &self,
        data: SubscriptionData,
        handler: StorageHandler,
    ) -> Result<bool> {
        self.start(data, handler, false)
    }

    fn start_or_update_subscription_and_wait(
        &self,
        data: SubscriptionData,
        handler: StorageHandler,
    ) -> Result<bool> {
        self.start(data, handler, true)
    }

    fn stop_subscription(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.data.take().is_none() {
            return Ok(());
        }
        inner.generation += 1;
        inner.reset(&self.store);
        self.service.stop_subscription(&self.id)
    }

    fn details_storage(&self) -> Arc<ObjectDetailsStorage> {
        Arc::clone(&self.store)
    }

    fn state(&self) -> SubscriptionStorageState {
        self.inner.lock().snapshot(&self.store, false)
    }
}

impl Drop for ObjectSubscriptionStorage {
    fn drop(&mut self) {
        if let Err(e) = self.stop_subscription() {
            warn!(subscription_id = %self.id, error = %e, "failed to stop subscription on drop");
        }
    }
}
