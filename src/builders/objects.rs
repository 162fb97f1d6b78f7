//! Subscriptions to explicit object ids.

use crate::error::Result;
use crate::subscriptions::{
    apply_to_details, ObjectsSubscription, SubscriptionCallback, SubscriptionData,
    SubscriptionService, SubscriptionUpdate,
};
use crate::types::{relation_keys, ObjectDetails, ObjectId, SubscriptionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds id-scoped subscriptions with the common object keys.
#[derive(Clone, Debug, Default)]
pub struct ObjectsSubscriptionBuilder {
    base_keys: Vec<String>,
}

impl ObjectsSubscriptionBuilder {
    pub fn new() -> Self {
        Self::with_keys(relation_keys::OBJECT_LIST_KEYS)
    }

    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            base_keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn build(
        &self,
        sub_id_prefix: &str,
        space_id: &str,
        object_ids: Vec<ObjectId>,
        additional_keys: &[&str],
    ) -> SubscriptionData {
        let mut keys = self.base_keys.clone();
        for key in additional_keys {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }

        SubscriptionData::Objects(ObjectsSubscription {
            identifier: SubscriptionId::new(sub_id_prefix),
            space_id: space_id.to_string(),
            object_ids,
            keys,
        })
    }
}

/// Receives the details of a single watched object.
pub type ObjectHandler = Arc<dyn Fn(ObjectDetails) + Send + Sync>;

/// Watches single objects, one subscription per prefix.
pub struct SingleObjectSubscriptionService {
    service: Arc<dyn SubscriptionService>,
    builder: ObjectsSubscriptionBuilder,
    /// Latest details per prefix.
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    next_generation: AtomicU64,
}

/// Details of one prefix, tagged with the start that produced them.
struct CacheEntry {
    generation: u64,
    details: Vec<ObjectDetails>,
}

impl CacheEntry {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            details: Vec::new(),
        }
    }
}

impl SingleObjectSubscriptionService {
    pub fn new(service: Arc<dyn SubscriptionService>, builder: ObjectsSubscriptionBuilder) -> Self {
        Self {
            service,
            builder,
            cache: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn start_subscription(
        &self,
        sub_id_prefix: &str,
        space_id: &str,
        object_id: &str,
        additional_keys: &[&str],
        data_handler: ObjectHandler,
    ) -> Result<()> {
        let data = self.builder.build(
            sub_id_prefix,
            space_id,
            vec![object_id.to_string()],
            additional_keys,
        );

        let cache = Arc::clone(&self.cache);
        let prefix = sub_id_prefix.to_string();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let callback: SubscriptionCallback =
            Arc::new(move |_id: &SubscriptionId, update: SubscriptionUpdate| {
                let first = {
                    let mut cache = cache.lock();
                    let entry = cache
                        .entry(prefix.clone())
                        .or_insert_with(|| CacheEntry::new(generation));
                    if entry.generation > generation {
                        trace!(prefix = %prefix, "ignoring event for replaced object subscription");
                        return;
                    }
                    if entry.generation < generation {
                        *entry = CacheEntry::new(generation);
                    }
                    apply_to_details(&mut entry.details, update);
                    entry.details.first().cloned()
                };
                if let Some(object) = first {
                    data_handler(object);
                }
            });

        // The previous entry stays until the new registration delivers data.
        self.service.start_subscription(data, callback)
    }

    pub fn stop_subscription(&self, sub_id_prefix: &str) -> Result<()> {
        // Outranks every callback handed out so far.
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.cache
            .lock()
            .insert(sub_id_prefix.to_string(), CacheEntry::new(generation));
        debug!(prefix = sub_id_prefix, "stopping single object subscription");
        self.service
            .stop_subscription(&SubscriptionId::new(sub_id_prefix))
    }

    /// Last known details for a prefix.
    pub fn cached(&self, sub_id_prefix: &str) -> Option<ObjectDetails> {
        self.cache
            .lock()
            .get(sub_id_prefix)
            .and_then(|entry| entry.details.first().cloned())
    }
}
