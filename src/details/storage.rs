//! Reference-counted details store with an LRU of retained entries.

use crate::types::{ObjectDetails, ObjectId};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of unreferenced details kept for fast re-subscribe.
pub const DEFAULT_RETAINED_CAPACITY: usize = 512;

/// Read access to synchronized object details.
pub trait DetailsStorage: Send + Sync {
    /// Look up details by object id.
    fn get(&self, id: &str) -> Option<Arc<ObjectDetails>>;

    /// Resolve several ids, keeping input order and skipping unknown ids.
    fn get_many(&self, ids: &[ObjectId]) -> Vec<Arc<ObjectDetails>> {
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of resolvable ids.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry {
    details: Arc<ObjectDetails>,
    /// Number of live subscriptions listing this id.
    refs: usize,
}

/// Details store shared by all subscriptions of a session.
///
/// Entries referenced by at least one subscription are "live". When the last
/// reference goes away the entry moves to a bounded LRU instead of being
/// dropped, so a consumer re-expanding a tree or re-opening a screen can
/// still resolve it.
pub struct ObjectDetailsStorage {
    live: RwLock<HashMap<ObjectId, Entry>>,
    retained: Mutex<LruCache<ObjectId, Arc<ObjectDetails>>>,
}

impl ObjectDetailsStorage {
    pub fn new() -> Self {
        Self::with_retained_capacity(DEFAULT_RETAINED_CAPACITY)
    }

    pub fn with_retained_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            live: RwLock::new(HashMap::new()),
            retained: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Store details and take one reference on the id.
    pub fn acquire(&self, details: ObjectDetails) {
        let mut live = self.live.write();
        let id = details.id.clone();
        let details = Arc::new(details);
        match live.get_mut(&id) {
            Some(entry) => {
                entry.details = details;
                entry.refs += 1;
            }
            None => {
                self.retained.lock().pop(&id);
                live.insert(id, Entry { details, refs: 1 });
            }
        }
    }

    /// Replace the details of an id owned by the caller.
    ///
    /// Unreferenced ids land in the retained cache.
    pub fn upsert(&self, details: ObjectDetails) {
        let mut live = self.live.write();
        match live.get_mut(&details.id) {
            Some(entry) => entry.details = Arc::new(details),
            None => {
                self.retained
                    .lock()
                    .put(details.id.clone(), Arc::new(details));
            }
        }
    }

    /// Keep details for an id the caller does not own.
    ///
    /// Live entries belong to other subscriptions and are left untouched.
    pub fn stash(&self, details: ObjectDetails) {
        let live = self.live.read();
        if !live.contains_key(&details.id) {
            self.retained
                .lock()
                .put(details.id.clone(), Arc::new(details));
        }
    }

    /// Drop one reference. The entry is retained once nobody references it.
    pub fn release(&self, id: &str) {
        let mut live = self.live.write();
        let now_unreferenced = match live.get_mut(id) {
            Some(entry) => {
                entry.refs = entry.refs.saturating_sub(1);
                entry.refs == 0
            }
            None => false,
        };
        if now_unreferenced {
            if let Some(entry) = live.remove(id) {
                self.retained.lock().put(id.to_string(), entry.details);
            }
        }
    }

    /// Number of ids referenced by at least one subscription.
    pub fn live_count(&self) -> usize {
        self.live.read().len()
    }

    pub fn retained_count(&self) -> usize {
        self.retained.lock().len()
    }

    /// Number of live references held on an id.
    pub fn ref_count(&self, id: &str) -> usize {
        self.live.read().get(id).map(|e| e.refs).unwrap_or(0)
    }
}

impl DetailsStorage for ObjectDetailsStorage {
    fn get(&self, id: &str) -> Option<Arc<ObjectDetails>> {
        if let Some(entry) = self.live.read().get(id) {
            return Some(Arc::clone(&entry.details));
        }
        self.retained.lock().get(id).cloned()
    }

    fn len(&self) -> usize {
        // Live and retained ids are disjoint.
        self.live.read().len() + self.retained.lock().len()
    }
}

impl Default for ObjectDetailsStorage {
    fn default() -> Self {
        Self::new()
    }
}
