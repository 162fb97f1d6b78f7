//! Shared fixtures for integration tests.

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver};
use object_sync::{
    ObjectDetails, ObjectsSubscription, StorageHandler, SubscriptionData, SubscriptionId,
    SubscriptionManager, SubscriptionStorageState, SubscriptionTransport, SubscriptionUpdate,
    SyncError,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(2);

/// Transport that records calls and rejects chosen ids.
#[derive(Default)]
pub struct FakeTransport {
    pub subscribed: Mutex<Vec<SubscriptionData>>,
    pub unsubscribed: Mutex<Vec<SubscriptionId>>,
    pub rejected: Mutex<HashSet<SubscriptionId>>,
    pub fail_unsubscribe: Mutex<bool>,
}

impl FakeTransport {
    pub fn subscribe_count(&self) -> usize {
        self.subscribed.lock().len()
    }

    pub fn reject(&self, id: &SubscriptionId) {
        self.rejected.lock().insert(id.clone());
    }
}

impl SubscriptionTransport for FakeTransport {
    fn subscribe(&self, data: &SubscriptionData) -> object_sync::Result<()> {
        if self.rejected.lock().contains(data.identifier()) {
            return Err(SyncError::QueryRejected {
                id: data.identifier().clone(),
                reason: "invalid filter".to_string(),
            });
        }
        self.subscribed.lock().push(data.clone());
        Ok(())
    }

    fn unsubscribe(&self, ids: &[SubscriptionId]) -> object_sync::Result<()> {
        if *self.fail_unsubscribe.lock() {
            return Err(SyncError::Transport("connection lost".to_string()));
        }
        self.unsubscribed.lock().extend(ids.iter().cloned());
        Ok(())
    }
}

/// Route library logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn setup() -> (Arc<SubscriptionManager>, Arc<FakeTransport>) {
    init_tracing();
    let transport = Arc::new(FakeTransport::default());
    let manager = Arc::new(SubscriptionManager::new(transport.clone()));
    (manager, transport)
}

pub fn objects_query(id: &str, object_ids: &[&str]) -> SubscriptionData {
    SubscriptionData::Objects(ObjectsSubscription {
        identifier: SubscriptionId::new(id),
        space_id: "space".to_string(),
        object_ids: object_ids.iter().map(|s| s.to_string()).collect(),
        keys: vec!["id".to_string(), "name".to_string()],
    })
}

pub fn channel_handler() -> (StorageHandler, Receiver<SubscriptionStorageState>) {
    let (tx, rx) = unbounded();
    let handler: StorageHandler = Arc::new(move |state: SubscriptionStorageState| {
        let _ = tx.send(state);
    });
    (handler, rx)
}

pub fn initial(ids: &[&str]) -> SubscriptionUpdate {
    SubscriptionUpdate::InitialData {
        items: ids.iter().map(|id| ObjectDetails::new(*id)).collect(),
    }
}

pub fn named(id: &str, name: &str) -> ObjectDetails {
    ObjectDetails::new(id).with_value("name", name)
}

/// Drain published states until one matches, or panic after the timeout.
pub fn recv_until(
    rx: &Receiver<SubscriptionStorageState>,
    predicate: impl Fn(&SubscriptionStorageState) -> bool,
) -> SubscriptionStorageState {
    loop {
        let state = rx.recv_timeout(TIMEOUT).expect("no matching state published");
        if predicate(&state) {
            return state;
        }
    }
}
