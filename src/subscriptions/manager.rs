//! Subscription manager multiplexing live queries over one transport.

use crate::details::ObjectDetailsStorage;
use crate::error::{Result, SyncError};
use crate::transport::SubscriptionTransport;
use crate::types::SubscriptionId;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::types::{
    ManagerConfig, SubscriptionCallback, SubscriptionData, SubscriptionUpdate, WaitOutcome,
};

/// Live subscriptions and lifecycle of their event routing.
pub trait SubscriptionService: Send + Sync {
    /// Shared details store for ad hoc id lookups.
    fn storage(&self) -> Arc<ObjectDetailsStorage>;

    /// Query currently registered for an id.
    fn active_data(&self, id: &SubscriptionId) -> Option<SubscriptionData>;

    fn is_active(&self, id: &SubscriptionId) -> bool {
        self.active_data(id).is_some()
    }

    /// Start several subscriptions sharing one callback.
    fn start_subscriptions(
        &self,
        data: Vec<SubscriptionData>,
        update: SubscriptionCallback,
    ) -> Result<()>;

    /// Start a subscription, replacing any live one with the same id.
    fn start_subscription(&self, data: SubscriptionData, update: SubscriptionCallback)
        -> Result<()>;

    /// Start a subscription and hand back a handle resolving on first data.
    fn start_subscription_with_waiter(
        &self,
        data: SubscriptionData,
        update: SubscriptionCallback,
    ) -> Result<InitialDataWaiter>;

    /// Start a subscription and block until its initial data was delivered,
    /// the subscription was stopped, or the configured bound elapsed.
    fn start_subscription_and_wait(
        &self,
        data: SubscriptionData,
        update: SubscriptionCallback,
    ) -> Result<WaitOutcome> {
        Ok(self.start_subscription_with_waiter(data, update)?.wait())
    }

    /// Re-issue a query that may or may not be live.
    ///
    /// A live subscription with identical data is left alone. An inactive id
    /// is only started when `required` is set. Returns whether a
    /// registration was made.
    fn update_subscription(
        &self,
        data: SubscriptionData,
        required: bool,
        update: SubscriptionCallback,
    ) -> Result<bool>;

    /// Stop one subscription. Stopping an inactive id is a no-op.
    fn stop_subscription(&self, id: &SubscriptionId) -> Result<()>;

    fn stop_subscriptions(&self, ids: &[SubscriptionId]) -> Result<()>;

    fn stop_all_subscriptions(&self) -> Result<()>;
}

/// One-shot handle resolved when a subscription receives its initial data.
pub struct InitialDataWaiter {
    receiver: Receiver<WaitOutcome>,
    timeout: Duration,
}

impl InitialDataWaiter {
    /// Block until initial data arrives, the subscription is stopped, or the
    /// manager's `initial_data_timeout` elapsed.
    pub fn wait(self) -> WaitOutcome {
        self.wait_timeout(self.timeout)
            .unwrap_or(WaitOutcome::TimedOut)
    }

    /// Wait at most `timeout`. `None` if nothing arrived in time.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<WaitOutcome> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(WaitOutcome::Cancelled),
        }
    }
}

/// Pending initial-data waiters of one subscription id.
///
/// Shared by successive registrations of the id, so a wait started before a
/// replacement resolves on the replacement's initial data.
#[derive(Default)]
struct Waiters {
    pending: Vec<PendingWaiter>,
}

struct PendingWaiter {
    /// Number of the registration the wait was started with.
    registration: u64,
    sender: Sender<WaitOutcome>,
}

impl Waiters {
    /// Resolve waits started with registration `number` or an earlier one.
    fn resolve_up_to(&mut self, number: u64, outcome: WaitOutcome) {
        self.pending.retain(|waiter| {
            if waiter.registration > number {
                return true;
            }
            let _ = waiter.sender.send(outcome);
            false
        });
    }

    fn resolve_all(&mut self, outcome: WaitOutcome) {
        for waiter in self.pending.drain(..) {
            let _ = waiter.sender.send(outcome);
        }
    }

    fn forget(&mut self, number: u64) {
        self.pending.retain(|waiter| waiter.registration != number);
    }
}

/// Internal registration state.
struct Registration {
    data: SubscriptionData,
    sender: Sender<SubscriptionUpdate>,
    /// Set once the registration is replaced or stopped.
    cancelled: Arc<AtomicBool>,
    waiters: Arc<Mutex<Waiters>>,
}

impl Registration {
    /// Stop routing events. Queued events are discarded by the worker.
    fn cancel(&self, outcome: Option<WaitOutcome>) {
        let mut waiters = self.waiters.lock();
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(outcome) = outcome {
            waiters.resolve_all(outcome);
        }
    }
}

/// Drains the event queue of one registration.
struct Worker {
    number: u64,
    id: SubscriptionId,
    receiver: Receiver<SubscriptionUpdate>,
    /// Resolves once the transport accepted (`true`) or rejected the query.
    ready: Receiver<bool>,
    update: SubscriptionCallback,
    cancelled: Arc<AtomicBool>,
    waiters: Arc<Mutex<Waiters>>,
}

impl Worker {
    fn run(self) {
        if !self.ready.recv().unwrap_or(false) {
            return;
        }
        for event in self.receiver.iter() {
            if self.cancelled.load(Ordering::SeqCst) {
                trace!(subscription_id = %self.id, "discarding event for replaced subscription");
                break;
            }
            let is_initial = event.is_initial_data();
            (self.update)(&self.id, event);

            if is_initial {
                let mut waiters = self.waiters.lock();
                if !self.cancelled.load(Ordering::SeqCst) {
                    waiters.resolve_up_to(self.number, WaitOutcome::Loaded);
                }
            }
        }
    }
}

/// Manages live subscriptions keyed by id.
///
/// Each registration owns an event queue drained by its own worker thread,
/// so events for one id are applied strictly in arrival order while a slow
/// consumer of one id never delays another.
pub struct SubscriptionManager {
    config: ManagerConfig,
    transport: Arc<dyn SubscriptionTransport>,
    storage: Arc<ObjectDetailsStorage>,
    /// Active registrations by id.
    registrations: RwLock<HashMap<SubscriptionId, Registration>>,
    /// Serializes start/stop so one id never races to the transport.
    write_lock: Mutex<()>,
    /// Numbers registrations and names their worker threads.
    next_registration: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new(transport: Arc<dyn SubscriptionTransport>) -> Self {
        Self::with_config(transport, ManagerConfig::default())
    }

    /// Create a new subscription manager with custom configuration.
    pub fn with_config(transport: Arc<dyn SubscriptionTransport>, config: ManagerConfig) -> Self {
        let storage = Arc::new(ObjectDetailsStorage::with_retained_capacity(
            config.retained_details_capacity,
        ));
        Self {
            config,
            transport,
            storage,
            registrations: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
            next_registration: AtomicU64::new(1),
        }
    }

    /// Route a decoded event from the transport to its subscription.
    ///
    /// Events for ids that are not live (stale ids after a stop or a race with
    /// the server) are dropped.
    pub fn handle_event(&self, id: &SubscriptionId, update: SubscriptionUpdate) -> Result<()> {
        let delivered = match self.registrations.read().get(id) {
            Some(reg) => reg.sender.send(update).is_ok(),
            None => false,
        };
        if !delivered {
            debug!(subscription_id = %id, "dropping event for inactive subscription");
            return Err(SyncError::SubscriptionNotActive(id.clone()));
        }
        Ok(())
    }

    pub fn active_ids(&self) -> Vec<SubscriptionId> {
        let mut ids: Vec<_> = self.registrations.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn subscription_count(&self) -> usize {
        self.registrations.read().len()
    }

    /// Register with the transport and install the worker.
    ///
    /// The new registration is routable before the transport is called, so
    /// events the engine sends while `subscribe` is in flight are queued for
    /// it. Its worker holds them until the transport accepted the query.
    /// Must be called with `write_lock` held.
    fn register(
        &self,
        data: SubscriptionData,
        update: SubscriptionCallback,
        waiter: Option<Sender<WaitOutcome>>,
    ) -> Result<()> {
        data.validate()?;
        let id = data.identifier().clone();
        let number = self.next_registration.fetch_add(1, Ordering::Relaxed);

        let (sender, receiver) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let waiters = self
            .registrations
            .read()
            .get(&id)
            .map(|reg| Arc::clone(&reg.waiters))
            .unwrap_or_default();

        self.spawn_worker(Worker {
            number,
            id: id.clone(),
            receiver: receiver.clone(),
            ready: ready_rx,
            update,
            cancelled: Arc::clone(&cancelled),
            waiters: Arc::clone(&waiters),
        })?;

        if let Some(sender) = waiter {
            waiters.lock().pending.push(PendingWaiter {
                registration: number,
                sender,
            });
        }

        let previous = self.registrations.write().insert(
            id.clone(),
            Registration {
                data: data.clone(),
                sender,
                cancelled,
                waiters: Arc::clone(&waiters),
            },
        );

        // Register-or-replace on the transport.
        if let Err(e) = self.transport.subscribe(&data) {
            self.restore(&id, previous, &receiver);
            waiters.lock().forget(number);
            let _ = ready_tx.send(false);
            return Err(e);
        }

        if let Some(old) = previous {
            debug!(subscription_id = %id, "replacing live subscription");
            old.cancel(None);
        }
        let _ = ready_tx.send(true);
        debug!(subscription_id = %id, registration = number, "subscription started");
        Ok(())
    }

    /// Reinstate the registration a rejected query displaced.
    ///
    /// Events queued for the rejected registration move to the previous one
    /// in arrival order.
    fn restore(
        &self,
        id: &SubscriptionId,
        previous: Option<Registration>,
        queued: &Receiver<SubscriptionUpdate>,
    ) {
        let mut regs = self.registrations.write();
        if let Some(rejected) = regs.remove(id) {
            rejected.cancelled.store(true, Ordering::SeqCst);
        }
        match previous {
            Some(old) => {
                for event in queued.try_iter() {
                    let _ = old.sender.send(event);
                }
                regs.insert(id.clone(), old);
            }
            None => {
                let dropped = queued.try_iter().count();
                if dropped > 0 {
                    debug!(subscription_id = %id, dropped, "dropping events for rejected subscription");
                }
            }
        }
    }

    fn spawn_worker(&self, worker: Worker) -> Result<()> {
        let name = format!("{}-{}", self.config.worker_name_prefix, worker.number);
        thread::Builder::new().name(name).spawn(move || worker.run())?;
        Ok(())
    }

    /// Remove registrations and unregister them from the transport.
    ///
    /// Local state is cleared even when the transport fails to unregister.
    fn unregister(&self, ids: &[SubscriptionId]) -> Result<()> {
        let removed: Vec<SubscriptionId> = {
            let mut regs = self.registrations.write();
            ids.iter()
                .filter_map(|id| {
                    regs.remove(id).map(|reg| {
                        reg.cancel(Some(WaitOutcome::Cancelled));
                        id.clone()
                    })
                })
                .collect()
        };

        if removed.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.transport.unsubscribe(&removed) {
            warn!(count = removed.len(), error = %e, "transport failed to unregister subscriptions");
            return Err(e);
        }
        debug!(count = removed.len(), "subscriptions stopped");
        Ok(())
    }
}

impl SubscriptionService for SubscriptionManager {
    fn storage(&self) -> Arc<ObjectDetailsStorage> {
        Arc::clone(&self.storage)
    }

    fn active_data(&self, id: &SubscriptionId) -> Option<SubscriptionData> {
        self.registrations.read().get(id).map(|r| r.data.clone())
    }

    fn start_subscriptions(
        &self,
        data: Vec<SubscriptionData>,
        update: SubscriptionCallback,
    ) -> Result<()> {
        // Last request per id wins; identical repeats collapse.
        let mut batch: Vec<SubscriptionData> = Vec::with_capacity(data.len());
        for item in data {
            match batch
                .iter()
                .position(|queued| queued.identifier() == item.identifier())
            {
                Some(index) => batch[index] = item,
                None => batch.push(item),
            }
        }

        let _lock = self.write_lock.lock();
        for item in batch {
            self.register(item, Arc::clone(&update), None)?;
        }
        Ok(())
    }

    fn start_subscription(
        &self,
        data: SubscriptionData,
        update: SubscriptionCallback,
    ) -> Result<()> {
        let _lock = self.write_lock.lock();
        self.register(data, update, None)
    }

    fn start_subscription_with_waiter(
        &self,
        data: SubscriptionData,
        update: SubscriptionCallback,
    ) -> Result<InitialDataWaiter> {
        let (sender, receiver) = bounded(1);
        let _lock = self.write_lock.lock();
        self.register(data, update, Some(sender))?;
        Ok(InitialDataWaiter {
            receiver,
            timeout: self.config.initial_data_timeout,
        })
    }

    fn update_subscription(
        &self,
        data: SubscriptionData,
        required: bool,
        update: SubscriptionCallback,
    ) -> Result<bool> {
        let _lock = self.write_lock.lock();
        let current = self
            .registrations
            .read()
            .get(data.identifier())
            .map(|reg| reg.data == data);

        match current {
            Some(true) => {
                trace!(subscription_id = %data.identifier(), "subscription unchanged");
                Ok(false)
            }
            Some(false) => self.register(data, update, None).map(|_| true),
            None if required => self.register(data, update, None).map(|_| true),
            None => Ok(false),
        }
    }

    fn stop_subscription(&self, id: &SubscriptionId) -> Result<()> {
        let _lock = self.write_lock.lock();
        self.unregister(std::slice::from_ref(id))
    }

    fn stop_subscriptions(&self, ids: &[SubscriptionId]) -> Result<()> {
        let _lock = self.write_lock.lock();
        self.unregister(ids)
    }

    fn stop_all_subscriptions(&self) -> Result<()> {
        let _lock = self.write_lock.lock();
        let ids = self.active_ids();
        self.unregister(&ids)
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        for reg in self.registrations.get_mut().values() {
            reg.cancel(Some(WaitOutcome::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::types::ObjectsSubscription;
    use crate::transport::testing::RecordingTransport;
    use crate::types::ObjectDetails;
    use std::sync::Weak;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn objects(id: &str, object_ids: &[&str]) -> SubscriptionData {
        SubscriptionData::Objects(ObjectsSubscription {
            identifier: SubscriptionId::new(id),
            space_id: "space".into(),
            object_ids: object_ids.iter().map(|s| s.to_string()).collect(),
            keys: vec![],
        })
    }

    fn recording_callback() -> (SubscriptionCallback, Receiver<(SubscriptionId, SubscriptionUpdate)>) {
        let (tx, rx) = unbounded();
        let callback: SubscriptionCallback = Arc::new(move |id: &SubscriptionId, update: SubscriptionUpdate| {
            let _ = tx.send((id.clone(), update));
        });
        (callback, rx)
    }

    fn manager() -> (SubscriptionManager, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        (SubscriptionManager::new(transport.clone()), transport)
    }

    #[test]
    fn test_start_and_route() {
        let (manager, transport) = manager();
        let (callback, rx) = recording_callback();

        manager.start_subscription(objects("a", &["1"]), callback).unwrap();
        assert_eq!(transport.subscribe_count(), 1);
        assert!(manager.is_active(&"a".into()));

        manager
            .handle_event(&"a".into(), SubscriptionUpdate::PageCount { count: 1 })
            .unwrap();
        let (id, update) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(id, SubscriptionId::new("a"));
        assert_eq!(update, SubscriptionUpdate::PageCount { count: 1 });
    }

    #[test]
    fn test_event_for_unknown_id() {
        let (manager, _) = manager();
        let result = manager.handle_event(&"ghost".into(), SubscriptionUpdate::PageCount { count: 1 });
        assert!(matches!(result, Err(SyncError::SubscriptionNotActive(_))));
    }

    #[test]
    fn test_restart_replaces_registration() {
        let (manager, transport) = manager();
        let (first, first_rx) = recording_callback();
        let (second, second_rx) = recording_callback();

        manager.start_subscription(objects("a", &["1"]), first).unwrap();
        manager.start_subscription(objects("a", &["2"]), second).unwrap();
        assert_eq!(manager.subscription_count(), 1);
        assert_eq!(transport.subscribe_count(), 2);

        manager
            .handle_event(&"a".into(), SubscriptionUpdate::PageCount { count: 2 })
            .unwrap();
        assert!(second_rx.recv_timeout(TIMEOUT).is_ok());
        assert!(first_rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_rejected_start_keeps_previous() {
        let (manager, transport) = manager();
        let (callback, rx) = recording_callback();
        manager.start_subscription(objects("a", &["1"]), callback.clone()).unwrap();

        transport.reject(&"a".into());
        let result = manager.start_subscription(objects("a", &["2"]), callback);
        assert!(matches!(result, Err(SyncError::QueryRejected { .. })));
        assert_eq!(manager.active_data(&"a".into()), Some(objects("a", &["1"])));

        manager
            .handle_event(&"a".into(), SubscriptionUpdate::PageCount { count: 1 })
            .unwrap();
        assert!(rx.recv_timeout(TIMEOUT).is_ok());
    }

    #[test]
    fn test_wait_for_initial_data() {
        let (manager, _) = manager();
        let (callback, _rx) = recording_callback();

        let waiter = manager
            .start_subscription_with_waiter(objects("a", &["1"]), callback)
            .unwrap();
        assert_eq!(waiter.wait_timeout(Duration::from_millis(20)), None);

        manager
            .handle_event(
                &"a".into(),
                SubscriptionUpdate::InitialData { items: vec![ObjectDetails::new("1")] },
            )
            .unwrap();
        assert_eq!(waiter.wait_timeout(TIMEOUT), Some(WaitOutcome::Loaded));
    }

    #[test]
    fn test_waiter_survives_replacement() {
        let (manager, _) = manager();
        let (callback, _rx) = recording_callback();

        let waiter = manager
            .start_subscription_with_waiter(objects("a", &["1"]), callback.clone())
            .unwrap();
        manager.start_subscription(objects("a", &["2"]), callback).unwrap();

        manager
            .handle_event(
                &"a".into(),
                SubscriptionUpdate::InitialData { items: vec![ObjectDetails::new("2")] },
            )
            .unwrap();
        assert_eq!(waiter.wait_timeout(TIMEOUT), Some(WaitOutcome::Loaded));
    }

    #[test]
    fn test_stop_cancels_waiter() {
        let (manager, transport) = manager();
        let (callback, _rx) = recording_callback();

        let waiter = manager
            .start_subscription_with_waiter(objects("a", &["1"]), callback)
            .unwrap();
        manager.stop_subscription(&"a".into()).unwrap();

        assert_eq!(waiter.wait(), WaitOutcome::Cancelled);
        assert_eq!(transport.unsubscribed.lock().len(), 1);
        // Second stop is a no-op
        manager.stop_subscription(&"a".into()).unwrap();
        assert_eq!(transport.unsubscribed.lock().len(), 1);
    }

    #[test]
    fn test_update_subscription() {
        let (manager, transport) = manager();
        let (callback, _rx) = recording_callback();

        let started = manager
            .update_subscription(objects("a", &["1"]), false, callback.clone())
            .unwrap();
        assert!(!started);
        assert_eq!(transport.subscribe_count(), 0);

        assert!(manager
            .update_subscription(objects("a", &["1"]), true, callback.clone())
            .unwrap());
        assert!(!manager
            .update_subscription(objects("a", &["1"]), true, callback.clone())
            .unwrap());
        assert!(manager
            .update_subscription(objects("a", &["1", "2"]), false, callback)
            .unwrap());
        assert_eq!(transport.subscribe_count(), 2);
    }

    #[test]
    fn test_batch_start_dedups() {
        let (manager, transport) = manager();
        let (callback, _rx) = recording_callback();

        manager
            .start_subscriptions(
                vec![objects("a", &["1"]), objects("b", &["2"]), objects("a", &["1"])],
                callback,
            )
            .unwrap();
        assert_eq!(transport.subscribe_count(), 2);
        assert_eq!(manager.active_ids(), vec![SubscriptionId::new("a"), SubscriptionId::new("b")]);
    }

    #[test]
    fn test_stop_all_clears_even_on_transport_failure() {
        let (manager, transport) = manager();
        let (callback, _rx) = recording_callback();
        manager
            .start_subscriptions(vec![objects("a", &[]), objects("b", &[])], callback)
            .unwrap();

        *transport.fail_unsubscribe.lock() = true;
        let result = manager.stop_all_subscriptions();
        assert!(matches!(result, Err(SyncError::Transport(_))));
        assert_eq!(manager.subscription_count(), 0);
    }

    /// Answers every query before `subscribe` returns, like an engine that
    /// pushes the first batch on the same connection.
    #[derive(Default)]
    struct EagerTransport {
        manager: Mutex<Weak<SubscriptionManager>>,
        reject: AtomicBool,
    }

    impl SubscriptionTransport for EagerTransport {
        fn subscribe(&self, data: &SubscriptionData) -> Result<()> {
            if let Some(manager) = self.manager.lock().upgrade() {
                manager.handle_event(
                    data.identifier(),
                    SubscriptionUpdate::InitialData { items: vec![ObjectDetails::new("1")] },
                )?;
            }
            if self.reject.load(Ordering::SeqCst) {
                return Err(SyncError::QueryRejected {
                    id: data.identifier().clone(),
                    reason: "rejected after answering".to_string(),
                });
            }
            Ok(())
        }

        fn unsubscribe(&self, _ids: &[SubscriptionId]) -> Result<()> {
            Ok(())
        }
    }

    fn eager_manager() -> (Arc<SubscriptionManager>, Arc<EagerTransport>) {
        let transport = Arc::new(EagerTransport::default());
        let manager = Arc::new(SubscriptionManager::new(transport.clone()));
        *transport.manager.lock() = Arc::downgrade(&manager);
        (manager, transport)
    }

    #[test]
    fn test_initial_data_during_subscribe() {
        let (manager, _transport) = eager_manager();
        let (callback, rx) = recording_callback();

        let waiter = manager
            .start_subscription_with_waiter(objects("a", &["1"]), callback)
            .unwrap();
        assert_eq!(waiter.wait_timeout(TIMEOUT), Some(WaitOutcome::Loaded));
        let (_, update) = rx.recv_timeout(TIMEOUT).unwrap();
        assert!(update.is_initial_data());
    }

    #[test]
    fn test_rejected_replacement_forwards_queued_events() {
        let (manager, transport) = eager_manager();
        let (first, first_rx) = recording_callback();
        let (second, second_rx) = recording_callback();

        manager.start_subscription(objects("a", &["1"]), first).unwrap();
        assert!(first_rx.recv_timeout(TIMEOUT).is_ok());

        transport.reject.store(true, Ordering::SeqCst);
        let result = manager.start_subscription(objects("a", &["2"]), second);
        assert!(matches!(result, Err(SyncError::QueryRejected { .. })));
        assert_eq!(manager.active_data(&"a".into()), Some(objects("a", &["1"])));

        // The batch sent while the replacement was in flight lands on the
        // registration that stayed live.
        assert!(first_rx.recv_timeout(TIMEOUT).is_ok());
        assert!(second_rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_wait_is_bounded() {
        let transport = Arc::new(RecordingTransport::default());
        let config = ManagerConfig {
            initial_data_timeout: Duration::from_millis(30),
            ..ManagerConfig::default()
        };
        let manager = SubscriptionManager::with_config(transport, config);
        let (callback, _rx) = recording_callback();

        let outcome = manager
            .start_subscription_and_wait(objects("a", &["1"]), callback)
            .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(manager.is_active(&"a".into()));
    }
}
