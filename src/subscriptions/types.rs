//! Subscription query descriptors and the update protocol.

use crate::details::DEFAULT_RETAINED_CAPACITY;
use crate::error::{Result, SyncError};
use crate::types::{ObjectDetails, ObjectId, SubscriptionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a subscription manager.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Max unreferenced details kept in the shared store.
    /// Default: 512
    pub retained_details_capacity: usize,

    /// Thread name prefix for per-subscription workers.
    /// Default: "sub"
    pub worker_name_prefix: String,

    /// Upper bound for blocking waits on initial data.
    /// Default: 10s
    pub initial_data_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            retained_details_capacity: DEFAULT_RETAINED_CAPACITY,
            worker_name_prefix: "sub".to_string(),
            initial_data_timeout: Duration::from_secs(10),
        }
    }
}

/// Filter condition understood by the query engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Equal,
    NotEqual,
    Greater,
    Less,
    In,
    NotIn,
    Empty,
    NotEmpty,
    Exists,
}

/// Relation filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub relation_key: String,
    pub condition: FilterCondition,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn new(
        relation_key: impl Into<String>,
        condition: FilterCondition,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            relation_key: relation_key.into(),
            condition,
            value: value.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Relation sort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub relation_key: String,
    pub direction: SortDirection,
}

/// Search query over a space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSubscription {
    pub identifier: SubscriptionId,
    pub space_id: String,
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    /// Max results (None = all).
    pub limit: Option<usize>,
    pub offset: usize,
    /// Relation keys to fetch.
    pub keys: Vec<String>,
    /// Restrict to objects of these types or relations.
    pub source: Option<Vec<String>>,
    /// Restrict to the members of a collection.
    pub collection_id: Option<ObjectId>,
    /// Explicit order to publish results in, overriding server order.
    pub object_order: Option<Vec<ObjectId>>,
    /// Skip dependent-object subscriptions on the server.
    pub no_dep_subscription: bool,
}

impl SearchSubscription {
    pub fn new(identifier: SubscriptionId, space_id: impl Into<String>) -> Self {
        Self {
            identifier,
            space_id: space_id.into(),
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: 0,
            keys: Vec::new(),
            source: None,
            collection_id: None,
            object_order: None,
            no_dep_subscription: false,
        }
    }
}

/// Subscription to a fixed set of object ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectsSubscription {
    pub identifier: SubscriptionId,
    pub space_id: String,
    pub object_ids: Vec<ObjectId>,
    pub keys: Vec<String>,
}

/// Immutable query descriptor. A changed query is a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubscriptionData {
    Search(SearchSubscription),
    Objects(ObjectsSubscription),
}

impl SubscriptionData {
    pub fn identifier(&self) -> &SubscriptionId {
        match self {
            SubscriptionData::Search(search) => &search.identifier,
            SubscriptionData::Objects(objects) => &objects.identifier,
        }
    }

    pub fn space_id(&self) -> &str {
        match self {
            SubscriptionData::Search(search) => &search.space_id,
            SubscriptionData::Objects(objects) => &objects.space_id,
        }
    }

    /// Publish order override, if any.
    pub fn object_order(&self) -> Option<&[ObjectId]> {
        match self {
            SubscriptionData::Search(search) => search.object_order.as_deref(),
            SubscriptionData::Objects(_) => None,
        }
    }

    /// Reject descriptors the query engine could never accept.
    pub fn validate(&self) -> Result<()> {
        if self.identifier().as_str().trim().is_empty() {
            return Err(SyncError::InvalidSubscription(
                "empty subscription identifier".to_string(),
            ));
        }
        if let SubscriptionData::Search(search) = self {
            if search.limit == Some(0) {
                return Err(SyncError::InvalidSubscription(format!(
                    "{}: limit must be positive",
                    search.identifier
                )));
            }
        }
        Ok(())
    }
}

/// Incremental change pushed by the query engine for one subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionUpdate {
    /// Full ordered result set. Sent at start and after every resync.
    InitialData { items: Vec<ObjectDetails> },

    /// New details for an object; order is unchanged.
    Update { details: ObjectDetails },

    /// Object left the result set.
    Remove { id: ObjectId },

    /// Object entered the result set right after `after` (head if None).
    Add {
        details: ObjectDetails,
        after: Option<ObjectId>,
    },

    /// Object moved right after `after` (head if None).
    Move { id: ObjectId, after: Option<ObjectId> },

    /// Total number of results on the server.
    PageCount { count: usize },
}

impl SubscriptionUpdate {
    pub fn is_initial_data(&self) -> bool {
        matches!(self, SubscriptionUpdate::InitialData { .. })
    }
}

/// Receives every update routed to a subscription id.
pub type SubscriptionCallback = Arc<dyn Fn(&SubscriptionId, SubscriptionUpdate) + Send + Sync>;

/// How a wait for initial data ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Initial data of the current registration was delivered.
    Loaded,
    /// The subscription was stopped before any initial data arrived.
    Cancelled,
    /// No initial data within the configured bound.
    TimedOut,
}

/// Counters describing one subscription storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionStats {
    /// Events applied to the ordered list.
    pub events_applied: u64,
    /// Events referencing unknown ids or duplicating entries.
    pub inconsistencies: u64,
}
