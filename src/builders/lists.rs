//! Object list queries: sets and recently modified objects.

use crate::error::Result;
use crate::subscriptions::{
    SearchSubscription, SortDirection, SubscriptionCallback, SubscriptionData, SubscriptionService,
};
use crate::types::{relation_keys, DetailsLayout, SubscriptionId};
use std::sync::Arc;

use super::search;

/// Default number of sets shown in a list.
pub const SETS_LIMIT: usize = 100;

fn object_list_keys() -> Vec<String> {
    relation_keys::OBJECT_LIST_KEYS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Non-archived sets of a space, most recently modified first.
pub fn sets_subscription(
    identifier: SubscriptionId,
    space_id: &str,
    limit: Option<usize>,
) -> SubscriptionData {
    let mut filters = search::not_hidden_filters(false);
    filters.push(search::space_id_filter(space_id));
    filters.push(search::layout_filter(&[DetailsLayout::Set]));

    SubscriptionData::Search(SearchSubscription {
        filters,
        sorts: vec![search::sort(
            relation_keys::LAST_MODIFIED_DATE,
            SortDirection::Desc,
        )],
        limit: Some(limit.unwrap_or(SETS_LIMIT)),
        keys: object_list_keys(),
        ..SearchSubscription::new(identifier, space_id)
    })
}

/// Objects of the given layouts, most recently modified first.
pub fn recent_subscription(
    identifier: SubscriptionId,
    space_id: &str,
    layouts: &[DetailsLayout],
    limit: usize,
) -> SubscriptionData {
    let mut filters = search::not_hidden_filters(false);
    filters.push(search::space_id_filter(space_id));
    filters.push(search::template_scheme_filter(false));
    if !layouts.is_empty() {
        filters.push(search::layout_filter(layouts));
    }

    SubscriptionData::Search(SearchSubscription {
        filters,
        sorts: vec![search::sort(
            relation_keys::LAST_MODIFIED_DATE,
            SortDirection::Desc,
        )],
        limit: Some(limit),
        keys: object_list_keys(),
        ..SearchSubscription::new(identifier, space_id)
    })
}

/// Subscribes a screen to the sets of one space.
pub struct SetsSubscriptionService {
    service: Arc<dyn SubscriptionService>,
    space_id: String,
    subscription_id: SubscriptionId,
}

impl SetsSubscriptionService {
    pub fn new(service: Arc<dyn SubscriptionService>, space_id: impl Into<String>) -> Self {
        Self {
            service,
            space_id: space_id.into(),
            subscription_id: SubscriptionId::unique("Sets"),
        }
    }

    pub fn subscription_id(&self) -> &SubscriptionId {
        &self.subscription_id
    }

    pub fn start_subscription(
        &self,
        object_limit: Option<usize>,
        update: SubscriptionCallback,
    ) -> Result<()> {
        let data = sets_subscription(self.subscription_id.clone(), &self.space_id, object_limit);
        self.service.start_subscription(data, update)
    }

    pub fn stop_subscription(&self) -> Result<()> {
        self.service.stop_subscription(&self.subscription_id)
    }
}
