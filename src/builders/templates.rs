//! Templates available for an object type.

use crate::error::Result;
use crate::subscriptions::{
    SearchSubscription, SortDirection, SubscriptionCallback, SubscriptionData, SubscriptionService,
};
use crate::types::{relation_keys, SubscriptionId};
use std::sync::Arc;
use tracing::warn;

use super::search;

pub const TEMPLATES_LIMIT: usize = 100;

/// Templates of `type_id` in a space, newest first.
pub fn templates_subscription(
    identifier: SubscriptionId,
    type_id: &str,
    space_id: &str,
) -> SubscriptionData {
    SubscriptionData::Search(SearchSubscription {
        filters: search::templates_filters(type_id, space_id),
        sorts: vec![search::sort(relation_keys::ADDED_DATE, SortDirection::Desc)],
        limit: Some(TEMPLATES_LIMIT),
        keys: relation_keys::TEMPLATE_PREVIEW_KEYS
            .iter()
            .map(|k| k.to_string())
            .collect(),
        ..SearchSubscription::new(identifier, space_id)
    })
}

/// Template list subscription, stopped when the service is dropped.
pub struct TemplatesSubscriptionService {
    service: Arc<dyn SubscriptionService>,
    subscription_id: SubscriptionId,
}

impl TemplatesSubscriptionService {
    pub fn new(service: Arc<dyn SubscriptionService>) -> Self {
        Self {
            service,
            subscription_id: SubscriptionId::unique("Templates"),
        }
    }

    pub fn subscription_id(&self) -> &SubscriptionId {
        &self.subscription_id
    }

    pub fn start_subscription(
        &self,
        type_id: &str,
        space_id: &str,
        update: SubscriptionCallback,
    ) -> Result<()> {
        let data = templates_subscription(self.subscription_id.clone(), type_id, space_id);
        self.service.start_subscription(data, update)
    }
}

impl Drop for TemplatesSubscriptionService {
    fn drop(&mut self) {
        if let Err(e) = self.service.stop_subscription(&self.subscription_id) {
            warn!(subscription_id = %self.subscription_id, error = %e, "failed to stop templates subscription");
        }
    }
}
