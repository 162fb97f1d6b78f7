//! Derived list builders.
//!
//! Builders turn domain parameters into [`crate::SubscriptionData`] values.
//! They hold no shared state; the thin services around them only remember
//! their own subscription id.

mod lists;
mod objects;
pub mod search;
mod templates;

pub use lists::{recent_subscription, sets_subscription, SetsSubscriptionService, SETS_LIMIT};
pub use objects::{ObjectHandler, ObjectsSubscriptionBuilder, SingleObjectSubscriptionService};
pub use templates::{templates_subscription, TemplatesSubscriptionService, TEMPLATES_LIMIT};
