//! Recursively expandable object trees.
//!
//! A tree shows a first-level list and lets the user expand rows into the
//! objects they link to. Link targets outside the first level come from one
//! child subscription scoped to exactly the ids the expanded rows need.
//!
//! # Example
//!
//! ```ignore
//! let subscriptions = Arc::new(TreeSubscriptionManager::new(manager.clone()));
//! let widget = TreeWidget::new(subscriptions, "space", TreeConfig::default(), Arc::new(|rows| {
//!     render(rows);
//! }));
//!
//! widget.set_first_level(favorites)?;
//! if let Some(rows) = widget.rows() {
//!     widget.expand(&rows[0])?;
//! }
//! ```

mod manager;
mod types;
mod widget;

pub use manager::{TreeSubscriptionManager, TreeSubscriptions};
pub use types::{DetailsHandler, ExpandedId, RowExpandState, RowsHandler, TreeConfig, TreeRow};
pub use widget::{build_rows, TreeWidget};
