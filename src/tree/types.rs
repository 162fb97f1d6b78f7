//! Types for tree widgets.

use crate::types::{ObjectDetails, ObjectId};
use std::sync::Arc;

/// Tree widget configuration.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Deepest level whose rows can still be expanded.
    /// Default: 3
    pub max_expandable_level: usize,
    /// Purpose prefix of the child subscription id.
    /// Default: "TreeWidget"
    pub child_subscription_prefix: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_expandable_level: 3,
            child_subscription_prefix: "TreeWidget".to_string(),
        }
    }
}

/// How a row presents its expand affordance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowExpandState {
    /// Page with outgoing links within the depth bound.
    Expandable { expanded: bool },
    /// Sets and collections open as lists, never as subtrees.
    Set,
    /// Nothing to expand.
    Plain,
}

/// One rendered row.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeRow {
    /// Path of object ids from the root, joined by `-`.
    pub row_id: String,
    pub object_id: ObjectId,
    pub title: String,
    pub level: usize,
    pub expand_state: RowExpandState,
}

impl TreeRow {
    pub fn is_expanded(&self) -> bool {
        matches!(self.expand_state, RowExpandState::Expandable { expanded: true })
    }
}

/// An expanded row, remembered by path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedId {
    pub row_id: String,
    pub object_id: ObjectId,
}

/// Receives the details of the child subscription.
pub type DetailsHandler = Arc<dyn Fn(Vec<Arc<ObjectDetails>>) + Send + Sync>;

/// Receives rebuilt rows.
pub type RowsHandler = Arc<dyn Fn(Vec<TreeRow>) + Send + Sync>;
