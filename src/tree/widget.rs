//! Expansion state of a tree widget.

use crate::error::Result;
use crate::types::{EditorViewType, ObjectDetails, ObjectId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

use super::manager::TreeSubscriptions;
use super::types::{
    DetailsHandler, ExpandedId, RowExpandState, RowsHandler, TreeConfig, TreeRow,
};

/// Build the rows of a tree.
///
/// The first level is rendered in its own order; children follow the order
/// of their parent's links. Row ids are paths, so an object linked from two
/// parents yields two independent rows.
pub fn build_rows(
    first_level: &[Arc<ObjectDetails>],
    child: &[Arc<ObjectDetails>],
    expanded: &[ExpandedId],
    max_expandable_level: usize,
) -> Vec<TreeRow> {
    let mut by_id: HashMap<&str, &Arc<ObjectDetails>> = HashMap::new();
    for details in first_level.iter().chain(child) {
        by_id.entry(details.id.as_str()).or_insert(details);
    }
    let expanded: HashSet<&str> = expanded.iter().map(|e| e.row_id.as_str()).collect();

    let roots: Vec<ObjectId> = first_level.iter().map(|d| d.id.clone()).collect();
    let mut rows = Vec::new();
    push_rows(
        &mut rows,
        &roots,
        "",
        0,
        &by_id,
        &expanded,
        max_expandable_level,
    );
    rows
}

fn push_rows(
    rows: &mut Vec<TreeRow>,
    links: &[ObjectId],
    id_prefix: &str,
    level: usize,
    by_id: &HashMap<&str, &Arc<ObjectDetails>>,
    expanded: &HashSet<&str>,
    max_expandable_level: usize,
) {
    let mut seen = HashSet::new();
    for link in links {
        if !seen.insert(link.as_str()) {
            continue;
        }
        let Some(details) = by_id.get(link.as_str()) else {
            continue;
        };

        let row_id = format!("{}-{}", id_prefix, details.id);
        let links = details.links();
        let can_expand = level < max_expandable_level && !links.is_empty();
        let is_expanded = can_expand && expanded.contains(row_id.as_str());
        let expand_state = match details.editor_view_type() {
            EditorViewType::Page if can_expand => RowExpandState::Expandable {
                expanded: is_expanded,
            },
            EditorViewType::Set => RowExpandState::Set,
            _ => RowExpandState::Plain,
        };

        rows.push(TreeRow {
            row_id: row_id.clone(),
            object_id: details.id.clone(),
            title: details.title(),
            level,
            expand_state,
        });

        if rows.last().is_some_and(TreeRow::is_expanded) {
            push_rows(
                rows,
                &links,
                &row_id,
                level + 1,
                by_id,
                expanded,
                max_expandable_level,
            );
        }
    }
}

struct TreeState {
    first_level: Option<Vec<Arc<ObjectDetails>>>,
    child: Vec<Arc<ObjectDetails>>,
    expanded: Vec<ExpandedId>,
    /// Bumped on every change; only the newest revision is published.
    revision: u64,
    rows: Option<Vec<TreeRow>>,
}

impl TreeState {
    /// Whether every id is already held by the child subscription.
    fn child_covers(&self, ids: &[ObjectId]) -> bool {
        let loaded: HashSet<&str> = self.child.iter().map(|d| d.id.as_str()).collect();
        ids.iter().all(|id| loaded.contains(id.as_str()))
    }

    /// Link targets of expanded rows not covered by the first level.
    fn child_links(&self) -> Vec<ObjectId> {
        let first_level = self.first_level.as_deref().unwrap_or_default();
        let first_ids: HashSet<&str> = first_level.iter().map(|d| d.id.as_str()).collect();
        let expanded_ids: HashSet<&str> =
            self.expanded.iter().map(|e| e.object_id.as_str()).collect();

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for details in first_level.iter().chain(&self.child) {
            if !expanded_ids.contains(details.id.as_str()) {
                continue;
            }
            for link in details.links() {
                if !first_ids.contains(link.as_str()) && seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }
        links
    }
}

/// A recursively expandable tree fed by a first-level list and one child
/// subscription.
///
/// Expanding a row subscribes to the link targets of all expanded rows. When
/// every target is already loaded the rows are rebuilt right away from the
/// cached details. Collapsing never touches the subscription, so collapsed
/// subtrees re-expand from cache.
pub struct TreeWidget {
    config: TreeConfig,
    space_id: String,
    subscriptions: Arc<dyn TreeSubscriptions>,
    rows_handler: RowsHandler,
    state: Mutex<TreeState>,
    /// Held while publishing so rows leave in revision order.
    publish_lock: Mutex<()>,
}

impl TreeWidget {
    pub fn new(
        subscriptions: Arc<dyn TreeSubscriptions>,
        space_id: impl Into<String>,
        config: TreeConfig,
        rows_handler: RowsHandler,
    ) -> Arc<Self> {
        let widget = Arc::new(Self {
            config,
            space_id: space_id.into(),
            subscriptions,
            rows_handler,
            state: Mutex::new(TreeState {
                first_level: None,
                child: Vec::new(),
                expanded: Vec::new(),
                revision: 0,
                rows: None,
            }),
            publish_lock: Mutex::new(()),
        });
        widget
            .subscriptions
            .set_details_handler(Self::details_handler(Arc::downgrade(&widget)));
        widget
    }

    fn details_handler(widget: Weak<Self>) -> DetailsHandler {
        Arc::new(move |details: Vec<Arc<ObjectDetails>>| {
            if let Some(widget) = widget.upgrade() {
                if let Err(e) = widget.set_child_details(details) {
                    warn!(error = %e, "failed to refresh tree after child update");
                }
            }
        })
    }

    /// Replace the first-level objects.
    pub fn set_first_level(&self, details: Vec<Arc<ObjectDetails>>) -> Result<()> {
        self.state.lock().first_level = Some(details);
        self.refresh()
    }

    /// Replace the child subscription's objects.
    pub fn set_child_details(&self, details: Vec<Arc<ObjectDetails>>) -> Result<()> {
        self.state.lock().child = details;
        self.refresh()
    }

    pub fn expand(&self, row: &TreeRow) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.expanded.iter().any(|e| e.row_id == row.row_id) {
                return Ok(());
            }
            state.expanded.push(ExpandedId {
                row_id: row.row_id.clone(),
                object_id: row.object_id.clone(),
            });
        }
        self.refresh()
    }

    pub fn collapse(&self, row: &TreeRow) -> Result<()> {
        {
            let mut state = self.state.lock();
            let before = state.expanded.len();
            state.expanded.retain(|e| e.row_id != row.row_id);
            if state.expanded.len() == before {
                return Ok(());
            }
        }
        self.refresh()
    }

    /// Last published rows. `None` until the first level arrived.
    pub fn rows(&self) -> Option<Vec<TreeRow>> {
        self.state.lock().rows.clone()
    }

    pub fn expanded(&self) -> Vec<ExpandedId> {
        self.state.lock().expanded.clone()
    }

    /// Stop the child subscription.
    pub fn stop(&self) -> Result<()> {
        self.subscriptions.stop()
    }

    fn refresh(&self) -> Result<()> {
        let (revision, links) = {
            let mut state = self.state.lock();
            state.revision += 1;
            let links = state.child_links();
            if state.child_covers(&links) {
                (state.revision, None)
            } else {
                (state.revision, Some(links))
            }
        };

        // A changed subscription delivers its details through the handler,
        // which refreshes again with everything loaded.
        let updated = match links {
            Some(links) => self
                .subscriptions
                .start_or_update_subscription(&self.space_id, links)?,
            None => false,
        };
        if !updated {
            self.publish(revision);
        }
        Ok(())
    }

    fn publish(&self, revision: u64) {
        let _publish = self.publish_lock.lock();
        let rows = {
            let mut state = self.state.lock();
            if state.revision != revision {
                trace!(revision, latest = state.revision, "skipping superseded tree rebuild");
                return;
            }
            let Some(first_level) = state.first_level.as_deref() else {
                return;
            };
            let rows = build_rows(
                first_level,
                &state.child,
                &state.expanded,
                self.config.max_expandable_level,
            );
            state.rows = Some(rows.clone());
            rows
        };
        (self.rows_handler)(rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{relation_keys, DetailsLayout};
    use std::collections::BTreeSet;

    fn page(id: &str, links: &[&str]) -> Arc<ObjectDetails> {
        Arc::new(
            ObjectDetails::new(id)
                .with_value(relation_keys::NAME, id)
                .with_value(relation_keys::LINKS, links.to_vec()),
        )
    }

    fn expanded(row_id: &str, object_id: &str) -> ExpandedId {
        ExpandedId {
            row_id: row_id.into(),
            object_id: object_id.into(),
        }
    }

    /// Serves link targets from a fixed pool and records requested id sets.
    struct FakeSubscriptions {
        pool: Vec<Arc<ObjectDetails>>,
        handler: Mutex<Option<DetailsHandler>>,
        current: Mutex<Vec<ObjectId>>,
        requests: Mutex<Vec<Vec<ObjectId>>>,
    }

    impl FakeSubscriptions {
        fn new(pool: Vec<Arc<ObjectDetails>>) -> Arc<Self> {
            Arc::new(Self {
                pool,
                handler: Mutex::new(None),
                current: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    impl TreeSubscriptions for FakeSubscriptions {
        fn set_details_handler(&self, handler: DetailsHandler) {
            *self.handler.lock() = Some(handler);
        }

        fn start_or_update_subscription(
            &self,
            _space_id: &str,
            object_ids: Vec<ObjectId>,
        ) -> Result<bool> {
            if object_ids.is_empty() || *self.current.lock() == object_ids {
                return Ok(false);
            }
            *self.current.lock() = object_ids.clone();
            self.requests.lock().push(object_ids.clone());

            let details: Vec<_> = self
                .pool
                .iter()
                .filter(|d| object_ids.contains(&d.id))
                .cloned()
                .collect();
            let handler = self.handler.lock().clone();
            if let Some(handler) = handler {
                handler(details);
            }
            Ok(true)
        }

        fn stop(&self) -> Result<()> {
            self.current.lock().clear();
            Ok(())
        }
    }

    fn widget(pool: Vec<Arc<ObjectDetails>>) -> (Arc<TreeWidget>, Arc<FakeSubscriptions>) {
        let subs = FakeSubscriptions::new(pool);
        let widget = TreeWidget::new(subs.clone(), "space", TreeConfig::default(), Arc::new(|_rows: Vec<TreeRow>| {}));
        (widget, subs)
    }

    fn row<'a>(rows: &'a [TreeRow], row_id: &str) -> &'a TreeRow {
        rows.iter().find(|r| r.row_id == row_id).unwrap()
    }

    #[test]
    fn test_build_rows_first_level() {
        let rows = build_rows(&[page("a", &[]), page("b", &["c"])], &[], &[], 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_id, "-a");
        assert_eq!(rows[0].expand_state, RowExpandState::Plain);
        assert_eq!(rows[1].expand_state, RowExpandState::Expandable { expanded: false });
    }

    #[test]
    fn test_build_rows_children_follow_links_order() {
        let first = [page("p", &["y", "x"])];
        let child = [page("x", &[]), page("y", &[])];
        let rows = build_rows(&first, &child, &[expanded("-p", "p")], 3);

        let ids: Vec<_> = rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["-p", "-p-y", "-p-x"]);
        assert_eq!(rows[1].level, 1);
    }

    #[test]
    fn test_build_rows_respects_depth_bound() {
        // Self-link: every level could expand forever.
        let first = [page("loop", &["loop"])];
        let expanded_ids = vec![
            expanded("-loop", "loop"),
            expanded("-loop-loop", "loop"),
            expanded("-loop-loop-loop", "loop"),
        ];
        let rows = build_rows(&first, &[], &expanded_ids, 2);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].level, 2);
        assert_eq!(rows[2].expand_state, RowExpandState::Plain);
    }

    #[test]
    fn test_sets_never_expand() {
        let set = Arc::new(
            ObjectDetails::new("s")
                .with_value(relation_keys::LAYOUT, DetailsLayout::Set.code())
                .with_value(relation_keys::LINKS, vec!["a"]),
        );
        let rows = build_rows(&[set], &[page("a", &[])], &[expanded("-s", "s")], 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expand_state, RowExpandState::Set);
    }

    #[test]
    fn test_shared_child_has_distinct_rows() {
        let (widget, _subs) = widget(vec![page("shared", &["leaf"]), page("leaf", &[])]);
        widget
            .set_first_level(vec![page("a", &["shared"]), page("b", &["shared"])])
            .unwrap();

        let rows = widget.rows().unwrap();
        widget.expand(row(&rows, "-a")).unwrap();
        let rows = widget.rows().unwrap();
        widget.expand(row(&rows, "-b")).unwrap();
        let rows = widget.rows().unwrap();

        let row_ids: BTreeSet<_> = rows.iter().map(|r| r.row_id.clone()).collect();
        assert_eq!(row_ids.len(), rows.len());
        assert!(row_ids.contains("-a-shared"));
        assert!(row_ids.contains("-b-shared"));

        widget.expand(row(&rows, "-a-shared")).unwrap();
        let rows = widget.rows().unwrap();
        assert!(row(&rows, "-a-shared").is_expanded());
        assert!(!row(&rows, "-b-shared").is_expanded());

        widget.collapse(row(&rows, "-b")).unwrap();
        let rows = widget.rows().unwrap();
        assert!(row(&rows, "-a-shared").is_expanded());
        assert!(rows.iter().all(|r| r.row_id != "-b-shared"));
    }

    #[test]
    fn test_loaded_targets_skip_subscription() {
        let (widget, subs) = widget(vec![]);
        widget
            .set_first_level(vec![page("a", &["b"]), page("b", &[])])
            .unwrap();

        let rows = widget.rows().unwrap();
        widget.expand(row(&rows, "-a")).unwrap();

        assert!(subs.requests.lock().is_empty());
        let ids: Vec<_> = widget.rows().unwrap().into_iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec!["-a", "-a-b", "-b"]);
    }

    #[test]
    fn test_collapse_keeps_subscription() {
        let (widget, subs) = widget(vec![page("child", &[])]);
        widget.set_first_level(vec![page("a", &["child"])]).unwrap();

        let rows = widget.rows().unwrap();
        widget.expand(row(&rows, "-a")).unwrap();
        assert_eq!(*subs.requests.lock(), vec![vec!["child".to_string()]]);

        let rows = widget.rows().unwrap();
        widget.collapse(row(&rows, "-a")).unwrap();
        assert_eq!(widget.rows().unwrap().len(), 1);

        // Re-expanding needs the same ids again.
        let rows = widget.rows().unwrap();
        widget.expand(row(&rows, "-a")).unwrap();
        assert_eq!(subs.requests.lock().len(), 1);
        assert_eq!(widget.rows().unwrap().len(), 2);
    }
}
