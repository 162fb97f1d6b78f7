//! Application of subscription updates to an ordered id list.
//!
//! Events for one subscription are order-dependent patches, so they must be
//! applied strictly in arrival order. Malformed events never fail: they are
//! applied best-effort and reported as an [`Inconsistency`].

use crate::details::ObjectDetailsStorage;
use crate::types::{ObjectDetails, ObjectId};
use std::collections::HashSet;
use std::fmt;

use super::types::SubscriptionUpdate;

/// An event that does not match local state.
///
/// These come from benign client/server timing races, but a steady stream of
/// them points at a real ordering bug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// `move` for an id not in the list.
    UnknownMoveTarget(ObjectId),
    /// `move`/`add` anchored after an id not in the list.
    UnknownAnchor(ObjectId),
    /// `remove` for an id not in the list.
    UnknownRemove(ObjectId),
    /// `add` for an id already in the list, or repeated in initial data.
    DuplicateAdd(ObjectId),
    /// `update` for an id not in the list.
    UpdateForUnlisted(ObjectId),
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::UnknownMoveTarget(id) => write!(f, "move of unknown id {}", id),
            Inconsistency::UnknownAnchor(id) => write!(f, "anchor {} not in list", id),
            Inconsistency::UnknownRemove(id) => write!(f, "remove of unknown id {}", id),
            Inconsistency::DuplicateAdd(id) => write!(f, "duplicate add of {}", id),
            Inconsistency::UpdateForUnlisted(id) => write!(f, "update for unlisted id {}", id),
        }
    }
}

/// Result of applying one update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Set when the update was a full replace.
    pub is_initial: bool,
    /// Server-side total, for `page_count` updates.
    pub page_count: Option<usize>,
    pub inconsistencies: Vec<Inconsistency>,
}

impl ApplyOutcome {
    fn flag(&mut self, inconsistency: Inconsistency) {
        self.inconsistencies.push(inconsistency);
    }
}

/// Server-declared order of the ids in one subscription. Ids are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedIds {
    ids: Vec<ObjectId>,
}

impl OrderedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        position_of(&self.ids, id, String::as_str)
    }

    /// Drop every id, releasing the store references held for them.
    pub fn clear(&mut self, store: &ObjectDetailsStorage) {
        for id in self.ids.drain(..) {
            store.release(&id);
        }
    }
}

fn position_of<T>(items: &[T], id: &str, key: impl Fn(&T) -> &str) -> Option<usize> {
    items.iter().position(|item| key(item) == id)
}

/// Index to insert at so the item lands right after `after`.
///
/// `None` for a missing anchor.
fn insertion_index<T>(items: &[T], after: Option<&str>, key: impl Fn(&T) -> &str) -> Option<usize> {
    match after {
        None => Some(0),
        Some(anchor) => position_of(items, anchor, key).map(|index| index + 1),
    }
}

/// Apply one update to a subscription's ordered ids and the shared store.
///
/// The caller owns `ids`; store references are taken for every listed id and
/// released when the id leaves the list.
pub fn apply_update(
    ids: &mut OrderedIds,
    update: SubscriptionUpdate,
    store: &ObjectDetailsStorage,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    match update {
        SubscriptionUpdate::InitialData { items } => {
            outcome.is_initial = true;
            let previous = std::mem::take(&mut ids.ids);

            let mut seen = HashSet::with_capacity(items.len());
            for details in items {
                if seen.insert(details.id.clone()) {
                    ids.ids.push(details.id.clone());
                    store.acquire(details);
                } else {
                    outcome.flag(Inconsistency::DuplicateAdd(details.id.clone()));
                    store.upsert(details);
                }
            }

            for id in previous {
                store.release(&id);
            }
        }

        SubscriptionUpdate::Update { details } => {
            if ids.contains(&details.id) {
                store.upsert(details);
            } else {
                outcome.flag(Inconsistency::UpdateForUnlisted(details.id.clone()));
                store.stash(details);
            }
        }

        SubscriptionUpdate::Remove { id } => match ids.position(&id) {
            Some(index) => {
                ids.ids.remove(index);
                store.release(&id);
            }
            None => outcome.flag(Inconsistency::UnknownRemove(id)),
        },

        SubscriptionUpdate::Add { details, after } => {
            let id = details.id.clone();
            match ids.position(&id) {
                Some(index) => {
                    // Move-like add: keep the existing reference
                    outcome.flag(Inconsistency::DuplicateAdd(id.clone()));
                    ids.ids.remove(index);
                    store.upsert(details);
                }
                None => store.acquire(details),
            }

            let index = match insertion_index(&ids.ids, after.as_deref(), String::as_str) {
                Some(index) => index,
                None => {
                    if let Some(anchor) = after {
                        outcome.flag(Inconsistency::UnknownAnchor(anchor));
                    }
                    ids.ids.len()
                }
            };
            ids.ids.insert(index, id);
        }

        SubscriptionUpdate::Move { id, after } => {
            if after.as_deref() == Some(id.as_str()) {
                return outcome;
            }
            let Some(from) = ids.position(&id) else {
                outcome.flag(Inconsistency::UnknownMoveTarget(id));
                return outcome;
            };
            if let Some(anchor) = after.as_deref() {
                if !ids.contains(anchor) {
                    outcome.flag(Inconsistency::UnknownAnchor(anchor.to_string()));
                    return outcome;
                }
            }

            let moved = ids.ids.remove(from);
            let index = insertion_index(&ids.ids, after.as_deref(), String::as_str).unwrap_or(0);
            ids.ids.insert(index, moved);
        }

        SubscriptionUpdate::PageCount { count } => {
            outcome.page_count = Some(count);
        }
    }

    outcome
}

fn details_key(details: &ObjectDetails) -> &str {
    &details.id
}

/// Apply one update directly to a list of details.
///
/// Used by consumers that keep their own small result list instead of the
/// shared store. Same ordering rules as [`apply_update`].
pub fn apply_to_details(list: &mut Vec<ObjectDetails>, update: SubscriptionUpdate) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    let key = details_key;

    match update {
        SubscriptionUpdate::InitialData { items } => {
            outcome.is_initial = true;
            list.clear();
            for details in items {
                match position_of(list, &details.id, key) {
                    Some(index) => {
                        outcome.flag(Inconsistency::DuplicateAdd(details.id.clone()));
                        list[index] = details;
                    }
                    None => list.push(details),
                }
            }
        }

        SubscriptionUpdate::Update { details } => match position_of(list, &details.id, key) {
            Some(index) => list[index] = details,
            None => outcome.flag(Inconsistency::UpdateForUnlisted(details.id)),
        },

        SubscriptionUpdate::Remove { id } => match position_of(list, &id, key) {
            Some(index) => {
                list.remove(index);
            }
            None => outcome.flag(Inconsistency::UnknownRemove(id)),
        },

        SubscriptionUpdate::Add { details, after } => {
            if let Some(index) = position_of(list, &details.id, key) {
                outcome.flag(Inconsistency::DuplicateAdd(details.id.clone()));
                list.remove(index);
            }
            let index = match insertion_index(list, after.as_deref(), key) {
                Some(index) => index,
                None => {
                    if let Some(anchor) = after {
                        outcome.flag(Inconsistency::UnknownAnchor(anchor));
                    }
                    list.len()
                }
            };
            list.insert(index, details);
        }

        SubscriptionUpdate::Move { id, after } => {
            if after.as_deref() == Some(id.as_str()) {
                return outcome;
            }
            let Some(from) = position_of(list, &id, key) else {
                outcome.flag(Inconsistency::UnknownMoveTarget(id));
                return outcome;
            };
            if let Some(anchor) = after.as_deref() {
                if position_of(list, anchor, key).is_none() {
                    outcome.flag(Inconsistency::UnknownAnchor(anchor.to_string()));
                    return outcome;
                }
            }
            let moved = list.remove(from);
            let index = insertion_index(list, after.as_deref(), key).unwrap_or(0);
            list.insert(index, moved);
        }

        SubscriptionUpdate::PageCount { count } => {
            outcome.page_count = Some(count);
        }
    }

    outcome
}
