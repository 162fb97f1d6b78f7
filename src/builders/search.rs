//! Filter and sort helpers shared by the list builders.

use crate::subscriptions::{Filter, FilterCondition, Sort, SortDirection};
use crate::types::{relation_keys, DetailsLayout, ObjectId};

/// Unique key of the template object type.
pub const TEMPLATE_TYPE_KEY: &str = "ot-template";

/// Relation holding the unique key of an object's type.
pub const TYPE_UNIQUE_KEY: &str = "type.uniqueKey";

pub fn sort(relation_key: &str, direction: SortDirection) -> Sort {
    Sort {
        relation_key: relation_key.to_string(),
        direction,
    }
}

pub fn not_hidden_filter() -> Filter {
    Filter::new(relation_keys::IS_HIDDEN, FilterCondition::NotEqual, true)
}

pub fn is_archived_filter(is_archived: bool) -> Filter {
    Filter::new(relation_keys::IS_ARCHIVED, FilterCondition::Equal, is_archived)
}

pub fn is_deleted_filter(is_deleted: bool) -> Filter {
    Filter::new(relation_keys::IS_DELETED, FilterCondition::Equal, is_deleted)
}

pub fn space_id_filter(space_id: &str) -> Filter {
    Filter::new(relation_keys::SPACE_ID, FilterCondition::Equal, space_id)
}

pub fn layout_filter(layouts: &[DetailsLayout]) -> Filter {
    let codes: Vec<i64> = layouts.iter().map(|l| l.code()).collect();
    Filter::new(relation_keys::LAYOUT, FilterCondition::In, codes)
}

/// Include or exclude templates.
pub fn template_scheme_filter(include: bool) -> Filter {
    let condition = if include {
        FilterCondition::Equal
    } else {
        FilterCondition::NotEqual
    };
    Filter::new(TYPE_UNIQUE_KEY, condition, TEMPLATE_TYPE_KEY)
}

pub fn object_ids_filter(ids: &[ObjectId]) -> Filter {
    Filter::new(relation_keys::ID, FilterCondition::In, ids.to_vec())
}

/// Filters shared by every list of regular objects.
pub fn not_hidden_filters(is_archived: bool) -> Vec<Filter> {
    vec![
        not_hidden_filter(),
        is_archived_filter(is_archived),
        is_deleted_filter(false),
    ]
}

/// Templates targeting the given object type.
pub fn templates_filters(type_id: &str, space_id: &str) -> Vec<Filter> {
    vec![
        is_archived_filter(false),
        is_deleted_filter(false),
        template_scheme_filter(true),
        Filter::new(relation_keys::TARGET_OBJECT_TYPE, FilterCondition::Equal, type_id),
        space_id_filter(space_id),
    ]
}
