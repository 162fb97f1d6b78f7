//! Core types shared by the details store, subscriptions and tree widgets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of an object in the knowledge base.
pub type ObjectId = String;

/// Identifier of a live subscription.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(value: impl Into<String>) -> Self {
        SubscriptionId(value.into())
    }

    /// Unique id of the form `<purpose>-<uuid>`, one per screen instance.
    pub fn unique(purpose: &str) -> Self {
        SubscriptionId(format!("{}-{}", purpose, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriptionId {
    fn from(value: &str) -> Self {
        SubscriptionId(value.to_string())
    }
}

/// Bundled relation keys.
pub mod relation_keys {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const SNIPPET: &str = "snippet";
    pub const LAYOUT: &str = "layout";
    pub const LINKS: &str = "links";
    pub const TYPE: &str = "type";
    pub const SPACE_ID: &str = "spaceId";
    pub const IS_ARCHIVED: &str = "isArchived";
    pub const IS_HIDDEN: &str = "isHidden";
    pub const IS_DELETED: &str = "isDeleted";
    pub const DONE: &str = "done";
    pub const ICON_EMOJI: &str = "iconEmoji";
    pub const ICON_IMAGE: &str = "iconImage";
    pub const LAST_MODIFIED_DATE: &str = "lastModifiedDate";
    pub const LAST_OPENED_DATE: &str = "lastOpenedDate";
    pub const ADDED_DATE: &str = "addedDate";
    pub const TARGET_OBJECT_TYPE: &str = "targetObjectType";
    pub const TEMPLATE_IS_BUNDLED: &str = "templateIsBundled";
    pub const SET_OF: &str = "setOf";

    /// Keys requested by plain object lists.
    pub const OBJECT_LIST_KEYS: &[&str] = &[
        ID,
        NAME,
        SNIPPET,
        LAYOUT,
        TYPE,
        SPACE_ID,
        ICON_EMOJI,
        ICON_IMAGE,
        DONE,
        IS_ARCHIVED,
        IS_DELETED,
        LAST_MODIFIED_DATE,
    ];

    /// Keys requested for template previews.
    pub const TEMPLATE_PREVIEW_KEYS: &[&str] = &[
        ID,
        NAME,
        SNIPPET,
        LAYOUT,
        TYPE,
        ICON_EMOJI,
        ICON_IMAGE,
        TARGET_OBJECT_TYPE,
        TEMPLATE_IS_BUNDLED,
        ADDED_DATE,
    ];

    /// Keys requested by tree widgets, which need the link graph.
    pub const TREE_KEYS: &[&str] = &[
        ID, NAME, SNIPPET, LAYOUT, TYPE, ICON_EMOJI, ICON_IMAGE, DONE, LINKS, IS_ARCHIVED,
        IS_DELETED,
    ];
}

/// A dynamically typed relation value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Bool(bool),
    Number(f64),
    String(String),
    StringList(Vec<String>),
    Null,
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::String(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::String(value)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        DetailValue::Bool(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Number(value)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        DetailValue::Number(value as f64)
    }
}

impl From<Vec<String>> for DetailValue {
    fn from(value: Vec<String>) -> Self {
        DetailValue::StringList(value)
    }
}

impl From<Vec<&str>> for DetailValue {
    fn from(value: Vec<&str>) -> Self {
        DetailValue::StringList(value.into_iter().map(str::to_string).collect())
    }
}

/// Object layouts as reported by the `layout` relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailsLayout {
    Basic,
    Profile,
    Todo,
    Set,
    ObjectType,
    Relation,
    File,
    Dashboard,
    Image,
    Note,
    Space,
    Bookmark,
    Collection,
    Audio,
    Video,
    Date,
    Participant,
    Pdf,
    Chat,
    ChatDerived,
    Unknown(i64),
}

impl DetailsLayout {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => DetailsLayout::Basic,
            1 => DetailsLayout::Profile,
            2 => DetailsLayout::Todo,
            3 => DetailsLayout::Set,
            4 => DetailsLayout::ObjectType,
            5 => DetailsLayout::Relation,
            6 => DetailsLayout::File,
            7 => DetailsLayout::Dashboard,
            8 => DetailsLayout::Image,
            9 => DetailsLayout::Note,
            10 => DetailsLayout::Space,
            11 => DetailsLayout::Bookmark,
            14 => DetailsLayout::Collection,
            15 => DetailsLayout::Audio,
            16 => DetailsLayout::Video,
            17 => DetailsLayout::Date,
            19 => DetailsLayout::Participant,
            20 => DetailsLayout::Pdf,
            21 => DetailsLayout::Chat,
            22 => DetailsLayout::ChatDerived,
            other => DetailsLayout::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            DetailsLayout::Basic => 0,
            DetailsLayout::Profile => 1,
            DetailsLayout::Todo => 2,
            DetailsLayout::Set => 3,
            DetailsLayout::ObjectType => 4,
            DetailsLayout::Relation => 5,
            DetailsLayout::File => 6,
            DetailsLayout::Dashboard => 7,
            DetailsLayout::Image => 8,
            DetailsLayout::Note => 9,
            DetailsLayout::Space => 10,
            DetailsLayout::Bookmark => 11,
            DetailsLayout::Collection => 14,
            DetailsLayout::Audio => 15,
            DetailsLayout::Video => 16,
            DetailsLayout::Date => 17,
            DetailsLayout::Participant => 19,
            DetailsLayout::Pdf => 20,
            DetailsLayout::Chat => 21,
            DetailsLayout::ChatDerived => 22,
            DetailsLayout::Unknown(code) => code,
        }
    }
}

/// How an object opens in the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorViewType {
    Page,
    Set,
    Chat,
    Date,
}

/// Synchronized state of one object.
///
/// Details are replaced wholesale on every update event; the store never
/// patches individual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetails {
    pub id: ObjectId,
    #[serde(default)]
    pub values: BTreeMap<String, DetailValue>,
}

impl ObjectDetails {
    pub fn new(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    /// Build details from a JSON object. The `id` field is required.
    pub fn from_json(value: serde_json::Value) -> crate::error::Result<Self> {
        let mut values: BTreeMap<String, DetailValue> = serde_json::from_value(value)?;
        let id = match values.remove(relation_keys::ID) {
            Some(DetailValue::String(id)) => id,
            _ => {
                return Err(crate::error::SyncError::Serialization(
                    "object details without string id".to_string(),
                ))
            }
        };
        Ok(Self { id, values })
    }

    /// Set a relation value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&DetailValue> {
        self.values.get(key)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(DetailValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(DetailValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(DetailValue::Bool(true)))
    }

    /// String list value. A single string is treated as a one-element list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(DetailValue::StringList(list)) => list.clone(),
            Some(DetailValue::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.string(relation_keys::NAME).unwrap_or_default()
    }

    /// Display title. Notes show their snippet.
    pub fn title(&self) -> String {
        let title = if self.layout() == DetailsLayout::Note {
            self.string(relation_keys::SNIPPET).unwrap_or_default()
        } else {
            self.name()
        };
        if title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            title.to_string()
        }
    }

    /// Outgoing links to other objects.
    pub fn links(&self) -> Vec<ObjectId> {
        self.string_list(relation_keys::LINKS)
    }

    pub fn layout(&self) -> DetailsLayout {
        match self.values.get(relation_keys::LAYOUT) {
            Some(DetailValue::Number(n)) => DetailsLayout::from_code(*n as i64),
            _ => DetailsLayout::Basic,
        }
    }

    pub fn editor_view_type(&self) -> EditorViewType {
        match self.layout() {
            DetailsLayout::Set | DetailsLayout::Collection => EditorViewType::Set,
            DetailsLayout::Chat | DetailsLayout::ChatDerived => EditorViewType::Chat,
            DetailsLayout::Date => EditorViewType::Date,
            _ => EditorViewType::Page,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.bool(relation_keys::IS_ARCHIVED)
    }

    pub fn is_hidden(&self) -> bool {
        self.bool(relation_keys::IS_HIDDEN)
    }

    pub fn is_deleted(&self) -> bool {
        self.bool(relation_keys::IS_DELETED)
    }

    pub fn space_id(&self) -> Option<&str> {
        self.string(relation_keys::SPACE_ID)
    }

    pub fn type_id(&self) -> Option<&str> {
        self.string(relation_keys::TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unique_subscription_id() {
        let a = SubscriptionId::unique("Sets");
        let b = SubscriptionId::unique("Sets");
        assert!(a.as_str().starts_with("Sets-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_details_from_json() {
        let details = ObjectDetails::from_json(json!({
            "id": "obj1",
            "name": "Page",
            "layout": 0,
            "links": ["a", "b"],
            "done": true,
        }))
        .unwrap();

        assert_eq!(details.id, "obj1");
        assert_eq!(details.name(), "Page");
        assert_eq!(details.links(), vec!["a".to_string(), "b".to_string()]);
        assert!(details.bool(relation_keys::DONE));
        assert!(details.value(relation_keys::ID).is_none());
    }

    #[test]
    fn test_details_from_json_requires_id() {
        let result = ObjectDetails::from_json(json!({ "name": "nameless" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_title_fallbacks() {
        let note = ObjectDetails::new("n")
            .with_value(relation_keys::LAYOUT, DetailsLayout::Note.code())
            .with_value(relation_keys::SNIPPET, "first line");
        assert_eq!(note.title(), "first line");

        let empty = ObjectDetails::new("e").with_value(relation_keys::NAME, "  ");
        assert_eq!(empty.title(), "Untitled");
    }

    #[test]
    fn test_editor_view_type() {
        let set = ObjectDetails::new("s").with_value(relation_keys::LAYOUT, DetailsLayout::Set.code());
        assert_eq!(set.editor_view_type(), EditorViewType::Set);

        let collection =
            ObjectDetails::new("c").with_value(relation_keys::LAYOUT, DetailsLayout::Collection.code());
        assert_eq!(collection.editor_view_type(), EditorViewType::Set);

        assert_eq!(ObjectDetails::new("p").editor_view_type(), EditorViewType::Page);
    }

    #[test]
    fn test_layout_code_roundtrip() {
        for code in [0, 3, 9, 14, 17, 21, 99] {
            assert_eq!(DetailsLayout::from_code(code).code(), code);
        }
    }
}
