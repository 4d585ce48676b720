use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::EntityType;

/// One field-level change, as produced by direct edits and paste and as
/// consumed by the persistence layer.
///
/// Top-level fields and attributes travel as distinct variants so a caller
/// can never forget which update path a change belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityUpdate {
    /// A top-level entity field (`status`, `folderType`, `assignees`, ...)
    Field {
        entity_id: String,
        entity_type: EntityType,
        field: String,
        value: Value,
    },
    /// An entry in the entity's attribute map
    Attribute {
        entity_id: String,
        entity_type: EntityType,
        name: String,
        value: Value,
    },
}

impl EntityUpdate {
    pub fn entity_id(&self) -> &str {
        match self {
            EntityUpdate::Field { entity_id, .. } | EntityUpdate::Attribute { entity_id, .. } => {
                entity_id
            }
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityUpdate::Field { entity_type, .. }
            | EntityUpdate::Attribute { entity_type, .. } => *entity_type,
        }
    }

    /// The field or attribute name this update targets
    pub fn field_name(&self) -> &str {
        match self {
            EntityUpdate::Field { field, .. } => field,
            EntityUpdate::Attribute { name, .. } => name,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            EntityUpdate::Field { value, .. } | EntityUpdate::Attribute { value, .. } => value,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, EntityUpdate::Attribute { .. })
    }
}

/// "Resume inheriting from the parent". Not expressible as a literal value
/// assignment: the attribute is removed from the entity's own-attribute
/// list instead, so persistence routes it through a different endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritedReset {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub folder_id: String,
    /// Attribute names to revert to the inherited value
    pub attribs: Vec<String>,
    /// The own-attribute list after the revert
    pub own_attrib: Vec<String>,
}

/// An update as recorded in history. Carries enough context to turn the
/// change back into an inherited-value reset on undo/redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryUpdate {
    pub update: EntityUpdate,
    /// Own-attribute list captured when the entry was recorded
    #[serde(default)]
    pub own_attrib: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    /// True when applying this update should revert to the inherited value
    #[serde(default)]
    pub was_inherited: bool,
}

impl HistoryUpdate {
    /// A plain literal update with no inheritance context
    pub fn literal(update: EntityUpdate) -> Self {
        HistoryUpdate {
            update,
            own_attrib: Vec::new(),
            folder_id: None,
            was_inherited: false,
        }
    }
}

/// The two-bucket result of an undo/redo (and of a committed paste): plain
/// value assignments and inherited-value resets, dispatched through two
/// different persistence paths by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBatch {
    pub updates: Vec<EntityUpdate>,
    pub inherited: Vec<InheritedReset>,
}

impl UpdateBatch {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inherited.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len() + self.inherited.len()
    }
}

/// Who produced an update batch. History-originated batches must not be
/// recorded again, or undo would echo into itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    User,
    History,
}
