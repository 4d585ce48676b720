use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::entity::EntityType;

/// What a column id refers to. Attribute columns use the `attrib.` prefix
/// convention, link columns the `link_` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Name,
    SubType,
    Status,
    Tags,
    Assignees,
    Attribute(String),
    Link(String),
    Other(String),
}

impl ColumnKind {
    pub fn parse(id: &str) -> ColumnKind {
        if let Some(name) = id.strip_prefix("attrib.") {
            return ColumnKind::Attribute(name.to_string());
        }
        if let Some(name) = id.strip_prefix("link_") {
            return ColumnKind::Link(name.to_string());
        }
        match id {
            "name" => ColumnKind::Name,
            "subType" => ColumnKind::SubType,
            "status" => ColumnKind::Status,
            "tags" => ColumnKind::Tags,
            "assignees" => ColumnKind::Assignees,
            other => ColumnKind::Other(other.to_string()),
        }
    }

    /// The entity field this column writes to on paste. `subType` depends
    /// on the entity kind; attribute columns target the attribute map.
    pub fn target_field(&self, entity_type: EntityType) -> &str {
        match self {
            ColumnKind::Name => "name",
            ColumnKind::SubType => entity_type.sub_type_field(),
            ColumnKind::Status => "status",
            ColumnKind::Tags => "tags",
            ColumnKind::Assignees => "assignees",
            ColumnKind::Attribute(name) | ColumnKind::Link(name) | ColumnKind::Other(name) => name,
        }
    }
}

/// Declared value shape of a column, driving paste coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Boolean,
    Array,
    Link,
    Assignees,
}

/// One allowed value of an enumerated column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl ColumnOption {
    pub fn new(value: impl Into<String>) -> Self {
        ColumnOption {
            value: value.into(),
            label: None,
        }
    }

    pub fn labeled(value: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnOption {
            value: value.into(),
            label: Some(label.into()),
        }
    }
}

/// Declared type of a project attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Integer,
    Float,
    Boolean,
    List,
}

/// Per-attribute validation info: the declared type plus the enumerated
/// option set, when the attribute has one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub data_type: AttributeType,
    #[serde(default)]
    pub options: Vec<ColumnOption>,
}

impl AttributeSpec {
    pub fn plain(data_type: AttributeType) -> Self {
        AttributeSpec {
            data_type,
            options: Vec::new(),
        }
    }
}

/// A column as configured by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub data_type: ColumnType,
    #[serde(default)]
    pub read_only: bool,
}

impl Column {
    pub fn new(id: impl Into<String>, data_type: ColumnType) -> Self {
        Column {
            id: id.into(),
            data_type,
            read_only: false,
        }
    }

    pub fn read_only(id: impl Into<String>, data_type: ColumnType) -> Self {
        Column {
            id: id.into(),
            data_type,
            read_only: true,
        }
    }
}

/// Column semantics plus the enum option sets the validator matches
/// pasted values against. Supplied by the caller per project.
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    pub columns: HashMap<String, Column>,
    pub statuses: Vec<ColumnOption>,
    pub folder_types: Vec<ColumnOption>,
    pub task_types: Vec<ColumnOption>,
    pub tags: Vec<ColumnOption>,
    pub assignees: Vec<ColumnOption>,
    pub attributes: HashMap<String, AttributeSpec>,
}

impl ColumnSchema {
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn data_type(&self, id: &str) -> ColumnType {
        self.column(id).map(|c| c.data_type).unwrap_or_default()
    }

    pub fn is_read_only(&self, id: &str) -> bool {
        self.column(id).is_some_and(|c| c.read_only)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.get(name)
    }

    /// Option set for a built-in enumerated column. `subType` resolves to
    /// folder or task types depending on the entity kind; columns with no
    /// known enum return None and pass through unvalidated.
    pub fn builtin_options(&self, kind: &ColumnKind, entity_type: EntityType) -> Option<&[ColumnOption]> {
        match kind {
            ColumnKind::Status => Some(&self.statuses),
            ColumnKind::SubType => match entity_type {
                EntityType::Folder => Some(&self.folder_types),
                EntityType::Task => Some(&self.task_types),
            },
            ColumnKind::Tags => Some(&self.tags),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builtin_ids() {
        assert_eq!(ColumnKind::parse("name"), ColumnKind::Name);
        assert_eq!(ColumnKind::parse("subType"), ColumnKind::SubType);
        assert_eq!(ColumnKind::parse("status"), ColumnKind::Status);
        assert_eq!(ColumnKind::parse("assignees"), ColumnKind::Assignees);
    }

    #[test]
    fn parse_prefixed_ids() {
        assert_eq!(
            ColumnKind::parse("attrib.priority"),
            ColumnKind::Attribute("priority".into())
        );
        assert_eq!(
            ColumnKind::parse("link_reference"),
            ColumnKind::Link("reference".into())
        );
    }

    #[test]
    fn sub_type_targets_entity_kind() {
        let kind = ColumnKind::parse("subType");
        assert_eq!(kind.target_field(EntityType::Folder), "folderType");
        assert_eq!(kind.target_field(EntityType::Task), "taskType");
    }

    #[test]
    fn unknown_column_defaults_to_text() {
        let schema = ColumnSchema::default();
        assert_eq!(schema.data_type("somethingElse"), ColumnType::Text);
        assert!(!schema.is_read_only("somethingElse"));
    }
}
