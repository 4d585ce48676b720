use serde::{Deserialize, Serialize};

use super::entity::{AttribMap, EntityType, FolderNode, TaskNode};

/// A render-ready projection of one entity in the table.
///
/// Rows are rebuilt wholesale on every relevant input change and never
/// patched in place; `sub_rows` holds children only when the parent folder
/// is expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub status: String,
    /// Folder type or task type, depending on `entity_type`
    pub sub_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub attrib: AttribMap,
    #[serde(default)]
    pub sub_rows: Vec<Row>,
    /// Placeholder marker; the renderer shows a skeleton cell for these
    #[serde(default)]
    pub is_loading: bool,
}

impl Row {
    pub fn from_folder(folder: &FolderNode) -> Self {
        Row {
            id: folder.id.clone(),
            entity_type: EntityType::Folder,
            name: folder.name.clone(),
            label: folder.label.clone(),
            status: folder.status.clone(),
            sub_type: folder.folder_type.clone(),
            tags: folder.tags.clone(),
            assignees: Vec::new(),
            attrib: folder.attrib.clone(),
            sub_rows: Vec::new(),
            is_loading: false,
        }
    }

    pub fn from_task(task: &TaskNode) -> Self {
        Row {
            id: task.id.clone(),
            entity_type: EntityType::Task,
            name: task.name.clone(),
            label: task.label.clone(),
            status: task.status.clone(),
            sub_type: task.task_type.clone(),
            tags: task.tags.clone(),
            assignees: task.assignees.clone(),
            attrib: task.attrib.clone(),
            sub_rows: Vec::new(),
            is_loading: false,
        }
    }

    /// Synthetic placeholder row emitted while a task page is in flight.
    /// Carries the attribute keys of a real task row so the column shape
    /// does not change under the renderer.
    pub fn loading_task(index: usize, attrib_keys: &[String]) -> Self {
        let mut attrib = AttribMap::new();
        for key in attrib_keys {
            attrib.insert(key.clone(), serde_json::Value::Null);
        }
        Row {
            id: format!("loading-{}", index),
            entity_type: EntityType::Task,
            name: String::new(),
            label: None,
            status: String::new(),
            sub_type: String::new(),
            tags: Vec::new(),
            assignees: Vec::new(),
            attrib,
            sub_rows: Vec::new(),
            is_loading: true,
        }
    }

    /// Display text: label when set, name otherwise
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
