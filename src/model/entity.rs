use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute payload: attribute name → value, in declaration order
pub type AttribMap = IndexMap<String, Value>;

/// Kind of entity a row or update refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Folder,
    Task,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Folder => "folder",
            EntityType::Task => "task",
        }
    }

    /// The field name holding this entity's subtype
    pub fn sub_type_field(self) -> &'static str {
        match self {
            EntityType::Folder => "folderType",
            EntityType::Task => "taskType",
        }
    }
}

/// A folder record as supplied by the data-fetch layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub folder_type: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attrib: AttribMap,
    /// Attribute names explicitly set on this folder (not inherited)
    #[serde(default)]
    pub own_attrib: Vec<String>,
    /// Display path as last reported by the server
    #[serde(default)]
    pub path: String,
}

/// A task record. Tasks are always leaves under a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: String,
    pub folder_id: String,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub task_type: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub attrib: AttribMap,
    #[serde(default)]
    pub own_attrib: Vec<String>,
}

impl FolderNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, folder_type: impl Into<String>) -> Self {
        FolderNode {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            label: None,
            folder_type: folder_type.into(),
            status: String::new(),
            tags: Vec::new(),
            attrib: AttribMap::new(),
            own_attrib: Vec::new(),
            path: String::new(),
        }
    }

    /// Check whether an attribute is explicitly set (as opposed to inherited)
    pub fn owns_attrib(&self, name: &str) -> bool {
        self.own_attrib.iter().any(|a| a == name)
    }
}

impl TaskNode {
    pub fn new(
        id: impl Into<String>,
        folder_id: impl Into<String>,
        name: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        TaskNode {
            id: id.into(),
            folder_id: folder_id.into(),
            name: name.into(),
            label: None,
            task_type: task_type.into(),
            status: String::new(),
            tags: Vec::new(),
            assignees: Vec::new(),
            attrib: AttribMap::new(),
            own_attrib: Vec::new(),
        }
    }

    pub fn owns_attrib(&self, name: &str) -> bool {
        self.own_attrib.iter().any(|a| a == name)
    }
}

/// A read-only view over one fetch of the entity maps.
///
/// The folder→task index is maintained by the data-fetch layer; this view
/// never recomputes it. All lookups treat missing references as "absent",
/// never as errors (orphans are promoted to roots by the tree builder).
#[derive(Debug, Clone, Copy)]
pub struct EntitySnapshot<'a> {
    pub folders: &'a IndexMap<String, FolderNode>,
    pub tasks: &'a IndexMap<String, TaskNode>,
    /// folder id → ids of its direct tasks
    pub folder_tasks: &'a HashMap<String, Vec<String>>,
}

impl<'a> EntitySnapshot<'a> {
    pub fn new(
        folders: &'a IndexMap<String, FolderNode>,
        tasks: &'a IndexMap<String, TaskNode>,
        folder_tasks: &'a HashMap<String, Vec<String>>,
    ) -> Self {
        EntitySnapshot {
            folders,
            tasks,
            folder_tasks,
        }
    }

    pub fn folder(&self, id: &str) -> Option<&'a FolderNode> {
        self.folders.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&'a TaskNode> {
        self.tasks.get(id)
    }

    /// Slash-joined ancestor path for a folder, resolved through the map.
    /// A folder whose parent is absent from the map is a path root.
    pub fn folder_path(&self, id: &str) -> Option<String> {
        let folder = self.folder(id)?;
        let mut segments = vec![folder.name.as_str()];
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut current = folder.parent_id.as_deref();
        while let Some(pid) = current {
            // A parent cycle would loop forever; stop at the repeat
            if !seen.insert(pid) {
                break;
            }
            let Some(parent) = self.folder(pid) else { break };
            segments.push(parent.name.as_str());
            current = parent.parent_id.as_deref();
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Full path for any entity: folders resolve their ancestor chain,
    /// tasks append their name to the owning folder's path.
    pub fn entity_path(&self, kind: EntityType, id: &str) -> Option<String> {
        match kind {
            EntityType::Folder => self.folder_path(id),
            EntityType::Task => {
                let task = self.task(id)?;
                match self.folder_path(&task.folder_id) {
                    Some(folder_path) => Some(format!("{}/{}", folder_path, task.name)),
                    None => Some(task.name.clone()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_maps() -> (
        IndexMap<String, FolderNode>,
        IndexMap<String, TaskNode>,
        HashMap<String, Vec<String>>,
    ) {
        let mut folders = IndexMap::new();
        let mut assets = FolderNode::new("f-assets", "assets", "Folder");
        assets.path = "assets".into();
        folders.insert(assets.id.clone(), assets);
        let mut hero = FolderNode::new("f-hero", "hero", "Asset");
        hero.parent_id = Some("f-assets".into());
        folders.insert(hero.id.clone(), hero);

        let mut tasks = IndexMap::new();
        tasks.insert(
            "t-model".to_string(),
            TaskNode::new("t-model", "f-hero", "modeling", "Modeling"),
        );

        let mut folder_tasks = HashMap::new();
        folder_tasks.insert("f-hero".to_string(), vec!["t-model".to_string()]);
        (folders, tasks, folder_tasks)
    }

    #[test]
    fn folder_path_walks_ancestors() {
        let (folders, tasks, folder_tasks) = snapshot_maps();
        let snap = EntitySnapshot::new(&folders, &tasks, &folder_tasks);
        assert_eq!(snap.folder_path("f-hero").as_deref(), Some("assets/hero"));
    }

    #[test]
    fn task_path_includes_folder_chain() {
        let (folders, tasks, folder_tasks) = snapshot_maps();
        let snap = EntitySnapshot::new(&folders, &tasks, &folder_tasks);
        assert_eq!(
            snap.entity_path(EntityType::Task, "t-model").as_deref(),
            Some("assets/hero/modeling")
        );
    }

    #[test]
    fn dangling_parent_is_a_path_root() {
        let (mut folders, tasks, folder_tasks) = snapshot_maps();
        folders.get_mut("f-hero").unwrap().parent_id = Some("missing".into());
        let snap = EntitySnapshot::new(&folders, &tasks, &folder_tasks);
        assert_eq!(snap.folder_path("f-hero").as_deref(), Some("hero"));
    }

    #[test]
    fn parent_cycle_terminates() {
        let (mut folders, tasks, folder_tasks) = snapshot_maps();
        folders.get_mut("f-assets").unwrap().parent_id = Some("f-hero".into());
        let snap = EntitySnapshot::new(&folders, &tasks, &folder_tasks);
        // Cycle hero → assets → hero stops after one full walk
        assert_eq!(snap.folder_path("f-hero").as_deref(), Some("assets/hero"));
    }
}
