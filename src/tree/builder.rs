use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::entity::EntitySnapshot;
use crate::model::row::Row;

/// Inputs controlling one materialization pass, beyond the entity maps
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// false = flat task list, ignoring folder structure
    pub show_hierarchy: bool,
    /// Flat mode: a further task page is in flight
    pub loading_more: bool,
    /// folder id → number of task rows still loading for that folder
    pub task_loading: HashMap<String, usize>,
    /// Placeholder count for `loading_more` when `task_loading` is empty
    pub page_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            show_hierarchy: true,
            loading_more: false,
            task_loading: HashMap::new(),
            page_size: 100,
        }
    }
}

/// Materialize the row tree for one render pass.
///
/// Pure function of its inputs: identical inputs yield structurally
/// identical trees, and nothing is mutated. Missing lookups (a task whose
/// folder is absent, a folder whose parent is absent) promote the entity to
/// root visibility instead of failing.
pub fn build(snapshot: &EntitySnapshot, expanded: &HashSet<String>, options: &BuildOptions) -> Vec<Row> {
    if options.show_hierarchy {
        build_hierarchy(snapshot, expanded, options)
    } else {
        build_flat(snapshot, options)
    }
}

/// Flat mode: one row per task, name-sorted, plus loading placeholders
fn build_flat(snapshot: &EntitySnapshot, options: &BuildOptions) -> Vec<Row> {
    let mut rows: Vec<Row> = snapshot.tasks.values().map(Row::from_task).collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    if options.loading_more {
        let keys = task_attrib_keys(snapshot);
        let count = if options.task_loading.is_empty() {
            options.page_size
        } else {
            options.task_loading.values().sum()
        };
        for i in 0..count {
            rows.push(Row::loading_task(i, &keys));
        }
    }
    rows
}

fn build_hierarchy(
    snapshot: &EntitySnapshot,
    expanded: &HashSet<String>,
    options: &BuildOptions,
) -> Vec<Row> {
    // Child and root folder indexes, in snapshot order
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut roots: Vec<&str> = Vec::new();
    for folder in snapshot.folders.values() {
        let resolved_parent = folder
            .parent_id
            .as_deref()
            .filter(|pid| snapshot.folders.contains_key(*pid));
        match resolved_parent {
            Some(pid) => children.entry(pid).or_default().push(folder.id.as_str()),
            None => {
                if folder.parent_id.is_some() {
                    log::warn!(
                        "folder {} references missing parent {:?}; treating as root",
                        folder.id,
                        folder.parent_id
                    );
                }
                roots.push(folder.id.as_str());
            }
        }
    }

    // Visibility phase: breadth-first from the roots, descending only
    // through expanded folders. Collapsed subtrees are never visited, so
    // cost tracks visible rows rather than total rows.
    let mut visible: Vec<&str> = Vec::new();
    let mut queue: VecDeque<&str> = roots.iter().copied().collect();
    while let Some(id) = queue.pop_front() {
        visible.push(id);
        if expanded.contains(id)
            && let Some(kids) = children.get(id)
        {
            queue.extend(kids.iter().copied());
        }
    }

    // Row phase: expanded folders get their direct task rows (and loading
    // placeholders) immediately
    let mut rows: HashMap<&str, Row> = HashMap::with_capacity(visible.len());
    for &id in &visible {
        let folder = &snapshot.folders[id];
        let mut row = Row::from_folder(folder);
        if expanded.contains(id) {
            if let Some(task_ids) = snapshot.folder_tasks.get(id) {
                for task_id in task_ids {
                    if let Some(task) = snapshot.task(task_id) {
                        row.sub_rows.push(Row::from_task(task));
                    }
                }
            }
            if let Some(&count) = options.task_loading.get(id) {
                let keys = task_attrib_keys(snapshot);
                for i in 0..count {
                    row.sub_rows.push(Row::loading_task(i, &keys));
                }
            }
        }
        rows.insert(id, row);
    }

    // Wiring pass: attach each visible folder under its parent's row.
    // Reverse visit order means a child's subtree is complete before the
    // child itself is moved into its parent.
    let mut root_rows: Vec<Row> = Vec::new();
    for &id in visible.iter().rev() {
        let row = rows.remove(id).expect("visible folder has a row");
        let folder = &snapshot.folders[id];
        let parent_row = folder
            .parent_id
            .as_deref()
            .filter(|pid| expanded.contains(*pid))
            .and_then(|pid| rows.get_mut(pid));
        match parent_row {
            Some(parent) => parent.sub_rows.push(row),
            None => root_rows.push(row),
        }
    }

    // Orphaned tasks surface at the root rather than disappearing
    for task in snapshot.tasks.values() {
        if !snapshot.folders.contains_key(&task.folder_id) {
            log::warn!(
                "task {} references missing folder {}; promoting to root",
                task.id,
                task.folder_id
            );
            root_rows.push(Row::from_task(task));
        }
    }

    sort_root_rows(&mut root_rows);
    for row in &mut root_rows {
        sort_children(row);
    }
    root_rows
}

/// Root rows sort by name alone
fn sort_root_rows(rows: &mut [Row]) {
    rows.sort_by(|a, b| (a.is_loading, &a.name).cmp(&(b.is_loading, &b.name)));
}

/// Children mixing tasks and folders sort tasks first, then by name.
/// Case-sensitive comparison, and stable so equal keys keep input order.
fn sort_children(row: &mut Row) {
    row.sub_rows
        .sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    for child in &mut row.sub_rows {
        sort_children(child);
    }
}

fn sort_key(row: &Row) -> (bool, u8, &str) {
    let type_rank = match row.entity_type {
        crate::model::EntityType::Task => 0,
        crate::model::EntityType::Folder => 1,
    };
    (row.is_loading, type_rank, row.name.as_str())
}

/// Attribute keys of a representative task row, so placeholder rows keep
/// the column shape
fn task_attrib_keys(snapshot: &EntitySnapshot) -> Vec<String> {
    snapshot
        .tasks
        .values()
        .next()
        .map(|t| t.attrib.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{EntityType, FolderNode, TaskNode};
    use indexmap::IndexMap;

    struct Fixture {
        folders: IndexMap<String, FolderNode>,
        tasks: IndexMap<String, TaskNode>,
        folder_tasks: HashMap<String, Vec<String>>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                folders: IndexMap::new(),
                tasks: IndexMap::new(),
                folder_tasks: HashMap::new(),
            }
        }

        fn folder(&mut self, id: &str, name: &str, parent: Option<&str>) -> &mut Self {
            let mut folder = FolderNode::new(id, name, "Folder");
            folder.parent_id = parent.map(String::from);
            self.folders.insert(id.to_string(), folder);
            self
        }

        fn task(&mut self, id: &str, name: &str, folder: &str) -> &mut Self {
            self.tasks
                .insert(id.to_string(), TaskNode::new(id, folder, name, "Generic"));
            self.folder_tasks
                .entry(folder.to_string())
                .or_default()
                .push(id.to_string());
            self
        }

        fn snapshot(&self) -> EntitySnapshot<'_> {
            EntitySnapshot::new(&self.folders, &self.tasks, &self.folder_tasks)
        }
    }

    fn expanded(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Hierarchical visibility
    // -----------------------------------------------------------------------

    #[test]
    fn collapsed_root_hides_children() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None).folder("b", "B", Some("a"));
        let rows = build(&fx.snapshot(), &expanded(&[]), &BuildOptions::default());
        assert_eq!(names(&rows), ["A"]);
        assert!(rows[0].sub_rows.is_empty());
    }

    #[test]
    fn expanded_parent_reveals_child_folder_but_not_its_tasks() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .folder("b", "B", Some("a"))
            .task("t", "T", "b");
        let rows = build(&fx.snapshot(), &expanded(&["a"]), &BuildOptions::default());
        assert_eq!(names(&rows), ["A"]);
        assert_eq!(names(&rows[0].sub_rows), ["B"]);
        // B itself is not expanded, so T is absent
        assert!(rows[0].sub_rows[0].sub_rows.is_empty());
    }

    #[test]
    fn fully_expanded_chain_reveals_tasks() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .folder("b", "B", Some("a"))
            .task("t", "T", "b");
        let rows = build(&fx.snapshot(), &expanded(&["a", "b"]), &BuildOptions::default());
        assert_eq!(names(&rows[0].sub_rows[0].sub_rows), ["T"]);
    }

    #[test]
    fn expansion_below_collapsed_ancestor_is_inert() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .folder("b", "B", Some("a"))
            .folder("c", "C", Some("b"));
        // b is expanded but a is not, so neither b nor c is visible
        let rows = build(&fx.snapshot(), &expanded(&["b"]), &BuildOptions::default());
        assert_eq!(names(&rows), ["A"]);
        assert!(rows[0].sub_rows.is_empty());
    }

    // -----------------------------------------------------------------------
    // Orphan promotion
    // -----------------------------------------------------------------------

    #[test]
    fn folder_with_missing_parent_becomes_root() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None).folder("b", "B", Some("ghost"));
        let rows = build(&fx.snapshot(), &expanded(&[]), &BuildOptions::default());
        assert_eq!(names(&rows), ["A", "B"]);
    }

    #[test]
    fn task_with_missing_folder_becomes_root() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None).task("t", "zz", "ghost");
        let rows = build(&fx.snapshot(), &expanded(&[]), &BuildOptions::default());
        assert_eq!(names(&rows), ["A", "zz"]);
        assert_eq!(rows[1].entity_type, EntityType::Task);
    }

    // -----------------------------------------------------------------------
    // Sort policy
    // -----------------------------------------------------------------------

    #[test]
    fn tasks_sort_before_sibling_folders() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .folder("b", "Alpha", Some("a"))
            .task("t1", "zeta", "a")
            .task("t2", "beta", "a");
        let rows = build(&fx.snapshot(), &expanded(&["a"]), &BuildOptions::default());
        assert_eq!(names(&rows[0].sub_rows), ["beta", "zeta", "Alpha"]);
    }

    #[test]
    fn name_sort_is_case_sensitive() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .task("t1", "apple", "a")
            .task("t2", "Banana", "a");
        let rows = build(&fx.snapshot(), &expanded(&["a"]), &BuildOptions::default());
        // Plain byte order: uppercase sorts before lowercase
        assert_eq!(names(&rows[0].sub_rows), ["Banana", "apple"]);
    }

    #[test]
    fn root_rows_sort_by_name_only() {
        let mut fx = Fixture::new();
        fx.folder("b", "B", None).folder("a", "A", None);
        let rows = build(&fx.snapshot(), &expanded(&[]), &BuildOptions::default());
        assert_eq!(names(&rows), ["A", "B"]);
    }

    // -----------------------------------------------------------------------
    // Flat mode
    // -----------------------------------------------------------------------

    #[test]
    fn flat_mode_ignores_folder_structure() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .folder("b", "B", Some("a"))
            .task("t1", "delta", "b")
            .task("t2", "alpha", "a");
        let options = BuildOptions {
            show_hierarchy: false,
            ..BuildOptions::default()
        };
        let rows = build(&fx.snapshot(), &expanded(&[]), &options);
        assert_eq!(names(&rows), ["alpha", "delta"]);
    }

    #[test]
    fn flat_mode_appends_a_page_of_placeholders() {
        let mut fx = Fixture::new();
        let mut task = TaskNode::new("t1", "a", "alpha", "Generic");
        task.attrib.insert("priority".into(), serde_json::json!("high"));
        fx.folder("a", "A", None);
        fx.tasks.insert("t1".into(), task);
        fx.folder_tasks.insert("a".into(), vec!["t1".into()]);

        let options = BuildOptions {
            show_hierarchy: false,
            loading_more: true,
            page_size: 3,
            ..BuildOptions::default()
        };
        let rows = build(&fx.snapshot(), &expanded(&[]), &options);
        assert_eq!(rows.len(), 4);
        assert!(rows[1].is_loading && rows[3].is_loading);
        // Placeholders carry the same attribute keys as real task rows
        assert!(rows[1].attrib.contains_key("priority"));
    }

    #[test]
    fn loading_map_counts_override_page_size() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None).task("t1", "alpha", "a");
        let options = BuildOptions {
            show_hierarchy: false,
            loading_more: true,
            task_loading: HashMap::from([("a".to_string(), 2)]),
            page_size: 50,
            ..BuildOptions::default()
        };
        let rows = build(&fx.snapshot(), &expanded(&[]), &options);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn expanded_folder_with_pending_tasks_gets_placeholders() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None).task("t1", "alpha", "a");
        let options = BuildOptions {
            task_loading: HashMap::from([("a".to_string(), 2)]),
            ..BuildOptions::default()
        };
        let rows = build(&fx.snapshot(), &expanded(&["a"]), &options);
        assert_eq!(rows[0].sub_rows.len(), 3);
        // Real rows first, placeholders after
        assert!(!rows[0].sub_rows[0].is_loading);
        assert!(rows[0].sub_rows[2].is_loading);
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn identical_inputs_build_identical_trees() {
        let mut fx = Fixture::new();
        fx.folder("a", "A", None)
            .folder("b", "B", Some("a"))
            .task("t1", "one", "a")
            .task("t2", "two", "b");
        let exp = expanded(&["a", "b"]);
        let options = BuildOptions::default();
        let first = build(&fx.snapshot(), &exp, &options);
        let second = build(&fx.snapshot(), &exp, &options);
        assert_eq!(first, second);
    }
}
