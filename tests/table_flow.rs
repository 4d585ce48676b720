use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::json;

use trellis::clipboard::{CellRef, MemoryClipboard, sanitize_name};
use trellis::model::{
    ColumnOption, ColumnSchema, EntitySnapshot, EntityType, FolderNode, TableSettings, TaskNode,
};
use trellis::table::ProjectTable;
use trellis::tree::{BuildOptions, build};

/// A small project: two nested folders with one task at the bottom
struct World {
    folders: IndexMap<String, FolderNode>,
    tasks: IndexMap<String, TaskNode>,
    folder_tasks: HashMap<String, Vec<String>>,
}

impl World {
    fn new() -> Self {
        let mut folders = IndexMap::new();
        let mut a = FolderNode::new("a", "A", "Folder");
        a.status = "Pending".into();
        folders.insert(a.id.clone(), a);
        let mut b = FolderNode::new("b", "B", "Sequence");
        b.parent_id = Some("a".into());
        folders.insert(b.id.clone(), b);

        let mut tasks = IndexMap::new();
        let mut t = TaskNode::new("t", "b", "comp", "Compositing");
        t.status = "Pending".into();
        t.assignees = vec!["alice".into()];
        tasks.insert(t.id.clone(), t);

        let mut folder_tasks = HashMap::new();
        folder_tasks.insert("b".to_string(), vec!["t".to_string()]);
        World {
            folders,
            tasks,
            folder_tasks,
        }
    }

    fn snapshot(&self) -> EntitySnapshot<'_> {
        EntitySnapshot::new(&self.folders, &self.tasks, &self.folder_tasks)
    }
}

fn expanded(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn schema() -> ColumnSchema {
    let mut schema = ColumnSchema::default();
    schema.statuses = vec![
        ColumnOption::new("Pending"),
        ColumnOption::new("In progress"),
        ColumnOption::new("Done"),
    ];
    schema.assignees = vec![
        ColumnOption::labeled("alice", "Alice Doe"),
        ColumnOption::labeled("bob", "Bob Roe"),
    ];
    schema
}

fn table() -> ProjectTable<MemoryClipboard> {
    ProjectTable::with_clipboard(TableSettings::default(), MemoryClipboard::new())
}

// ============================================================================
// Tree materialization
// ============================================================================

#[test]
fn expanding_folders_reveals_the_subtree_step_by_step() {
    let world = World::new();

    // Only A expanded: B appears, B's task does not
    let rows = build(&world.snapshot(), &expanded(&["a"]), &BuildOptions::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "a");
    assert_eq!(rows[0].sub_rows.len(), 1);
    assert_eq!(rows[0].sub_rows[0].id, "b");
    assert!(rows[0].sub_rows[0].sub_rows.is_empty());

    // A and B expanded: the task surfaces under B
    let rows = build(
        &world.snapshot(),
        &expanded(&["a", "b"]),
        &BuildOptions::default(),
    );
    let b = &rows[0].sub_rows[0];
    assert_eq!(b.sub_rows.len(), 1);
    assert_eq!(b.sub_rows[0].id, "t");
    assert_eq!(b.sub_rows[0].entity_type, EntityType::Task);
}

// ============================================================================
// Clipboard round trip
// ============================================================================

#[test]
fn copy_then_paste_round_trips_status_cells() {
    let world = World::new();
    let mut table = table();

    let text = table
        .copy(
            &world.snapshot(),
            &[CellRef::new("t", "status"), CellRef::new("t", "name")],
            &ids(&["t"]),
            &ids(&["status", "name"]),
        )
        .unwrap();
    // Name cells copy as the full ancestor path
    assert_eq!(text, "Pending\tA/B/comp");

    let updates = table
        .paste(
            &world.snapshot(),
            &ids(&["t"]),
            &ids(&["status", "name"]),
            &schema(),
        )
        .unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].value(), &json!("Pending"));
    // Pasting a path into the name column keeps only the leaf
    assert_eq!(updates[1].field_name(), "name");
    assert_eq!(updates[1].value(), &json!("comp"));
}

#[test]
fn single_cell_paste_broadcasts_over_the_selection() {
    let world = World::new();
    let mut table = table();
    table.clipboard_text("Done");

    let updates = table
        .paste(
            &world.snapshot(),
            &ids(&["a", "b", "t"]),
            &ids(&["status"]),
            &schema(),
        )
        .unwrap();
    assert_eq!(updates.len(), 3);
    for update in &updates {
        assert_eq!(update.field_name(), "status");
        assert_eq!(update.value(), &json!("Done"));
    }
}

#[test]
fn assignee_paste_is_partially_tolerant() {
    let world = World::new();
    let mut table = table();

    table.clipboard_text("alice, doesnotexist");
    let updates = table
        .paste(&world.snapshot(), &ids(&["t"]), &ids(&["assignees"]), &schema())
        .unwrap();
    assert_eq!(updates[0].value(), &json!(["alice"]));

    table.clipboard_text("doesnotexist");
    assert!(
        table
            .paste(&world.snapshot(), &ids(&["t"]), &ids(&["assignees"]), &schema())
            .is_err()
    );
}

// ============================================================================
// History
// ============================================================================

#[test]
fn undo_redo_walks_a_paste_back_and_forth() {
    let world = World::new();
    let mut table = table();

    table.clipboard_text("Done");
    table
        .paste(&world.snapshot(), &ids(&["t"]), &ids(&["status"]), &schema())
        .unwrap();

    let undone = table.undo().unwrap();
    assert_eq!(undone.updates[0].value(), &json!("Pending"));
    assert!(table.can_redo());

    let redone = table.redo().unwrap();
    assert_eq!(redone.updates[0].value(), &json!("Done"));
    assert!(table.can_undo());
    assert!(!table.can_redo());
}

#[test]
fn history_is_bounded_by_the_settings_limit() {
    let world = World::new();
    let mut table = table();
    let statuses = ["Done", "In progress"];

    for i in 0..60 {
        table.clipboard_text(statuses[i % 2]);
        table
            .paste(&world.snapshot(), &ids(&["t"]), &ids(&["status"]), &schema())
            .unwrap();
    }
    let mut undone = 0;
    while table.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 50);
}

// ============================================================================
// Subtask names
// ============================================================================

#[test]
fn pasted_subtask_names_are_sanitized() {
    assert_eq!(sanitize_name("My Task #1!"), "My_Task__1");
}

/// Test helper: put text on the injected clipboard
trait ClipboardText {
    fn clipboard_text(&mut self, text: &str);
}

impl ClipboardText for ProjectTable<MemoryClipboard> {
    fn clipboard_text(&mut self, text: &str) {
        use trellis::clipboard::SystemClipboard;
        self.clipboard_mut().write_text(text).unwrap();
    }
}
