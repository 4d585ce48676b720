use std::collections::HashSet;

use serde_json::Value;

use crate::clipboard::codec::{self, CellRef};
use crate::clipboard::system::{OsClipboard, SystemClipboard};
use crate::clipboard::validate::{ClipboardError, validate_paste};
use crate::history::{History, HistoryError};
use crate::model::column::ColumnSchema;
use crate::model::entity::{EntitySnapshot, EntityType};
use crate::model::row::Row;
use crate::model::settings::TableSettings;
use crate::model::update::{
    EntityUpdate, HistoryUpdate, UpdateBatch, UpdateOrigin,
};
use crate::tree::{self, BuildOptions};

/// Error type for table-service operations
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// The composition root for one open project table.
///
/// Owns the edit history and the clipboard backend. Everything else
/// (entity snapshots, expansion state, render order, column schema) is
/// supplied per call by the owning view. The service never talks to
/// persistence itself: it returns update batches for the caller to apply.
pub struct ProjectTable<C: SystemClipboard = OsClipboard> {
    settings: TableSettings,
    history: History,
    clipboard: C,
}

impl ProjectTable<OsClipboard> {
    pub fn new(settings: TableSettings) -> Self {
        Self::with_clipboard(settings, OsClipboard)
    }
}

impl<C: SystemClipboard> ProjectTable<C> {
    pub fn with_clipboard(settings: TableSettings, clipboard: C) -> Self {
        let history = History::with_limit(settings.history_limit);
        ProjectTable {
            settings,
            history,
            clipboard,
        }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// The injected clipboard backend (tests preload paste text here)
    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// Build options seeded from the table settings
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            show_hierarchy: self.settings.show_hierarchy,
            page_size: self.settings.page_size,
            ..BuildOptions::default()
        }
    }

    /// Rebuild the row tree. Safe to call on every input change.
    pub fn build_rows(
        &self,
        snapshot: &EntitySnapshot,
        expanded: &HashSet<String>,
        options: &BuildOptions,
    ) -> Vec<Row> {
        tree::build(snapshot, expanded, options)
    }

    // -----------------------------------------------------------------------
    // Clipboard
    // -----------------------------------------------------------------------

    /// Serialize the selection and write it to the system clipboard.
    /// Returns the written text.
    pub fn copy(
        &mut self,
        snapshot: &EntitySnapshot,
        cells: &[CellRef],
        row_order: &[String],
        col_order: &[String],
    ) -> Result<String, TableError> {
        let text = codec::copy_cells(snapshot, cells, row_order, col_order);
        self.clipboard.write_text(&text)?;
        Ok(text)
    }

    /// Read the clipboard and turn it into a validated update batch over
    /// the selected rows and columns. Validation is all-or-nothing and runs
    /// before any update is produced; a successful paste is recorded in
    /// history with its inverse ops.
    pub fn paste(
        &mut self,
        snapshot: &EntitySnapshot,
        target_rows: &[String],
        target_cols: &[String],
        schema: &ColumnSchema,
    ) -> Result<Vec<EntityUpdate>, TableError> {
        let text = self.clipboard.read_text()?;
        let mut rows = codec::parse_clipboard_text(&text);
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Typed targets for validation, aligned index-for-index with
        // `target_rows` so tiling pairs cells identically in both passes
        let typed: Vec<(String, EntityType)> = target_rows
            .iter()
            .map(|id| {
                let entity_type = if snapshot.task(id).is_some() {
                    EntityType::Task
                } else {
                    EntityType::Folder
                };
                (id.clone(), entity_type)
            })
            .collect();
        validate_paste(&mut rows, &typed, target_cols, schema)?;

        let updates = codec::build_paste_updates(snapshot, &rows, target_rows, target_cols, schema);
        let (undo, redo) = inverse_ops(snapshot, &updates);
        self.commit(UpdateOrigin::User, undo, redo);
        Ok(updates)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Record a committed batch. Batches that originated from an undo/redo
    /// are ignored; replaying them would corrupt the redo trail.
    pub fn commit(
        &mut self,
        origin: UpdateOrigin,
        undo: Vec<HistoryUpdate>,
        redo: Vec<HistoryUpdate>,
    ) {
        if origin == UpdateOrigin::History {
            return;
        }
        self.history.record(undo, redo);
    }

    pub fn undo(&mut self) -> Result<UpdateBatch, TableError> {
        Ok(self.history.undo()?)
    }

    pub fn redo(&mut self) -> Result<UpdateBatch, TableError> {
        Ok(self.history.redo()?)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

/// Derive the (undo, redo) history ops for an update batch from the
/// current snapshot. Updates that would not change anything are dropped
/// from both lists, so a no-op batch records nothing.
///
/// The undo side captures the previous value and whether it was inherited
/// rather than explicitly set; undoing such an update later becomes an
/// inherited-value reset instead of a literal write.
pub fn inverse_ops(
    snapshot: &EntitySnapshot,
    updates: &[EntityUpdate],
) -> (Vec<HistoryUpdate>, Vec<HistoryUpdate>) {
    let mut undo = Vec::new();
    let mut redo = Vec::new();
    for update in updates {
        let entity_id = update.entity_id();
        let entity_type = update.entity_type();
        let Some(context) = entity_context(snapshot, entity_type, entity_id) else {
            continue;
        };
        let field = update.field_name();
        let previous = context.field_value(field, update.is_attribute());
        if &previous == update.value() {
            continue;
        }

        let was_inherited = update.is_attribute() && !context.own_attrib.iter().any(|a| a == field);
        undo.push(HistoryUpdate {
            update: with_value(update, previous),
            own_attrib: context.own_attrib.clone(),
            folder_id: context.folder_id.clone(),
            was_inherited,
        });

        let mut own_after = context.own_attrib.clone();
        if update.is_attribute() && !own_after.iter().any(|a| a == field) {
            own_after.push(field.to_string());
        }
        redo.push(HistoryUpdate {
            update: update.clone(),
            own_attrib: own_after,
            folder_id: context.folder_id.clone(),
            was_inherited: false,
        });
    }
    (undo, redo)
}

struct EntityContext<'a> {
    own_attrib: &'a Vec<String>,
    folder_id: Option<String>,
    fields: EntityFields<'a>,
}

enum EntityFields<'a> {
    Folder(&'a crate::model::entity::FolderNode),
    Task(&'a crate::model::entity::TaskNode),
}

fn entity_context<'a>(
    snapshot: &EntitySnapshot<'a>,
    entity_type: EntityType,
    id: &str,
) -> Option<EntityContext<'a>> {
    match entity_type {
        EntityType::Folder => snapshot.folder(id).map(|folder| EntityContext {
            own_attrib: &folder.own_attrib,
            folder_id: folder.parent_id.clone(),
            fields: EntityFields::Folder(folder),
        }),
        EntityType::Task => snapshot.task(id).map(|task| EntityContext {
            own_attrib: &task.own_attrib,
            folder_id: Some(task.folder_id.clone()),
            fields: EntityFields::Task(task),
        }),
    }
}

impl EntityContext<'_> {
    /// Current value of a field or attribute, Null when unset
    fn field_value(&self, field: &str, is_attribute: bool) -> Value {
        if is_attribute {
            return match &self.fields {
                EntityFields::Folder(folder) => folder.attrib.get(field).cloned(),
                EntityFields::Task(task) => task.attrib.get(field).cloned(),
            }
            .unwrap_or(Value::Null);
        }
        match &self.fields {
            EntityFields::Folder(folder) => match field {
                "name" => Value::String(folder.name.clone()),
                "label" => folder
                    .label
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
                "status" => Value::String(folder.status.clone()),
                "folderType" => Value::String(folder.folder_type.clone()),
                "tags" => Value::Array(
                    folder.tags.iter().cloned().map(Value::String).collect(),
                ),
                _ => Value::Null,
            },
            EntityFields::Task(task) => match field {
                "name" => Value::String(task.name.clone()),
                "label" => task.label.clone().map(Value::String).unwrap_or(Value::Null),
                "status" => Value::String(task.status.clone()),
                "taskType" => Value::String(task.task_type.clone()),
                "tags" => Value::Array(task.tags.iter().cloned().map(Value::String).collect()),
                "assignees" => Value::Array(
                    task.assignees.iter().cloned().map(Value::String).collect(),
                ),
                _ => Value::Null,
            },
        }
    }
}

fn with_value(update: &EntityUpdate, value: Value) -> EntityUpdate {
    match update {
        EntityUpdate::Field {
            entity_id,
            entity_type,
            field,
            ..
        } => EntityUpdate::Field {
            entity_id: entity_id.clone(),
            entity_type: *entity_type,
            field: field.clone(),
            value,
        },
        EntityUpdate::Attribute {
            entity_id,
            entity_type,
            name,
            ..
        } => EntityUpdate::Attribute {
            entity_id: entity_id.clone(),
            entity_type: *entity_type,
            name: name.clone(),
            value,
        },
    }
}
