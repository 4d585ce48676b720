use serde_json::Value;

use crate::model::column::{ColumnKind, ColumnSchema, ColumnType};
use crate::model::entity::{EntitySnapshot, EntityType};
use crate::model::update::EntityUpdate;

/// One selected cell, addressed by the owning row's entity id and the
/// column id. Render order is supplied separately by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub row_id: String,
    pub col_id: String,
}

impl CellRef {
    pub fn new(row_id: impl Into<String>, col_id: impl Into<String>) -> Self {
        CellRef {
            row_id: row_id.into(),
            col_id: col_id.into(),
        }
    }
}

/// One pasted text row: its tab-split values and the column ids they were
/// mapped to during targeting (empty until then)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClipboardRow {
    pub values: Vec<String>,
    pub col_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Serialize a cell selection to clipboard text: one `\t`-joined line per
/// row, `\n`-joined, no header. Rows and columns follow the caller's render
/// order. The `name` column emits the entity's full slash-joined ancestor
/// path; `subType` resolves to the folder or task type.
pub fn copy_cells(
    snapshot: &EntitySnapshot,
    cells: &[CellRef],
    row_order: &[String],
    col_order: &[String],
) -> String {
    let row_index = |id: &str| row_order.iter().position(|r| r == id).unwrap_or(usize::MAX);
    let col_index = |id: &str| col_order.iter().position(|c| c == id).unwrap_or(usize::MAX);

    // Group by row, keeping one entry per row in selection order
    let mut rows: Vec<(&str, Vec<&str>)> = Vec::new();
    for cell in cells {
        match rows.iter_mut().find(|(id, _)| *id == cell.row_id) {
            Some((_, cols)) => cols.push(cell.col_id.as_str()),
            None => rows.push((cell.row_id.as_str(), vec![cell.col_id.as_str()])),
        }
    }
    rows.sort_by_key(|(id, _)| row_index(id));

    let mut lines = Vec::with_capacity(rows.len());
    for (row_id, mut cols) in rows {
        cols.sort_by_key(|id| col_index(id));
        let cells: Vec<String> = cols
            .iter()
            .map(|col_id| resolve_cell(snapshot, row_id, col_id))
            .collect();
        lines.push(cells.join("\t"));
    }
    lines.join("\n")
}

/// Resolve one cell to its copied text. Missing entities and values become
/// empty cells.
fn resolve_cell(snapshot: &EntitySnapshot, row_id: &str, col_id: &str) -> String {
    let kind = ColumnKind::parse(col_id);
    if let Some(task) = snapshot.task(row_id) {
        return match &kind {
            ColumnKind::Name => snapshot
                .entity_path(EntityType::Task, row_id)
                .unwrap_or_else(|| task.name.clone()),
            ColumnKind::SubType => task.task_type.clone(),
            ColumnKind::Status => task.status.clone(),
            ColumnKind::Tags => task.tags.join(", "),
            ColumnKind::Assignees => task.assignees.join(", "),
            ColumnKind::Attribute(name) => {
                task.attrib.get(name).map(stringify_value).unwrap_or_default()
            }
            ColumnKind::Link(_) => String::new(),
            ColumnKind::Other(name) => match name.as_str() {
                "label" => task.label.clone().unwrap_or_default(),
                _ => task.attrib.get(name).map(stringify_value).unwrap_or_default(),
            },
        };
    }
    if let Some(folder) = snapshot.folder(row_id) {
        return match &kind {
            ColumnKind::Name => snapshot
                .folder_path(row_id)
                .unwrap_or_else(|| folder.name.clone()),
            ColumnKind::SubType => folder.folder_type.clone(),
            ColumnKind::Status => folder.status.clone(),
            ColumnKind::Tags => folder.tags.join(", "),
            ColumnKind::Assignees => String::new(),
            ColumnKind::Attribute(name) => {
                folder.attrib.get(name).map(stringify_value).unwrap_or_default()
            }
            ColumnKind::Link(_) => String::new(),
            ColumnKind::Other(name) => match name.as_str() {
                "label" => folder.label.clone().unwrap_or_default(),
                _ => folder.attrib.get(name).map(stringify_value).unwrap_or_default(),
            },
        };
    }
    String::new()
}

/// Cell stringification: arrays comma-join, null is empty
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(stringify_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Paste: parsing and coercion
// ---------------------------------------------------------------------------

/// Split clipboard text into rows of tab-separated values. A trailing
/// newline is dropped; CRLF line endings are tolerated.
pub fn parse_clipboard_text(text: &str) -> Vec<ParsedClipboardRow> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            ParsedClipboardRow {
                values: line.split('\t').map(String::from).collect(),
                col_ids: Vec::new(),
            }
        })
        .collect()
}

/// A single copied cell is broadcast to every selected cell instead of
/// being tiled positionally
pub fn is_single_value(rows: &[ParsedClipboardRow]) -> bool {
    rows.len() == 1 && rows[0].values.len() == 1
}

/// Coerce pasted text to the column's declared value shape
pub fn process_field_value(raw: &str, column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Array | ColumnType::Assignees => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Value::Array(Vec::new());
            }
            // JSON array first, comma-split second; splitting a plain word
            // yields the one-element fallback
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                return Value::Array(items);
            }
            Value::Array(
                trimmed
                    .split(',')
                    .map(|s| Value::String(s.trim().to_string()))
                    .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
                    .collect(),
            )
        }
        ColumnType::Number => {
            let parsed: f64 = raw.trim().parse().unwrap_or(0.0);
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(0))
        }
        ColumnType::Boolean => {
            let lowered = raw.trim().to_lowercase();
            Value::Bool(matches!(lowered.as_str(), "true" | "1" | "yes"))
        }
        ColumnType::Text | ColumnType::Link => Value::String(raw.trim().to_string()),
    }
}

// ---------------------------------------------------------------------------
// Paste: targeting
// ---------------------------------------------------------------------------

/// Map a validated paste grid onto the selected rows and columns.
///
/// When the pasted block is smaller than the selection, values tile with
/// modulo arithmetic over the parsed grid's dimensions, so one copied row
/// fans out across many selected rows. The `name` column pastes the leaf
/// component of a copied path; `subType` remaps to the entity's own type
/// field.
pub fn build_paste_updates(
    snapshot: &EntitySnapshot,
    rows: &[ParsedClipboardRow],
    target_rows: &[String],
    target_cols: &[String],
    schema: &ColumnSchema,
) -> Vec<EntityUpdate> {
    if rows.is_empty() {
        return Vec::new();
    }
    let mut updates = Vec::new();
    for (i, row_id) in target_rows.iter().enumerate() {
        let Some(entity_type) = entity_type_of(snapshot, row_id) else {
            log::debug!("paste target {} not in snapshot; skipping", row_id);
            continue;
        };
        let parsed = &rows[i % rows.len()];
        if parsed.values.is_empty() {
            continue;
        }
        for (j, col_id) in target_cols.iter().enumerate() {
            let raw = &parsed.values[j % parsed.values.len()];
            updates.push(cell_update(row_id, entity_type, col_id, raw, schema));
        }
    }
    updates
}

fn entity_type_of(snapshot: &EntitySnapshot, id: &str) -> Option<EntityType> {
    if snapshot.task(id).is_some() {
        Some(EntityType::Task)
    } else if snapshot.folder(id).is_some() {
        Some(EntityType::Folder)
    } else {
        None
    }
}

fn cell_update(
    row_id: &str,
    entity_type: EntityType,
    col_id: &str,
    raw: &str,
    schema: &ColumnSchema,
) -> EntityUpdate {
    let kind = ColumnKind::parse(col_id);
    match &kind {
        ColumnKind::Attribute(name) => {
            let column_type = schema
                .attribute(name)
                .map(|spec| coercion_type(spec.data_type))
                .unwrap_or_else(|| schema.data_type(col_id));
            EntityUpdate::Attribute {
                entity_id: row_id.to_string(),
                entity_type,
                name: name.clone(),
                value: process_field_value(raw, column_type),
            }
        }
        _ => {
            // Copied name cells carry the full path; only the leaf pastes
            let raw = if kind == ColumnKind::Name {
                raw.rsplit('/').next().unwrap_or(raw)
            } else {
                raw
            };
            let column_type = schema
                .column(col_id)
                .map(|c| c.data_type)
                .unwrap_or_else(|| default_type_for(&kind));
            EntityUpdate::Field {
                entity_id: row_id.to_string(),
                entity_type,
                field: kind.target_field(entity_type).to_string(),
                value: process_field_value(raw, column_type),
            }
        }
    }
}

fn coercion_type(attr: crate::model::column::AttributeType) -> ColumnType {
    use crate::model::column::AttributeType;
    match attr {
        AttributeType::Integer | AttributeType::Float => ColumnType::Number,
        AttributeType::Boolean => ColumnType::Boolean,
        AttributeType::List => ColumnType::Array,
        AttributeType::String => ColumnType::Text,
    }
}

fn default_type_for(kind: &ColumnKind) -> ColumnType {
    match kind {
        ColumnKind::Tags => ColumnType::Array,
        ColumnKind::Assignees => ColumnType::Assignees,
        ColumnKind::Link(_) => ColumnType::Link,
        _ => ColumnType::Text,
    }
}
