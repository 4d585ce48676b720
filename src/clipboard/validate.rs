use regex::Regex;

use super::codec::ParsedClipboardRow;
use crate::model::column::{AttributeType, ColumnKind, ColumnOption, ColumnSchema};
use crate::model::entity::EntityType;

/// Error type for clipboard operations. Validation failures carry the one
/// user-facing message shown for the aborted paste.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("column \"{0}\" is read-only")]
    ReadOnly(String),
    #[error("invalid value for {field}: \"{value}\"")]
    InvalidValue { field: String, value: String },
    #[error("clipboard unavailable: {0}")]
    Io(String),
}

/// Accepted numeric shape for integer and float attributes
const NUMERIC_PATTERN: &str = r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$";
/// Entity ids are lowercase 32-digit hex strings
const ENTITY_ID_PATTERN: &str = r"^[0-9a-f]{32}$";

/// Validate every candidate cell of a paste before any update is built.
///
/// The whole paste is all-or-nothing: the first invalid cell aborts it with
/// a single error and no state change. The only correcting paths are enum
/// casing (the canonical value is substituted back into `rows`) and
/// assignee lists, where unmatched entries are silently dropped as long as
/// at least one entry matches.
pub fn validate_paste(
    rows: &mut [ParsedClipboardRow],
    target_rows: &[(String, EntityType)],
    target_cols: &[String],
    schema: &ColumnSchema,
) -> Result<(), ClipboardError> {
    if rows.is_empty() {
        return Ok(());
    }
    let numeric = Regex::new(NUMERIC_PATTERN).expect("numeric pattern");
    let entity_id = Regex::new(ENTITY_ID_PATTERN).expect("entity id pattern");

    for col_id in target_cols {
        if schema.is_read_only(col_id) {
            return Err(ClipboardError::ReadOnly(col_id.clone()));
        }
    }

    for (i, (_, entity_type)) in target_rows.iter().enumerate() {
        let parsed_index = i % rows.len();
        if rows[parsed_index].values.is_empty() {
            continue;
        }
        for (j, col_id) in target_cols.iter().enumerate() {
            let value_index = j % rows[parsed_index].values.len();
            let raw = rows[parsed_index].values[value_index].trim().to_string();
            // Empty cells clear the target value and carry nothing to check
            if raw.is_empty() {
                continue;
            }
            let corrected = validate_cell(col_id, *entity_type, &raw, schema, &numeric, &entity_id)?;
            if let Some(corrected) = corrected {
                rows[parsed_index].values[value_index] = corrected;
            }
        }
    }
    Ok(())
}

/// Check one cell. Returns the corrected text when a correction applies
/// (canonical enum casing, filtered assignees), None when the raw value
/// passes as-is.
fn validate_cell(
    col_id: &str,
    entity_type: EntityType,
    raw: &str,
    schema: &ColumnSchema,
    numeric: &Regex,
    entity_id: &Regex,
) -> Result<Option<String>, ClipboardError> {
    let kind = ColumnKind::parse(col_id);
    match &kind {
        ColumnKind::Link(_) => {
            for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if !entity_id.is_match(id) {
                    return Err(invalid(col_id, raw));
                }
            }
            Ok(None)
        }
        ColumnKind::Assignees => {
            let mut matched = Vec::new();
            for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if let Some(canonical) = match_assignee(&schema.assignees, name) {
                    matched.push(canonical.to_string());
                }
            }
            if matched.is_empty() {
                return Err(invalid(col_id, raw));
            }
            // Partial tolerance: unmatched entries drop silently
            Ok(Some(matched.join(", ")))
        }
        ColumnKind::Attribute(name) => match schema.attribute(name) {
            Some(spec) => match spec.data_type {
                AttributeType::Integer => {
                    if !numeric.is_match(raw) || raw.parse::<f64>().is_ok_and(|v| v.fract() != 0.0)
                    {
                        return Err(invalid(col_id, raw));
                    }
                    Ok(None)
                }
                AttributeType::Float => {
                    if !numeric.is_match(raw) {
                        return Err(invalid(col_id, raw));
                    }
                    Ok(None)
                }
                AttributeType::String if !spec.options.is_empty() => {
                    match match_canonical(&spec.options, raw) {
                        Some(canonical) => Ok(Some(canonical.to_string())),
                        None => Err(invalid(col_id, raw)),
                    }
                }
                _ => Ok(None),
            },
            // Attributes with no declared spec pass through unvalidated
            None => Ok(None),
        },
        ColumnKind::Status | ColumnKind::SubType | ColumnKind::Tags => {
            let Some(options) = schema.builtin_options(&kind, entity_type) else {
                return Ok(None);
            };
            if options.is_empty() {
                return Ok(None);
            }
            if kind == ColumnKind::Tags {
                // Multi-value column: every entry must resolve
                let mut corrected = Vec::new();
                for tag in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    match match_canonical(options, tag) {
                        Some(canonical) => corrected.push(canonical.to_string()),
                        None => return Err(invalid(col_id, raw)),
                    }
                }
                Ok(Some(corrected.join(", ")))
            } else {
                match match_canonical(options, raw) {
                    Some(canonical) => Ok(Some(canonical.to_string())),
                    None => Err(invalid(col_id, raw)),
                }
            }
        }
        ColumnKind::Name | ColumnKind::Other(_) => Ok(None),
    }
}

fn invalid(field: &str, value: &str) -> ClipboardError {
    ClipboardError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Exact match first, then case-insensitive with the canonical casing
/// substituted back
fn match_canonical<'a>(options: &'a [ColumnOption], raw: &str) -> Option<&'a str> {
    if let Some(option) = options.iter().find(|o| o.value == raw) {
        return Some(&option.value);
    }
    options
        .iter()
        .find(|o| o.value.eq_ignore_ascii_case(raw))
        .map(|o| o.value.as_str())
}

/// Assignees match case-sensitively by value, then by display label
fn match_assignee<'a>(options: &'a [ColumnOption], raw: &str) -> Option<&'a str> {
    if let Some(option) = options.iter().find(|o| o.value == raw) {
        return Some(&option.value);
    }
    options
        .iter()
        .find(|o| o.label.as_deref() == Some(raw))
        .map(|o| o.value.as_str())
}
