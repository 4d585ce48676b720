use regex::Regex;

/// Error type for the subtask TSV codec
#[derive(Debug, thiserror::Error)]
pub enum SubtaskTsvError {
    #[error("expected 6 or 8 tab-separated columns, got {0}")]
    UnexpectedColumnCount(usize),
}

/// One row of the subtask clipboard format.
///
/// The 8-column layout carries the parent task's id and name so a paste can
/// land under a different parent; the legacy 6-column layout omits them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtaskRecord {
    /// Parent task id (8-column layout only)
    pub task_id: Option<String>,
    /// Parent task name (8-column layout only)
    pub task_name: Option<String>,
    pub label: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub assignees: Vec<String>,
    pub done: bool,
}

/// Serialize records to the 8-column headerless layout:
/// `TaskId\tTaskName\tLabel\tName\tStartDate\tEndDate\tAssignees\tStatus`.
/// Status round-trips through the literal strings `Done`/`Todo`.
pub fn serialize_subtasks(records: &[SubtaskRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        let assignees = record.assignees.join(", ");
        lines.push(
            [
                record.task_id.as_deref().unwrap_or(""),
                record.task_name.as_deref().unwrap_or(""),
                record.label.as_str(),
                record.name.as_str(),
                record.start_date.as_str(),
                record.end_date.as_str(),
                assignees.as_str(),
                if record.done { "Done" } else { "Todo" },
            ]
            .join("\t"),
        );
    }
    lines.join("\n")
}

/// Parse subtask TSV text, accepting both layouts. A leading header row is
/// skipped; blank lines are ignored.
pub fn parse_subtasks(text: &str) -> Result<Vec<SubtaskRecord>, SubtaskTsvError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if index == 0 && is_header(&cols) {
            continue;
        }
        let record = match cols.len() {
            8 => SubtaskRecord {
                task_id: Some(cols[0].trim().to_string()),
                task_name: Some(cols[1].trim().to_string()),
                label: cols[2].trim().to_string(),
                name: cols[3].trim().to_string(),
                start_date: cols[4].trim().to_string(),
                end_date: cols[5].trim().to_string(),
                assignees: split_assignees(cols[6]),
                done: cols[7].trim().eq_ignore_ascii_case("done"),
            },
            6 => SubtaskRecord {
                task_id: None,
                task_name: None,
                label: cols[0].trim().to_string(),
                name: cols[1].trim().to_string(),
                start_date: cols[2].trim().to_string(),
                end_date: cols[3].trim().to_string(),
                assignees: split_assignees(cols[4]),
                done: cols[5].trim().eq_ignore_ascii_case("done"),
            },
            other => return Err(SubtaskTsvError::UnexpectedColumnCount(other)),
        };
        records.push(record);
    }
    Ok(records)
}

/// Recognize subtask TSV by shape alone: 6 or 8 columns with the last one
/// being a `Done`/`Todo` status (or the `Status` header)
pub fn is_subtasks_tsv(text: &str) -> bool {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return false;
    };
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 6 && cols.len() != 8 {
        return false;
    }
    let last = cols[cols.len() - 1].trim().to_lowercase();
    matches!(last.as_str(), "done" | "todo" | "status")
}

fn is_header(cols: &[&str]) -> bool {
    cols.last()
        .is_some_and(|c| c.trim().eq_ignore_ascii_case("status"))
}

fn split_assignees(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Identifier pattern subtask names must satisfy
const NAME_PATTERN: &str = r"^[a-zA-Z0-9_]([a-zA-Z0-9_.-]*[a-zA-Z0-9_])?$";

/// Force a name into the identifier pattern: invalid leading/trailing
/// characters are stripped, interior ones become `_`, and a name with
/// nothing left is padded to `_`.
pub fn sanitize_name(raw: &str) -> String {
    let edge_ok = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let inner_ok = |c: char| edge_ok(c) || c == '.' || c == '-';

    let trimmed = raw.trim_matches(|c| !edge_ok(c));
    if trimmed.is_empty() {
        return "_".to_string();
    }
    trimmed
        .chars()
        .map(|c| if inner_ok(c) { c } else { '_' })
        .collect()
}

/// Check a name against the identifier pattern
pub fn is_valid_name(name: &str) -> bool {
    Regex::new(NAME_PATTERN).expect("name pattern").is_match(name)
}
