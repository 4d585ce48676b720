pub mod codec;
pub mod subtasks;
pub mod system;
pub mod validate;

pub use codec::{
    CellRef, ParsedClipboardRow, build_paste_updates, copy_cells, is_single_value,
    parse_clipboard_text, process_field_value,
};
pub use subtasks::{
    SubtaskRecord, SubtaskTsvError, is_subtasks_tsv, parse_subtasks, sanitize_name,
    serialize_subtasks,
};
pub use system::{MemoryClipboard, OsClipboard, SystemClipboard};
pub use validate::{ClipboardError, validate_paste};
