use chrono::{DateTime, Utc};

use crate::model::update::{HistoryUpdate, InheritedReset, UpdateBatch};

/// Error type for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One committed edit batch: the ops that revert it and the ops that
/// reapply it. Entries are never mutated after being pushed, and are moved
/// between the two stacks whole, never partially applied.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub undo: Vec<HistoryUpdate>,
    pub redo: Vec<HistoryUpdate>,
    pub timestamp: DateTime<Utc>,
}

/// Bounded undo/redo stacks over [`HistoryEntry`] batches
#[derive(Debug)]
pub struct History {
    past: Vec<HistoryEntry>,
    future: Vec<HistoryEntry>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        History {
            past: Vec::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a committed batch. No-op when `undo` is empty (an entry with
    /// no effective change is never pushed). Any new record invalidates the
    /// redo trail.
    pub fn record(&mut self, undo: Vec<HistoryUpdate>, redo: Vec<HistoryUpdate>) {
        if undo.is_empty() {
            return;
        }
        self.past.push(HistoryEntry {
            undo,
            redo,
            timestamp: Utc::now(),
        });
        if self.past.len() > self.limit {
            self.past.drain(..self.past.len() - self.limit);
        }
        self.future.clear();
    }

    /// Pop the most recent entry and return its undo ops, split into the
    /// literal and inherited-reset buckets for the caller to apply.
    pub fn undo(&mut self) -> Result<UpdateBatch, HistoryError> {
        let entry = self.past.pop().ok_or(HistoryError::NothingToUndo)?;
        let batch = split_updates(&entry.undo);
        self.future.push(entry);
        Ok(batch)
    }

    /// Symmetric to [`History::undo`], replaying the redo ops
    pub fn redo(&mut self) -> Result<UpdateBatch, HistoryError> {
        let entry = self.future.pop().ok_or(HistoryError::NothingToRedo)?;
        let batch = split_updates(&entry.redo);
        self.past.push(entry);
        Ok(batch)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn len(&self) -> usize {
        self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

/// Split a history op list into the two dispatch buckets.
///
/// An update flagged `was_inherited` with a known folder becomes a
/// [`InheritedReset`]: "resume inheriting" is expressed by removing the
/// field from the entity's own-attribute list, not by writing a literal
/// value. Everything else passes through unchanged.
pub fn split_updates(ops: &[HistoryUpdate]) -> UpdateBatch {
    let mut batch = UpdateBatch::default();
    for op in ops {
        if op.was_inherited
            && let Some(folder_id) = &op.folder_id
        {
            batch.inherited.push(InheritedReset {
                entity_id: op.update.entity_id().to_string(),
                entity_type: op.update.entity_type(),
                folder_id: folder_id.clone(),
                attribs: vec![op.update.field_name().to_string()],
                own_attrib: op.own_attrib.clone(),
            });
        } else {
            batch.updates.push(op.update.clone());
        }
    }
    batch
}
