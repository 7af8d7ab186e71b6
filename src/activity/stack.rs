//! Transaction nesting and undo/redo history.
//!
//! - `start` pushes an open transaction; transactions nest
//! - `commit` folds a nested transaction into its parent; at the top level a
//!   non-empty unit joins the undo history and clears the redo history
//! - `rollback` hands the records back to the module to revert, without
//!   touching history
//! - Undo moves a unit to the redo history and back again on redo
//! - History is bounded: the oldest unit is dropped past `max_levels`

use crate::design::ElementId;
use crate::error::{DesignError, Result};

use super::listener::{ActivityEvent, ActivityKind};
use super::record::{changes, Record};

/// A labelled group of records undone and redone together.
#[derive(Debug, Clone)]
pub(crate) struct ActivityUnit {
    pub(crate) label: String,
    pub(crate) records: Vec<Record>,
}

impl ActivityUnit {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            records: Vec::new(),
        }
    }

    pub(crate) fn event(&self, kind: ActivityKind) -> ActivityEvent {
        ActivityEvent {
            kind,
            label: self.label.clone(),
            changes: changes(&self.records, kind == ActivityKind::Undo),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ActivityStack {
    /// Open transactions, innermost last.
    open: Vec<ActivityUnit>,
    undo: Vec<ActivityUnit>,
    redo: Vec<ActivityUnit>,
    /// Maximum number of undo units (0 = unlimited).
    max_levels: usize,
}

impl ActivityStack {
    pub(crate) fn new(max_levels: usize) -> Self {
        Self {
            open: Vec::new(),
            undo: Vec::new(),
            redo: Vec::new(),
            max_levels,
        }
    }

    pub(crate) fn start(&mut self, label: &str) {
        self.open.push(ActivityUnit::new(label));
    }

    /// Append a record to the innermost open transaction.
    pub(crate) fn record(&mut self, record: Record) -> Result<()> {
        let current = self.open.last_mut().ok_or(DesignError::NoOpenTransaction)?;
        current.records.push(record);
        Ok(())
    }

    /// Close the innermost transaction. Returns the unit when it was the
    /// outermost one, so the caller can notify listeners.
    pub(crate) fn commit(&mut self) -> Result<Option<ActivityUnit>> {
        let unit = self.open.pop().ok_or(DesignError::NoOpenTransaction)?;
        if let Some(parent) = self.open.last_mut() {
            parent.records.extend(unit.records);
            return Ok(None);
        }
        if !unit.records.is_empty() {
            self.redo.clear();
            self.push_undo(unit.clone());
        }
        Ok(Some(unit))
    }

    /// Close the innermost transaction, returning the records to revert.
    pub(crate) fn take_rollback(&mut self) -> Result<ActivityUnit> {
        self.open.pop().ok_or(DesignError::NoOpenTransaction)
    }

    pub(crate) fn pop_undo(&mut self) -> Option<ActivityUnit> {
        self.undo.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<ActivityUnit> {
        self.redo.pop()
    }

    pub(crate) fn push_undo(&mut self, unit: ActivityUnit) {
        self.undo.push(unit);
        if self.max_levels > 0 && self.undo.len() > self.max_levels {
            self.undo.remove(0);
        }
    }

    pub(crate) fn push_redo(&mut self, unit: ActivityUnit) {
        self.redo.push(unit);
    }

    /// Number of open transactions.
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub(crate) fn undo_label(&self) -> Option<&str> {
        self.undo.last().map(|u| u.label.as_str())
    }

    pub(crate) fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(|u| u.label.as_str())
    }

    pub(crate) fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub(crate) fn clear_history(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Drop every history unit that touches `ids`, together with the units
    /// that could only be replayed after it. Returns how many were dropped.
    pub(crate) fn forget(&mut self, ids: &[ElementId]) -> usize {
        let mut dropped = 0;
        for history in [&mut self.undo, &mut self.redo] {
            // The next unit to replay is last, so everything at or below the
            // newest touching unit depends on it.
            if let Some(last) = history
                .iter()
                .rposition(|u| u.records.iter().any(|r| r.touches(ids)))
            {
                history.drain(..=last);
                dropped += last + 1;
            }
        }
        dropped
    }
}
