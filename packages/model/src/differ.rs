//! # Change recording
//!
//! Every structural edit applied to a [`Document`](crate::Document) is recorded
//! as a [`Change`]. Addresses held by earlier records are transformed by each
//! later edit, so the change list always describes the current tree. A record
//! whose node disappeared is dropped.

use crate::path::{Operation, Path, Position};
use serde::{Deserialize, Serialize};

/// One recorded edit of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    /// A node was inserted; `path` addresses it in the current tree
    Insert { path: Path, name: String },

    /// A node was removed; `position` is where it used to be
    Remove { position: Position, name: String },

    /// An attribute of the element at `path` changed
    #[serde(rename_all = "camelCase")]
    Attribute {
        path: Path,
        key: String,
        old_value: Option<String>,
        new_value: Option<String>,
    },
}

impl Change {
    fn transformed(&self, op: &Operation) -> Option<Change> {
        match self {
            Change::Insert { path, name } => Some(Change::Insert {
                path: path.transformed(op)?,
                name: name.clone(),
            }),
            Change::Remove { position, name } => Some(Change::Remove {
                position: position.transformed(op)?,
                name: name.clone(),
            }),
            Change::Attribute {
                path,
                key,
                old_value,
                new_value,
            } => Some(Change::Attribute {
                path: path.transformed(op)?,
                key: key.clone(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            }),
        }
    }
}

/// Ordered change list of the current batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Differ {
    changes: Vec<Change>,
}

impl Differ {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Transform the recorded addresses by `op`, then append `recorded`
    pub(crate) fn record(&mut self, op: Option<&Operation>, recorded: impl IntoIterator<Item = Change>) {
        if let Some(op) = op {
            self.changes = self
                .changes
                .iter()
                .filter_map(|change| change.transformed(op))
                .collect();
        }
        self.changes.extend(recorded);
    }

    /// Hand over the recorded changes and start a new batch
    pub fn take(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }
}
