use serde::{Deserialize, Serialize};

use crate::models::{TextPosition, TextRange};

/// One text edit against the host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PendingEdit {
    Replace { range: TextRange, text: String },
    Insert { at: TextPosition, text: String },
    Delete { range: TextRange },
}

impl PendingEdit {
    /// The span this edit removes (empty for inserts).
    pub fn range(&self) -> TextRange {
        match self {
            PendingEdit::Replace { range, .. } | PendingEdit::Delete { range } => *range,
            PendingEdit::Insert { at, .. } => TextRange::caret(*at),
        }
    }

    /// The text this edit writes (empty for deletes).
    pub fn text(&self) -> &str {
        match self {
            PendingEdit::Replace { text, .. } | PendingEdit::Insert { text, .. } => text,
            PendingEdit::Delete { .. } => "",
        }
    }
}

/// Edits that must reach the host as one atomic change.
///
/// Edits apply in order; each one's positions refer to the text left by the
/// edits before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditBatch(Vec<PendingEdit>);

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(edit: PendingEdit) -> Self {
        Self(vec![edit])
    }

    pub fn push(&mut self, edit: PendingEdit) {
        self.0.push(edit);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PendingEdit> {
        self.0.iter()
    }

    pub fn edits(&self) -> &[PendingEdit] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a EditBatch {
    type Item = &'a PendingEdit;
    type IntoIter = std::slice::Iter<'a, PendingEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<PendingEdit>> for EditBatch {
    fn from(edits: Vec<PendingEdit>) -> Self {
        Self(edits)
    }
}
