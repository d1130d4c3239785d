use std::collections::VecDeque;

use xi_rope::Rope;
use xi_rope::delta::Builder;

use super::{EditBatch, Patch, PendingEdit};
use crate::models::TextPosition;
use crate::parsing::position_to_offset;

/// Why the host refused an edit batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("position {}:{} does not exist in the document", .0.line, .0.column)]
    InvalidPosition(TextPosition),

    #[error("range {}:{}..{}:{} ends before it starts", .start.line, .start.column, .end.line, .end.column)]
    InvalidRange {
        start: TextPosition,
        end: TextPosition,
    },

    #[error("document is closed")]
    Closed,
}

/// The editing surface that owns the authoritative source text.
pub trait HostDocument {
    /// Current text, fetched fresh for every operation.
    fn text(&self) -> String;

    /// Applies every edit of `batch` in order, or none of them.
    fn apply_batch(&mut self, batch: &EditBatch) -> Result<Patch, HostError>;

    /// Reverts the last applied batch. Returns false when there is nothing
    /// to undo.
    fn undo(&mut self) -> bool;

    /// Re-applies the last undone batch. Returns false when there is
    /// nothing to redo.
    fn redo(&mut self) -> bool;
}

/// Undo steps kept per document; older steps are forgotten first.
pub const MAX_UNDO_STEPS: usize = 500;

/// In-memory host document over an xi-rope buffer.
///
/// Each applied batch is one undo step. Undo history stores whole rope
/// snapshots, which share structure with the live buffer, and holds at most
/// [`MAX_UNDO_STEPS`] of them.
#[derive(Clone)]
pub struct Document {
    buffer: Rope,
    version: u64,
    undo_stack: VecDeque<Rope>,
    redo_stack: VecDeque<Rope>,
    closed: bool,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            version: 0,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            closed: false,
        }
    }

    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Incremented by every applied batch, undo and redo.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Marks the document closed; every later batch is refused.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn restore(&mut self, from_undo: bool) -> bool {
        let (source, sink) = if from_undo {
            (&mut self.undo_stack, &mut self.redo_stack)
        } else {
            (&mut self.redo_stack, &mut self.undo_stack)
        };
        let Some(previous) = source.pop_back() else {
            return false;
        };
        push_step(sink, std::mem::replace(&mut self.buffer, previous));
        self.version += 1;
        true
    }
}

fn push_step(stack: &mut VecDeque<Rope>, snapshot: Rope) {
    if stack.len() == MAX_UNDO_STEPS {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

/// Applies one edit to `rope`, returning the new rope and the byte range the
/// edit wrote.
fn apply_edit(rope: &Rope, edit: &PendingEdit) -> Result<(Rope, std::ops::Range<usize>), HostError> {
    let text = rope.to_string();
    let range = edit.range();
    let start = position_to_offset(&text, range.start)
        .ok_or(HostError::InvalidPosition(range.start))?;
    let end =
        position_to_offset(&text, range.end).ok_or(HostError::InvalidPosition(range.end))?;
    if end < start {
        return Err(HostError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }

    let mut builder = Builder::new(rope.len());
    match edit {
        PendingEdit::Delete { .. } => builder.delete(start..end),
        PendingEdit::Replace { text, .. } | PendingEdit::Insert { text, .. } => {
            builder.replace(start..end, Rope::from(text.as_str()))
        }
    }
    let delta = builder.build();

    let written = start..start + edit.text().len();
    Ok((delta.apply(rope), written))
}

impl HostDocument for Document {
    fn text(&self) -> String {
        self.buffer.to_string()
    }

    fn apply_batch(&mut self, batch: &EditBatch) -> Result<Patch, HostError> {
        if self.closed {
            return Err(HostError::Closed);
        }

        let mut scratch = self.buffer.clone();
        let mut changed = Vec::with_capacity(batch.len());
        for edit in batch {
            let (next, written) = apply_edit(&scratch, edit)?;
            scratch = next;
            changed.push(written);
        }

        push_step(&mut self.undo_stack, std::mem::replace(&mut self.buffer, scratch));
        self.redo_stack.clear();
        self.version += 1;

        Ok(Patch {
            changed,
            version: self.version,
        })
    }

    fn undo(&mut self) -> bool {
        self.restore(true)
    }

    fn redo(&mut self) -> bool {
        self.restore(false)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.buffer.len())
            .field("version", &self.version)
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TextRange;
    use pretty_assertions::assert_eq;

    fn pos(line: usize, column: usize) -> TextPosition {
        TextPosition::new(line, column)
    }

    fn range(start: (usize, usize), end: (usize, usize)) -> TextRange {
        TextRange::new(pos(start.0, start.1), pos(end.0, end.1))
    }

    // ============ Basic document tests ============

    #[test]
    fn test_document_from_bytes_valid_utf8() {
        let text = "<p>Hello</p>\n<p>World</p>";
        let doc = Document::from_bytes(text.as_bytes()).expect("Should create document");

        assert_eq!(doc.to_bytes(), text.as_bytes());
        assert_eq!(doc.version(), 0);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_document_from_bytes_invalid_utf8() {
        let invalid_bytes = vec![0xFF, 0xFE, 0xFD];
        assert!(Document::from_bytes(&invalid_bytes).is_err());
    }

    #[test]
    fn test_document_preserves_line_endings() {
        let text = "<p>a</p>\r\n<p>b</p>\n";
        let doc = Document::new(text);
        assert_eq!(doc.text(), text);
    }

    // ============ Batch application ============

    #[test]
    fn test_batch_edits_apply_sequentially() {
        // Given a two-line document
        let mut doc = Document::new("<p>A</p>\n<p>B</p>");
        let batch = EditBatch::from(vec![
            PendingEdit::Delete {
                range: range((0, 8), (1, 8)),
            },
            // Position valid only after the deletion above
            PendingEdit::Insert {
                at: pos(0, 0),
                text: "<p>B</p>\n".to_string(),
            },
        ]);

        // When the batch is applied
        let patch = doc.apply_batch(&batch).unwrap();

        // Then both edits land, in order
        assert_eq!(doc.text(), "<p>B</p>\n<p>A</p>");
        assert_eq!(patch.version, 1);
        assert_eq!(patch.changed, vec![8..8, 0..9]);
    }

    #[test]
    fn test_replace_with_multibyte_text() {
        let mut doc = Document::new("<p>é</p>");
        let batch = EditBatch::single(PendingEdit::Replace {
            range: range((0, 3), (0, 5)),
            text: "ü🦀".to_string(),
        });

        doc.apply_batch(&batch).unwrap();

        assert_eq!(doc.text(), "<p>ü🦀</p>");
    }

    #[test]
    fn test_failed_batch_is_atomic() {
        let mut doc = Document::new("<p>A</p>");
        let batch = EditBatch::from(vec![
            PendingEdit::Delete {
                range: range((0, 0), (0, 8)),
            },
            PendingEdit::Insert {
                at: pos(0, 3),
                text: "x".to_string(),
            },
        ]);

        let result = doc.apply_batch(&batch);

        assert_eq!(result, Err(HostError::InvalidPosition(pos(0, 3))));
        assert_eq!(doc.text(), "<p>A</p>");
        assert_eq!(doc.version(), 0);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_position_inside_multibyte_char_is_rejected() {
        let mut doc = Document::new("é");
        let batch = EditBatch::single(PendingEdit::Insert {
            at: pos(0, 1),
            text: "x".to_string(),
        });
        assert!(matches!(
            doc.apply_batch(&batch),
            Err(HostError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let mut doc = Document::new("abc");
        let batch = EditBatch::single(PendingEdit::Delete {
            range: range((0, 2), (0, 1)),
        });
        assert!(matches!(
            doc.apply_batch(&batch),
            Err(HostError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_closed_document_refuses_edits() {
        let mut doc = Document::new("<p>A</p>");
        doc.close();

        let batch = EditBatch::single(PendingEdit::Delete {
            range: range((0, 0), (0, 1)),
        });

        assert_eq!(doc.apply_batch(&batch), Err(HostError::Closed));
        assert_eq!(doc.text(), "<p>A</p>");
    }

    // ============ Undo / redo ============

    #[test]
    fn test_undo_redo_whole_batches() {
        let mut doc = Document::new("<p>A</p>\n<p>B</p>");
        let batch = EditBatch::from(vec![
            PendingEdit::Delete {
                range: range((0, 8), (1, 8)),
            },
            PendingEdit::Insert {
                at: pos(0, 0),
                text: "<p>B</p>\n".to_string(),
            },
        ]);
        doc.apply_batch(&batch).unwrap();

        assert!(doc.undo());
        assert_eq!(doc.text(), "<p>A</p>\n<p>B</p>");
        assert!(!doc.undo());

        assert!(doc.redo());
        assert_eq!(doc.text(), "<p>B</p>\n<p>A</p>");
        assert!(!doc.redo());
        assert_eq!(doc.version(), 3);
    }

    #[test]
    fn test_new_batch_clears_redo() {
        let mut doc = Document::new("ab");
        let insert = |text: &str| {
            EditBatch::single(PendingEdit::Insert {
                at: pos(0, 0),
                text: text.to_string(),
            })
        };

        doc.apply_batch(&insert("x")).unwrap();
        doc.undo();
        doc.apply_batch(&insert("y")).unwrap();

        assert!(!doc.can_redo());
        assert_eq!(doc.text(), "yab");
    }

    #[test]
    fn test_undo_history_is_capped() {
        // Given more batches than the history keeps
        let mut doc = Document::new("");
        let steps = MAX_UNDO_STEPS + 5;
        for _ in 0..steps {
            let batch = EditBatch::single(PendingEdit::Insert {
                at: pos(0, 0),
                text: "x".to_string(),
            });
            doc.apply_batch(&batch).unwrap();
        }

        // When undoing as far as possible
        let mut undone = 0;
        while doc.undo() {
            undone += 1;
        }

        // Then only the newest steps were kept
        assert_eq!(undone, MAX_UNDO_STEPS);
        assert_eq!(doc.text(), "x".repeat(steps - MAX_UNDO_STEPS));
        assert_eq!(doc.version() as usize, steps + MAX_UNDO_STEPS);
    }
}
