use serde::{Deserialize, Serialize};

/// A 0-based `(line, column)` position in source text.
///
/// Columns are byte offsets into the line (lines are split on `\n`).
/// Ordering is document order: line first, then column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A `[start, end)` span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    pub const fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `at`.
    pub const fn caret(at: TextPosition) -> Self {
        Self { start: at, end: at }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Number of line breaks the range spans.
    #[must_use]
    pub fn line_span(self) -> usize {
        self.end.line.saturating_sub(self.start.line)
    }
}

/// The full markup span of one element, opening tag through matching close
/// (or self-close). The end position is just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementBoundary {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl ElementBoundary {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
        }
    }

    pub fn start(&self) -> TextPosition {
        TextPosition::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> TextPosition {
        TextPosition::new(self.end_line, self.end_column)
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start(), self.end())
    }

    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }
}
