use crate::models::{TextPosition, TextRange};

/// Splits text into lines on `\n`. A trailing newline yields a final empty line,
/// and a `\r` before the newline stays part of its line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Converts a line/column position into a byte offset.
///
/// Returns `None` when the line does not exist, the column is past the end
/// of the line, or the column splits a UTF-8 character.
pub fn position_to_offset(text: &str, pos: TextPosition) -> Option<usize> {
    let mut offset = 0;
    for (index, line) in text.split('\n').enumerate() {
        if index == pos.line {
            if pos.column > line.len() || !line.is_char_boundary(pos.column) {
                return None;
            }
            return Some(offset + pos.column);
        }
        offset += line.len() + 1;
    }
    None
}

/// Converts a byte offset into a line/column position, clamping to the end.
pub fn offset_to_position(text: &str, offset: usize) -> TextPosition {
    let offset = offset.min(text.len());
    let before = &text[..floor_char_boundary(text, offset)];
    let line = before.matches('\n').count();
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1);
    TextPosition::new(line, column)
}

/// Returns the text covered by `range`, if both ends are valid.
pub fn slice_range(text: &str, range: TextRange) -> Option<&str> {
    let start = position_to_offset(text, range.start)?;
    let end = position_to_offset(text, range.end)?;
    text.get(start..end)
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
