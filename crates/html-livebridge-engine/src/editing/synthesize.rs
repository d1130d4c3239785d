//! Turning rendered-view edit requests into text edits.
//!
//! Every request is resolved against the current source text, never against
//! positions recorded at annotation time. Elements are re-located by
//! `(line, tag, occurrence)`; when that fails the source has drifted from the
//! rendered view and the request is refused rather than guessed at.

use serde::{Deserialize, Serialize};

use super::edit::{EditBatch, PendingEdit};
use super::style::set_style_property;
use crate::models::{ElementBoundary, ElementRef, TextPosition, TextRange};
use crate::parsing::locate::closing_tag_pattern;
use crate::parsing::{TagKind, locate_in_line, resolve_boundary, scan_line, split_lines};

/// A change requested from the rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditRequest {
    /// Remove an element and all of its markup.
    Delete { element: ElementRef },
    /// Replace the text between an element's opening and closing tags.
    Retype {
        element: ElementRef,
        new_text: String,
    },
    /// Set one inline style property on the nearest opening tag at or above
    /// `line_number`.
    Restyle {
        line_number: usize,
        property: String,
        value: String,
    },
    /// Move `source` next to `target`.
    Move {
        source: ElementRef,
        target: ElementRef,
        insert_before: bool,
    },
    /// Replace a raw range with new text.
    Replace { range: TextRange, new_text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("line {line_number} is outside the document")]
    LineOutOfRange { line_number: usize },

    #[error("<{}> #{} not found on line {}", .0.tag_name, .0.element_index, .0.line_number)]
    ElementNotFound(ElementRef),

    #[error("text of <{}> on line {} does not close on the same line", .0.tag_name, .0.line_number)]
    MultiLineText(ElementRef),

    #[error("no opening tag at or above line {line_number}")]
    NoTagAbove { line_number: usize },

    #[error("cannot move an element next to itself or into its own content")]
    TargetInsideSource,
}

impl SynthesisError {
    /// True when the request refers to source that no longer exists, as
    /// opposed to a shape the synthesizer does not support.
    pub fn is_drift(&self) -> bool {
        matches!(
            self,
            SynthesisError::LineOutOfRange { .. } | SynthesisError::ElementNotFound(_)
        )
    }
}

/// Computes the edits for `request` against `text`.
///
/// The returned batch is meant to be applied atomically, in order.
pub fn synthesize(text: &str, request: &EditRequest) -> Result<EditBatch, SynthesisError> {
    let lines = split_lines(text);
    match request {
        EditRequest::Delete { element } => {
            let boundary = find(&lines, element)?;
            Ok(EditBatch::single(PendingEdit::Delete {
                range: boundary.range(),
            }))
        }
        EditRequest::Retype { element, new_text } => retype(&lines, element, new_text),
        EditRequest::Restyle {
            line_number,
            property,
            value,
        } => restyle(&lines, *line_number, property, value),
        EditRequest::Move {
            source,
            target,
            insert_before,
        } => move_element(&lines, source, target, *insert_before),
        EditRequest::Replace { range, new_text } => Ok(EditBatch::single(PendingEdit::Replace {
            range: *range,
            text: new_text.clone(),
        })),
    }
}

fn line_at<'a>(lines: &[&'a str], line_number: usize) -> Result<(usize, &'a str), SynthesisError> {
    line_number
        .checked_sub(1)
        .and_then(|index| lines.get(index).map(|line| (index, *line)))
        .ok_or(SynthesisError::LineOutOfRange { line_number })
}

fn find(lines: &[&str], element: &ElementRef) -> Result<ElementBoundary, SynthesisError> {
    let (line_index, line) = line_at(lines, element.line_number)?;
    let column = locate_in_line(line, &element.tag_name, element.element_index)
        .ok_or_else(|| SynthesisError::ElementNotFound(element.clone()))?;
    Ok(resolve_boundary(lines, line_index, column, &element.tag_name))
}

fn retype(
    lines: &[&str],
    element: &ElementRef,
    new_text: &str,
) -> Result<EditBatch, SynthesisError> {
    let (line_index, line) = line_at(lines, element.line_number)?;
    let column = locate_in_line(line, &element.tag_name, element.element_index)
        .ok_or_else(|| SynthesisError::ElementNotFound(element.clone()))?;

    let multi_line = || SynthesisError::MultiLineText(element.clone());
    let inner_start = line[column..].find('>').map(|gt| column + gt + 1).ok_or_else(multi_line)?;
    if line[..inner_start].ends_with("/>") {
        return Err(multi_line());
    }
    let inner_end = closing_tag_pattern(&element.tag_name)
        .and_then(|closer| closer.find_at(line, inner_start))
        .map(|m| m.start())
        .ok_or_else(multi_line)?;

    Ok(EditBatch::single(PendingEdit::Replace {
        range: TextRange::new(
            TextPosition::new(line_index, inner_start),
            TextPosition::new(line_index, inner_end),
        ),
        text: html_escape::encode_text(new_text).into_owned(),
    }))
}

fn restyle(
    lines: &[&str],
    line_number: usize,
    property: &str,
    value: &str,
) -> Result<EditBatch, SynthesisError> {
    let (start_index, _) = line_at(lines, line_number)?;

    let (line_index, line, tag) = (0..=start_index)
        .rev()
        .find_map(|index| {
            let line = lines[index];
            scan_line(line)
                .into_iter()
                .find(|tag| tag.kind == TagKind::Opening)
                .map(|tag| (index, line, tag))
        })
        .ok_or(SynthesisError::NoTagAbove { line_number })?;

    let restyled = set_style_property(tag.content, property, value);
    let new_line = format!("{}{restyled}{}", &line[..tag.start], &line[tag.end..]);

    Ok(EditBatch::single(PendingEdit::Replace {
        range: TextRange::new(
            TextPosition::new(line_index, 0),
            TextPosition::new(line_index, line.len()),
        ),
        text: new_line,
    }))
}

/// What a move removes and where it puts it back.
struct MovePlan {
    deletion: TextRange,
    insertion: TextPosition,
    text: String,
}

fn move_element(
    lines: &[&str],
    source: &ElementRef,
    target: &ElementRef,
    insert_before: bool,
) -> Result<EditBatch, SynthesisError> {
    let source_bounds = find(lines, source)?;
    let target_bounds = find(lines, target)?;

    let source_range = source_bounds.range();
    if source_range.start <= target_bounds.start() && target_bounds.start() < source_range.end {
        return Err(SynthesisError::TargetInsideSource);
    }

    let anchor = if insert_before {
        target_bounds.start()
    } else {
        target_bounds.end()
    };

    let plan = plan_whole_lines(lines, source_range, anchor, insert_before)
        .unwrap_or_else(|| MovePlan {
            deletion: source_range,
            insertion: anchor,
            text: text_of(lines, source_range),
        });

    let MovePlan {
        deletion,
        insertion,
        text,
    } = plan;

    if deletion.start < insertion && insertion < deletion.end {
        log::debug!("move of {source:?} leaves the text unchanged");
        return Ok(EditBatch::new());
    }

    let insertion = if deletion.end <= insertion {
        shift_after_deletion(insertion, deletion)
    } else {
        insertion
    };

    Ok(EditBatch::from(vec![
        PendingEdit::Delete { range: deletion },
        PendingEdit::Insert {
            at: insertion,
            text,
        },
    ]))
}

/// Line-granular move: applies when the source is alone on its lines and the
/// anchor sits at the edge of its line, so the line break travels with the
/// element instead of leaving an empty line behind.
fn plan_whole_lines(
    lines: &[&str],
    source: TextRange,
    anchor: TextPosition,
    insert_before: bool,
) -> Option<MovePlan> {
    let first = lines[source.start.line];
    let last = lines[source.end.line];
    let alone = first[..source.start.column].trim().is_empty()
        && last[source.end.column..].trim().is_empty();
    if !alone {
        return None;
    }

    let anchor_line = lines[anchor.line];
    let text = lines[source.start.line..=source.end.line].join("\n");
    let last_index = lines.len() - 1;

    let deletion = if source.end.line < last_index {
        TextRange::new(
            TextPosition::new(source.start.line, 0),
            TextPosition::new(source.end.line + 1, 0),
        )
    } else if source.start.line > 0 {
        let previous = source.start.line - 1;
        TextRange::new(
            TextPosition::new(previous, lines[previous].len()),
            TextPosition::new(source.end.line, last.len()),
        )
    } else {
        return None;
    };

    let (insertion, text) = if insert_before {
        if !anchor_line[..anchor.column].trim().is_empty() {
            return None;
        }
        (TextPosition::new(anchor.line, 0), format!("{text}\n"))
    } else {
        if !anchor_line[anchor.column..].trim().is_empty() {
            return None;
        }
        if anchor.line < last_index {
            (TextPosition::new(anchor.line + 1, 0), format!("{text}\n"))
        } else {
            (
                TextPosition::new(anchor.line, anchor_line.len()),
                format!("\n{text}"),
            )
        }
    };

    Some(MovePlan {
        deletion,
        insertion,
        text,
    })
}

/// Where `at` ends up once `deleted` (which ends at or before `at`) is gone.
///
/// A position on the deletion's last line is rebased onto the deletion's
/// start, whether the deletion spans one line or several.
fn shift_after_deletion(at: TextPosition, deleted: TextRange) -> TextPosition {
    if at.line == deleted.end.line {
        TextPosition::new(
            deleted.start.line,
            deleted.start.column + (at.column - deleted.end.column),
        )
    } else {
        TextPosition::new(at.line - deleted.line_span(), at.column)
    }
}

fn text_of(lines: &[&str], range: TextRange) -> String {
    if range.start.line == range.end.line {
        return lines[range.start.line][range.start.column..range.end.column].to_string();
    }
    let mut text = lines[range.start.line][range.start.column..].to_string();
    for line in &lines[range.start.line + 1..range.end.line] {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    text.push_str(&lines[range.end.line][..range.end.column]);
    text
}
