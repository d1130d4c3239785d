//! Re-locating elements in current source text by `(line, tag, occurrence)`.
//!
//! Positions recorded at annotation time go stale as soon as the source
//! changes, so elements are found again by counting openers of their tag on
//! their recorded line. Openers are whatever [`scan_line`] reports as an
//! opening tag, the same definition the annotator numbers occurrences with.
//! When the line no longer has enough openers the element is reported as not
//! found and callers abandon their edit.

use regex::Regex;

use super::scanner::{ScannedTag, TagKind, scan_line};
use crate::models::ElementRef;

/// `</tag>` with optional whitespace before `>`, case-insensitive.
pub fn closing_tag_pattern(tag_name: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(tag_name))).ok()
}

/// True when `tag` opens an element named `tag_name` (self-closing included).
pub fn opens(tag: &ScannedTag<'_>, tag_name: &str) -> bool {
    tag.kind == TagKind::Opening && tag.name.eq_ignore_ascii_case(tag_name)
}

/// True when `tag` is `</tag_name>`.
pub fn closes(tag: &ScannedTag<'_>, tag_name: &str) -> bool {
    tag.kind == TagKind::Closing && tag.name.eq_ignore_ascii_case(tag_name)
}

/// Byte offset of the `element_index`-th `<tag_name` opener on `line`.
pub fn locate_in_line(line: &str, tag_name: &str, element_index: usize) -> Option<usize> {
    scan_line(line)
        .into_iter()
        .filter(|tag| opens(tag, tag_name))
        .nth(element_index)
        .map(|tag| tag.start)
}

/// Finds the opening bracket of an element in `text`.
///
/// `line_number` is 1-based. Returns the 0-based line index and the byte
/// column of `<`, or `None` when the line is missing or has fewer than
/// `element_index + 1` matching openers.
pub fn locate(
    text: &str,
    tag_name: &str,
    line_number: usize,
    element_index: usize,
) -> Option<(usize, usize)> {
    let line_index = line_number.checked_sub(1)?;
    let line = text.split('\n').nth(line_index)?;
    let column = locate_in_line(line, tag_name, element_index)?;
    Some((line_index, column))
}

/// [`locate`] driven by an [`ElementRef`].
pub fn locate_element(text: &str, element: &ElementRef) -> Option<(usize, usize)> {
    locate(
        text,
        &element.tag_name,
        element.line_number,
        element.element_index,
    )
}
