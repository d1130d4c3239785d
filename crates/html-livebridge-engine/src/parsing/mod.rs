//! Best-effort HTML tag matching over raw text.
//!
//! Nothing here builds a DOM. Tags are found line by line, elements are
//! re-located by occurrence count and their extent is found by depth
//! counting, which keeps every operation local and tolerant of malformed
//! markup.

pub mod boundary;
pub mod cursor;
pub mod lines;
pub mod locate;
pub mod scanner;

pub use boundary::resolve_boundary;
pub use lines::{offset_to_position, position_to_offset, slice_range, split_lines};
pub use locate::{locate, locate_element, locate_in_line};
pub use scanner::{SKIPPED_TAGS, ScannedTag, TagKind, scan_line};

use crate::models::{ElementBoundary, ElementRef};

/// Locates `element` in `text` and resolves its full boundary.
///
/// `None` means the element could not be found; the source has drifted from
/// the view that produced `element`.
pub fn find_element(text: &str, element: &ElementRef) -> Option<ElementBoundary> {
    let (line_index, column) = locate_element(text, element)?;
    let lines = split_lines(text);
    Some(resolve_boundary(
        &lines,
        line_index,
        column,
        &element.tag_name,
    ))
}
