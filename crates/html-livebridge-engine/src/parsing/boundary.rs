//! Element boundary resolution.
//!
//! Given the position of an opening tag, find where the whole element ends:
//!
//! 1. `<tag .../>` ends at its own `/>`.
//! 2. Otherwise count nesting depth from just after the opening tag's `>`,
//!    line by line: every further non-self-closing `<tag` opener adds one,
//!    every `</tag>` removes one, in text order. The closer that brings the
//!    depth to zero ends the element. Openers and closers are the tags
//!    [`scan_line`] finds, so text that only looks like a tag never counts.
//! 3. With no matching closer the element degrades to the rest of its
//!    opening line.

use super::locate::{closes, opens};
use super::scanner::scan_line;
use crate::models::{ElementBoundary, TextPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Open,
    Close,
}

/// Computes the element boundary for the tag starting at
/// `lines[line_index][tag_start..]`.
pub fn resolve_boundary(
    lines: &[&str],
    line_index: usize,
    tag_start: usize,
    tag_name: &str,
) -> ElementBoundary {
    let line = lines.get(line_index).copied().unwrap_or_default();
    let start = TextPosition::new(line_index, tag_start.min(line.len()));
    let fallback = ElementBoundary::new(start, TextPosition::new(line_index, line.len()));

    let open_end = line
        .get(tag_start..)
        .and_then(|rest| rest.find('>'))
        .map(|p| tag_start + p);

    if let Some(gt) = open_end
        && line[..gt].ends_with('/')
    {
        return ElementBoundary::new(start, TextPosition::new(line_index, gt + 1));
    }

    let mut depth = 1usize;
    let (first_line, mut from) = match open_end {
        Some(gt) => (line_index, gt + 1),
        None => (line_index + 1, 0),
    };

    for (index, current) in lines.iter().enumerate().skip(first_line) {
        for (kind, end) in nesting_events(current, from, tag_name) {
            match kind {
                Nesting::Open => depth += 1,
                Nesting::Close => {
                    depth -= 1;
                    if depth == 0 {
                        return ElementBoundary::new(start, TextPosition::new(index, end));
                    }
                }
            }
        }
        from = 0;
    }

    log::debug!(
        "no closing </{tag_name}> for element at {}:{}; using its opening line",
        line_index + 1,
        tag_start
    );
    fallback
}

/// Openers and closers of `tag_name` starting at or after byte `from` of
/// `line`, in text order, each with the offset just past its `>`.
///
/// Self-closing openers are ignored.
fn nesting_events(line: &str, from: usize, tag_name: &str) -> Vec<(Nesting, usize)> {
    scan_line(line)
        .into_iter()
        .filter(|tag| tag.start >= from)
        .filter_map(|tag| {
            if opens(&tag, tag_name) && !tag.self_closing {
                Some((Nesting::Open, tag.end))
            } else if closes(&tag, tag_name) {
                Some((Nesting::Close, tag.end))
            } else {
                None
            }
        })
        .collect()
}
