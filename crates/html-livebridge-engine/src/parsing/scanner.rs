//! Line-oriented tag scanner.
//!
//! Finds `<...>` constructs on a single line of HTML without building a tree
//! or checking nesting. Anything that does not look like a complete tag is
//! left as plain text:
//!
//! - `<` not followed by a tag name (`a < b`) is text;
//! - a tag interrupted by another `<` before its `>` is text up to that `<`;
//! - a tag with no `>` on the line ends the scan, since no complete tag can
//!   follow it.

use super::cursor::Cursor;

/// Tags that never receive tracking attributes: void elements, raw-text
/// elements and the doctype declaration.
pub const SKIPPED_TAGS: &[&str] = &[
    "meta", "link", "br", "hr", "img", "input", "area", "base", "col", "embed", "param", "source",
    "track", "wbr", "script", "style", "!doctype",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>` or `<name .../>`
    Opening,
    /// `</name>`
    Closing,
    /// `<!...>`, comments and doctype included
    Declaration,
}

/// One tag found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTag<'a> {
    /// Raw tag text from `<` through `>`.
    pub content: &'a str,
    /// Byte offset of `<`.
    pub start: usize,
    /// Byte offset just past `>`.
    pub end: usize,
    /// Lowercase tag name; declarations keep their `!` prefix.
    pub name: String,
    pub kind: TagKind,
    pub self_closing: bool,
    /// Closing tags, declarations and [`SKIPPED_TAGS`].
    pub skippable: bool,
}

impl ScannedTag<'_> {
    /// True for opening tags that should be annotated and tracked.
    pub fn is_trackable(&self) -> bool {
        self.kind == TagKind::Opening && !self.skippable
    }

    /// Byte offset where injected attributes belong: before `/>` for
    /// self-closing tags, before `>` otherwise.
    pub fn attribute_insert_offset(&self) -> usize {
        if self.self_closing {
            self.end - 2
        } else {
            self.end - 1
        }
    }
}

pub(crate) fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':'
}

/// Scans one line and returns every complete tag on it, in order.
pub fn scan_line(line: &str) -> Vec<ScannedTag<'_>> {
    let mut tags = Vec::new();
    let mut cur = Cursor::new(line);

    while !cur.eof() {
        if cur.peek() != Some(b'<') {
            cur.bump();
            continue;
        }

        let start = cur.i;
        let (kind, name_start) = match cur.peek_at(1) {
            Some(b'/') => (TagKind::Closing, start + 2),
            Some(b'!') => (TagKind::Declaration, start + 2),
            _ => (TagKind::Opening, start + 1),
        };

        let starts_with_letter = line
            .as_bytes()
            .get(name_start)
            .is_some_and(|b| b.is_ascii_alphabetic());
        if kind != TagKind::Declaration && !starts_with_letter {
            cur.bump();
            continue;
        }

        let Some(gt) = cur.find_after(b'>') else {
            break;
        };
        if cur.find_after(b'<').is_some_and(|lt| lt < gt) {
            cur.bump();
            continue;
        }

        let end = gt + 1;
        let name_len = cur.run_len(name_start, is_tag_name_byte);
        let bare_name = line[name_start..name_start + name_len].to_ascii_lowercase();
        let name = match kind {
            TagKind::Declaration => format!("!{bare_name}"),
            _ => bare_name,
        };
        let content = &line[start..end];
        let self_closing = kind == TagKind::Opening && content.ends_with("/>");
        let skippable = kind != TagKind::Opening || SKIPPED_TAGS.contains(&name.as_str());

        tags.push(ScannedTag {
            content,
            start,
            end,
            name,
            kind,
            self_closing,
            skippable,
        });
        cur.seek(end);
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(line: &str) -> Vec<String> {
        scan_line(line).into_iter().map(|t| t.name).collect()
    }

    fn trackable(line: &str) -> Vec<String> {
        scan_line(line)
            .into_iter()
            .filter(|t| t.is_trackable())
            .map(|t| t.name)
            .collect()
    }

    #[test]
    fn scans_open_and_close_tags() {
        let tags = scan_line(r#"<p class="x">Hi</p>"#);

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].content, r#"<p class="x">"#);
        assert_eq!((tags[0].start, tags[0].end), (0, 13));
        assert_eq!(tags[0].kind, TagKind::Opening);
        assert_eq!(tags[1].content, "</p>");
        assert_eq!(tags[1].kind, TagKind::Closing);
        assert!(tags[1].skippable);
    }

    #[test]
    fn tag_names_are_lowercased() {
        assert_eq!(names("<DIV><Span></Span></DIV>"), vec!["div", "span", "span", "div"]);
    }

    #[test]
    fn void_and_raw_text_tags_are_skipped() {
        let line = r#"<meta charset="utf-8"><br><img src="a.png"/><script></script><em>x</em>"#;
        assert_eq!(trackable(line), vec!["em"]);
    }

    #[test]
    fn declarations_are_skipped() {
        let tags = scan_line("<!DOCTYPE html>");

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "!doctype");
        assert_eq!(tags[0].kind, TagKind::Declaration);
        assert!(!tags[0].is_trackable());
    }

    #[test]
    fn self_closing_is_detected() {
        let tags = scan_line("<widget/><x-icon name='a' />");

        assert!(tags[0].self_closing);
        assert_eq!(tags[0].attribute_insert_offset(), 7);
        assert!(tags[1].self_closing);
        assert_eq!(tags[1].name, "x-icon");
    }

    #[test]
    fn unterminated_tag_is_plain_text() {
        let tags = scan_line("<p>text <span class=");

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "p");
    }

    #[test]
    fn less_than_without_name_is_text() {
        assert_eq!(trackable("<p>1 < 2 and 3 <4</p>"), vec!["p"]);
    }

    #[test]
    fn interrupted_tag_resumes_at_next_angle_bracket() {
        assert_eq!(trackable("<a <b>x</b>"), vec!["b"]);
    }

    #[test]
    fn tags_inside_comments_are_still_found() {
        assert_eq!(trackable("<!-- <p>old</p> -->"), vec!["p"]);
    }

    #[test]
    fn empty_line_has_no_tags() {
        assert!(scan_line("").is_empty());
        assert!(scan_line("just text").is_empty());
    }

    #[test]
    fn multibyte_text_between_tags() {
        let tags = scan_line("<p>héllo wörld</p><b>ü</b>");

        assert_eq!(tags.len(), 4);
        assert_eq!(tags[2].content, "<b>");
        assert_eq!(&"<p>héllo wörld</p><b>ü</b>"[tags[2].start..tags[2].end], "<b>");
    }
}
