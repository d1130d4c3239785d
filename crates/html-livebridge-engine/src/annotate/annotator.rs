use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{ATTR_ID, ATTR_INDEX, ATTR_LINE, SourceMap, StateClass};
use crate::models::{ElementRef, SourceProvenance};
use crate::parsing::{scan_line, split_lines};

/// Output of one annotation pass.
#[derive(Debug, Clone)]
pub struct Annotated {
    /// Source text with tracking attributes injected into every trackable
    /// opening tag.
    pub html: String,
    pub source_map: SourceMap,
}

/// Annotates `text` into a fresh [`SourceMap`].
pub fn annotate(text: &str) -> Annotated {
    let mut source_map = SourceMap::new();
    let html = annotate_into(text, &mut source_map);
    Annotated { html, source_map }
}

/// Annotates `text`, clearing and repopulating `source_map`.
///
/// Each trackable opening tag gets three attributes (id, 1-based line and
/// same-line occurrence index) inserted just before its `>` or `/>`. Nothing
/// else in the text changes, so removing those attributes gives back `text`
/// exactly.
pub fn annotate_into(text: &str, source_map: &mut SourceMap) -> String {
    source_map.clear();
    let mut out = String::with_capacity(text.len() + text.len() / 2);

    for (line_index, line) in split_lines(text).into_iter().enumerate() {
        if line_index > 0 {
            out.push('\n');
        }
        let line_number = line_index + 1;
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        let mut copied = 0;

        for tag in scan_line(line).into_iter().filter(|t| t.is_trackable()) {
            let seen = occurrences.entry(tag.name.clone()).or_insert(0);
            let element_index = *seen;
            *seen += 1;

            let element = ElementRef::new(line_number, tag.name.as_str(), element_index);
            let id = source_map.push(SourceProvenance::new(element).with_original_text(line));

            let at = tag.attribute_insert_offset();
            out.push_str(&line[copied..at]);
            out.push_str(&format!(
                r#" {ATTR_ID}="{id}" {ATTR_LINE}="{line_number}" {ATTR_INDEX}="{element_index}""#
            ));
            copied = at;
        }
        out.push_str(&line[copied..]);
    }

    log::debug!(
        "annotated {} elements (generation {})",
        source_map.len(),
        source_map.generation()
    );
    out
}

const STATE_STYLES: &str = r#"    .lb-selected {
      outline: 2px solid #007acc !important;
      outline-offset: 1px !important;
      cursor: pointer;
    }
    .lb-hover {
      outline: 1px dashed #007acc !important;
      outline-offset: 1px !important;
      cursor: pointer;
    }
    .lb-dragging {
      opacity: 0.5 !important;
    }
    .lb-drop-target {
      outline: 2px dashed #28a745 !important;
      outline-offset: 2px !important;
    }
    .lb-editing {
      outline: 2px solid #ffc107 !important;
      outline-offset: 1px !important;
      cursor: text !important;
    }
    * {
      cursor: default;
    }"#;

/// Wraps annotated markup in the minimal document handed to the rendering
/// surface: a `<base>` so relative URLs resolve against `base_uri`, and the
/// visual-state classes.
pub fn document_shell(processed: &str, base_uri: &str) -> String {
    let base = html_escape::encode_double_quoted_attribute(base_uri.trim_end_matches('/'));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <base href=\"{base}/\">\n  <style>\n{STATE_STYLES}\n  </style>\n</head>\n<body>\n{processed}\n</body>\n</html>"
    )
}

fn tracking_attribute_regex() -> &'static Regex {
    static TRACKING_REGEX: OnceLock<Regex> = OnceLock::new();
    TRACKING_REGEX.get_or_init(|| {
        Regex::new(&format!(
            r#" (?:{ATTR_ID}|{ATTR_LINE}|{ATTR_INDEX})="[^"]*""#
        ))
        .expect("Invalid tracking attribute regex")
    })
}

/// Removes the injected tracking attributes, undoing [`annotate_into`].
pub fn strip_tracking_attributes(html: &str) -> String {
    tracking_attribute_regex().replace_all(html, "").into_owned()
}

/// Removes every trace the rendering side leaves on markup: tracking
/// attributes, `draggable`, state classes, and any `class` attribute left
/// empty by that.
pub fn strip_tracking_markup(html: &str) -> String {
    static DRAGGABLE_REGEX: OnceLock<Regex> = OnceLock::new();
    static CLASS_REGEX: OnceLock<Regex> = OnceLock::new();

    let draggable = DRAGGABLE_REGEX
        .get_or_init(|| Regex::new(r#" draggable="[^"]*""#).expect("Invalid draggable regex"));
    let class = CLASS_REGEX
        .get_or_init(|| Regex::new(r#" class="([^"]*)""#).expect("Invalid class regex"));

    let stripped = strip_tracking_attributes(html);
    let stripped = draggable.replace_all(&stripped, "");
    class
        .replace_all(&stripped, |caps: &Captures<'_>| {
            let kept: Vec<&str> = caps[1]
                .split_whitespace()
                .filter(|c| !StateClass::is_state_class(c))
                .collect();
            if kept.is_empty() {
                String::new()
            } else {
                format!(r#" class="{}""#, kept.join(" "))
            }
        })
        .into_owned()
}
