//! Rewriting one declaration of an opening tag's `style` attribute.

use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::scanner::is_tag_name_byte;

fn style_attribute_regex() -> &'static Regex {
    static STYLE_REGEX: OnceLock<Regex> = OnceLock::new();
    STYLE_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\sstyle\s*=\s*(["'])"#).expect("Invalid style attribute regex")
    })
}

/// Returns `tag` (the raw text of one opening tag) with `property` set to
/// `value` in its inline style.
///
/// An existing `style` attribute keeps its quote character and its other
/// declarations; any declaration of `property` (case-insensitive) is dropped
/// and the new one appended. Without a `style` attribute one is inserted
/// right after the tag name.
pub fn set_style_property(tag: &str, property: &str, value: &str) -> String {
    let existing = style_attribute_regex().captures(tag).and_then(|caps| {
        let open = caps.get(0)?.end();
        let quote = caps.get(1)?.as_str();
        let close = open + tag[open..].find(quote)?;
        Some((open, close, quote))
    });

    match existing {
        Some((open, close, quote)) => {
            let kept: Vec<&str> = tag[open..close]
                .split(';')
                .map(str::trim)
                .filter(|decl| !decl.is_empty() && !declares(decl, property))
                .collect();
            let declaration = format!("{property}: {}", escape_for_quote(value, quote));
            let style = if kept.is_empty() {
                declaration
            } else {
                format!("{}; {declaration}", kept.join("; "))
            };
            format!("{}{style}{}", &tag[..open], &tag[close..])
        }
        None => {
            let name_end = 1 + tag
                .bytes()
                .skip(1)
                .take_while(|&b| is_tag_name_byte(b))
                .count();
            format!(
                r#"{} style="{property}: {};"{}"#,
                &tag[..name_end],
                escape_for_quote(value, "\""),
                &tag[name_end..]
            )
        }
    }
}

fn declares(declaration: &str, property: &str) -> bool {
    declaration
        .split_once(':')
        .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case(property.trim()))
}

fn escape_for_quote(value: &str, quote: &str) -> String {
    value.replace(quote, if quote == "\"" { "&quot;" } else { "&#39;" })
}
