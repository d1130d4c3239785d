//! CSS inspector model and element labels.

use std::sync::OnceLock;

use regex::Regex;

use crate::annotate::StateClass;

/// Computed properties shown for the selected element, by category.
pub const CSS_CATEGORIES: [(&str, &[&str]); 5] = [
    (
        "Layout",
        &["display", "position", "width", "height", "margin", "padding"],
    ),
    (
        "Typography",
        &[
            "font-family",
            "font-size",
            "font-weight",
            "line-height",
            "text-align",
            "color",
        ],
    ),
    ("Background", &["background-color", "background-image"]),
    ("Border", &["border", "border-radius"]),
    (
        "Spacing",
        &["gap", "flex-direction", "justify-content", "align-items"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorProperty {
    pub name: &'static str,
    pub value: String,
    /// `#rrggbb` form of the value, for colour properties.
    pub hex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorCategory {
    pub name: &'static str,
    pub properties: Vec<InspectorProperty>,
}

/// Builds the inspector from a computed-style lookup.
pub fn inspect(computed: impl Fn(&str) -> String) -> Vec<InspectorCategory> {
    CSS_CATEGORIES
        .iter()
        .map(|&(name, properties)| InspectorCategory {
            name,
            properties: properties
                .iter()
                .map(|&property| {
                    let value = computed(property);
                    let hex = property.contains("color").then(|| rgb_to_hex(&value));
                    InspectorProperty {
                        name: property,
                        value,
                        hex,
                    }
                })
                .collect(),
        })
        .collect()
}

/// Converts `rgb(r, g, b)` / `rgba(r, g, b, a)` to `#rrggbb`.
///
/// Values already in `#` form pass through; anything else becomes black.
pub fn rgb_to_hex(value: &str) -> String {
    static RGB_REGEX: OnceLock<Regex> = OnceLock::new();

    if value.starts_with('#') {
        return value.to_string();
    }
    let rgb = RGB_REGEX.get_or_init(|| {
        Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)").expect("Invalid rgb regex")
    });
    rgb.captures(value)
        .and_then(|caps| {
            let channel = |i: usize| caps[i].parse::<u8>().ok();
            Some(format!(
                "#{:02x}{:02x}{:02x}",
                channel(1)?,
                channel(2)?,
                channel(3)?
            ))
        })
        .unwrap_or_else(|| "#000000".to_string())
}

/// `tag#id.class1.class2`, leaving out state classes.
pub fn element_label(tag: &str, id: Option<&str>, classes: &[String]) -> String {
    let mut label = tag.to_ascii_lowercase();
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        label.push('#');
        label.push_str(id);
    }
    for class in classes.iter().filter(|c| !StateClass::is_state_class(c)) {
        label.push('.');
        label.push_str(class);
    }
    label
}
