//! A render surface without a renderer.
//!
//! Builds an element tree from the tracked opening tags of annotated markup
//! and lays it out as one row per element. Untracked markup (the document
//! shell, void elements) is not represented. Good enough to drive the
//! interaction controller from a terminal or a test.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::surface::{Rect, RenderSurface};
use crate::annotate::ATTR_ID;
use crate::models::{TrackingId, Zoom};
use crate::parsing::{TagKind, scan_line, split_lines};

/// Handle of one element in a [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    inline_style: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    elements: Vec<Element>,
    roots: Vec<NodeId>,
    zoom: Zoom,
    focused: Option<NodeId>,
    text_selection: Option<NodeId>,
    scrolled_to: Option<NodeId>,
    loads: usize,
}

/// Width of one layout row.
const ROW_WIDTH: f64 = 80.0;

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/=`]+)))?"#)
            .expect("Invalid attribute regex")
    })
}

fn parse_attributes(tag: &str, name_len: usize) -> Vec<(String, String)> {
    let body = tag
        .get(1 + name_len..)
        .unwrap_or_default()
        .trim_end_matches('>')
        .trim_end_matches('/');
    attribute_regex()
        .captures_iter(body)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            (caps[1].to_ascii_lowercase(), value.to_string())
        })
        .collect()
}

fn parse_declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
    })
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached elements in document order, with their depth.
    pub fn outline(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|&n| (n, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            out.push((node, depth));
            stack.extend(
                self.element(node)
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
        }
        out
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.siblings(node)?;
        let index = siblings.iter().position(|&n| n == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.siblings(node)?;
        let index = siblings.iter().position(|&n| n == node)?;
        siblings.get(index + 1).copied()
    }

    pub fn tracking_id(&self, node: NodeId) -> Option<TrackingId> {
        self.attribute(node, ATTR_ID)?.parse().ok()
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn text_selection(&self) -> Option<NodeId> {
        self.text_selection
    }

    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to
    }

    /// Number of documents loaded so far.
    pub fn loads(&self) -> usize {
        self.loads
    }

    fn element(&self, node: NodeId) -> &Element {
        &self.elements[node.0]
    }

    fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.elements[node.0]
    }

    fn siblings(&self, node: NodeId) -> Option<&Vec<NodeId>> {
        match self.element(node).parent {
            Some(parent) => Some(&self.element(parent).children),
            None => self.roots.contains(&node).then_some(&self.roots),
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            match self.element(current).parent {
                Some(parent) => current = parent,
                None => return self.roots.contains(&current),
            }
        }
    }

    fn push(&mut self, element: Element) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    fn detach(&mut self, node: NodeId) {
        match self.element(node).parent {
            Some(parent) => self.element_mut(parent).children.retain(|&n| n != node),
            None => self.roots.retain(|&n| n != node),
        }
        self.element_mut(node).parent = None;
    }

    fn place(&mut self, node: NodeId, reference: NodeId, after: bool) {
        if self.contains(node, reference) {
            log::debug!("refusing to place {node:?} next to its own descendant {reference:?}");
            return;
        }
        self.detach(node);
        let parent = self.element(reference).parent;
        let siblings = match parent {
            Some(parent) => &mut self.elements[parent.0].children,
            None => &mut self.roots,
        };
        let index = siblings
            .iter()
            .position(|&n| n == reference)
            .map_or(siblings.len(), |i| if after { i + 1 } else { i });
        siblings.insert(index, node);
        self.element_mut(node).parent = parent;
    }

    fn deep_copy(&mut self, node: NodeId, parent: Option<NodeId>) -> NodeId {
        let source = self.element(node).clone();
        let copy = self.push(Element {
            parent,
            children: Vec::new(),
            ..source.clone()
        });
        for child in source.children {
            let child_copy = self.deep_copy(child, Some(copy));
            self.element_mut(copy).children.push(child_copy);
        }
        copy
    }
}

impl RenderSurface for HeadlessSurface {
    type Node = NodeId;

    fn load_document(&mut self, html: &str) {
        self.elements.clear();
        self.roots.clear();
        self.focused = None;
        self.text_selection = None;
        self.scrolled_to = None;
        self.loads += 1;

        let mut open: Vec<NodeId> = Vec::new();
        for line in split_lines(html) {
            let tags = scan_line(line);
            for (i, tag) in tags.iter().enumerate() {
                match tag.kind {
                    TagKind::Closing => {
                        if let Some(depth) = open
                            .iter()
                            .rposition(|&n| self.element(n).tag == tag.name)
                        {
                            open.truncate(depth);
                        }
                    }
                    TagKind::Opening if tag.content.contains(ATTR_ID) => {
                        let name_len = tag.content[1..]
                            .bytes()
                            .take_while(|&b| crate::parsing::scanner::is_tag_name_byte(b))
                            .count();
                        let mut attributes = parse_attributes(tag.content, name_len);
                        let classes = attributes
                            .iter()
                            .position(|(name, _)| name == "class")
                            .map(|i| attributes.remove(i).1)
                            .map(|value| value.split_whitespace().map(str::to_string).collect())
                            .unwrap_or_default();
                        let text_end = tags.get(i + 1).map_or(line.len(), |next| next.start);
                        let parent = open.last().copied();
                        let node = self.push(Element {
                            tag: tag.name.clone(),
                            attributes,
                            classes,
                            text: html_escape::decode_html_entities(line[tag.end..text_end].trim())
                                .into_owned(),
                            parent,
                            ..Element::default()
                        });
                        match parent {
                            Some(parent) => self.element_mut(parent).children.push(node),
                            None => self.roots.push(node),
                        }
                        if !tag.self_closing {
                            open.push(node);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    fn find_by_tracking_id(&self, id: TrackingId) -> Option<NodeId> {
        self.outline()
            .into_iter()
            .map(|(node, _)| node)
            .find(|&node| self.tracking_id(node) == Some(id))
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node).tag.clone()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element(node);
        if name == "class" {
            return (!element.classes.is_empty()).then(|| element.classes.join(" "));
        }
        element
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let element = self.element_mut(node);
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
            return;
        }
        match element.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => element
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let element = self.element_mut(node);
        if name == "class" {
            element.classes.clear();
        }
        element.attributes.retain(|(n, _)| n != name);
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        self.element(node).classes.clone()
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let classes = &mut self.element_mut(node).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.element_mut(node).classes.retain(|c| c != class);
    }

    fn text_content(&self, node: NodeId) -> String {
        let element = self.element(node);
        let mut text = element.text.clone();
        for &child in &element.children {
            text.push_str(&self.text_content(child));
        }
        text
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        for child in std::mem::take(&mut self.element_mut(node).children) {
            self.element_mut(child).parent = None;
        }
        self.element_mut(node).text = text.to_string();
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn select_all_contents(&mut self, node: NodeId) {
        self.text_selection = Some(node);
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        self.scrolled_to = Some(node);
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.element(n).parent;
        }
        false
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn insert_before(&mut self, node: NodeId, reference: NodeId) {
        self.place(node, reference, false);
    }

    fn insert_after(&mut self, node: NodeId, reference: NodeId) {
        self.place(node, reference, true);
    }

    fn clone_node(&mut self, node: NodeId) -> NodeId {
        self.deep_copy(node, None)
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        if !self.is_attached(node) {
            return Rect::default();
        }
        let outline = self.outline();
        let Some(row) = outline.iter().position(|&(n, _)| n == node) else {
            return Rect::default();
        };
        let (_, depth) = outline[row];
        let subtree = outline[row + 1..]
            .iter()
            .take_while(|&&(_, d)| d > depth)
            .count();
        let scale = f64::from(self.zoom.scale());
        Rect {
            x: depth as f64 * 2.0 * scale,
            y: row as f64 * scale,
            width: ROW_WIDTH * scale,
            height: (subtree + 1) as f64 * scale,
        }
    }

    fn outer_html(&self, node: NodeId) -> String {
        let element = self.element(node);
        let mut html = format!("<{}", element.tag);
        let mut attributes = element.attributes.clone();
        if !element.classes.is_empty() {
            attributes.insert(0, ("class".to_string(), element.classes.join(" ")));
        }
        for (name, value) in &attributes {
            html.push_str(&format!(
                " {name}=\"{}\"",
                html_escape::encode_double_quoted_attribute(value)
            ));
        }
        html.push('>');
        html.push_str(&html_escape::encode_text(&element.text));
        for &child in &element.children {
            html.push_str(&self.outer_html(child));
        }
        html.push_str(&format!("</{}>", element.tag));
        html
    }

    fn set_inline_style(&mut self, node: NodeId, property: &str, value: &str) {
        let style = &mut self.element_mut(node).inline_style;
        style.retain(|(name, _)| !name.eq_ignore_ascii_case(property));
        style.push((property.to_ascii_lowercase(), value.to_string()));
    }

    fn computed_style(&self, node: NodeId, property: &str) -> String {
        let element = self.element(node);
        let property = property.to_ascii_lowercase();
        let declared: HashMap<String, String> = self
            .attribute(node, "style")
            .map(|style| parse_declarations(&style).collect())
            .unwrap_or_default();
        element
            .inline_style
            .iter()
            .rev()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.clone())
            .or_else(|| declared.get(&property).cloned())
            .unwrap_or_default()
    }
}
