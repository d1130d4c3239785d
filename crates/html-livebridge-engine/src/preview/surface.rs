use std::fmt::Debug;

use crate::models::{TrackingId, Zoom};

/// Axis-aligned box of a rendered element, in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// The DOM-like surface that renders annotated markup.
///
/// Nodes are opaque handles; the interaction controller keeps no data on
/// them beyond the handle itself.
pub trait RenderSurface {
    type Node: Copy + Eq + Debug;

    /// Replaces the whole rendered document.
    fn load_document(&mut self, html: &str);

    fn set_zoom(&mut self, zoom: Zoom);

    /// The attached element carrying `id`, if any.
    fn find_by_tracking_id(&self, id: TrackingId) -> Option<Self::Node>;

    /// Lowercase tag name.
    fn tag_name(&self, node: Self::Node) -> String;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    fn classes(&self, node: Self::Node) -> Vec<String>;
    fn add_class(&mut self, node: Self::Node, class: &str);
    fn remove_class(&mut self, node: Self::Node, class: &str);

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, node: Self::Node) -> String;
    /// Replaces all content of the element with `text`.
    fn set_text_content(&mut self, node: Self::Node, text: &str);

    fn focus(&mut self, node: Self::Node);
    /// Selects the element's whole content as the text selection.
    fn select_all_contents(&mut self, node: Self::Node);
    fn scroll_into_view(&mut self, node: Self::Node);

    /// True when `node` is `ancestor` itself or lies in its subtree.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool;

    /// Detaches the element (and its subtree) from the document.
    fn remove(&mut self, node: Self::Node);
    /// Moves `node` to be the previous sibling of `reference`. Does nothing
    /// when `reference` is inside `node`.
    fn insert_before(&mut self, node: Self::Node, reference: Self::Node);
    /// Moves `node` to be the next sibling of `reference`. Does nothing
    /// when `reference` is inside `node`.
    fn insert_after(&mut self, node: Self::Node, reference: Self::Node);
    /// Deep copy, not attached anywhere.
    fn clone_node(&mut self, node: Self::Node) -> Self::Node;

    fn bounding_box(&self, node: Self::Node) -> Rect;
    fn outer_html(&self, node: Self::Node) -> String;

    fn set_inline_style(&mut self, node: Self::Node, property: &str, value: &str);
    fn computed_style(&self, node: Self::Node, property: &str) -> String;
}
