//! Rendering-side interaction state machine.
//!
//! The controller turns pointer, keyboard and toolbar events on a
//! [`RenderSurface`] into visual state and outgoing [`FromPreview`]
//! messages, and applies [`ToPreview`] messages from the host.

use html_livebridge_config::PreviewConfig;

use super::input::{Key, KeyInput, PreviewEvent, ToolbarAction};
use super::inspector::{InspectorCategory, element_label, inspect};
use super::surface::RenderSurface;
use crate::annotate::{
    ATTR_ID, ATTR_INDEX, ATTR_LINE, SourceMap, StateClass, annotate_into, document_shell,
    strip_tracking_markup,
};
use crate::models::{ElementRef, SourceProvenance, TrackingId, Zoom};
use crate::protocol::{FromPreview, ToPreview};

const CONTENT_EDITABLE: &str = "contenteditable";
const DRAGGABLE: &str = "draggable";

/// Where the controller is in its interaction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Hovering,
    Selected,
    EditingText,
    Dragging,
}

#[derive(Debug)]
struct TextEdit<N> {
    node: N,
    original_text: String,
    provenance: SourceProvenance,
}

#[derive(Debug)]
struct Drag<N> {
    node: N,
    provenance: SourceProvenance,
}

#[derive(Debug)]
struct Clipboard<N> {
    copy: N,
    /// The element to remove once the copy is pasted.
    cut_from: Option<N>,
}

pub struct InteractionController<S: RenderSurface> {
    surface: S,
    source_map: SourceMap,
    config: PreviewConfig,
    zoom: Zoom,
    css_panel_open: bool,
    selected: Option<S::Node>,
    hovered: Option<S::Node>,
    editing: Option<TextEdit<S::Node>>,
    dragging: Option<Drag<S::Node>>,
    drop_targets: Vec<S::Node>,
    clipboard: Option<Clipboard<S::Node>>,
}

impl<S: RenderSurface> InteractionController<S> {
    pub fn new(surface: S, config: PreviewConfig) -> Self {
        let config = config.validated();
        Self {
            surface,
            source_map: SourceMap::new(),
            zoom: Zoom::new(config.default_zoom),
            css_panel_open: config.show_css_panel,
            config,
            selected: None,
            hovered: None,
            editing: None,
            dragging: None,
            drop_targets: Vec::new(),
            clipboard: None,
        }
    }

    /// The message announcing the surface is ready for content.
    pub fn ready(&self) -> FromPreview {
        FromPreview::Ready
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Provenance of the elements currently rendered.
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn selected(&self) -> Option<S::Node> {
        self.selected
    }

    pub fn hovered(&self) -> Option<S::Node> {
        self.hovered
    }

    pub fn mode(&self) -> Mode {
        if self.editing.is_some() {
            Mode::EditingText
        } else if self.dragging.is_some() {
            Mode::Dragging
        } else if self.selected.is_some() {
            Mode::Selected
        } else if self.hovered.is_some() {
            Mode::Hovering
        } else {
            Mode::Idle
        }
    }

    /// Applies one message from the host.
    pub fn handle_host_message(&mut self, message: ToPreview) -> Vec<FromPreview> {
        match message {
            ToPreview::UpdateContent { html, base_uri } => {
                self.load(&html, &base_uri);
                Vec::new()
            }
            ToPreview::Zoom { level } => {
                self.set_zoom(Zoom::new(level));
                Vec::new()
            }
            ToPreview::SelectElement { line, .. } => self.select_line(line),
            ToPreview::ConfigUpdate { config } => {
                self.config = config.validated();
                self.css_panel_open = self.config.show_css_panel;
                Vec::new()
            }
        }
    }

    /// Applies one user event.
    pub fn handle_event(&mut self, event: PreviewEvent<S::Node>) -> Vec<FromPreview> {
        match event {
            PreviewEvent::Activate(node) => {
                if self.editing.is_some() || !self.is_trackable(node) {
                    return Vec::new();
                }
                self.select(node).into_iter().collect()
            }
            PreviewEvent::ActivateSecondary(node) => self.start_editing(node),
            PreviewEvent::PointerOver(node) => {
                self.hover(node);
                Vec::new()
            }
            PreviewEvent::PointerOut => {
                self.clear_hover();
                Vec::new()
            }
            PreviewEvent::Blur(node) => {
                if self.editing.as_ref().is_some_and(|edit| edit.node == node) {
                    self.commit_editing().into_iter().collect()
                } else {
                    Vec::new()
                }
            }
            PreviewEvent::DragStart(node) => {
                self.start_drag(node);
                Vec::new()
            }
            PreviewEvent::DragOver(node) => {
                self.drag_over(node);
                Vec::new()
            }
            PreviewEvent::DragLeave(node) => {
                self.surface
                    .remove_class(node, StateClass::DropTarget.as_str());
                self.drop_targets.retain(|&n| n != node);
                Vec::new()
            }
            PreviewEvent::Drop { target, y } => self.drop_on(target, y).into_iter().collect(),
            PreviewEvent::DragEnd => {
                self.end_drag();
                Vec::new()
            }
            PreviewEvent::Key(input) => self.key(input),
            PreviewEvent::Toolbar(action) => self.toolbar(action),
            PreviewEvent::InspectorChange { property, value } => {
                self.change_style(&property, &value).into_iter().collect()
            }
        }
    }

    /// The CSS inspector for the selected element, when the panel is shown.
    pub fn inspector(&self) -> Option<Vec<InspectorCategory>> {
        let node = self.selected.filter(|_| self.css_panel_open)?;
        Some(inspect(|property| self.surface.computed_style(node, property)))
    }

    /// `tag#id.classes` of the selected element.
    pub fn element_label(&self) -> Option<String> {
        let node = self.selected?;
        Some(element_label(
            &self.surface.tag_name(node),
            self.surface.attribute(node, "id").as_deref(),
            &self.surface.classes(node),
        ))
    }

    fn load(&mut self, html: &str, base_uri: &str) {
        self.selected = None;
        self.hovered = None;
        self.editing = None;
        self.dragging = None;
        self.drop_targets.clear();
        self.clipboard = None;

        let processed = annotate_into(html, &mut self.source_map);
        self.surface.load_document(&document_shell(&processed, base_uri));
        self.surface.set_zoom(self.zoom);
        for (id, _) in self.source_map.iter() {
            if let Some(node) = self.surface.find_by_tracking_id(id) {
                self.surface.set_attribute(node, DRAGGABLE, "true");
            }
        }
    }

    fn is_trackable(&self, node: S::Node) -> bool {
        self.surface.attribute(node, ATTR_ID).is_some()
    }

    /// Source map entry for `node`, or a reconstruction from its tracking
    /// attributes when the map has none.
    fn provenance(&self, node: S::Node) -> SourceProvenance {
        let mapped = self
            .surface
            .attribute(node, ATTR_ID)
            .and_then(|id| id.parse::<TrackingId>().ok())
            .and_then(|id| self.source_map.get(id));
        if let Some(provenance) = mapped {
            return provenance.clone();
        }

        let number = |name: &str, default: usize| {
            self.surface
                .attribute(node, name)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        SourceProvenance::new(ElementRef::new(
            number(ATTR_LINE, 1),
            self.surface.tag_name(node),
            number(ATTR_INDEX, 0),
        ))
    }

    fn select(&mut self, node: S::Node) -> Option<FromPreview> {
        if let Some(previous) = self.selected {
            self.surface
                .remove_class(previous, StateClass::Selected.as_str());
        }
        self.selected = Some(node);
        self.surface.add_class(node, StateClass::Selected.as_str());
        self.surface.remove_class(node, StateClass::Hover.as_str());
        if self.hovered == Some(node) {
            self.hovered = None;
        }
        self.css_panel_open = self.config.show_css_panel;

        let line = self.provenance(node).line_number();
        Some(FromPreview::ElementSelected {
            start_line: line,
            end_line: line,
            start_column: 0,
            end_column: 0,
        })
    }

    fn select_line(&mut self, line: usize) -> Vec<FromPreview> {
        if self.editing.is_some() {
            return Vec::new();
        }
        let Some(node) = self
            .source_map
            .find_by_line(line)
            .and_then(|(id, _)| self.surface.find_by_tracking_id(id))
        else {
            return Vec::new();
        };
        let selected = self.select(node);
        self.surface.scroll_into_view(node);
        selected.into_iter().collect()
    }

    fn hover(&mut self, node: S::Node) {
        if self.editing.is_some() || !self.is_trackable(node) {
            return;
        }
        self.clear_hover();
        if self.selected != Some(node) {
            self.surface.add_class(node, StateClass::Hover.as_str());
            self.hovered = Some(node);
        }
    }

    fn clear_hover(&mut self) {
        if let Some(hovered) = self.hovered.take() {
            if self.selected != Some(hovered) {
                self.surface.remove_class(hovered, StateClass::Hover.as_str());
            }
        }
    }

    fn start_editing(&mut self, node: S::Node) -> Vec<FromPreview> {
        if !self.is_trackable(node) {
            return Vec::new();
        }
        let out: Vec<FromPreview> = self.commit_editing().into_iter().collect();
        if let Some(previous) = self.selected.filter(|&n| n != node) {
            self.surface
                .remove_class(previous, StateClass::Selected.as_str());
        }

        self.selected = Some(node);
        self.editing = Some(TextEdit {
            node,
            original_text: self.surface.text_content(node),
            provenance: self.provenance(node),
        });
        self.surface.set_attribute(node, CONTENT_EDITABLE, "true");
        self.surface.remove_class(node, StateClass::Selected.as_str());
        self.surface.remove_class(node, StateClass::Hover.as_str());
        self.surface.add_class(node, StateClass::Editing.as_str());
        self.surface.focus(node);
        self.surface.select_all_contents(node);
        out
    }

    /// Ends text editing, reporting the change if the text differs.
    fn commit_editing(&mut self) -> Option<FromPreview> {
        let edit = self.editing.take()?;
        let new_text = self.surface.text_content(edit.node);
        self.finish_editing(edit.node);

        (new_text != edit.original_text).then(|| FromPreview::TextContentChange {
            line_number: edit.provenance.line_number(),
            tag_name: edit.provenance.tag_name().to_string(),
            element_index: edit.provenance.element_index(),
            original_text: edit.original_text,
            new_text,
        })
    }

    fn cancel_editing(&mut self) {
        if let Some(edit) = self.editing.take() {
            self.surface.set_text_content(edit.node, &edit.original_text);
            self.finish_editing(edit.node);
        }
    }

    fn finish_editing(&mut self, node: S::Node) {
        self.surface.remove_attribute(node, CONTENT_EDITABLE);
        self.surface.remove_class(node, StateClass::Editing.as_str());
        self.surface.add_class(node, StateClass::Selected.as_str());
        self.selected = Some(node);
    }

    fn start_drag(&mut self, node: S::Node) {
        if self.editing.is_some() || !self.is_trackable(node) {
            return;
        }
        self.surface.add_class(node, StateClass::Dragging.as_str());
        self.dragging = Some(Drag {
            node,
            provenance: self.provenance(node),
        });
    }

    fn drag_over(&mut self, node: S::Node) {
        let Some(drag) = &self.dragging else {
            return;
        };
        if !self.surface.contains(drag.node, node)
            && self.is_trackable(node)
            && !self.drop_targets.contains(&node)
        {
            self.surface
                .add_class(node, StateClass::DropTarget.as_str());
            self.drop_targets.push(node);
        }
    }

    fn drop_on(&mut self, target: S::Node, y: f64) -> Option<FromPreview> {
        self.surface
            .remove_class(target, StateClass::DropTarget.as_str());
        let message = self.dragging.as_ref().and_then(|drag| {
            if self.surface.contains(drag.node, target) || !self.is_trackable(target) {
                return None;
            }
            let insert_before = y < self.surface.bounding_box(target).mid_y();
            Some((drag.node, drag.provenance.clone(), insert_before))
        });
        let message = message.map(|(node, source, insert_before)| {
            if insert_before {
                self.surface.insert_before(node, target);
            } else {
                self.surface.insert_after(node, target);
            }
            log::debug!(
                "moved line {} {} {} line {}",
                source.line_number(),
                if insert_before { "before" } else { "after" },
                self.surface.tag_name(target),
                self.provenance(target).line_number()
            );
            FromPreview::MoveElement {
                source: source.element,
                target: self.provenance(target).element,
                insert_before,
            }
        });
        self.end_drag();
        message
    }

    fn end_drag(&mut self) {
        if let Some(drag) = self.dragging.take() {
            self.surface
                .remove_class(drag.node, StateClass::Dragging.as_str());
        }
        for node in self.drop_targets.drain(..) {
            self.surface
                .remove_class(node, StateClass::DropTarget.as_str());
        }
    }

    fn key(&mut self, input: KeyInput) -> Vec<FromPreview> {
        if self.editing.is_some() {
            match input.key {
                Key::Escape => self.cancel_editing(),
                Key::Enter if !input.shift => return self.commit_editing().into_iter().collect(),
                _ => {}
            }
            return Vec::new();
        }

        if input.command() {
            return match input.char_lower() {
                Some('z') if !input.shift => vec![FromPreview::TriggerUndo],
                Some('z' | 'y') => vec![FromPreview::TriggerRedo],
                Some('=' | '+') => {
                    self.set_zoom(self.zoom.zoomed_in());
                    Vec::new()
                }
                Some('-') => {
                    self.set_zoom(self.zoom.zoomed_out());
                    Vec::new()
                }
                Some('0') => {
                    self.set_zoom(Zoom::new(self.config.default_zoom));
                    Vec::new()
                }
                Some('c') => {
                    self.copy(false);
                    Vec::new()
                }
                Some('x') => {
                    self.copy(true);
                    Vec::new()
                }
                Some('v') => {
                    self.paste();
                    Vec::new()
                }
                _ => Vec::new(),
            };
        }

        match input.key {
            Key::Delete | Key::Backspace => self.delete_selected().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn toolbar(&mut self, action: ToolbarAction) -> Vec<FromPreview> {
        match action {
            ToolbarAction::Refresh => vec![FromPreview::RequestRefresh],
            ToolbarAction::Undo => vec![FromPreview::TriggerUndo],
            ToolbarAction::Redo => vec![FromPreview::TriggerRedo],
            ToolbarAction::Devtools => vec![FromPreview::OpenDevtools],
            ToolbarAction::ZoomIn => {
                self.set_zoom(self.zoom.zoomed_in());
                Vec::new()
            }
            ToolbarAction::ZoomOut => {
                self.set_zoom(self.zoom.zoomed_out());
                Vec::new()
            }
            ToolbarAction::ZoomReset => {
                self.set_zoom(Zoom::new(self.config.default_zoom));
                Vec::new()
            }
            ToolbarAction::CloseCssPanel => {
                self.css_panel_open = false;
                Vec::new()
            }
        }
    }

    fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
        self.surface.set_zoom(zoom);
    }

    fn delete_selected(&mut self) -> Option<FromPreview> {
        let node = self.selected.take()?;
        let provenance = self.provenance(node);
        let outer_html = strip_tracking_markup(&self.surface.outer_html(node));
        self.surface.remove(node);
        if self.hovered == Some(node) {
            self.hovered = None;
        }

        Some(FromPreview::DeleteElement {
            line_number: provenance.line_number(),
            tag_name: provenance.tag_name().to_string(),
            element_index: provenance.element_index(),
            outer_html: Some(outer_html),
        })
    }

    fn copy(&mut self, cut: bool) {
        let Some(node) = self.selected else {
            return;
        };
        let copy = self.surface.clone_node(node);
        if cut {
            self.surface.add_class(node, StateClass::Dragging.as_str());
        }
        self.clipboard = Some(Clipboard {
            copy,
            cut_from: cut.then_some(node),
        });
    }

    /// Inserts the clipboard element after the selection. Rendering only;
    /// nothing is sent to the host.
    fn paste(&mut self) {
        let (Some(clipboard), Some(selected)) = (&self.clipboard, self.selected) else {
            return;
        };
        let (copy, cut_from) = (clipboard.copy, clipboard.cut_from);

        let pasted = self.surface.clone_node(copy);
        for class in [StateClass::Selected, StateClass::Hover, StateClass::Dragging] {
            self.surface.remove_class(pasted, class.as_str());
        }
        self.surface.insert_after(pasted, selected);
        self.surface.set_attribute(pasted, DRAGGABLE, "true");

        if let Some(original) = cut_from {
            self.surface.remove(original);
            if self.selected == Some(original) {
                self.selected = None;
            }
            self.clipboard = None;
        }
    }

    fn change_style(&mut self, property: &str, value: &str) -> Option<FromPreview> {
        let node = self.selected?;
        self.surface.set_inline_style(node, property, value);
        let line = self.provenance(node).line_number();
        Some(FromPreview::CssPropertyChange {
            start_line: line,
            end_line: line,
            property: property.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::surface::Rect;
    use crate::preview::{HeadlessSurface, NodeId};
    use crate::tests::{rendered, tracked};
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<h1>Title</h1>\n<p>First</p>\n<p>Second</p>";

    fn has_class(
        controller: &InteractionController<HeadlessSurface>,
        n: NodeId,
        class: StateClass,
    ) -> bool {
        controller
            .surface()
            .classes(n)
            .iter()
            .any(|c| c == class.as_str())
    }

    // ============ Content ============

    #[test]
    fn update_content_annotates_and_marks_draggable() {
        let controller = rendered(PAGE);

        assert_eq!(controller.source_map().len(), 3);
        assert_eq!(controller.surface().outline().len(), 3);
        let p = tracked(&controller, 1);
        assert_eq!(
            controller.surface().attribute(p, DRAGGABLE).as_deref(),
            Some("true")
        );
        assert_eq!(controller.mode(), Mode::Idle);
    }

    // ============ Selection and hover ============

    #[test]
    fn activate_selects_one_element_at_a_time() {
        let mut controller = rendered(PAGE);
        let (h1, p) = (tracked(&controller, 0), tracked(&controller, 1));

        controller.handle_event(PreviewEvent::Activate(h1));
        let messages = controller.handle_event(PreviewEvent::Activate(p));

        assert_eq!(
            messages,
            vec![FromPreview::ElementSelected {
                start_line: 2,
                end_line: 2,
                start_column: 0,
                end_column: 0,
            }]
        );
        assert!(!has_class(&controller, h1, StateClass::Selected));
        assert!(has_class(&controller, p, StateClass::Selected));
        assert_eq!(controller.mode(), Mode::Selected);
    }

    #[test]
    fn hover_skips_selected_element() {
        let mut controller = rendered(PAGE);
        let (h1, p) = (tracked(&controller, 0), tracked(&controller, 1));

        controller.handle_event(PreviewEvent::PointerOver(h1));
        assert_eq!(controller.mode(), Mode::Hovering);
        assert!(has_class(&controller, h1, StateClass::Hover));

        controller.handle_event(PreviewEvent::Activate(p));
        controller.handle_event(PreviewEvent::PointerOver(p));
        assert!(!has_class(&controller, h1, StateClass::Hover));
        assert!(!has_class(&controller, p, StateClass::Hover));

        controller.handle_event(PreviewEvent::PointerOver(h1));
        controller.handle_event(PreviewEvent::PointerOut);
        assert!(!has_class(&controller, h1, StateClass::Hover));
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn host_select_element_selects_by_line_and_scrolls() {
        let mut controller = rendered(PAGE);

        let messages =
            controller.handle_host_message(ToPreview::SelectElement { line: 3, column: 0 });

        let second = tracked(&controller, 2);
        assert_eq!(controller.selected(), Some(second));
        assert_eq!(controller.surface().scrolled_to(), Some(second));
        assert_eq!(messages.len(), 1);

        let none = controller.handle_host_message(ToPreview::SelectElement { line: 9, column: 0 });
        assert!(none.is_empty());
    }

    // ============ Text editing ============

    #[test]
    fn enter_commits_changed_text() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);

        controller.handle_event(PreviewEvent::ActivateSecondary(p));
        assert_eq!(controller.mode(), Mode::EditingText);
        assert!(has_class(&controller, p, StateClass::Editing));
        assert_eq!(controller.surface().focused(), Some(p));
        assert_eq!(controller.surface().text_selection(), Some(p));

        controller.surface_mut().set_text_content(p, "Changed");
        let messages = controller.handle_event(PreviewEvent::Key(KeyInput::plain(Key::Enter)));

        assert_eq!(
            messages,
            vec![FromPreview::TextContentChange {
                line_number: 2,
                tag_name: "p".to_string(),
                element_index: 0,
                original_text: "First".to_string(),
                new_text: "Changed".to_string(),
            }]
        );
        assert_eq!(controller.mode(), Mode::Selected);
        assert!(has_class(&controller, p, StateClass::Selected));
        assert_eq!(controller.surface().attribute(p, CONTENT_EDITABLE), None);
    }

    #[test]
    fn shift_enter_keeps_editing() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);
        controller.handle_event(PreviewEvent::ActivateSecondary(p));

        let messages = controller.handle_event(PreviewEvent::Key(
            KeyInput::plain(Key::Enter).with_shift(),
        ));

        assert!(messages.is_empty());
        assert_eq!(controller.mode(), Mode::EditingText);
    }

    #[test]
    fn blur_without_change_emits_nothing() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);
        controller.handle_event(PreviewEvent::ActivateSecondary(p));

        let messages = controller.handle_event(PreviewEvent::Blur(p));

        assert!(messages.is_empty());
        assert_eq!(controller.mode(), Mode::Selected);
    }

    #[test]
    fn escape_restores_original_text() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);
        controller.handle_event(PreviewEvent::ActivateSecondary(p));
        controller.surface_mut().set_text_content(p, "Oops");

        let messages = controller.handle_event(PreviewEvent::Key(KeyInput::plain(Key::Escape)));
        let after_blur = controller.handle_event(PreviewEvent::Blur(p));

        assert!(messages.is_empty());
        assert!(after_blur.is_empty());
        assert_eq!(controller.surface().text_content(p), "First");
    }

    #[test]
    fn shortcuts_are_suppressed_while_editing() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);
        controller.handle_event(PreviewEvent::ActivateSecondary(p));

        for input in [
            KeyInput::ctrl(Key::Char('z')),
            KeyInput::ctrl(Key::Char('=')),
            KeyInput::plain(Key::Delete),
        ] {
            assert!(controller.handle_event(PreviewEvent::Key(input)).is_empty());
        }
        assert_eq!(controller.zoom().level(), 100);
        assert_eq!(controller.surface().outline().len(), 3);

        // Selection and drag are ignored too
        controller.handle_event(PreviewEvent::Activate(tracked(&controller, 0)));
        controller.handle_event(PreviewEvent::DragStart(p));
        assert_eq!(controller.mode(), Mode::EditingText);
    }

    // ============ Drag and drop ============

    #[test]
    fn drop_in_upper_half_moves_before() {
        let mut controller = rendered(PAGE);
        let (h1, second) = (tracked(&controller, 0), tracked(&controller, 2));

        controller.handle_event(PreviewEvent::DragStart(second));
        assert_eq!(controller.mode(), Mode::Dragging);
        controller.handle_event(PreviewEvent::DragOver(h1));
        assert!(has_class(&controller, h1, StateClass::DropTarget));

        let rect: Rect = controller.surface().bounding_box(h1);
        let messages = controller.handle_event(PreviewEvent::Drop {
            target: h1,
            y: rect.y + 0.1,
        });

        assert_eq!(
            messages,
            vec![FromPreview::MoveElement {
                source: ElementRef::new(3, "p", 0),
                target: ElementRef::new(1, "h1", 0),
                insert_before: true,
            }]
        );
        let order: Vec<String> = controller
            .surface()
            .outline()
            .into_iter()
            .map(|(n, _)| controller.surface().text_content(n))
            .collect();
        assert_eq!(order, vec!["Second", "Title", "First"]);
        assert!(!has_class(&controller, h1, StateClass::DropTarget));
        assert!(!has_class(&controller, second, StateClass::Dragging));
        assert_eq!(controller.mode(), Mode::Idle);
    }

    #[test]
    fn drop_in_lower_half_moves_after() {
        let mut controller = rendered(PAGE);
        let (h1, first) = (tracked(&controller, 0), tracked(&controller, 1));

        controller.handle_event(PreviewEvent::DragStart(h1));
        let rect = controller.surface().bounding_box(first);
        let messages = controller.handle_event(PreviewEvent::Drop {
            target: first,
            y: rect.y + rect.height * 0.9,
        });

        assert!(matches!(
            messages.as_slice(),
            [FromPreview::MoveElement {
                insert_before: false,
                ..
            }]
        ));
    }

    #[test]
    fn drop_on_itself_does_nothing() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);

        controller.handle_event(PreviewEvent::DragStart(p));
        controller.handle_event(PreviewEvent::DragOver(p));
        let messages = controller.handle_event(PreviewEvent::Drop { target: p, y: 0.0 });

        assert!(messages.is_empty());
        assert!(!has_class(&controller, p, StateClass::DropTarget));
        assert_eq!(controller.mode(), Mode::Idle);
    }

    #[test]
    fn drop_into_own_subtree_is_refused() {
        // Given a div with a paragraph inside it, being dragged
        let mut controller = rendered("<main>\n<div>\n  <p>x</p>\n</div>\n</main>");
        let div = tracked(&controller, 1);
        let p = tracked(&controller, 2);
        controller.handle_event(PreviewEvent::DragStart(div));

        // When it is dragged over and dropped on its own child
        controller.handle_event(PreviewEvent::DragOver(p));
        assert!(!has_class(&controller, p, StateClass::DropTarget));
        let messages = controller.handle_event(PreviewEvent::Drop { target: p, y: 0.0 });

        // Then nothing moves and no move is requested
        assert!(messages.is_empty());
        assert_eq!(controller.surface().outline().len(), 3);
        assert_eq!(controller.surface().previous_sibling(p), None);
        assert!(!has_class(&controller, div, StateClass::Dragging));
        assert_eq!(controller.mode(), Mode::Idle);
    }

    // ============ Deletion ============

    #[test]
    fn delete_emits_clean_outer_html_and_removes_node() {
        let mut controller = rendered("<p class=\"lead\">Hi</p>");
        let p = tracked(&controller, 0);
        controller.handle_event(PreviewEvent::Activate(p));

        let messages = controller.handle_event(PreviewEvent::Key(KeyInput::plain(Key::Delete)));

        assert_eq!(
            messages,
            vec![FromPreview::DeleteElement {
                line_number: 1,
                tag_name: "p".to_string(),
                element_index: 0,
                outer_html: Some("<p class=\"lead\">Hi</p>".to_string()),
            }]
        );
        assert!(controller.surface().outline().is_empty());
        assert_eq!(controller.mode(), Mode::Idle);
    }

    #[test]
    fn delete_without_selection_does_nothing() {
        let mut controller = rendered(PAGE);
        let messages =
            controller.handle_event(PreviewEvent::Key(KeyInput::plain(Key::Backspace)));
        assert!(messages.is_empty());
    }

    // ============ Shortcuts and toolbar ============

    #[test]
    fn command_shortcuts_map_to_messages_and_zoom() {
        let mut controller = rendered(PAGE);

        let undo = controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('z'))));
        let redo_y = controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('y'))));
        let redo_z =
            controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('Z')).with_shift()));
        assert_eq!(undo, vec![FromPreview::TriggerUndo]);
        assert_eq!(redo_y, vec![FromPreview::TriggerRedo]);
        assert_eq!(redo_z, vec![FromPreview::TriggerRedo]);

        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('='))));
        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('+'))));
        assert_eq!(controller.zoom().level(), 150);
        assert_eq!(controller.surface().zoom().level(), 150);

        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('-'))));
        assert_eq!(controller.zoom().level(), 125);
        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('0'))));
        assert_eq!(controller.zoom().level(), 100);
    }

    #[test]
    fn toolbar_actions_map_to_messages() {
        let mut controller = rendered(PAGE);

        for (action, expected) in [
            (ToolbarAction::Refresh, FromPreview::RequestRefresh),
            (ToolbarAction::Undo, FromPreview::TriggerUndo),
            (ToolbarAction::Redo, FromPreview::TriggerRedo),
            (ToolbarAction::Devtools, FromPreview::OpenDevtools),
        ] {
            assert_eq!(
                controller.handle_event(PreviewEvent::Toolbar(action)),
                vec![expected]
            );
        }

        assert!(
            controller
                .handle_event(PreviewEvent::Toolbar(ToolbarAction::ZoomOut))
                .is_empty()
        );
        assert_eq!(controller.zoom().level(), 75);
    }

    #[test]
    fn host_zoom_is_clamped() {
        let mut controller = rendered(PAGE);
        controller.handle_host_message(ToPreview::Zoom { level: 1000 });
        assert_eq!(controller.surface().zoom().level(), 400);
    }

    #[test]
    fn cut_and_paste_moves_rendered_element_only() {
        let mut controller = rendered(PAGE);
        let (h1, second) = (tracked(&controller, 0), tracked(&controller, 2));

        controller.handle_event(PreviewEvent::Activate(h1));
        let cut = controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('x'))));
        assert!(has_class(&controller, h1, StateClass::Dragging));

        controller.handle_event(PreviewEvent::Activate(second));
        let paste = controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('v'))));

        assert!(cut.is_empty());
        assert!(paste.is_empty());
        let order: Vec<String> = controller
            .surface()
            .outline()
            .into_iter()
            .map(|(n, _)| controller.surface().text_content(n))
            .collect();
        assert_eq!(order, vec!["First", "Second", "Title"]);
    }

    #[test]
    fn copy_and_paste_duplicates_without_state_classes() {
        let mut controller = rendered(PAGE);
        let p = tracked(&controller, 1);

        controller.handle_event(PreviewEvent::Activate(p));
        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('c'))));
        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('v'))));
        controller.handle_event(PreviewEvent::Key(KeyInput::ctrl(Key::Char('v'))));

        let outline = controller.surface().outline();
        assert_eq!(outline.len(), 5);
        let (pasted, _) = outline[2];
        assert!(controller.surface().classes(pasted).is_empty());
        assert!(has_class(&controller, p, StateClass::Selected));
    }

    // ============ Inspector ============

    #[test]
    fn inspector_change_applies_inline_and_emits_css_change() {
        let mut controller = rendered("<div>\n<p id=\"x\" class=\"note\">A</p>\n</div>");
        let p = tracked(&controller, 1);
        controller.handle_event(PreviewEvent::Activate(p));

        let messages = controller.handle_event(PreviewEvent::InspectorChange {
            property: "color".to_string(),
            value: "rgb(255, 0, 0)".to_string(),
        });

        assert_eq!(
            messages,
            vec![FromPreview::CssPropertyChange {
                start_line: 2,
                end_line: 2,
                property: "color".to_string(),
                value: "rgb(255, 0, 0)".to_string(),
            }]
        );
        assert_eq!(controller.element_label().as_deref(), Some("p#x.note"));

        let inspector = controller.inspector().unwrap();
        let color = inspector[1]
            .properties
            .iter()
            .find(|p| p.name == "color")
            .unwrap();
        assert_eq!(color.hex.as_deref(), Some("#ff0000"));

        controller.handle_event(PreviewEvent::Toolbar(ToolbarAction::CloseCssPanel));
        assert!(controller.inspector().is_none());
    }

    #[test]
    fn inspector_hidden_when_panel_disabled() {
        let mut controller = rendered(PAGE);
        controller.handle_host_message(ToPreview::ConfigUpdate {
            config: PreviewConfig {
                show_css_panel: false,
                ..PreviewConfig::default()
            },
        });
        controller.handle_event(PreviewEvent::Activate(tracked(&controller, 0)));

        assert!(controller.inspector().is_none());
    }

    #[test]
    fn refresh_resets_interaction_state() {
        let mut controller = rendered(PAGE);
        controller.handle_event(PreviewEvent::Activate(tracked(&controller, 0)));

        controller.handle_host_message(ToPreview::UpdateContent {
            html: "<p>Only</p>".to_string(),
            base_uri: "file:///site".to_string(),
        });

        assert_eq!(controller.mode(), Mode::Idle);
        assert_eq!(controller.source_map().len(), 1);
        assert_eq!(controller.source_map().generation(), 2);
    }
}
