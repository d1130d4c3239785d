//! Injecting tracking attributes into HTML and recording where each tracked
//! element came from.

mod annotator;
mod source_map;

pub use annotator::{
    Annotated, annotate, annotate_into, document_shell, strip_tracking_attributes,
    strip_tracking_markup,
};
pub use source_map::SourceMap;

/// Attribute holding an element's [`TrackingId`](crate::models::TrackingId).
pub const ATTR_ID: &str = "data-src-id";
/// Attribute holding an element's 1-based source line.
pub const ATTR_LINE: &str = "data-src-line";
/// Attribute holding an element's same-line occurrence index.
pub const ATTR_INDEX: &str = "data-src-index";

/// Visual-state classes toggled on rendered elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateClass {
    Selected,
    Hover,
    Dragging,
    DropTarget,
    Editing,
}

impl StateClass {
    pub const ALL: [StateClass; 5] = [
        StateClass::Selected,
        StateClass::Hover,
        StateClass::Dragging,
        StateClass::DropTarget,
        StateClass::Editing,
    ];

    /// Shared prefix of every state class name.
    pub const PREFIX: &'static str = "lb-";

    pub fn as_str(self) -> &'static str {
        match self {
            StateClass::Selected => "lb-selected",
            StateClass::Hover => "lb-hover",
            StateClass::Dragging => "lb-dragging",
            StateClass::DropTarget => "lb-drop-target",
            StateClass::Editing => "lb-editing",
        }
    }

    pub fn is_state_class(class: &str) -> bool {
        class.starts_with(Self::PREFIX)
    }
}
