//! Messages exchanged between the host and the rendering surface.
//!
//! Both directions are JSON objects tagged by `type`, with kebab-case type
//! names and camelCase fields. Line numbers on the wire are 1-based; columns
//! are 0-based byte offsets.

use html_livebridge_config::PreviewConfig;
use serde::{Deserialize, Serialize};

use crate::editing::EditRequest;
use crate::models::{ElementRef, TextPosition, TextRange};

/// Host → rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ToPreview {
    UpdateContent { html: String, base_uri: String },
    Zoom { level: u16 },
    SelectElement { line: usize, column: usize },
    ConfigUpdate { config: PreviewConfig },
}

/// Rendering surface → host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum FromPreview {
    Ready,
    ElementSelected {
        start_line: usize,
        end_line: usize,
        start_column: usize,
        end_column: usize,
    },
    DeleteElement {
        line_number: usize,
        tag_name: String,
        element_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outer_html: Option<String>,
    },
    TextContentChange {
        line_number: usize,
        tag_name: String,
        element_index: usize,
        original_text: String,
        new_text: String,
    },
    CssPropertyChange {
        start_line: usize,
        end_line: usize,
        property: String,
        value: String,
    },
    MoveElement {
        source: ElementRef,
        target: ElementRef,
        insert_before: bool,
    },
    ApplyEdit {
        start_line: usize,
        end_line: usize,
        start_column: usize,
        end_column: usize,
        new_content: String,
    },
    TriggerUndo,
    TriggerRedo,
    RequestRefresh,
    OpenDevtools,
    Error { message: String },
}

impl ToPreview {
    /// One-line JSON encoding of the message.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl FromPreview {
    /// Parses one JSON-encoded message.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// The source edit this message asks for, if it is an edit message.
    ///
    /// An `apply-edit` with a line number of 0 is not a valid request and
    /// maps to `None`.
    pub fn edit_request(&self) -> Option<EditRequest> {
        match self {
            FromPreview::DeleteElement {
                line_number,
                tag_name,
                element_index,
                ..
            } => Some(EditRequest::Delete {
                element: ElementRef::new(*line_number, tag_name.as_str(), *element_index),
            }),
            FromPreview::TextContentChange {
                line_number,
                tag_name,
                element_index,
                new_text,
                ..
            } => Some(EditRequest::Retype {
                element: ElementRef::new(*line_number, tag_name.as_str(), *element_index),
                new_text: new_text.clone(),
            }),
            FromPreview::CssPropertyChange {
                start_line,
                property,
                value,
                ..
            } => Some(EditRequest::Restyle {
                line_number: *start_line,
                property: property.clone(),
                value: value.clone(),
            }),
            FromPreview::MoveElement {
                source,
                target,
                insert_before,
            } => Some(EditRequest::Move {
                source: source.clone(),
                target: target.clone(),
                insert_before: *insert_before,
            }),
            FromPreview::ApplyEdit {
                start_line,
                end_line,
                start_column,
                end_column,
                new_content,
            } => Some(EditRequest::Replace {
                range: TextRange::new(
                    TextPosition::new(start_line.checked_sub(1)?, *start_column),
                    TextPosition::new(end_line.checked_sub(1)?, *end_column),
                ),
                new_text: new_content.clone(),
            }),
            _ => None,
        }
    }
}
