//! Host-side preview session.
//!
//! A [`PreviewSession`] owns the host document and everything the host keeps
//! about one open preview: configuration, zoom, the debounced refresh timer
//! and the selection echo guard. It is a plain state machine: callers feed it
//! messages and clock readings and carry out the [`HostAction`]s it returns.

mod debounce;
mod echo_guard;

pub use debounce::Debouncer;
pub use echo_guard::{ECHO_WINDOW, EchoGuard};

use std::fmt;
use std::time::{Duration, Instant};

use html_livebridge_config::PreviewConfig;

use crate::editing::{EditRequest, HostDocument, synthesize};
use crate::models::{TextPosition, Zoom};
use crate::protocol::{FromPreview, ToPreview};

/// Delay between an undo/redo and the refresh showing its result.
pub const UNDO_REFRESH_DELAY: Duration = Duration::from_millis(100);

/// Something the host has to do in response to a preview message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Send a message to the rendering surface.
    Post(ToPreview),
    /// Select and reveal a range in the host editor.
    RevealSelection {
        start: TextPosition,
        end: TextPosition,
    },
    /// The document text changed; persist it if the host saves on edit.
    DocumentChanged,
    OpenDevtools,
    /// Show a non-fatal message to the user.
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The rendering surface reported an error.
    PreviewError(String),
    /// The host refused an edit batch.
    EditRejected(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PreviewError(message) => write!(f, "Preview error: {message}"),
            Notice::EditRejected(message) => write!(f, "Edit could not be applied: {message}"),
        }
    }
}

pub struct PreviewSession<D: HostDocument> {
    document: D,
    base_uri: String,
    config: PreviewConfig,
    zoom: Zoom,
    refresh: Debouncer,
    echo: EchoGuard,
}

impl<D: HostDocument> PreviewSession<D> {
    pub fn new(document: D, base_uri: impl Into<String>, config: PreviewConfig) -> Self {
        let config = config.validated();
        let zoom = Zoom::new(config.default_zoom);
        log::info!("preview session opened at {}% zoom", zoom.level());
        Self {
            document,
            base_uri: base_uri.into(),
            config,
            zoom,
            refresh: Debouncer::new(),
            echo: EchoGuard::new(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// When the pending refresh is due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.refresh.deadline()
    }

    /// Dispatches one message from the rendering surface.
    pub fn handle_message(&mut self, message: FromPreview, now: Instant) -> Vec<HostAction> {
        if let Some(request) = message.edit_request() {
            return self.apply_request(&request, now);
        }

        match message {
            FromPreview::Ready | FromPreview::RequestRefresh => {
                vec![HostAction::Post(self.refresh())]
            }
            FromPreview::ElementSelected {
                start_line,
                end_line,
                start_column,
                end_column,
            } => {
                let (Some(start_line), Some(end_line)) =
                    (start_line.checked_sub(1), end_line.checked_sub(1))
                else {
                    return Vec::new();
                };
                self.echo.arm(now);
                vec![HostAction::RevealSelection {
                    start: TextPosition::new(start_line, start_column),
                    end: TextPosition::new(end_line, end_column),
                }]
            }
            FromPreview::TriggerUndo => self.history(now, true),
            FromPreview::TriggerRedo => self.history(now, false),
            FromPreview::OpenDevtools => vec![HostAction::OpenDevtools],
            FromPreview::Error { message } => {
                log::warn!("preview reported: {message}");
                vec![HostAction::Notify(Notice::PreviewError(message))]
            }
            _ => Vec::new(),
        }
    }

    /// Synthesizes `request` against the current text and applies it as one
    /// batch.
    ///
    /// A request that no longer matches the source is dropped without
    /// touching the document; a batch the host refuses becomes a notice.
    pub fn apply_request(&mut self, request: &EditRequest, now: Instant) -> Vec<HostAction> {
        let text = self.document.text();
        let batch = match synthesize(&text, request) {
            Ok(batch) => batch,
            Err(err) if err.is_drift() => {
                log::debug!("source drifted, dropping {request:?}: {err}");
                return Vec::new();
            }
            Err(err) => {
                log::debug!("cannot synthesize {request:?}: {err}");
                return Vec::new();
            }
        };
        if batch.is_empty() {
            return Vec::new();
        }

        match self.document.apply_batch(&batch) {
            Ok(patch) => {
                log::info!(
                    "applied {} edit(s), document version {}",
                    batch.len(),
                    patch.version
                );
                self.on_document_change(now);
                vec![HostAction::DocumentChanged]
            }
            Err(err) => {
                log::warn!("host rejected edit batch: {err}");
                vec![HostAction::Notify(Notice::EditRejected(err.to_string()))]
            }
        }
    }

    fn history(&mut self, now: Instant, undo: bool) -> Vec<HostAction> {
        let changed = if undo {
            self.document.undo()
        } else {
            self.document.redo()
        };
        if !changed {
            return Vec::new();
        }
        self.refresh.schedule(now, UNDO_REFRESH_DELAY);
        vec![HostAction::DocumentChanged]
    }

    /// Restarts the debounced refresh, if auto refresh is on.
    pub fn on_document_change(&mut self, now: Instant) {
        if self.config.auto_refresh {
            self.refresh
                .schedule(now, Duration::from_millis(self.config.refresh_delay));
        }
    }

    /// Returns the refresh message once the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ToPreview> {
        self.refresh.poll(now).then(|| self.content_message())
    }

    /// Mirrors a host cursor move into the preview.
    ///
    /// `line` is 0-based. Nothing is sent while the echo guard is armed,
    /// when the preview panel is not active, or with scroll sync off.
    pub fn on_host_selection_change(
        &mut self,
        line: usize,
        column: usize,
        panel_active: bool,
        now: Instant,
    ) -> Option<ToPreview> {
        if self.echo.is_suppressed(now) || !panel_active || !self.config.sync_scroll {
            return None;
        }
        Some(ToPreview::SelectElement {
            line: line + 1,
            column,
        })
    }

    /// Fresh content for the preview; cancels any pending refresh.
    pub fn refresh(&mut self) -> ToPreview {
        self.refresh.cancel();
        self.content_message()
    }

    fn content_message(&self) -> ToPreview {
        log::info!("refreshing preview");
        ToPreview::UpdateContent {
            html: self.document.text(),
            base_uri: self.base_uri.clone(),
        }
    }

    pub fn zoom_in(&mut self) -> ToPreview {
        self.set_zoom(self.zoom.zoomed_in())
    }

    pub fn zoom_out(&mut self) -> ToPreview {
        self.set_zoom(self.zoom.zoomed_out())
    }

    pub fn reset_zoom(&mut self) -> ToPreview {
        self.set_zoom(Zoom::new(self.config.default_zoom))
    }

    fn set_zoom(&mut self, zoom: Zoom) -> ToPreview {
        self.zoom = zoom;
        ToPreview::Zoom {
            level: zoom.level(),
        }
    }

    /// Replaces the configuration and returns the update for the preview.
    pub fn set_config(&mut self, config: PreviewConfig) -> ToPreview {
        self.config = config.validated();
        if !self.config.auto_refresh {
            self.refresh.cancel();
        }
        ToPreview::ConfigUpdate {
            config: self.config.clone(),
        }
    }
}
