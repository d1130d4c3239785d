/// A key as the controller sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Delete,
    Backspace,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// The pressed character, lowercased, if the key is a character.
    pub fn char_lower(&self) -> Option<char> {
        match self.key {
            Key::Char(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Refresh,
    Undo,
    Redo,
    Devtools,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    CloseCssPanel,
}

/// Input from the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewEvent<N> {
    /// Primary activation (click).
    Activate(N),
    /// Secondary activation (double click).
    ActivateSecondary(N),
    PointerOver(N),
    PointerOut,
    Blur(N),
    DragStart(N),
    DragOver(N),
    DragLeave(N),
    /// Drop onto `target` at vertical position `y`.
    Drop { target: N, y: f64 },
    DragEnd,
    Key(KeyInput),
    Toolbar(ToolbarAction),
    /// A value edited in the CSS inspector for the selected element.
    InspectorChange { property: String, value: String },
}
