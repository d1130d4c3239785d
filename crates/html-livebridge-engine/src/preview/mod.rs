/*!
Rendering side of the bridge.

The [`InteractionController`] owns the interaction state (selection, hover,
inline text editing, drag and drop, clipboard, inspector) and talks to the
rendered document only through the [`RenderSurface`] trait. A
[`HeadlessSurface`] implements that trait without any renderer, for the
terminal front end and for tests.
*/

pub mod controller;
pub mod headless;
pub mod input;
pub mod inspector;
pub mod surface;

pub use controller::{InteractionController, Mode};
pub use headless::{HeadlessSurface, NodeId};
pub use input::{Key, KeyInput, PreviewEvent, ToolbarAction};
pub use inspector::{
    CSS_CATEGORIES, InspectorCategory, InspectorProperty, element_label, inspect, rgb_to_hex,
};
pub use surface::{Rect, RenderSurface};
