use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::preview::{HeadlessSurface, InteractionController, NodeId, RenderSurface};
use crate::models::TrackingId;
use crate::protocol::ToPreview;
use html_livebridge_config::PreviewConfig;

/// A small page with nesting, same-line siblings and a void element.
pub const SAMPLE_PAGE: &str = "<main class=\"page\">\n  <h1>Title</h1>\n  <p>One <b>bold</b> word</p>\n  <ul>\n    <li>a</li><li>b</li>\n  </ul>\n  <img src=\"x.png\">\n</main>";

/// Create a temporary site directory
pub fn create_test_site_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test HTML file with content
pub fn create_test_file(site_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = site_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// A controller over a headless surface with `text` already rendered.
pub fn rendered(text: &str) -> InteractionController<HeadlessSurface> {
    let mut controller =
        InteractionController::new(HeadlessSurface::new(), PreviewConfig::default());
    controller.handle_host_message(ToPreview::UpdateContent {
        html: text.to_string(),
        base_uri: "file:///site".to_string(),
    });
    controller
}

/// Rendered node for the `index`-th tracked element.
pub fn tracked(controller: &InteractionController<HeadlessSurface>, index: usize) -> NodeId {
    controller
        .surface()
        .find_by_tracking_id(TrackingId::new(index))
        .unwrap()
}
