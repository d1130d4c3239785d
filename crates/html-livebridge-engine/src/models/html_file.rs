use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};

const HTML_EXTENSIONS: [&str; 2] = [".html", ".htm"];

/// An HTML document addressed relative to the directory it is served from.
///
/// The directory doubles as the preview's base URI so relative asset
/// references in the document resolve the way they would in a browser.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlFile {
    root: PathBuf,
    relative_path: RelativePathBuf,
    display_name: String,
}

impl HtmlFile {
    pub fn new(root: impl Into<PathBuf>, relative_path: RelativePathBuf) -> Self {
        let display_name = Self::extract_display_name(&relative_path);
        Self {
            root: root.into(),
            relative_path,
            display_name,
        }
    }

    /// Splits an on-disk path into its parent directory and file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Some(Self::new(root, RelativePathBuf::from(file_name)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn absolute_path(&self) -> PathBuf {
        self.relative_path.to_path(&self.root)
    }

    /// File name without its `.html`/`.htm` extension.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Base URI handed to the rendering surface alongside the markup.
    pub fn base_uri(&self) -> String {
        let root = self.root.to_string_lossy();
        let root = root.trim_end_matches('/');
        format!("file://{root}")
    }

    pub fn is_html_path(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                let lower = name.to_ascii_lowercase();
                HTML_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
            })
    }

    fn extract_display_name(path: &RelativePath) -> String {
        path.file_name()
            .map(|name| {
                HTML_EXTENSIONS
                    .iter()
                    .find_map(|ext| name.strip_suffix(ext))
                    .unwrap_or(name)
            })
            .unwrap_or("Untitled")
            .to_string()
    }
}
