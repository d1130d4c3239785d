use crate::models::HtmlFile;
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid site directory: {0}")]
    InvalidRoot(String),
}

/// Read an HTML file and return its content
pub fn read_file(relative_path: &RelativePath, root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Read the file behind `file`
pub fn read_html_file(file: &HtmlFile) -> Result<String, IoError> {
    read_file(file.relative_path(), file.root())
}

/// Write content to a file, creating parent directories
pub fn write_file(relative_path: &RelativePath, root: &Path, content: &str) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)?;
    log::debug!("wrote {}", absolute_path.display());
    Ok(())
}

/// Save `content` back to `file`
pub fn write_html_file(file: &HtmlFile, content: &str) -> Result<(), IoError> {
    write_file(file.relative_path(), file.root(), content)
}

pub fn validate_root(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidRoot("Directory does not exist".to_string()));
    }

    Ok(())
}
