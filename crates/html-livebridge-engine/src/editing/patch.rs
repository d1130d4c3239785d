/// Result of applying an edit batch to a [`Document`](super::Document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges written by the batch, each in the coordinates of the text
    /// right after the edit that wrote it.
    pub changed: Vec<std::ops::Range<usize>>,
    pub version: u64,
}
