use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TRACKING_ID_PREFIX: &str = "src-";

/// Identity of one annotated element within a single render generation.
///
/// Assigned sequentially in document order; carries no meaning beyond that.
/// Never compare ids from different generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackingId(usize);

impl TrackingId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TRACKING_ID_PREFIX}{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a tracking id: {0:?}")]
pub struct ParseTrackingIdError(String);

impl FromStr for TrackingId {
    type Err = ParseTrackingIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(TRACKING_ID_PREFIX)
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| ParseTrackingIdError(s.to_string()))
    }
}

/// The `(line, tag, occurrence)` triple that re-identifies an element in
/// source text. This is also the wire shape of `move-element` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRef {
    /// 1-based source line.
    pub line_number: usize,
    /// Lowercase tag name.
    pub tag_name: String,
    /// 0-based count of earlier `<tag_name` openers on the same line.
    pub element_index: usize,
}

impl ElementRef {
    pub fn new(line_number: usize, tag_name: impl Into<String>, element_index: usize) -> Self {
        Self {
            line_number,
            tag_name: tag_name.into(),
            element_index,
        }
    }

    /// 0-based line index, or `None` for the invalid line number 0.
    pub fn line_index(&self) -> Option<usize> {
        self.line_number.checked_sub(1)
    }
}

/// Where a rendered element came from, recorded at annotation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProvenance {
    pub element: ElementRef,
    /// Snapshot of the source the element was taken from, kept for
    /// reconstruction if the element ever has to be restored.
    pub original_text: Option<String>,
}

impl SourceProvenance {
    pub fn new(element: ElementRef) -> Self {
        Self {
            element,
            original_text: None,
        }
    }

    #[must_use]
    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    pub fn line_number(&self) -> usize {
        self.element.line_number
    }

    pub fn tag_name(&self) -> &str {
        &self.element.tag_name
    }

    pub fn element_index(&self) -> usize {
        self.element.element_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_id_display_and_parse() {
        let id = TrackingId::new(42);
        assert_eq!(id.to_string(), "src-42");
        assert_eq!("src-42".parse::<TrackingId>(), Ok(id));
    }

    #[test]
    fn tracking_id_rejects_foreign_values() {
        assert!("42".parse::<TrackingId>().is_err());
        assert!("src-".parse::<TrackingId>().is_err());
        assert!("src-x".parse::<TrackingId>().is_err());
    }

    #[test]
    fn element_ref_line_index() {
        assert_eq!(ElementRef::new(1, "p", 0).line_index(), Some(0));
        assert_eq!(ElementRef::new(0, "p", 0).line_index(), None);
    }

    #[test]
    fn element_ref_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(ElementRef::new(3, "div", 1)).unwrap();
        assert_eq!(json["lineNumber"], 3);
        assert_eq!(json["tagName"], "div");
        assert_eq!(json["elementIndex"], 1);
    }
}
