pub mod html_file;
pub mod position;
pub mod provenance;
pub mod zoom;

pub use html_file::HtmlFile;
pub use position::{ElementBoundary, TextPosition, TextRange};
pub use provenance::{ElementRef, ParseTrackingIdError, SourceProvenance, TrackingId};
pub use zoom::{ZOOM_STEP, Zoom};
