pub mod annotate;
pub mod editing;
pub mod io;
pub mod models;
pub mod parsing;
pub mod preview;
pub mod protocol;
pub mod session;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use annotate::{Annotated, SourceMap, StateClass, annotate, annotate_into, document_shell};
pub use editing::{
    Document, EditBatch, EditRequest, HostDocument, HostError, Patch, PendingEdit,
    SynthesisError, synthesize,
};
pub use io::*;
pub use models::*;
pub use protocol::{FromPreview, ToPreview};
pub use session::{HostAction, Notice, PreviewSession};
