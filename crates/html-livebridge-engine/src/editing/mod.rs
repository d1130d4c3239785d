/*!
 * # Editing
 *
 * Everything that turns a request from the rendered view into a change of
 * the source text.
 *
 * - **`synthesize`**: `EditRequest` → `EditBatch`, resolved against a fresh
 *   snapshot of the source text
 * - **`style`**: inline `style` attribute rewriting used by restyle requests
 * - **`edit`**: `PendingEdit` and the ordered, atomic `EditBatch`
 * - **`document`**: the `HostDocument` seam and its xi-rope `Document`
 *   implementation with batch-level undo/redo
 * - **`patch`**: what an applied batch changed
 *
 * Synthesis never mutates anything. Batches are applied by the host in
 * order, each edit's positions referring to the text left by the previous
 * edits of the same batch.
 */

pub mod document;
pub mod edit;
pub mod patch;
pub mod style;
pub mod synthesize;

pub use document::{Document, HostDocument, HostError, MAX_UNDO_STEPS};
pub use edit::{EditBatch, PendingEdit};
pub use patch::Patch;
pub use style::set_style_property;
pub use synthesize::{EditRequest, SynthesisError, synthesize};
