//! Local storage for wpsync
//!
//! Everything this process owns lives on disk: Markdown documents under the
//! content directories and the JSON sync-state file.

mod content;
mod state;

pub use content::{render_document, ContentStore};
pub use state::StateTracker;
