//! Content transformation: remote items to local documents
//!
//! - [`html_to_markdown`]: regex-chain HTML converter
//! - [`build_post_frontmatter`] / [`build_page_frontmatter`]: metadata blocks
//! - [`Transformer`]: the seam the sync engine talks to, so the converter can
//!   be swapped without touching orchestration

mod frontmatter;
mod markdown;

pub use frontmatter::{
    build_page_frontmatter, build_post_frontmatter, featured_image_path, parse_remote_date,
    DATE_FORMAT,
};
pub use markdown::html_to_markdown;

use crate::error::Result;
use crate::types::{Document, RemoteItem};

/// Turns remote items into local documents
pub trait Transformer: Send + Sync {
    /// Render a post; `archived` adds the `archived: true` marker
    fn render_post(&self, item: &RemoteItem, archived: bool) -> Result<Document>;

    /// Render a page
    fn render_page(&self, item: &RemoteItem) -> Result<Document>;
}

/// Default transformer: frontmatter builders plus the regex Markdown converter
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTransformer;

impl Transformer for MarkdownTransformer {
    fn render_post(&self, item: &RemoteItem, archived: bool) -> Result<Document> {
        Ok(Document {
            frontmatter: build_post_frontmatter(item, archived)?,
            body: html_to_markdown(&item.html_content),
        })
    }

    fn render_page(&self, item: &RemoteItem) -> Result<Document> {
        Ok(Document {
            frontmatter: build_page_frontmatter(item)?,
            body: html_to_markdown(&item.html_content),
        })
    }
}
