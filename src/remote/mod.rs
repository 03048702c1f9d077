//! Remote content: the WordPress REST API as seen by the sync engine
//!
//! Every remote call is best effort. Implementations of [`ContentSource`]
//! never return errors; network failures, non-2xx responses and malformed
//! JSON degrade to empty or absent results and are logged.

mod client;
mod wire;

pub use client::WordPressClient;
pub use wire::WireItem;

use crate::types::{ContentType, RemoteId, RemoteItem};

/// Items requested per page
pub const PAGE_SIZE: u32 = 100;

/// Hard cap on pages fetched per listing (at most 1000 items)
pub const MAX_PAGES: u32 = 10;

/// Result of a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub items: Vec<RemoteItem>,
    /// False when pagination stopped on an error or on the page cap, i.e. the
    /// remote may hold items that are not in `items`
    pub complete: bool,
}

/// Source of posts, pages and taxonomy data
pub trait ContentSource: Send + Sync {
    /// List published items of a kind, optionally only those modified after
    /// `since`
    fn fetch_items(&self, kind: ContentType, since: Option<&str>) -> Listing;

    /// Fetch one post by id
    fn fetch_single(&self, id: RemoteId) -> Option<RemoteItem>;

    /// Category ids assigned to a post; empty on any error
    fn fetch_category_ids_for_post(&self, post_id: RemoteId) -> Vec<RemoteId>;

    /// Category name; `None` for id 0 and on any error
    fn fetch_category_name(&self, category_id: RemoteId) -> Option<String>;

    fn fetch_posts(&self, since: Option<&str>) -> Vec<RemoteItem> {
        self.fetch_items(ContentType::Post, since).items
    }

    fn fetch_pages(&self, since: Option<&str>) -> Vec<RemoteItem> {
        self.fetch_items(ContentType::Page, since).items
    }
}

/// Outcome of fetching one page of a listing
#[derive(Debug)]
pub enum PageFetch<T> {
    /// Decoded items, plus the number of records the server returned
    Items { items: Vec<T>, returned: usize },
    Failed,
}

impl<T> PageFetch<T> {
    /// A page where every returned record decoded
    pub fn decoded(items: Vec<T>) -> Self {
        let returned = items.len();
        PageFetch::Items { items, returned }
    }
}

/// Drive page-numbered pagination starting at page 1.
///
/// A page shorter than [`PAGE_SIZE`] is the last one. Stops there, at the
/// first failed page, or after [`MAX_PAGES`] full pages, whichever comes
/// first. Items gathered before a failure are kept. The flag is false when
/// the remote may hold items missing from the result: a failed page, a full
/// final page at the cap, or records that did not decode.
pub fn paginate<T>(mut fetch_page: impl FnMut(u32) -> PageFetch<T>) -> (Vec<T>, bool) {
    let mut items = Vec::new();
    let mut complete = true;

    for page in 1..=MAX_PAGES {
        match fetch_page(page) {
            PageFetch::Items {
                items: batch,
                returned,
            } => {
                if batch.len() < returned {
                    complete = false;
                }
                items.extend(batch);
                if returned < PAGE_SIZE as usize {
                    return (items, complete);
                }
            }
            PageFetch::Failed => return (items, false),
        }
    }

    tracing::warn!(
        "Stopped after {} pages ({} items); listing may be truncated",
        MAX_PAGES,
        items.len()
    );
    (items, false)
}
