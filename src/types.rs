//! Core types for wpsync

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote identifier of a post, page or category
pub type RemoteId = i64;

/// Kind of content synced from WordPress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Page,
}

impl ContentType {
    /// REST collection name (`/posts`, `/pages`)
    pub fn endpoint(&self) -> &'static str {
        match self {
            ContentType::Post => "posts",
            ContentType::Page => "pages",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Page => "page",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post or page fetched from the CMS. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Remote-assigned identifier
    pub id: RemoteId,
    /// URL-safe identifier, used as the local filename stem
    pub slug: String,
    /// Rendered title
    pub title: String,
    /// Rendered HTML body (may be empty)
    pub html_content: String,
    /// Publication date exactly as the API returned it
    pub published_at: String,
    pub category_ids: Vec<RemoteId>,
    /// Posts only
    pub tag_ids: Vec<RemoteId>,
    pub featured_media_id: Option<RemoteId>,
    /// Pages only
    pub parent_id: Option<RemoteId>,
    /// Pages only
    pub template_name: Option<String>,
}

impl RemoteItem {
    /// Minimal item with the required fields set; everything else empty.
    pub fn new(id: RemoteId, slug: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: String::new(),
            html_content: String::new(),
            published_at: published_at.into(),
            category_ids: Vec::new(),
            tag_ids: Vec::new(),
            featured_media_id: None,
            parent_id: None,
            template_name: None,
        }
    }
}

/// A single frontmatter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    String(String),
    Bool(bool),
    Integer(i64),
    /// Rendered as a YAML block list
    List(Vec<i64>),
}

impl From<&str> for FrontmatterValue {
    fn from(s: &str) -> Self {
        FrontmatterValue::String(s.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(s: String) -> Self {
        FrontmatterValue::String(s)
    }
}

impl From<bool> for FrontmatterValue {
    fn from(b: bool) -> Self {
        FrontmatterValue::Bool(b)
    }
}

impl From<i64> for FrontmatterValue {
    fn from(n: i64) -> Self {
        FrontmatterValue::Integer(n)
    }
}

impl From<Vec<i64>> for FrontmatterValue {
    fn from(v: Vec<i64>) -> Self {
        FrontmatterValue::List(v)
    }
}

/// Ordered frontmatter mapping.
///
/// Insertion order is preserved so that rendering is deterministic.
/// Optional keys are simply never inserted; there is no null value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FrontmatterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A rendered local document: frontmatter block plus Markdown body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Counts reported by a full or incremental sync cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub posts: usize,
    pub pages: usize,
    pub deleted_posts: usize,
    pub deleted_pages: usize,
}

/// Stage of the sync state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Classifying,
    Writing,
    Reconciling,
    Persisting,
}
