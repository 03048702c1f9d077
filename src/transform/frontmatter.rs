//! Frontmatter construction from remote items

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Result, SyncError};
use crate::types::{Frontmatter, RemoteItem};

/// Output format of the `date` key
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Public path of a post's featured image, as produced by the image pipeline
pub fn featured_image_path(slug: &str) -> String {
    format!("/images/featured/{}.jpg", slug)
}

/// Parse a WordPress date into UTC.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00+02:00`) and the naive local form
/// WordPress uses for `date` (`2024-01-15T10:30:00`), which is taken as UTC.
pub fn parse_remote_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SyncError::InvalidTimestamp(raw.to_string()))
}

fn base_frontmatter(item: &RemoteItem) -> Result<Frontmatter> {
    let date = parse_remote_date(&item.published_at)?;

    let mut fm = Frontmatter::new();
    fm.insert("title", item.title.as_str());
    fm.insert("date", date.format(DATE_FORMAT).to_string());
    fm.insert("draft", false);
    fm.insert("slug", item.slug.as_str());
    Ok(fm)
}

/// Build the frontmatter of a post.
///
/// `categories`, `tags` and `featured_image` are only present when set, and
/// `archived` is only present (as `true`) for archived posts.
pub fn build_post_frontmatter(item: &RemoteItem, archived: bool) -> Result<Frontmatter> {
    let mut fm = base_frontmatter(item)?;

    if !item.category_ids.is_empty() {
        fm.insert("categories", item.category_ids.clone());
    }
    if !item.tag_ids.is_empty() {
        fm.insert("tags", item.tag_ids.clone());
    }
    if item.featured_media_id.is_some() {
        fm.insert("featured_image", featured_image_path(&item.slug));
    }
    if archived {
        fm.insert("archived", true);
    }

    Ok(fm)
}

/// Build the frontmatter of a page. `parent` and `type` only when set.
pub fn build_page_frontmatter(item: &RemoteItem) -> Result<Frontmatter> {
    let mut fm = base_frontmatter(item)?;

    if let Some(parent) = item.parent_id {
        fm.insert("parent", parent);
    }
    if let Some(template) = &item.template_name {
        fm.insert("type", template.as_str());
    }

    Ok(fm)
}
