//! JSON records returned by `wp/v2`, and their decoding into [`RemoteItem`]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::types::{RemoteId, RemoteItem};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default, deserialize_with = "lenient")]
    pub rendered: String,
}

/// A post or page as the REST API returns it.
///
/// Everything is optional here; [`RemoteItem::try_from`] decides what is
/// required. A field of the wrong type (`null` lists, numeric templates)
/// decodes as absent instead of dropping the record, since a dropped record
/// takes its slug out of the remote set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireItem {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RemoteId>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Vec<RemoteId>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Vec<RemoteId>,
    #[serde(default, deserialize_with = "lenient")]
    pub featured_media: Option<RemoteId>,
    #[serde(default, deserialize_with = "lenient")]
    pub parent: Option<RemoteId>,
    #[serde(default, deserialize_with = "lenient")]
    pub template: Option<String>,
}

/// Decode a field, falling back to its default when the value has the wrong
/// shape
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl WireItem {
    /// Decode a single JSON value
    pub fn from_value(value: Value) -> Result<RemoteItem> {
        let wire: WireItem = serde_json::from_value(value)?;
        RemoteItem::try_from(wire)
    }
}

impl TryFrom<WireItem> for RemoteItem {
    type Error = SyncError;

    fn try_from(wire: WireItem) -> Result<Self> {
        let id = wire
            .id
            .ok_or_else(|| SyncError::Decode("missing id".to_string()))?;
        let slug = wire
            .slug
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::Decode(format!("item {} has no slug", id)))?;

        Ok(RemoteItem {
            id,
            slug,
            title: wire.title.rendered,
            html_content: wire.content.rendered,
            // Validated when the frontmatter is built
            published_at: wire.date.unwrap_or_default(),
            category_ids: wire.categories,
            tag_ids: wire.tags,
            // WordPress uses 0 / "" for "not set"
            featured_media_id: wire.featured_media.filter(|&m| m != 0),
            parent_id: wire.parent.filter(|&p| p != 0),
            template_name: wire.template.filter(|t| !t.is_empty()),
        })
    }
}

/// Decode a page of items, skipping (and logging) records that cannot be keyed
pub fn decode_items(values: Vec<Value>) -> Vec<RemoteItem> {
    values
        .into_iter()
        .filter_map(|value| match WireItem::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping undecodable item: {}", e);
                None
            }
        })
        .collect()
}
