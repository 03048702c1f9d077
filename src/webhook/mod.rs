//! Webhook dispatch (change notifications from the WordPress sync plugin)
//!
//! The payload decides which sync to run; [`server`] wraps this in an axum
//! router that authenticates requests and serializes syncs.

mod server;

pub use server::{WebhookServer, WebhookState, SECRET_HEADER};

use serde::Deserialize;

use crate::error::Result;
use crate::sync::SyncEngine;
use crate::types::RemoteId;

/// JSON body posted by the CMS on create / update / delete
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    pub action: Option<String>,
    pub post_id: Option<RemoteId>,
    pub post_type: Option<String>,
    pub slug: Option<String>,
}

/// What a webhook asks the engine to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    /// Connectivity check; no sync
    Test,
    /// Re-sync exactly one post
    SyncPost(RemoteId),
    /// Incremental sync (reconciles deletions)
    Incremental,
    /// Incremental sync after a remote deletion
    Deleted,
}

impl WebhookPayload {
    pub fn action(&self) -> WebhookAction {
        match self.action.as_deref() {
            Some("test") => WebhookAction::Test,
            Some("create") | Some("update") => match (self.post_type.as_deref(), self.post_id) {
                (Some("post"), Some(id)) => WebhookAction::SyncPost(id),
                _ => WebhookAction::Incremental,
            },
            Some("delete") => WebhookAction::Deleted,
            _ => WebhookAction::Incremental,
        }
    }
}

/// Run the sync an action asks for and describe the outcome
pub fn dispatch(engine: &mut SyncEngine, action: WebhookAction) -> Result<String> {
    match action {
        WebhookAction::Test => {
            tracing::info!("Test webhook received");
            Ok("Test OK".to_string())
        }
        WebhookAction::SyncPost(id) => {
            let count = engine.sync_single(id);
            tracing::info!("Synced {} post(s)", count);
            Ok(format!("Synced {} post(s)", count))
        }
        WebhookAction::Deleted => {
            let report = engine.sync_incremental()?;
            tracing::info!(
                "Post deleted, incremental sync: {} posts, {} deleted",
                report.posts,
                report.deleted_posts
            );
            Ok(format!("Synced {} posts", report.posts))
        }
        WebhookAction::Incremental => {
            let report = engine.sync_incremental()?;
            tracing::info!(
                "Incremental sync: {} posts, {} pages",
                report.posts,
                report.pages
            );
            Ok(format!(
                "Synced {} posts, {} pages",
                report.posts, report.pages
            ))
        }
    }
}
