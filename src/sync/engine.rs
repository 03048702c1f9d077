//! The sync orchestrator
//!
//! One cycle walks `Fetching -> Classifying -> Writing -> Reconciling ->
//! Persisting` and returns to `Idle`. Every mutating operation takes
//! `&mut self`, so one engine never runs two cycles at once; callers sharing
//! an engine across threads wrap it in a mutex.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::remote::{ContentSource, WordPressClient};
use crate::storage::{ContentStore, StateTracker};
use crate::transform::{MarkdownTransformer, Transformer, DATE_FORMAT};
use crate::types::{ContentType, RemoteId, RemoteItem, SyncPhase, SyncReport};

/// Category name (case-insensitive) that marks a post as archived
pub const ARCHIVED_CATEGORY: &str = "archived";

/// Incremental sync engine with injected collaborators
pub struct SyncEngine {
    source: Arc<dyn ContentSource>,
    transformer: Arc<dyn Transformer>,
    store: ContentStore,
    state: StateTracker,
    phase: SyncPhase,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn ContentSource>,
        transformer: Arc<dyn Transformer>,
        store: ContentStore,
        state: StateTracker,
    ) -> Self {
        Self {
            source,
            transformer,
            store,
            state,
            phase: SyncPhase::Idle,
        }
    }

    /// Production wiring: HTTP client, Markdown transformer, file store.
    ///
    /// Creates the output directories; failing to do so is fatal.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let client = WordPressClient::from_config(config)?;
        let store = ContentStore::new(&config.posts_dir, &config.pages_dir);
        store.create_dirs()?;

        Ok(Self::new(
            Arc::new(client),
            Arc::new(MarkdownTransformer),
            store,
            StateTracker::new(&config.state_file),
        ))
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn state(&self) -> &StateTracker {
        &self.state
    }

    fn enter(&mut self, phase: SyncPhase) {
        if self.phase != phase {
            tracing::debug!("Sync phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Sync posts; `full` ignores the recorded timestamp.
    /// Returns the number of posts written.
    pub fn sync_posts(&mut self, full: bool) -> usize {
        let since = if full { None } else { self.state.read_last_sync() };
        let count = self.sync_kind(ContentType::Post, since.as_deref());
        self.enter(SyncPhase::Idle);
        count
    }

    /// Sync pages; `full` ignores the recorded timestamp.
    /// Returns the number of pages written.
    pub fn sync_pages(&mut self, full: bool) -> usize {
        let since = if full { None } else { self.state.read_last_sync() };
        let count = self.sync_kind(ContentType::Page, since.as_deref());
        self.enter(SyncPhase::Idle);
        count
    }

    fn sync_kind(&mut self, kind: ContentType, since: Option<&str>) -> usize {
        self.enter(SyncPhase::Fetching);
        match since {
            Some(since) => tracing::info!("Fetching {}s modified since {}...", kind, since),
            None => tracing::info!("Fetching {}s...", kind),
        }
        let items = self.source.fetch_items(kind, since).items;

        let mut processed = 0;
        for item in &items {
            match self.process(kind, item) {
                Ok(()) => processed += 1,
                Err(e) if e.is_fatal() => {
                    tracing::error!("Error processing {} {}: {}", kind, item.id, e)
                }
                Err(e) => tracing::warn!("Error processing {} {}: {}", kind, item.id, e),
            }
        }

        tracing::info!("Synced {}/{} {}s", processed, items.len(), kind);
        processed
    }

    /// Classify, render and write a single item
    fn process(&mut self, kind: ContentType, item: &RemoteItem) -> Result<()> {
        let document = match kind {
            ContentType::Post => {
                self.enter(SyncPhase::Classifying);
                let archived = self.is_archived(item.id);
                if archived {
                    tracing::info!("Processing archived post: {}", item.slug);
                }
                self.enter(SyncPhase::Writing);
                self.transformer.render_post(item, archived)?
            }
            ContentType::Page => {
                self.enter(SyncPhase::Writing);
                self.transformer.render_page(item)?
            }
        };

        let path = self
            .store
            .write(kind, &item.slug, &document.frontmatter, &document.body)?;
        tracing::info!("Created/updated: {}", path.display());
        Ok(())
    }

    /// Whether a post belongs to the "Archived" category.
    ///
    /// One name lookup per category id (N+1 requests per post); stops at the
    /// first match.
    pub fn is_archived(&self, post_id: RemoteId) -> bool {
        self.source
            .fetch_category_ids_for_post(post_id)
            .into_iter()
            .any(|category_id| {
                self.source
                    .fetch_category_name(category_id)
                    .is_some_and(|name| name.eq_ignore_ascii_case(ARCHIVED_CATEGORY))
            })
    }

    /// Delete local posts whose slug no longer exists remotely
    pub fn detect_deleted_posts(&mut self) -> Result<usize> {
        let deleted = self.detect_deleted(ContentType::Post);
        self.enter(SyncPhase::Idle);
        deleted
    }

    /// Delete local pages whose slug no longer exists remotely
    pub fn detect_deleted_pages(&mut self) -> Result<usize> {
        let deleted = self.detect_deleted(ContentType::Page);
        self.enter(SyncPhase::Idle);
        deleted
    }

    /// Reconcile against the full remote listing, never an incremental one
    fn detect_deleted(&mut self, kind: ContentType) -> Result<usize> {
        self.enter(SyncPhase::Fetching);
        let listing = self.source.fetch_items(kind, None);
        if !listing.complete {
            tracing::warn!(
                "Remote {} listing incomplete ({} items); skipping deletion detection",
                kind,
                listing.items.len()
            );
            return Ok(0);
        }

        self.enter(SyncPhase::Reconciling);
        let remote: BTreeSet<&str> = listing.items.iter().map(|i| i.slug.as_str()).collect();
        let local = self.store.list_slugs(kind)?;

        let mut deleted = 0;
        for slug in local.iter().filter(|s| !remote.contains(s.as_str())) {
            match self.store.delete(kind, slug) {
                Ok(true) => {
                    tracing::info!("Deleted: {}/{}.md", self.store.dir(kind).display(), slug);
                    deleted += 1;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Error deleting {} {}: {}", kind, slug, e),
            }
        }

        Ok(deleted)
    }

    /// Full sync: all posts and pages, both deletion passes, then persist
    pub fn sync_all(&mut self) -> Result<SyncReport> {
        let started = now();
        let result = self.run_cycle(None, &started);
        self.enter(SyncPhase::Idle);
        result
    }

    /// Sync what changed since the last run. Falls back to [`Self::sync_all`]
    /// when no state has been recorded yet.
    pub fn sync_incremental(&mut self) -> Result<SyncReport> {
        let Some(last_sync) = self.state.read_last_sync() else {
            tracing::info!("No previous sync found. Performing full sync...");
            return self.sync_all();
        };

        let started = now();
        let result = self.run_cycle(Some(&last_sync), &started);
        self.enter(SyncPhase::Idle);
        result
    }

    /// One cycle. The new timestamp is taken before fetching and only written
    /// after every write and deletion, so a failed cycle is retried in full.
    fn run_cycle(&mut self, since: Option<&str>, started: &str) -> Result<SyncReport> {
        let posts = self.sync_kind(ContentType::Post, since);
        let pages = self.sync_kind(ContentType::Page, since);
        let deleted_posts = self.detect_deleted(ContentType::Post)?;
        let deleted_pages = self.detect_deleted(ContentType::Page)?;

        self.enter(SyncPhase::Persisting);
        self.state.write_last_sync(started)?;

        let report = SyncReport {
            posts,
            pages,
            deleted_posts,
            deleted_pages,
        };
        tracing::info!(
            "Sync complete: {} posts, {} pages, {} posts deleted, {} pages deleted",
            report.posts,
            report.pages,
            report.deleted_posts,
            report.deleted_pages
        );
        Ok(report)
    }

    /// Re-sync one post by id. Returns 1 on success and 0 on any failure.
    pub fn sync_single(&mut self, post_id: RemoteId) -> usize {
        self.enter(SyncPhase::Fetching);
        let count = match self.source.fetch_single(post_id) {
            Some(item) => match self.process(ContentType::Post, &item) {
                Ok(()) => 1,
                Err(e) => {
                    tracing::warn!("Error syncing post {}: {}", post_id, e);
                    0
                }
            },
            None => {
                tracing::warn!("Error fetching post {}", post_id);
                0
            }
        };
        self.enter(SyncPhase::Idle);
        count
    }
}

fn now() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}
