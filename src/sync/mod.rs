//! WordPress to Hugo sync
//!
//! [`SyncEngine`] fetches changed content, converts it, writes it to the
//! content directories and reconciles deletions against the full remote
//! listing. Three modes:
//! - full ([`SyncEngine::sync_all`]): ignore recorded state
//! - incremental ([`SyncEngine::sync_incremental`]): only items modified since
//!   the last run, full reconciliation every time
//! - single post ([`SyncEngine::sync_single`]): webhook-triggered resync

mod engine;

pub use engine::{SyncEngine, ARCHIVED_CATEGORY};
pub use crate::types::{SyncPhase, SyncReport};
