//! wpsync - WordPress to Hugo content sync
//!
//! Pulls posts and pages from the WordPress REST API, converts them to
//! Markdown with frontmatter, writes them into a Hugo content tree and
//! deletes local documents that no longer exist remotely.

pub mod config;
pub mod error;
pub mod remote;
pub mod storage;
pub mod sync;
pub mod transform;
pub mod types;
#[cfg(feature = "webhook")]
pub mod webhook;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use sync::SyncEngine;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
