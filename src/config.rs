//! Sync configuration
//!
//! Settings are resolved once at process start (flags, then environment,
//! then defaults) into a [`SyncConfig`] that is passed to every component.
//! Library code never reads the process environment itself.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://your-domain.com/wp-json/wp/v2";
pub const DEFAULT_POSTS_DIR: &str = "hugo-site/content/posts";
pub const DEFAULT_PAGES_DIR: &str = "hugo-site/content/pages";
pub const DEFAULT_STATE_FILE: &str = "hugo-site/.last-sync";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEBHOOK_PORT: u16 = 4567;

/// Resolved configuration for one sync process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// WordPress REST base URL, e.g. `https://example.com/wp-json/wp/v2`
    pub api_url: String,
    pub posts_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub state_file: PathBuf,
    /// Per-request timeout for remote calls
    pub request_timeout_secs: u64,
    /// Shared secret expected in `X-Webhook-Secret` (None = no check)
    pub webhook_secret: Option<String>,
    pub webhook_port: u16,
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            posts_dir: PathBuf::from(DEFAULT_POSTS_DIR),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            webhook_secret: None,
            webhook_port: DEFAULT_WEBHOOK_PORT,
        }
    }
}

/// Configuration flags shared by the `wpsync` and `wpsync-server` binaries
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// WordPress REST API base URL
    #[arg(long, env = "WP_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Output directory for posts
    #[arg(long, env = "POSTS_OUTPUT_DIR", default_value = DEFAULT_POSTS_DIR)]
    pub posts_dir: String,

    /// Output directory for pages
    #[arg(long, env = "PAGES_OUTPUT_DIR", default_value = DEFAULT_PAGES_DIR)]
    pub pages_dir: String,

    /// Sync state file (JSON)
    #[arg(long, env = "STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: String,

    /// Per-request timeout in seconds
    #[arg(long = "request-timeout", env = "WPSYNC_REQUEST_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Webhook shared secret
    #[arg(long = "secret", env = "SYNC_WEBHOOK_SECRET")]
    pub webhook_secret: Option<String>,

    /// Webhook listener port
    #[arg(long = "port", env = "SYNC_SERVER_PORT", default_value_t = DEFAULT_WEBHOOK_PORT)]
    pub webhook_port: u16,

    /// Emit logs as JSON lines
    #[arg(long, env = "WPSYNC_LOG_JSON")]
    pub log_json: bool,
}

impl ConfigArgs {
    /// Resolve flags into a [`SyncConfig`], expanding `~` in paths
    pub fn into_config(self) -> SyncConfig {
        SyncConfig {
            api_url: self.api_url.trim_end_matches('/').to_string(),
            posts_dir: expand_path(&self.posts_dir),
            pages_dir: expand_path(&self.pages_dir),
            state_file: expand_path(&self.state_file),
            request_timeout_secs: self.request_timeout_secs,
            webhook_secret: self.webhook_secret.filter(|s| !s.is_empty()),
            webhook_port: self.webhook_port,
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Initialize logging to stderr; `RUST_LOG` overrides the `info` default
pub fn init_logging(json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }
}
