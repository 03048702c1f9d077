//! wpsync CLI
//!
//! One-shot sync of WordPress content into a Hugo site.
//!
//! ```text
//! wpsync                # incremental sync since the last run
//! wpsync --full         # full sync of all posts and pages
//! wpsync --post-id 5    # sync only post 5
//! ```

use clap::Parser;

use wpsync::config::{init_logging, ConfigArgs};
use wpsync::error::Result;
use wpsync::SyncEngine;

#[derive(Parser, Debug)]
#[command(name = "wpsync")]
#[command(about = "Sync WordPress posts and pages into a Hugo content tree")]
#[command(version)]
struct Cli {
    /// Perform a full sync (ignore the last sync timestamp)
    #[arg(long, conflicts_with = "post_id")]
    full: bool,

    /// Sync a single post by ID
    #[arg(long)]
    post_id: Option<i64>,

    /// Print the sync report as JSON on stdout
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.config.log_json);

    let config = cli.config.into_config();
    let mut engine = SyncEngine::from_config(&config)?;

    if let Some(post_id) = cli.post_id {
        tracing::info!("Syncing single post ID: {}", post_id);
        let count = engine.sync_single(post_id);
        if cli.json {
            println!("{}", serde_json::json!({ "posts": count }));
        } else {
            println!("Synced {} post", count);
        }
        return Ok(());
    }

    tracing::info!("Starting sync from {}...", config.api_url);
    let report = if cli.full {
        engine.sync_all()?
    } else {
        engine.sync_incremental()?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sync complete!");
        println!("  Posts: {}", report.posts);
        println!("  Pages: {}", report.pages);
        println!("  Deleted posts: {}", report.deleted_posts);
        println!("  Deleted pages: {}", report.deleted_pages);
    }

    Ok(())
}
