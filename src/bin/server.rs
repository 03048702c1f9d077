//! wpsync webhook server
//!
//! Run with: wpsync-server --secret <shared-secret>

use std::sync::Arc;

use clap::Parser;
use parking_lot::Mutex;

use wpsync::config::{init_logging, ConfigArgs};
use wpsync::error::Result;
use wpsync::webhook::{WebhookServer, WebhookState};
use wpsync::SyncEngine;

#[derive(Parser, Debug)]
#[command(name = "wpsync-server")]
#[command(about = "Webhook listener that keeps a Hugo site in sync with WordPress")]
#[command(version)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.config.log_json);

    let config = args.config.into_config();

    // The blocking HTTP client is built (and later dropped) outside the
    // async runtime
    let engine = Arc::new(Mutex::new(SyncEngine::from_config(&config)?));

    tracing::info!(
        "Webhook secret: {}",
        if config.webhook_secret.is_some() {
            "configured"
        } else {
            "none"
        }
    );

    let state = WebhookState::new(engine.clone(), config.webhook_secret.clone());
    let server = WebhookServer::new(state, config.webhook_port);

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(server.start());
    drop(runtime);
    drop(engine);

    served?;
    Ok(())
}
