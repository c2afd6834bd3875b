//! Terminal entry point.
//!
//! ```bash
//! trafficdesk --api-url http://localhost:8000
//! trafficdesk> login 1024 secret
//! trafficdesk> records
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use trafficdesk_client::config::{API_URL_ENV, DATA_DIR_ENV, NOTIFY_TIMEOUT_ENV};
use trafficdesk_client::{App, ClientConfig, render, shell::Shell};

#[derive(Parser, Debug)]
#[command(name = "trafficdesk")]
#[command(author, version, about = "Traffic violation management console")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Directory for the persistent session
    #[arg(long, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// How long notifications stay visible, in milliseconds
    #[arg(long, env = NOTIFY_TIMEOUT_ENV)]
    notify_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trafficdesk_observability::init();

    let cli = Cli::parse();
    let config = resolve_config(cli)?;
    tracing::info!(api = %config.api_base_url, data_dir = ?config.data_dir, "starting");

    let app = App::start(config).await.context("failed to start client")?;
    let _renderer = render::spawn_notification_renderer(&app.notifier);

    Shell::new(app).run().await
}

/// Flags win over the environment, which wins over defaults.
fn resolve_config(cli: Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.api_url {
        config = config
            .with_api_base_url(url)
            .context("invalid --api-url")?;
    }
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(ms) = cli.notify_timeout_ms {
        config = config.with_notification_timeout(Duration::from_millis(ms));
    }
    Ok(config)
}
