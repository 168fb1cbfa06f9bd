//! git-browse - read-only web access to a directory of git repositories
//!
//! # Usage
//! ```bash
//! git-browse /srv/git                   # Serve every repository under /srv/git
//! git-browse --config browse.toml       # Serve using a config file
//! git-browse /srv/git --all --open      # Ignore export markers, open browser
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_browse::config::Config;
use git_browse::registry;
use git_browse::routes::{self, AppState};

/// Browse git repositories in your browser
#[derive(Parser)]
#[command(name = "git-browse")]
#[command(about = "Read-only web access to git repositories", long_about = None)]
struct Cli {
    /// Directory containing the repositories (overrides the config file)
    #[arg(value_name = "REPOSITORY_ROOT")]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serve repositories without a git-daemon-export-ok marker
    #[arg(long)]
    all: bool,

    /// Open browser automatically after starting
    #[arg(short, long)]
    open: bool,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    port: u16,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match (&cli.config, &cli.root) {
        (Some(path), _) => Config::load(path)?,
        (None, Some(root)) => Config::with_root(root.clone()),
        (None, None) => anyhow::bail!("either REPOSITORY_ROOT or --config is required"),
    };

    if let Some(root) = &cli.root {
        config.repository_root = root.clone();
    }
    if cli.all {
        config.preserve_export_flag = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quieter for production)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli)?;
    let names = registry::repository_names(&config).with_context(|| {
        format!(
            "cannot list repositories in {}",
            config.repository_root.display()
        )
    })?;
    tracing::info!(
        "Serving {} repositories from {}",
        names.len(),
        config.repository_root.display()
    );

    let root = config.repository_root.clone();
    let app = routes::create_router(AppState::new(config)).layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    let url = format!("http://{}/api/v1/repositories", addr);
    println!();
    println!("  Repositories: {} ({} found)", root.display(), names.len());
    println!("  Server:       {}", url);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    if cli.open {
        if let Err(e) = open::that(&url) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
