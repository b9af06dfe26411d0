//! Lessons Server: application entry point.

use clap::Parser;
use lessons_server::App;
use lessons_server::ServiceConfig;
use lessons_server::cli::{Args, Command, issue_token};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)),
        )
        .json()
        .init();

    let config = ServiceConfig::load(&args)?;

    if let Some(Command::IssueToken {
        subject,
        actor_type,
        private_key_file,
    }) = &args.command
    {
        let token = issue_token(&config.auth, *subject, *actor_type, private_key_file.as_deref())?;
        println!("{token}");
        return Ok(());
    }

    tracing::info!("Starting lessons server...");
    let app = App::build(config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks = app.spawn_background(shutdown_rx);

    tracing::info!("Lessons server ready");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    shutdown_tx.send_replace(true);
    drop(app);
    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("Lessons server stopped.");
    Ok(())
}
