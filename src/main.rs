//! Insurly CLI binary entry point.

use std::time::Duration;

use clap::Parser;
use insurly::cli::{commands, Cli, Commands};
use insurly::config::ClientConfig;
use insurly::error::ClientError;
use insurly::notify::{report_error, LogNotifier};
use insurly::Insurly;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        report_error(&LogNotifier, &e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    let app = Insurly::new(config)?;

    match cli.command {
        Commands::Login(args) => commands::handle_login(&app, &args.user_name, args.password).await,
        Commands::Logout => commands::handle_logout(&app).await,
        Commands::Status => commands::handle_status(&app),
        Commands::Profile => commands::handle_profile(&app).await,
        Commands::Policies => commands::handle_policies(&app).await,
    }
}
