//! CLI entry point for Insurly.

pub mod commands;

use clap::{Parser, Subcommand};

/// Insurly command-line client
#[derive(Parser, Debug)]
#[command(name = "insurly", version, about = "Insurly insurance account CLI")]
pub struct Cli {
    /// Backend base URL (overrides INSURLY_API_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds (overrides INSURLY_TIMEOUT_MS)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(LoginArgs),
    /// Sign out and remove the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Show the signed-in user's profile
    Profile,
    /// List policies with claimed and remaining sums
    Policies,
}

/// Arguments for `insurly login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// User name (email)
    pub user_name: String,

    /// Password (read from INSURLY_PASSWORD or stdin when omitted)
    #[arg(short, long, env = "INSURLY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}
