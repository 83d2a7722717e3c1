//! CLI argument definitions for the userinfo binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database (default, production-ready)
    Sqlite,
    /// PostgreSQL database (for replicated deployments)
    Postgres,
    /// In-memory with JSON persistence (for development and ephemeral deployments)
    Inmemory,
}

/// userinfo user profile and settings server
#[derive(Parser, Debug)]
#[command(name = "userinfo")]
#[command(about = "userinfo: user profile, settings and file RPC server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the userinfo server
    Serve(ServeArgs),
    /// Check health of a running userinfo server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "USERINFO_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "USERINFO_HOST")]
    pub host: String,

    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "USERINFO_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores userinfo.db
    /// For InMemory: stores userinfo.json
    #[arg(short = 'D', long, env = "USERINFO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "USERINFO_POSTGRES_URL")]
    pub postgres_url: Option<String>,

    /// Set a runtime flag, e.g. `--flag use.rendezvousserver=wss://rv.example.com`.
    /// Flags not given here are read from USERINFO_<NAME> environment variables.
    #[arg(long = "flag", value_name = "NAME=VALUE", value_parser = parse_flag)]
    pub flags: Vec<(String, String)>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "USERINFO_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Parse a `NAME=VALUE` flag assignment. The value may be empty.
fn parse_flag(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid flag `{s}`: expected NAME=VALUE"))?;
    if name.is_empty() {
        return Err(format!("invalid flag `{s}`: empty name"));
    }
    Ok((name.to_string(), value.to_string()))
}
