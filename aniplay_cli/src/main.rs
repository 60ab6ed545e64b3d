use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod auth;
mod cache;
mod server;

use aniplay_core::{AppConfig, ConfigManager};

#[derive(Parser)]
#[command(name = "aniplay")]
#[command(author, version, about = "AniPlay - account and poster cache management", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Override the application data directory
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local account and session
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Inspect and maintain the poster cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Companion scraping API operations
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Register a new account
    Register {
        /// Username (prompted when omitted)
        #[arg(long)]
        username: Option<String>,

        /// Email address (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted when omitted; prefer the prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and persist the session
    Login {
        /// Username (prompted when omitted)
        #[arg(long)]
        username: Option<String>,

        /// Password (prompted when omitted; prefer the prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the persisted session
    Logout,

    /// Show whether a valid session exists
    Status,

    /// Show the logged-in account
    Whoami,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Show poster cache statistics
    Stats,

    /// Remove corrupt poster files
    Clean,

    /// Remove poster files older than a cutoff
    Prune {
        /// Age cutoff in days
        #[arg(long, default_value_t = 30)]
        days: u64,
    },
}

#[derive(Subcommand)]
enum ServerCommand {
    /// Wait until the companion API reports healthy
    Wait,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("aniplay_core", log::LevelFilter::Debug)
            .filter_module("aniplay_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config: AppConfig = ConfigManager::new()
        .load()
        .context("Failed to load configuration")?;

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => aniplay_core::paths::default_data_dir(),
    };

    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommand::Register {
                username,
                email,
                password,
            } => auth::register(&config, &data_dir, username, email, password).await?,
            AuthCommand::Login { username, password } => {
                auth::login(&config, &data_dir, username, password).await?
            }
            AuthCommand::Logout => auth::logout(&config, &data_dir).await?,
            AuthCommand::Status => auth::status(&config, &data_dir).await?,
            AuthCommand::Whoami => auth::whoami(&config, &data_dir).await?,
        },
        Commands::Cache { command } => match command {
            CacheCommand::Stats => cache::stats(&config, &data_dir)?,
            CacheCommand::Clean => cache::clean(&config, &data_dir)?,
            CacheCommand::Prune { days } => cache::prune(&config, &data_dir, days)?,
        },
        Commands::Server { command } => match command {
            ServerCommand::Wait => server::wait(&config).await?,
        },
    }

    Ok(())
}
