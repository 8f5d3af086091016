//! lnprofiles - manage Lightning node connection profiles
//!
//! Profiles are stored in a JSON settings file. Embedded wallets can be
//! inspected and activated here but are created and deleted by the app that
//! runs the node.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

// Use the library crate
use lightning_profiles::cli::commands;
use lightning_profiles::config::Config;

/// Lightning node connection profile manager
#[derive(Parser)]
#[command(name = "lnprofiles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "profiles.toml", env = "LNPROFILES_CONFIG")]
    config: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved profiles (* marks the active one)
    List,

    /// Show one profile (secrets masked)
    Show {
        /// Profile index
        index: usize,
    },

    /// Import an lndconnect, clnrest, lndhub or bluewallet string
    Import {
        /// Connection string
        uri: String,

        /// Nickname for the new profile
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Create an account on a managed-account server
    CreateAccount {
        /// Account server URL
        server: String,

        /// Nickname for the new profile
        #[arg(long)]
        nickname: Option<String>,

        /// Connect through the configured Tor proxy
        #[arg(long)]
        tor: bool,
    },

    /// Make a profile active
    Activate {
        /// Profile index
        index: usize,
    },

    /// Duplicate a profile
    Copy {
        /// Profile index
        index: usize,
    },

    /// Delete a profile
    Delete {
        /// Profile index
        index: usize,

        /// Skip the first confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show current configuration
    Config,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lightning_profiles=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Using settings file {}", config.storage.settings_path.display());

    let result = match cli.command {
        Commands::List => commands::list(&config).await,
        Commands::Show { index } => commands::show(&config, index).await,
        Commands::Import { uri, nickname } => commands::import(&config, &uri, nickname).await,
        Commands::CreateAccount {
            server,
            nickname,
            tor,
        } => commands::create_account(&config, &server, nickname, tor).await,
        Commands::Activate { index } => commands::activate(&config, index).await,
        Commands::Copy { index } => commands::copy(&config, index).await,
        Commands::Delete { index, yes } => commands::delete(&config, index, yes).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
