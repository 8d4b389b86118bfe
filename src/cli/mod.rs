//! Command-line interface.

pub mod bootstrap;
pub mod cert;
pub mod completions;
pub mod lifecycle;
pub mod output;
pub mod render;
pub mod secret;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::Settings;

/// Deckhand - deployment orchestrator for a self-hosted Anki sync stack.
#[derive(Parser)]
#[command(
    name = "deckhand",
    about = "Deployment orchestrator for a self-hosted Anki sync stack",
    version
)]
pub struct Cli {
    /// Show detailed progress information
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to deckhand.toml (searched in the usual locations when omitted)
    #[arg(long, global = true, env = "DECKHAND_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the full bootstrap sequence
    Bootstrap {
        /// Public hostname the service will be reachable under
        #[arg(long, env = "DOMAIN")]
        domain: Option<String>,

        /// Operator contact email for certificate issuance
        #[arg(long, env = "CERTBOT_EMAIL")]
        email: Option<String>,

        /// AnkiWeb account used for scheduled sync
        #[arg(long, env = "ANKIWEB_USER")]
        sync_user: Option<String>,

        /// Service image reference to deploy
        #[arg(long, env = "ANKI_IMAGE")]
        image: Option<String>,
    },

    /// Render the reverse-proxy config from the current certificate state
    Render,

    /// Ensure a certificate exists for the stored domain
    Cert,

    /// Restart the service and verify it comes back healthy
    Restart,

    /// Trigger a sync and verify it actually succeeded
    Sync,

    /// Maintain the secret store
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },

    /// Show a deployment status overview
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Secret store subcommands.
#[derive(Subcommand)]
pub enum SecretAction {
    /// Set a value (overwrites an existing entry)
    Set {
        /// Key (e.g., CERTBOT_EMAIL)
        key: String,
        /// Value
        value: String,
    },

    /// Print a value
    Get {
        /// Key
        key: String,
    },

    /// List stored keys
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(cli: Cli) -> crate::error::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Bootstrap {
            domain,
            email,
            sync_user,
            image,
        } => bootstrap::execute(&settings, domain, email, sync_user, image),
        Command::Render => render::execute(&settings),
        Command::Cert => cert::execute(&settings),
        Command::Restart => lifecycle::restart(&settings),
        Command::Sync => lifecycle::sync(&settings),
        Command::Secret { action } => match action {
            SecretAction::Set { key, value } => secret::set(&settings, &key, &value),
            SecretAction::Get { key } => secret::get(&settings, &key),
            SecretAction::List { json } => secret::list(&settings, json),
        },
        Command::Status => status::execute(&settings),
        Command::Completions { shell } => completions::execute(shell),
    }
}
