//! Deckhand - deployment orchestrator for a self-hosted Anki sync stack.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deckhand::cli::output;
use deckhand::cli::{execute, Cli};
use deckhand::error::{ConfigError, Error, StoreError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("DECKHAND_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("deckhand=debug")
        } else {
            EnvFilter::new("deckhand=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli) {
        // Format error with suggestion if available
        let error_msg = e.to_string();
        let suggestion = match &e {
            Error::Config(ConfigError::MissingInput(what)) if what.starts_with("domain") => {
                Some("run: deckhand bootstrap --domain <host>")
            }
            Error::Config(ConfigError::MissingInput(what)) if what.starts_with("CERTBOT_EMAIL") => {
                Some("run: deckhand secret set CERTBOT_EMAIL <address>")
            }
            Error::Config(ConfigError::MissingInput(what)) if what.starts_with("DOMAIN") => {
                Some("run: deckhand secret set DOMAIN <host>")
            }
            Error::Store(StoreError::KeyNotSet(_)) => {
                Some("run: deckhand secret set <KEY> <value>")
            }
            _ => None,
        };

        output::error(&error_msg);
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
