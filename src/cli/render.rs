//! Render command - write the proxy config for the current state.

use crate::cli::output;
use crate::core::certs::{CertProber, CertState};
use crate::core::config::Settings;
use crate::core::constants;
use crate::core::render::ProxyRenderer;
use crate::core::store::EnvStore;
use crate::error::{ConfigError, Result};

/// Render the reverse-proxy config, probing the certificate state fresh.
pub fn execute(settings: &Settings) -> Result<()> {
    let env_path = settings.env_path();
    let store = if env_path.exists() {
        EnvStore::load(&env_path)?
    } else {
        EnvStore::empty(&env_path)
    };

    let domain = store
        .get_nonempty(constants::KEY_DOMAIN)
        .ok_or(ConfigError::MissingInput(
            "DOMAIN (set it in anki.env or run bootstrap)",
        ))?;

    let prober = CertProber::new(&settings.paths.live_dir);
    let renderer = ProxyRenderer::new(&settings.templates_dir(), &settings.proxy.output, &prober);
    let outcome = renderer.render(domain)?;

    match outcome.variant {
        CertState::Present => {
            output::success(&format!("rendered TLS vhost for {}", domain));
        }
        CertState::Absent => {
            output::success(&format!("rendered HTTP-only vhost for {}", domain));
            output::hint(&format!(
                "run {} to request a certificate",
                output::cmd("deckhand cert")
            ));
        }
    }

    output::kv("output", output::path(&settings.proxy.output.display().to_string()));
    if !outcome.changed {
        output::dimmed("  content unchanged, no reload needed");
    }
    Ok(())
}
