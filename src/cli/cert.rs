//! Cert command - ensure a certificate exists for the stored domain.

use crate::cli::output;
use crate::core::acme::CertAcquirer;
use crate::core::certs::{CertProber, CertState};
use crate::core::config::Settings;
use crate::core::constants;
use crate::core::host::SystemHost;
use crate::core::store::EnvStore;
use crate::error::{ConfigError, Result};

/// Ensure a certificate pair exists, requesting one only when absent.
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
    if let CertState::Present = prober.probe(domain) {
        output::success(&format!("certificate already present for {}", domain));
        return Ok(());
    }

    // the contact address is only required when a request will actually be made
    let email = store
        .get_nonempty(constants::KEY_EMAIL)
        .ok_or(ConfigError::MissingInput(
            "CERTBOT_EMAIL (required to request a certificate)",
        ))?;

    let host = SystemHost;
    let acquirer = CertAcquirer::new(&prober, &host, &settings.paths.webroot);

    output::progress("Requesting certificate");
    match acquirer.ensure(domain, email) {
        Ok(_) => {
            output::progress_done(true);
            output::success(&format!("certificate issued for {}", domain));
            output::hint(&format!(
                "run {} to switch the proxy to TLS",
                output::cmd("deckhand render")
            ));
            Ok(())
        }
        Err(e) => {
            output::progress_done(false);
            Err(e)
        }
    }
}
