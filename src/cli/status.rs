//! Status command - show a deployment overview.

use crate::cli::output;
use crate::core::certs::{CertProber, CertState};
use crate::core::config::Settings;
use crate::core::constants;
use crate::core::fsio;
use crate::core::host::{Host, SystemHost};
use crate::core::store::EnvStore;
use crate::error::Result;

/// Show the current deployment state: store, certificate, rendered config,
/// and timer installation.
pub fn execute(settings: &Settings) -> Result<()> {
    output::section("Deployment");

    let env_path = settings.env_path();
    let store = if env_path.exists() {
        let store = EnvStore::load(&env_path)?;
        output::kv(
            "store",
            format!("{} ({} keys)", env_path.display(), store.keys().count()),
        );
        Some(store)
    } else {
        output::kv("store", format!("{} (missing)", env_path.display()));
        None
    };

    let domain = store
        .as_ref()
        .and_then(|s| s.get_nonempty(constants::KEY_DOMAIN))
        .map(str::to_string);

    match &domain {
        Some(domain) => {
            output::kv("domain", domain);

            let prober = CertProber::new(&settings.paths.live_dir);
            let cert = match prober.probe(domain) {
                CertState::Present => "present",
                CertState::Absent => "absent",
            };
            output::kv("certificate", cert);
        }
        None => output::kv("domain", "not set"),
    }

    match std::fs::read(&settings.proxy.output) {
        Ok(bytes) => {
            let digest = fsio::sha256_hex(&bytes);
            output::kv(
                "proxy config",
                format!("{} ({})", settings.proxy.output.display(), &digest[..12]),
            );
        }
        Err(_) => output::kv("proxy config", "not rendered"),
    }

    let host = SystemHost;
    for timer in [constants::SYNC_TIMER, constants::RESTART_TIMER] {
        let state = if host.timer_enabled(timer) {
            "enabled"
        } else {
            "disabled"
        };
        output::kv(timer, state);
    }

    if domain.is_none() {
        println!();
        output::hint(&format!(
            "run {} to set up this host",
            output::cmd("deckhand bootstrap --domain <host>")
        ));
    }

    Ok(())
}
