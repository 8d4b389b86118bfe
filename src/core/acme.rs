//! Certificate acquisition.
//!
//! Thin, idempotent wrapper around the ACME client: when the prober already
//! sees a certificate pair the call returns without spawning anything, so
//! reruns on a secured domain are side-effect free.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::certs::{CertProber, CertState};
use crate::core::host::Host;
use crate::error::{CertError, Error, Result};

/// How `ensure` concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// A pair already existed; nothing was done.
    AlreadyPresent,
    /// A new certificate was issued.
    Issued,
}

/// Acquires certificates through the host's ACME client.
pub struct CertAcquirer<'a> {
    prober: &'a CertProber,
    host: &'a dyn Host,
    webroot: PathBuf,
}

impl<'a> CertAcquirer<'a> {
    pub fn new(prober: &'a CertProber, host: &'a dyn Host, webroot: &Path) -> Self {
        Self {
            prober,
            host,
            webroot: webroot.to_path_buf(),
        }
    }

    /// Ensure a certificate pair exists for `domain`, requesting one bound
    /// to `email` only when absent.
    ///
    /// # Errors
    ///
    /// `CertError::AcquireFailed` when the ACME exchange fails; the caller
    /// keeps serving the certificate-absent configuration.
    pub fn ensure(&self, domain: &str, email: &str) -> Result<Acquired> {
        if let CertState::Present = self.prober.probe(domain) {
            debug!(domain, "certificate already present, skipping acquisition");
            return Ok(Acquired::AlreadyPresent);
        }

        self.host
            .certbot_certonly(domain, email, &self.webroot)
            .map_err(|e| {
                Error::from(CertError::AcquireFailed {
                    domain: domain.to_string(),
                    detail: match e {
                        Error::Host(host_err) => host_err.to_string(),
                        other => other.to_string(),
                    },
                })
            })?;

        info!(domain, "certificate issued");
        Ok(Acquired::Issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    /// Host fake that counts certbot invocations.
    struct CountingHost {
        certbot_calls: RefCell<u32>,
        fail: bool,
    }

    impl CountingHost {
        fn new(fail: bool) -> Self {
            Self {
                certbot_calls: RefCell::new(0),
                fail,
            }
        }
    }

    impl Host for CountingHost {
        fn install_package(&self, _package: &str) -> Result<()> {
            Ok(())
        }
        fn compose_pull(&self, _compose_file: &Path) -> Result<()> {
            Ok(())
        }
        fn compose_up(&self, _compose_file: &Path) -> Result<()> {
            Ok(())
        }
        fn compose_restart(&self, _compose_file: &Path, _timeout: Duration) -> Result<()> {
            Ok(())
        }
        fn ensure_service_running(&self, _unit: &str) -> Result<()> {
            Ok(())
        }
        fn reload_service(&self, _unit: &str) -> Result<()> {
            Ok(())
        }
        fn daemon_reload(&self) -> Result<()> {
            Ok(())
        }
        fn timer_enabled(&self, _timer: &str) -> bool {
            false
        }
        fn enable_timer(&self, _timer: &str) -> Result<()> {
            Ok(())
        }
        fn certbot_certonly(&self, _domain: &str, _email: &str, _webroot: &Path) -> Result<()> {
            *self.certbot_calls.borrow_mut() += 1;
            if self.fail {
                return Err(crate::error::HostError::CommandFailed {
                    what: "certbot certonly".into(),
                    detail: "urn:ietf:params:acme:error:rateLimited".into(),
                }
                .into());
            }
            Ok(())
        }
        fn derive_sync_key(&self, _helper: &str, _user: &str, _password: &str) -> Result<String> {
            Ok("key".into())
        }
    }

    fn install_cert(live: &Path, domain: &str) {
        let dir = live.join(domain);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("fullchain.pem"), "chain").unwrap();
        std::fs::write(dir.join("privkey.pem"), "key").unwrap();
    }

    #[test]
    fn test_second_ensure_spawns_nothing() {
        let live = tempfile::tempdir().unwrap();
        let prober = CertProber::new(live.path());
        let host = CountingHost::new(false);
        let acquirer = CertAcquirer::new(&prober, &host, Path::new("/var/www/certbot"));

        let first = acquirer.ensure("anki.example.com", "ops@example.com").unwrap();
        assert_eq!(first, Acquired::Issued);
        assert_eq!(*host.certbot_calls.borrow(), 1);

        // the pair now exists, so the rerun must not touch the network
        install_cert(live.path(), "anki.example.com");
        let second = acquirer.ensure("anki.example.com", "ops@example.com").unwrap();
        assert_eq!(second, Acquired::AlreadyPresent);
        assert_eq!(*host.certbot_calls.borrow(), 1);
    }

    #[test]
    fn test_acquisition_failure_propagates() {
        let live = tempfile::tempdir().unwrap();
        let prober = CertProber::new(live.path());
        let host = CountingHost::new(true);
        let acquirer = CertAcquirer::new(&prober, &host, Path::new("/var/www/certbot"));

        let err = acquirer
            .ensure("anki.example.com", "ops@example.com")
            .unwrap_err();
        assert!(err.to_string().contains("certificate request"));
        assert!(err.to_string().contains("rateLimited"));
    }

    #[test]
    fn test_present_pair_short_circuits() {
        let live = tempfile::tempdir().unwrap();
        install_cert(live.path(), "anki.example.com");
        let prober = CertProber::new(live.path());
        let host = CountingHost::new(true); // would fail if ever invoked
        let acquirer = CertAcquirer::new(&prober, &host, Path::new("/var/www/certbot"));

        let outcome = acquirer.ensure("anki.example.com", "ops@example.com").unwrap();
        assert_eq!(outcome, Acquired::AlreadyPresent);
        assert_eq!(*host.certbot_calls.borrow(), 0);
    }
}
