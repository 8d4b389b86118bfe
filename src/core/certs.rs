//! Certificate state probing.
//!
//! Decides whether a usable certificate pair exists for a domain. The live
//! directory is usually root-only, so the probe first checks under the
//! current identity and falls back to an elevated check only when the plain
//! one is inconclusive. The probe never errors: no access and no files both
//! resolve to [`CertState::Absent`], and the result is never cached.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::core::constants;

/// The branch condition consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertState {
    Present,
    Absent,
}

/// Three-way answer of a single path check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Present,
    Missing,
    /// The check could not be performed under this identity.
    Denied,
}

/// Capability to test a path for existence under some identity.
pub trait CertAccess {
    fn check(&self, path: &Path) -> Access;
}

/// Checks under the calling process's own identity.
pub struct PlainAccess;

impl CertAccess for PlainAccess {
    fn check(&self, path: &Path) -> Access {
        match path.try_exists() {
            Ok(true) => Access::Present,
            Ok(false) => Access::Missing,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Access::Denied,
            Err(_) => Access::Missing,
        }
    }
}

/// Checks through `sudo -n test -e`, for paths the plain identity cannot
/// reach. As root the plain check already has full visibility, so sudo is
/// skipped entirely.
pub struct ElevatedAccess;

impl CertAccess for ElevatedAccess {
    fn check(&self, path: &Path) -> Access {
        if whoami::username() == "root" {
            return PlainAccess.check(path);
        }

        let status = Command::new("sudo")
            .args(["-n", "test", "-e"])
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(s) if s.success() => Access::Present,
            Ok(_) => Access::Missing,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "elevated check unavailable");
                Access::Denied
            }
        }
    }
}

/// Probes the certificate pair for a domain.
pub struct CertProber {
    live_dir: PathBuf,
    plain: Box<dyn CertAccess>,
    elevated: Box<dyn CertAccess>,
}

impl CertProber {
    /// Prober over the real filesystem with the sudo fallback.
    pub fn new(live_dir: &Path) -> Self {
        Self::with_access(live_dir, Box::new(PlainAccess), Box::new(ElevatedAccess))
    }

    /// Prober with injected accessors, for tests.
    pub fn with_access(
        live_dir: &Path,
        plain: Box<dyn CertAccess>,
        elevated: Box<dyn CertAccess>,
    ) -> Self {
        Self {
            live_dir: live_dir.to_path_buf(),
            plain,
            elevated,
        }
    }

    /// Re-evaluate the certificate state for `domain`.
    ///
    /// Both the chain and the private key must be present. Callers must not
    /// cache the result across renders; a certificate may appear between
    /// calls.
    pub fn probe(&self, domain: &str) -> CertState {
        let dir = self.live_dir.join(domain);
        let chain = dir.join(constants::CERT_CHAIN_FILE);
        let key = dir.join(constants::CERT_KEY_FILE);

        let state = if self.path_present(&chain) && self.path_present(&key) {
            CertState::Present
        } else {
            CertState::Absent
        };
        debug!(domain, ?state, "certificate probe");
        state
    }

    fn path_present(&self, path: &Path) -> bool {
        match self.plain.check(path) {
            Access::Present => true,
            Access::Missing => false,
            // inconclusive under this identity, ask once with elevation
            Access::Denied => matches!(self.elevated.check(path), Access::Present),
        }
    }
}
