//! Host command boundary.
//!
//! Every mutation of the host (package installs, docker compose, systemctl,
//! certbot, the sync-key helper) goes through the [`Host`] trait so the
//! orchestrator and the verify cycles can be exercised against a fake.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{HostError, Result};

/// Capabilities deckhand needs from the host it is deploying on.
pub trait Host {
    /// Install a package through the system package manager. Fatal on failure.
    fn install_package(&self, package: &str) -> Result<()>;

    /// Pull newer service images. Callers treat failure as best-effort.
    fn compose_pull(&self, compose_file: &Path) -> Result<()>;

    /// Bring the service containers up (detached).
    fn compose_up(&self, compose_file: &Path) -> Result<()>;

    /// Restart the service containers with a bounded stop timeout.
    fn compose_restart(&self, compose_file: &Path, timeout: Duration) -> Result<()>;

    /// Start a service unit unless it is already active.
    fn ensure_service_running(&self, unit: &str) -> Result<()>;

    /// Reload a service unit's configuration.
    fn reload_service(&self, unit: &str) -> Result<()>;

    /// Re-read unit definitions after files changed.
    fn daemon_reload(&self) -> Result<()>;

    /// Whether a timer unit is already enabled.
    fn timer_enabled(&self, timer: &str) -> bool;

    /// Enable and start a timer unit.
    fn enable_timer(&self, timer: &str) -> Result<()>;

    /// Request a certificate via the ACME client (HTTP-01 webroot).
    fn certbot_certonly(&self, domain: &str, email: &str, webroot: &Path) -> Result<()>;

    /// Derive the opaque sync key from credentials through the external
    /// helper. The password goes in on stdin, never on the command line.
    fn derive_sync_key(&self, helper: &str, user: &str, password: &str) -> Result<String>;
}

/// Real host implementation shelling out to the system tools.
pub struct SystemHost;

impl SystemHost {
    fn run(what: &str, cmd: &mut Command) -> Result<()> {
        debug!(command = what, "running host command");

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HostError::SpawnFailed {
                what: what.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HostError::CommandFailed {
                what: what.to_string(),
                detail: stderr.trim().to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn compose(compose_file: &Path) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("compose").arg("-f").arg(compose_file);
        cmd
    }
}

impl Host for SystemHost {
    fn install_package(&self, package: &str) -> Result<()> {
        info!(package, "installing package");
        let mut cmd = Command::new("apt-get");
        cmd.env("DEBIAN_FRONTEND", "noninteractive")
            .args(["install", "-y", package]);
        Self::run(&format!("apt-get install {}", package), &mut cmd).map_err(|e| {
            HostError::InstallFailed {
                package: package.to_string(),
                detail: e.to_string(),
            }
            .into()
        })
    }

    fn compose_pull(&self, compose_file: &Path) -> Result<()> {
        let mut cmd = Self::compose(compose_file);
        cmd.arg("pull");
        Self::run("docker compose pull", &mut cmd)
    }

    fn compose_up(&self, compose_file: &Path) -> Result<()> {
        let mut cmd = Self::compose(compose_file);
        cmd.args(["up", "-d"]);
        Self::run("docker compose up", &mut cmd)
    }

    fn compose_restart(&self, compose_file: &Path, timeout: Duration) -> Result<()> {
        let mut cmd = Self::compose(compose_file);
        cmd.args(["restart", "-t", &timeout.as_secs().to_string()]);
        Self::run("docker compose restart", &mut cmd)
    }

    fn ensure_service_running(&self, unit: &str) -> Result<()> {
        let active = Command::new("systemctl")
            .args(["is-active", "--quiet", unit])
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if active {
            debug!(unit, "service already running");
            return Ok(());
        }

        let mut cmd = Command::new("systemctl");
        cmd.args(["start", unit]);
        Self::run(&format!("systemctl start {}", unit), &mut cmd)
    }

    fn reload_service(&self, unit: &str) -> Result<()> {
        let mut cmd = Command::new("systemctl");
        cmd.args(["reload", unit]);
        Self::run(&format!("systemctl reload {}", unit), &mut cmd)
    }

    fn daemon_reload(&self) -> Result<()> {
        let mut cmd = Command::new("systemctl");
        cmd.arg("daemon-reload");
        Self::run("systemctl daemon-reload", &mut cmd)
    }

    fn timer_enabled(&self, timer: &str) -> bool {
        Command::new("systemctl")
            .args(["is-enabled", "--quiet", timer])
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn enable_timer(&self, timer: &str) -> Result<()> {
        let mut cmd = Command::new("systemctl");
        cmd.args(["enable", "--now", timer]);
        Self::run(&format!("systemctl enable {}", timer), &mut cmd)
    }

    fn certbot_certonly(&self, domain: &str, email: &str, webroot: &Path) -> Result<()> {
        info!(domain, "requesting certificate");
        let mut cmd = Command::new("certbot");
        cmd.args(["certonly", "--non-interactive", "--agree-tos"])
            .arg("--webroot")
            .arg("-w")
            .arg(webroot)
            .args(["-d", domain, "-m", email]);
        Self::run("certbot certonly", &mut cmd)
    }

    fn derive_sync_key(&self, helper: &str, user: &str, password: &str) -> Result<String> {
        debug!(helper, user, "deriving sync key");

        let mut child = Command::new(helper)
            .args(["--user", user])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HostError::SpawnFailed {
                what: helper.to_string(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(password.as_bytes())
                .map_err(|e| HostError::DeriveFailed(format!("failed to pass credentials: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| HostError::DeriveFailed(format!("helper did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HostError::DeriveFailed(stderr.trim().to_string()).into());
        }

        let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if key.is_empty() {
            return Err(HostError::DeriveFailed("helper produced no key".to_string()).into());
        }
        Ok(key)
    }
}
