//! Settings file management.
//!
//! Reads the optional `deckhand.toml`. Every value has a default, so a
//! missing file is fine; a malformed file is a fatal configuration error.
//! Relative paths are resolved against the deployment root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::retry::RetryPolicy;
use crate::error::{ConfigError, Result};

/// Deployment settings loaded from `deckhand.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub paths: Paths,
    pub proxy: Proxy,
    pub connect: Connect,
    pub secrets: Secrets,
    pub retry: Retry,
}

/// Filesystem layout of the deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Deployment root; the secret store lives directly under it.
    pub deploy_root: PathBuf,
    /// Proxy template directory (relative paths resolve under the root).
    pub templates_dir: PathBuf,
    /// Certbot live directory holding `<domain>/fullchain.pem` + `privkey.pem`.
    pub live_dir: PathBuf,
    /// Webroot served for HTTP-01 challenges.
    pub webroot: PathBuf,
    /// Compose file describing the Anki service container.
    pub compose_file: PathBuf,
    /// Directory the recurring-operation units are installed into.
    pub unit_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            deploy_root: PathBuf::from("/opt/anki"),
            templates_dir: PathBuf::from("templates"),
            live_dir: PathBuf::from("/etc/letsencrypt/live"),
            webroot: PathBuf::from("/var/www/certbot"),
            compose_file: PathBuf::from("docker-compose.yml"),
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

/// Reverse-proxy integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Proxy {
    /// Path the rendered vhost is written to.
    pub output: PathBuf,
    /// Proxy service unit name, reloaded after a changed render.
    pub service: String,
}

impl Default for Proxy {
    fn default() -> Self {
        Self {
            output: PathBuf::from("/etc/nginx/conf.d/anki.conf"),
            service: "nginx".to_string(),
        }
    }
}

/// AnkiConnect endpoint used by the health probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for Connect {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8765".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Secret-derivation integration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Secrets {
    /// External helper that derives the opaque sync key from credentials.
    /// The raw password is fed on stdin, the derived key read from stdout.
    pub synckey_helper: Option<String>,
}

/// Retry budgets for the two verify cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Retry {
    pub restart: Budget,
    pub sync: Budget,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            restart: Budget {
                max_attempts: 10,
                delay_secs: 6,
                settle_secs: 15,
            },
            sync: Budget {
                max_attempts: 3,
                delay_secs: 20,
                settle_secs: 0,
            },
        }
    }
}

/// A single bounded retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub max_attempts: u32,
    pub delay_secs: u64,
    pub settle_secs: u64,
}

impl Budget {
    /// Materialize the budget as a retry policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.delay_secs))
            .with_settle(Duration::from_secs(self.settle_secs))
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicitly passed path must exist. Otherwise the usual locations
    /// are searched and built-in defaults apply when nothing is found.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` for a missing explicit path and
    /// `ConfigError::Parse` for malformed TOML.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()).into());
                }
                Some(p.to_path_buf())
            }
            None => Self::search(),
        };

        match path {
            Some(path) => Self::read(&path),
            None => {
                debug!("no deckhand.toml found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Search the usual config locations: working directory, the user config
    /// directory, then `/etc/deckhand`.
    fn search() -> Option<PathBuf> {
        let cwd = PathBuf::from(constants::CONFIG_FILE);
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(dir) = dirs::config_dir() {
            let user = dir.join("deckhand").join(constants::CONFIG_FILE);
            if user.exists() {
                return Some(user);
            }
        }

        let system = PathBuf::from("/etc/deckhand").join(constants::CONFIG_FILE);
        if system.exists() {
            return Some(system);
        }

        None
    }

    fn read(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        Ok(settings)
    }

    /// Path of the secret store file.
    pub fn env_path(&self) -> PathBuf {
        self.paths.deploy_root.join(constants::ENV_FILE)
    }

    /// Path of the store seed template.
    pub fn env_example_path(&self) -> PathBuf {
        self.templates_dir().join(constants::ENV_EXAMPLE_FILE)
    }

    /// Resolved template directory.
    pub fn templates_dir(&self) -> PathBuf {
        self.resolve(&self.paths.templates_dir)
    }

    /// Resolved compose file path.
    pub fn compose_path(&self) -> PathBuf {
        self.resolve(&self.paths.compose_file)
    }

    /// HTTP timeout for the AnkiConnect client.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect.timeout_secs)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.paths.deploy_root.join(path)
        }
    }
}
