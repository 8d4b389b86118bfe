//! Error types for deckhand.
//!
//! A top-level [`Error`] composes one enum per component so callers can match
//! on the failing subsystem while `?` keeps working across layers.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for all deckhand operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Cert(#[from] CertError),

    #[error(transparent)]
    Health(#[from] HealthError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration and required-input failures. Always fatal, never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required input is neither provided nor present in the secret store.
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Secret store failures. Ordinary key absence is not an error; `get`
/// returns `Option` and only the CLI maps it to a failure outcome.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read secret store {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write secret store {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("{0} is not set")]
    KeyNotSet(String),
}

/// Config-render failures.
#[derive(Error, Debug)]
pub enum RenderError {
    /// There is no safe default to render without a template.
    #[error("template file missing: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("failed to write rendered config {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
}

/// Certificate-acquisition failures.
#[derive(Error, Debug)]
pub enum CertError {
    #[error("certificate request for {domain} failed: {detail}")]
    AcquireFailed { domain: String, detail: String },
}

/// Health-check failures surfaced after the retry budget is spent.
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("service unhealthy after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failures at the host-command boundary (apt, docker, systemctl, helpers).
#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to install package {package}: {detail}")]
    InstallFailed { package: String, detail: String },

    #[error("failed to spawn {what}: {source}")]
    SpawnFailed {
        what: String,
        source: std::io::Error,
    },

    #[error("{what} failed: {detail}")]
    CommandFailed { what: String, detail: String },

    #[error("sync key derivation failed: {0}")]
    DeriveFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
