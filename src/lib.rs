//! Deckhand - deployment orchestrator for a self-hosted Anki sync stack.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── bootstrap     # Full bootstrap sequence
//! │   ├── render        # Render the reverse-proxy config
//! │   ├── cert          # Ensure a certificate exists
//! │   ├── lifecycle     # restart / sync verify cycles
//! │   ├── secret        # Secret store maintenance
//! │   └── status        # Deployment overview
//! └── core/             # Core library components
//!     ├── config        # deckhand.toml settings
//!     ├── store         # KEY=value secret store
//!     ├── certs         # Certificate state prober
//!     ├── render        # Two-variant template renderer
//!     ├── acme          # Certificate acquisition via certbot
//!     ├── health        # AnkiConnect probes
//!     ├── retry         # Bounded health-check retry executor
//!     ├── host          # Host command boundary (apt/docker/systemctl)
//!     └── orchestrator  # Bootstrap stage machine
//! ```
//!
//! # Features
//!
//! - Idempotent bootstrap: re-running converges instead of duplicating effects
//! - Certificate-aware proxy rendering with an explicit two-variant choice
//! - Bounded retry around every health verification
//! - All host mutations behind an injectable boundary for testing

pub mod cli;
pub mod core;
pub mod error;
