//! Constants used throughout deckhand.
//!
//! Centralizes magic strings and default values.

/// Optional config file name (deckhand.toml).
pub const CONFIG_FILE: &str = "deckhand.toml";

/// Secret store file name relative to the deployment root.
pub const ENV_FILE: &str = "anki.env";

/// Store seed template file name inside the templates directory.
pub const ENV_EXAMPLE_FILE: &str = "anki.env.example";

/// Placeholder token substituted with the domain in proxy templates.
pub const DOMAIN_TOKEN: &str = "__DOMAIN__";

/// Certificate-absent proxy template file name.
pub const HTTP_TEMPLATE: &str = "anki-http.conf.tmpl";

/// Certificate-present proxy template file name.
pub const TLS_TEMPLATE: &str = "anki-tls.conf.tmpl";

/// Secret store keys.
pub const KEY_DOMAIN: &str = "DOMAIN";
pub const KEY_EMAIL: &str = "CERTBOT_EMAIL";
pub const KEY_SYNC_USER: &str = "ANKIWEB_USER";
pub const KEY_SYNC_KEY: &str = "ANKIWEB_SYNC_KEY";
pub const KEY_IMAGE: &str = "ANKI_IMAGE";

/// Certificate chain file name under the domain's live directory.
pub const CERT_CHAIN_FILE: &str = "fullchain.pem";

/// Private key file name under the domain's live directory.
pub const CERT_KEY_FILE: &str = "privkey.pem";

/// The two recurring-operation timers installed by the orchestrator.
pub const SYNC_TIMER: &str = "deckhand-sync.timer";
pub const RESTART_TIMER: &str = "deckhand-restart.timer";
