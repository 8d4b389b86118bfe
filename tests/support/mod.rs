//! Test support utilities for deckhand integration tests.
//!
//! Provides an isolated deployment rooted in a temp directory: every path in
//! the generated deckhand.toml points inside the temp dir, so tests never
//! touch the real host and can run in parallel.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Certificate-absent template used by the test deployments.
pub const HTTP_BODY: &str = "server {\n    listen 80;\n    server_name __DOMAIN__;\n    location /.well-known/acme-challenge/ { root /var/www/certbot; }\n}\n";

/// Certificate-present template used by the test deployments.
pub const TLS_BODY: &str = "server {\n    listen 443 ssl;\n    server_name __DOMAIN__;\n    ssl_certificate live/__DOMAIN__/fullchain.pem;\n    ssl_certificate_key live/__DOMAIN__/privkey.pem;\n}\n";

/// Test environment with an isolated deployment root.
pub struct Test {
    /// Temporary directory holding the whole deployment layout.
    pub dir: TempDir,
}

impl Test {
    /// Create a fresh deployment: deckhand.toml, templates, empty live dir.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let root = dir.path();

        let deploy = root.join("deploy");
        let templates = deploy.join("templates");
        fs::create_dir_all(&templates).expect("failed to create templates dir");
        fs::create_dir_all(root.join("live")).expect("failed to create live dir");

        fs::write(templates.join("anki-http.conf.tmpl"), HTTP_BODY).unwrap();
        fs::write(templates.join("anki-tls.conf.tmpl"), TLS_BODY).unwrap();
        fs::write(
            templates.join("anki.env.example"),
            "# deployment inputs\n# DOMAIN=anki.example.com\n",
        )
        .unwrap();

        let config = format!(
            r#"[paths]
deploy_root = "{deploy}"
templates_dir = "templates"
live_dir = "{live}"
webroot = "{webroot}"
compose_file = "docker-compose.yml"
unit_dir = "{units}"

[proxy]
output = "{output}"
service = "nginx"

[connect]
endpoint = "http://127.0.0.1:9"
timeout_secs = 1

[retry.restart]
max_attempts = 1
delay_secs = 0
settle_secs = 0

[retry.sync]
max_attempts = 1
delay_secs = 0
settle_secs = 0
"#,
            deploy = deploy.display(),
            live = root.join("live").display(),
            webroot = root.join("webroot").display(),
            units = root.join("units").display(),
            output = root.join("nginx").join("anki.conf").display(),
        );
        fs::write(root.join("deckhand.toml"), config).unwrap();

        Self { dir }
    }

    /// Create a test environment with the domain already stored.
    pub fn with_domain(domain: &str) -> Self {
        let t = Self::new();
        let output = t.secret_set("DOMAIN", domain);
        assert!(
            output.status.success(),
            "failed to store domain: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Path of the generated deckhand.toml.
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("deckhand.toml")
    }

    /// Path of the secret store file.
    pub fn env_path(&self) -> PathBuf {
        self.dir.path().join("deploy").join("anki.env")
    }

    /// Contents of the secret store file.
    pub fn env_contents(&self) -> String {
        fs::read_to_string(self.env_path()).expect("secret store missing")
    }

    /// Path of the rendered proxy config.
    pub fn rendered_path(&self) -> PathBuf {
        self.dir.path().join("nginx").join("anki.conf")
    }

    /// Contents of the rendered proxy config.
    pub fn rendered(&self) -> String {
        fs::read_to_string(self.rendered_path()).expect("rendered config missing")
    }

    /// Simulate certificate issuance by creating the pair in the live dir.
    pub fn install_cert(&self, domain: &str) {
        let live = self.dir.path().join("live").join(domain);
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("fullchain.pem"), "chain").unwrap();
        fs::write(live.join("privkey.pem"), "key").unwrap();
    }

    /// Remove a template to exercise the fatal missing-template path.
    pub fn remove_template(&self, name: &str) {
        fs::remove_file(self.dir.path().join("deploy").join("templates").join(name)).unwrap();
    }
}
