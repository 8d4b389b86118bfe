//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a deckhand command pointed at the isolated deployment.
    ///
    /// Returns a Command configured with:
    /// - DECKHAND_CONFIG set to the generated deckhand.toml
    /// - NO_COLOR for deterministic output
    /// - no inherited credential environment
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("deckhand").expect("failed to find deckhand binary");
        cmd.env("DECKHAND_CONFIG", self.config_path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("ANKIWEB_PASSWORD");
        cmd.env_remove("ANKIWEB_USER");
        cmd.env_remove("ANKI_IMAGE");
        cmd.env_remove("DOMAIN");
        cmd.env_remove("CERTBOT_EMAIL");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `deckhand secret set`.
    pub fn secret_set(&self, key: &str, value: &str) -> Output {
        self.cmd()
            .args(["secret", "set", key, value])
            .output()
            .expect("failed to run deckhand secret set")
    }

    /// Shortcut for `deckhand secret get`.
    pub fn secret_get(&self, key: &str) -> Output {
        self.cmd()
            .args(["secret", "get", key])
            .output()
            .expect("failed to run deckhand secret get")
    }

    /// Shortcut for `deckhand secret list`.
    pub fn secret_list(&self) -> Output {
        self.cmd()
            .args(["secret", "list"])
            .output()
            .expect("failed to run deckhand secret list")
    }

    /// Shortcut for `deckhand secret list --json`.
    pub fn secret_list_json(&self) -> Output {
        self.cmd()
            .args(["secret", "list", "--json"])
            .output()
            .expect("failed to run deckhand secret list --json")
    }

    /// Shortcut for `deckhand render`.
    pub fn render(&self) -> Output {
        self.cmd()
            .arg("render")
            .output()
            .expect("failed to run deckhand render")
    }

    /// Shortcut for `deckhand cert`.
    pub fn cert(&self) -> Output {
        self.cmd()
            .arg("cert")
            .output()
            .expect("failed to run deckhand cert")
    }

    /// Shortcut for `deckhand sync`.
    pub fn sync(&self) -> Output {
        self.cmd()
            .arg("sync")
            .output()
            .expect("failed to run deckhand sync")
    }

    /// Shortcut for `deckhand status`.
    pub fn status(&self) -> Output {
        self.cmd()
            .arg("status")
            .output()
            .expect("failed to run deckhand status")
    }
}
