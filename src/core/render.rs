//! Reverse-proxy config rendering.
//!
//! Chooses between the certificate-absent and certificate-present templates
//! based on a fresh probe, substitutes the domain placeholder, and overwrites
//! the output file whole. Given the same template set, domain, and
//! certificate state the output is byte-identical; the placeholder token
//! never survives into the output.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::certs::{CertProber, CertState};
use crate::core::constants;
use crate::core::fsio;
use crate::error::{ConfigError, RenderError, Result};

/// Outcome of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Which template variant was chosen.
    pub variant: CertState,
    /// Whether the output bytes differ from what was previously on disk.
    pub changed: bool,
}

/// Renders the proxy vhost for the deployment.
pub struct ProxyRenderer<'a> {
    templates_dir: PathBuf,
    output: PathBuf,
    prober: &'a CertProber,
}

impl<'a> ProxyRenderer<'a> {
    pub fn new(templates_dir: &Path, output: &Path, prober: &'a CertProber) -> Self {
        Self {
            templates_dir: templates_dir.to_path_buf(),
            output: output.to_path_buf(),
            prober,
        }
    }

    /// Render the config for `domain`, probing the certificate state fresh.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingInput` for an empty domain and
    /// `RenderError::TemplateMissing` when the chosen template file does not
    /// exist; there is no safe default to fall back to.
    pub fn render(&self, domain: &str) -> Result<RenderOutcome> {
        if domain.is_empty() {
            return Err(ConfigError::MissingInput("domain").into());
        }

        let variant = self.prober.probe(domain);
        let template_name = match variant {
            CertState::Present => constants::TLS_TEMPLATE,
            CertState::Absent => constants::HTTP_TEMPLATE,
        };

        let template_path = self.templates_dir.join(template_name);
        let template = fs::read_to_string(&template_path)
            .map_err(|_| RenderError::TemplateMissing(template_path.clone()))?;

        let rendered = template.replace(constants::DOMAIN_TOKEN, domain);
        debug_assert!(
            !rendered.contains(constants::DOMAIN_TOKEN),
            "placeholder must not survive substitution"
        );

        let changed = match fs::read(&self.output) {
            Ok(previous) => fsio::sha256_hex(&previous) != fsio::sha256_hex(rendered.as_bytes()),
            Err(_) => true,
        };

        if let Some(parent) = self.output.parent() {
            fs::create_dir_all(parent).map_err(|source| RenderError::WriteFailed {
                path: self.output.display().to_string(),
                source,
            })?;
        }
        fsio::write_atomic(&self.output, &rendered).map_err(|source| RenderError::WriteFailed {
            path: self.output.display().to_string(),
            source,
        })?;

        if changed {
            info!(domain, ?variant, output = %self.output.display(), "proxy config rendered");
        } else {
            debug!(domain, ?variant, "proxy config unchanged");
        }

        Ok(RenderOutcome { variant, changed })
    }

    /// Path the rendered document is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }
}
