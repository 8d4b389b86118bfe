//! Bootstrap stage machine.
//!
//! Composes the leaf components into the end-to-end sequence that brings the
//! deployment to a healthy, securely-reachable state. Every stage re-derives
//! its precondition from current state (files on disk, store contents), so
//! re-running the whole sequence on an already-bootstrapped system converges
//! instead of duplicating effects, and a partial run is resumable.

use std::fs;
use std::time::Duration;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::acme::CertAcquirer;
use crate::core::certs::{CertProber, CertState};
use crate::core::config::Settings;
use crate::core::constants;
use crate::core::fsio;
use crate::core::health::ServiceProbe;
use crate::core::host::Host;
use crate::core::render::ProxyRenderer;
use crate::core::retry::{run_with_healthcheck, Clock};
use crate::core::store::EnvStore;
use crate::error::{ConfigError, Result};

/// Tools the deployment needs on the host, with the package that provides
/// each one.
const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("docker", "docker.io"),
    ("nginx", "nginx"),
    ("certbot", "certbot"),
];

/// Recurring-operation units shipped with the binary.
const UNITS: &[(&str, &str)] = &[
    (
        "deckhand-sync.service",
        include_str!("../../systemd/deckhand-sync.service"),
    ),
    (
        "deckhand-sync.timer",
        include_str!("../../systemd/deckhand-sync.timer"),
    ),
    (
        "deckhand-restart.service",
        include_str!("../../systemd/deckhand-restart.service"),
    ),
    (
        "deckhand-restart.timer",
        include_str!("../../systemd/deckhand-restart.timer"),
    ),
];

/// The bootstrap stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InstallDeps,
    MaterializeSecret,
    RenderPreCert,
    StartServices,
    AcquireCert,
    RenderPostCert,
    ReloadProxy,
    InstallSchedules,
}

impl Stage {
    pub const SEQUENCE: [Stage; 8] = [
        Stage::InstallDeps,
        Stage::MaterializeSecret,
        Stage::RenderPreCert,
        Stage::StartServices,
        Stage::AcquireCert,
        Stage::RenderPostCert,
        Stage::ReloadProxy,
        Stage::InstallSchedules,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Stage::InstallDeps => "Installing dependencies",
            Stage::MaterializeSecret => "Materializing secrets",
            Stage::RenderPreCert => "Rendering proxy config",
            Stage::StartServices => "Starting services",
            Stage::AcquireCert => "Acquiring certificate",
            Stage::RenderPostCert => "Re-rendering proxy config",
            Stage::ReloadProxy => "Reloading proxy",
            Stage::InstallSchedules => "Installing schedules",
        }
    }
}

/// How a stage concluded: it either did work or found nothing to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Done,
    Skipped(&'static str),
}

/// Operator-provided inputs merged into the store during bootstrap.
#[derive(Default)]
pub struct BootstrapInputs {
    pub domain: Option<String>,
    pub email: Option<String>,
    pub sync_user: Option<String>,
    /// Raw AnkiWeb password; zeroized on drop and never persisted. Only the
    /// key derived through the configured helper reaches the store.
    pub sync_password: Option<Zeroizing<String>>,
    pub image: Option<String>,
}

/// The bootstrap orchestrator.
pub struct Bootstrap<'a> {
    settings: &'a Settings,
    host: &'a dyn Host,
    clock: &'a dyn Clock,
    probe: &'a dyn ServiceProbe,
    prober: CertProber,
    inputs: BootstrapInputs,
    domain: String,
    store: Option<EnvStore>,
    render_changed: bool,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        settings: &'a Settings,
        host: &'a dyn Host,
        clock: &'a dyn Clock,
        probe: &'a dyn ServiceProbe,
        inputs: BootstrapInputs,
    ) -> Self {
        let prober = CertProber::new(&settings.paths.live_dir);
        Self {
            settings,
            host,
            clock,
            probe,
            prober,
            inputs,
            domain: String::new(),
            store: None,
            render_changed: false,
        }
    }

    /// Resolve the required domain input before any stage runs.
    ///
    /// A missing domain is an operator mistake; failing here means a
    /// misconfigured run performs no host mutations at all.
    pub fn preflight(&mut self) -> Result<()> {
        if let Some(domain) = self.inputs.domain.as_deref().filter(|d| !d.is_empty()) {
            self.domain = domain.to_string();
            return Ok(());
        }

        let env_path = self.settings.env_path();
        if env_path.exists() {
            let store = EnvStore::load(&env_path)?;
            if let Some(domain) = store.get_nonempty(constants::KEY_DOMAIN) {
                self.domain = domain.to_string();
                return Ok(());
            }
        }

        Err(ConfigError::MissingInput("domain (pass --domain or set DOMAIN in anki.env)").into())
    }

    /// Run the full sequence.
    pub fn run(&mut self) -> Result<()> {
        self.preflight()?;
        info!(domain = %self.domain, "bootstrap starting");

        for stage in Stage::SEQUENCE {
            match self.run_stage(stage)? {
                StageOutcome::Done => debug!(stage = stage.title(), "stage done"),
                StageOutcome::Skipped(reason) => {
                    debug!(stage = stage.title(), reason, "stage skipped")
                }
            }
        }

        info!(domain = %self.domain, "bootstrap complete");
        Ok(())
    }

    /// Run one stage. Stages expect their predecessors to have run within
    /// this `Bootstrap` (the store is loaded by `MaterializeSecret`).
    pub fn run_stage(&mut self, stage: Stage) -> Result<StageOutcome> {
        match stage {
            Stage::InstallDeps => self.install_deps(),
            Stage::MaterializeSecret => self.materialize_secret(),
            Stage::RenderPreCert | Stage::RenderPostCert => self.render(),
            Stage::StartServices => self.start_services(),
            Stage::AcquireCert => self.acquire_cert(),
            Stage::ReloadProxy => self.reload_proxy(),
            Stage::InstallSchedules => self.install_schedules(),
        }
    }

    fn install_deps(&mut self) -> Result<StageOutcome> {
        let mut installed = 0;
        for (tool, package) in REQUIRED_TOOLS {
            if which::which(tool).is_ok() {
                debug!(tool, "already installed");
                continue;
            }
            self.host.install_package(package)?;
            installed += 1;
        }

        if installed == 0 {
            Ok(StageOutcome::Skipped("all dependencies present"))
        } else {
            Ok(StageOutcome::Done)
        }
    }

    fn materialize_secret(&mut self) -> Result<StageOutcome> {
        let mut store =
            EnvStore::load_or_seed(&self.settings.env_path(), &self.settings.env_example_path())?;

        let mut changed = store.set(constants::KEY_DOMAIN, &self.domain);
        if let Some(email) = &self.inputs.email {
            changed |= store.set(constants::KEY_EMAIL, email);
        }
        if let Some(user) = &self.inputs.sync_user {
            changed |= store.set(constants::KEY_SYNC_USER, user);
        }
        if let Some(image) = &self.inputs.image {
            changed |= store.set(constants::KEY_IMAGE, image);
        }

        if let Some(password) = &self.inputs.sync_password {
            let user = store
                .get_nonempty(constants::KEY_SYNC_USER)
                .map(str::to_string)
                .ok_or(ConfigError::MissingInput(
                    "ANKIWEB_USER (required to derive the sync key)",
                ))?;
            let helper = self.settings.secrets.synckey_helper.as_deref().ok_or(
                ConfigError::MissingInput(
                    "secrets.synckey_helper (required to derive the sync key)",
                ),
            )?;
            let key = self.host.derive_sync_key(helper, &user, password)?;
            changed |= store.set(constants::KEY_SYNC_KEY, &key);
        }

        let outcome = if changed {
            store.save()?;
            store.prune_backups()?;
            StageOutcome::Done
        } else {
            StageOutcome::Skipped("store already up to date")
        };

        self.store = Some(store);
        Ok(outcome)
    }

    fn render(&mut self) -> Result<StageOutcome> {
        let renderer = ProxyRenderer::new(
            &self.settings.templates_dir(),
            &self.settings.proxy.output,
            &self.prober,
        );
        let outcome = renderer.render(&self.domain)?;
        self.render_changed = outcome.changed;

        if outcome.changed {
            Ok(StageOutcome::Done)
        } else {
            Ok(StageOutcome::Skipped("configuration unchanged"))
        }
    }

    fn start_services(&mut self) -> Result<StageOutcome> {
        let compose = self.settings.compose_path();

        // a failed pull degrades to whatever image is already local
        if let Err(e) = self.host.compose_pull(&compose) {
            warn!(error = %e, "image pull failed, starting from local image");
        }

        let host = self.host;
        let probe = self.probe;
        let service = self.settings.proxy.service.as_str();
        run_with_healthcheck(
            || {
                host.compose_up(&compose)?;
                host.ensure_service_running(service)
            },
            || probe.version(),
            &self.settings.retry.restart.policy(),
            self.clock,
        )?;

        Ok(StageOutcome::Done)
    }

    fn acquire_cert(&mut self) -> Result<StageOutcome> {
        if let CertState::Present = self.prober.probe(&self.domain) {
            return Ok(StageOutcome::Skipped("certificate already present"));
        }

        // checked before the acquirer is invoked: a missing contact address
        // is an operator mistake, not a retryable condition
        let email = self
            .store()?
            .get_nonempty(constants::KEY_EMAIL)
            .map(str::to_string)
            .ok_or(ConfigError::MissingInput(
                "CERTBOT_EMAIL (required to request a certificate)",
            ))?;

        let acquirer = CertAcquirer::new(&self.prober, self.host, &self.settings.paths.webroot);
        acquirer.ensure(&self.domain, &email)?;
        Ok(StageOutcome::Done)
    }

    fn reload_proxy(&mut self) -> Result<StageOutcome> {
        if !self.render_changed {
            return Ok(StageOutcome::Skipped("configuration unchanged"));
        }
        self.host.reload_service(&self.settings.proxy.service)?;
        Ok(StageOutcome::Done)
    }

    fn install_schedules(&mut self) -> Result<StageOutcome> {
        let unit_dir = &self.settings.paths.unit_dir;
        let mut wrote = false;

        for (name, text) in UNITS {
            let target = unit_dir.join(name);
            let current = fs::read_to_string(&target).ok();
            if current.as_deref() == Some(*text) {
                continue;
            }
            fs::create_dir_all(unit_dir)?;
            fsio::write_atomic(&target, text)?;
            debug!(unit = name, "unit file installed");
            wrote = true;
        }

        if wrote {
            self.host.daemon_reload()?;
        }

        let mut enabled = 0;
        for timer in [constants::SYNC_TIMER, constants::RESTART_TIMER] {
            if self.host.timer_enabled(timer) {
                debug!(timer, "timer already enabled");
                continue;
            }
            self.host.enable_timer(timer)?;
            enabled += 1;
        }

        if !wrote && enabled == 0 {
            Ok(StageOutcome::Skipped("schedules already installed"))
        } else {
            Ok(StageOutcome::Done)
        }
    }

    fn store(&self) -> Result<&EnvStore> {
        self.store
            .as_ref()
            .ok_or_else(|| ConfigError::MissingInput("secret store (run MaterializeSecret first)").into())
    }
}

/// Bounded stop timeout handed to the container runtime on restart.
pub const RESTART_STOP_TIMEOUT: Duration = Duration::from_secs(30);
