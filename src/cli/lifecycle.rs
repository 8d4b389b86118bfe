//! Lifecycle commands - the two recurring verify cycles.
//!
//! Both are entry points for the installed timers and must be safe to run
//! unsupervised on a schedule: bounded retries, bounded action timeouts, and
//! a non-zero exit once the budget is spent.

use tracing::info;

use crate::cli::output;
use crate::core::config::Settings;
use crate::core::health::{ConnectClient, ServiceProbe};
use crate::core::host::{Host, SystemHost};
use crate::core::orchestrator::RESTART_STOP_TIMEOUT;
use crate::core::retry::{run_with_healthcheck, SystemClock};
use crate::error::Result;

/// Restart-and-verify cycle: restart the containers, then poll the version
/// endpoint until the service answers.
pub fn restart(settings: &Settings) -> Result<()> {
    info!("running restart-and-verify cycle");

    let host = SystemHost;
    let client = ConnectClient::new(&settings.connect.endpoint, settings.connect_timeout())?;
    let compose = settings.compose_path();

    output::progress("Restarting service");
    let report = run_with_healthcheck(
        || host.compose_restart(&compose, RESTART_STOP_TIMEOUT),
        || client.version(),
        &settings.retry.restart.policy(),
        &SystemClock,
    );

    match report {
        Ok(report) => {
            output::progress_done(true);
            output::success(&format!(
                "service healthy after {} attempt(s)",
                report.attempts
            ));
            Ok(())
        }
        Err(e) => {
            output::progress_done(false);
            Err(e)
        }
    }
}

/// Sync-and-verify cycle: the sync query both triggers the sync and reports
/// its result, so the cycle is pure probing. A reply with a populated error
/// field counts as failure even though the service answered.
pub fn sync(settings: &Settings) -> Result<()> {
    info!("running sync-and-verify cycle");

    let client = ConnectClient::new(&settings.connect.endpoint, settings.connect_timeout())?;

    output::progress("Syncing collection");
    let report = run_with_healthcheck(
        || Ok(()),
        || client.sync(),
        &settings.retry.sync.policy(),
        &SystemClock,
    );

    match report {
        Ok(report) => {
            output::progress_done(true);
            output::success(&format!("sync verified after {} attempt(s)", report.attempts));
            Ok(())
        }
        Err(e) => {
            output::progress_done(false);
            Err(e)
        }
    }
}
