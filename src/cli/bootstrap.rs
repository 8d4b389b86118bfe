//! Bootstrap command - run the full stage sequence.

use tracing::info;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::core::config::Settings;
use crate::core::health::ConnectClient;
use crate::core::host::SystemHost;
use crate::core::orchestrator::{Bootstrap, BootstrapInputs, Stage, StageOutcome};
use crate::core::retry::SystemClock;
use crate::error::Result;

/// Run the bootstrap sequence, reporting each stage.
pub fn execute(
    settings: &Settings,
    domain: Option<String>,
    email: Option<String>,
    sync_user: Option<String>,
    image: Option<String>,
) -> Result<()> {
    // the raw password is only ever accepted from the environment and
    // zeroized on drop; the store receives the derived key alone
    let sync_password = std::env::var("ANKIWEB_PASSWORD").ok().map(Zeroizing::new);

    let inputs = BootstrapInputs {
        domain,
        email,
        sync_user,
        sync_password,
        image,
    };

    let host = SystemHost;
    let clock = SystemClock;
    let probe = ConnectClient::new(&settings.connect.endpoint, settings.connect_timeout())?;
    let mut boot = Bootstrap::new(settings, &host, &clock, &probe, inputs);

    boot.preflight()?;
    info!("starting bootstrap");
    output::section("Bootstrap");

    for stage in Stage::SEQUENCE {
        output::progress(stage.title());
        match boot.run_stage(stage) {
            Ok(StageOutcome::Done) => output::progress_done(true),
            Ok(StageOutcome::Skipped(reason)) => {
                output::progress_done(true);
                output::dimmed(&format!("  {}", reason));
            }
            Err(e) => {
                output::progress_done(false);
                return Err(e);
            }
        }
    }

    println!();
    output::success("bootstrap complete");
    output::hint(&format!(
        "recurring cycles run via {} and {}",
        output::cmd("deckhand-sync.timer"),
        output::cmd("deckhand-restart.timer")
    ));
    Ok(())
}
