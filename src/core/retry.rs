//! Bounded health-check retry executor.
//!
//! Runs an action once, then polls a health probe until it answers or the
//! retry budget is exhausted. The clock is injected so tests run with zero
//! real delay.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{HealthError, Result};

/// Retry budget for one executor invocation: attempt count, fixed
/// inter-attempt delay, and an initial settle delay after the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub settle: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            settle: Duration::ZERO,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// Sleep capability, injected so tests substitute a recording fake.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation.
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A single probe answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy(String),
}

/// Successful executor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    /// Probe attempts spent, including the successful one.
    pub attempts: u32,
}

/// Run `action` once, settle, then poll `probe` up to
/// `policy.max_attempts` times with `policy.delay` between attempts.
///
/// Returns on the first healthy probe; otherwise fails with
/// `HealthError::Exhausted` carrying the last diagnostic. The probe is
/// invoked exactly as many times as the budget allows, never more.
pub fn run_with_healthcheck<A, P>(
    mut action: A,
    mut probe: P,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<HealthReport>
where
    A: FnMut() -> Result<()>,
    P: FnMut() -> ProbeOutcome,
{
    action()?;

    if !policy.settle.is_zero() {
        debug!(settle = ?policy.settle, "waiting for service to settle");
        clock.sleep(policy.settle);
    }

    let mut last = String::from("no probe attempted");
    for attempt in 1..=policy.max_attempts {
        match probe() {
            ProbeOutcome::Healthy => {
                debug!(attempt, "probe healthy");
                return Ok(HealthReport { attempts: attempt });
            }
            ProbeOutcome::Unhealthy(why) => {
                warn!(attempt, max = policy.max_attempts, %why, "probe failed");
                last = why;
            }
        }
        if attempt < policy.max_attempts {
            clock.sleep(policy.delay);
        }
    }

    Err(HealthError::Exhausted {
        attempts: policy.max_attempts,
        last,
    }
    .into())
}
