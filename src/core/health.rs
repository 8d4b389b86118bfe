//! AnkiConnect health probes.
//!
//! The managed service answers JSON-RPC style requests on a local port:
//! `{"action": "...", "version": 6}` in, `{"result": ..., "error": ...}`
//! out. Two probes exist: a version query (is the service up at all) and a
//! sync query (did the scheduled sync actually succeed). A sync reply with a
//! populated error field is a failure even though the service answered.

use std::time::Duration;

use serde::Deserialize;
use tracing::trace;

use crate::core::retry::ProbeOutcome;
use crate::error::{HealthError, Result};

/// AnkiConnect protocol version sent with every request.
const PROTOCOL_VERSION: u32 = 6;

/// Reply envelope shared by all AnkiConnect actions.
#[derive(Debug, Deserialize)]
struct ConnectReply {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: serde_json::Value,
}

/// Probe capability consumed by the orchestrator and the verify cycles,
/// injectable so tests substitute a canned implementation.
pub trait ServiceProbe {
    fn version(&self) -> ProbeOutcome;
    fn sync(&self) -> ProbeOutcome;
}

/// Blocking client for the managed service's health endpoint.
pub struct ConnectClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl ServiceProbe for ConnectClient {
    fn version(&self) -> ProbeOutcome {
        self.version_probe()
    }

    fn sync(&self) -> ProbeOutcome {
        self.sync_probe()
    }
}

impl ConnectClient {
    /// Build a client with a bounded per-request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HealthError::Client)?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    /// Version query: healthy once the service answers with a result.
    pub fn version_probe(&self) -> ProbeOutcome {
        match self.call("version") {
            Ok(reply) => version_outcome(&reply),
            Err(why) => ProbeOutcome::Unhealthy(why),
        }
    }

    /// Sync query: healthy only when the reply's error field is null.
    pub fn sync_probe(&self) -> ProbeOutcome {
        match self.call("sync") {
            Ok(reply) => sync_outcome(&reply),
            Err(why) => ProbeOutcome::Unhealthy(why),
        }
    }

    fn call(&self, action: &str) -> std::result::Result<ConnectReply, String> {
        let body = serde_json::json!({
            "action": action,
            "version": PROTOCOL_VERSION,
        });
        trace!(action, endpoint = %self.endpoint, "probing service");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| format!("{} request failed: {}", action, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("{} request answered http {}", action, status));
        }

        let text = response
            .text()
            .map_err(|e| format!("{} response unreadable: {}", action, e))?;
        if text.trim().is_empty() {
            return Err(format!("{} response was empty", action));
        }

        serde_json::from_str(&text).map_err(|e| format!("{} response malformed: {}", action, e))
    }
}

fn version_outcome(reply: &ConnectReply) -> ProbeOutcome {
    if !reply.error.is_null() {
        return ProbeOutcome::Unhealthy(format!("version reported error: {}", reply.error));
    }
    if reply.result.is_null() {
        return ProbeOutcome::Unhealthy("version reply carried no result".to_string());
    }
    ProbeOutcome::Healthy
}

// Only JSON null counts as "no error". An empty string still means the
// service filled the error slot, so it fails the probe.
fn sync_outcome(reply: &ConnectReply) -> ProbeOutcome {
    if reply.error.is_null() {
        ProbeOutcome::Healthy
    } else {
        ProbeOutcome::Unhealthy(format!("sync reported error: {}", reply.error))
    }
}
