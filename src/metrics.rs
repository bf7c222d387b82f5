//! Metric events emitted as structured logs.
//!
//! Uses tracing for now; a collector can scrape the `version_gate::metrics`
//! target.

use tracing::{debug, info};

use crate::types::{Decision, ProtocolVersion};

/// Where in the connection lifecycle a decision was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStage {
    /// Pre-admission check at login start.
    Login,
    /// Authoritative check on join.
    Join,
}

impl CheckStage {
    fn as_str(self) -> &'static str {
        match self {
            CheckStage::Login => "login",
            CheckStage::Join => "join",
        }
    }
}

/// Record an admission decision.
pub fn record_decision(stage: CheckStage, version: ProtocolVersion, decision: Decision) {
    debug!(
        target: "version_gate::metrics",
        metric_type = "decision",
        stage = stage.as_str(),
        version = version.release(),
        decision = decision.as_str(),
        "decision_metric"
    );
}

/// Record a reload attempt.
pub fn record_reload(success: bool, generation: u64) {
    let result = if success { "success" } else { "error" };
    info!(
        target: "version_gate::metrics",
        metric_type = "reload",
        result = result,
        generation = generation,
        "reload_metric"
    );
}

/// Record a reminder scan.
pub fn record_reminder_scan(scanned: usize, notified: usize) {
    debug!(
        target: "version_gate::metrics",
        metric_type = "reminder_scan",
        scanned = scanned,
        notified = notified,
        "reminder_scan_metric"
    );
}
