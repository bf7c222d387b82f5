//! Admission decision engine.
//!
//! Precedence:
//!
//! ```text
//! blacklisted?  ── yes ─▶ bypass-all | bypass-blacklist ? AllowBypassed(Blacklist) : DenyBlacklisted
//!      │ no
//! whitelisted?  ── no ──▶ bypass-all ? AllowBypassed(Whitelist) : DenyNotWhitelisted
//!      │ yes
//!    Allow
//! ```
//!
//! The blacklist is checked first, so a version on both lists is always
//! handled by the blacklist rule.

use crate::types::{BypassKind, CapabilitySet, Decision, ProtocolVersion};

use super::snapshot::PolicySnapshot;

/// Decide whether a connection on `version` holding `caps` may proceed.
pub fn decide(version: ProtocolVersion, caps: CapabilitySet, snapshot: &PolicySnapshot) -> Decision {
    if snapshot.is_blacklisted(version) {
        if caps.bypass_all || caps.bypass_blacklist {
            Decision::AllowBypassed(BypassKind::Blacklist)
        } else {
            Decision::DenyBlacklisted
        }
    } else if !snapshot.is_whitelisted(version) {
        if caps.bypass_all {
            Decision::AllowBypassed(BypassKind::Whitelist)
        } else {
            Decision::DenyNotWhitelisted
        }
    } else {
        Decision::Allow
    }
}
