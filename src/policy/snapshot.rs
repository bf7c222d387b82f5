//! Immutable policy snapshots.
//!
//! A `PolicySnapshot` is built once per successful reload and never mutated.
//! It is shared as `Arc<PolicySnapshot>` between connection handlers and the
//! reminder scan, so a reader always sees one complete generation of rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::config::{ConfigError, RawConfig};
use crate::reminder::ReminderInterval;
use crate::types::{CapabilitySet, Decision, ProtocolVersion, VersionSet};
use crate::POLICY_SCHEMA_VERSION;

use super::engine::decide;

/// The whitelist range selector as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    /// Configured start bound.
    pub start: ProtocolVersion,
    /// Configured end bound. May be older than `start`.
    pub end: ProtocolVersion,
}

impl VersionRange {
    /// Every release covered by the range, oldest first.
    pub fn versions(&self) -> Vec<ProtocolVersion> {
        ProtocolVersion::between(self.start, self.end)
    }

    /// Oldest covered release.
    pub fn oldest(&self) -> ProtocolVersion {
        self.start.min(self.end)
    }

    /// Newest covered release.
    pub fn newest(&self) -> ProtocolVersion {
        self.start.max(self.end)
    }
}

/// Recommended version and the nudge sent to everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The version players should use.
    pub version: ProtocolVersion,
    /// Color-translated message.
    pub message: String,
}

/// Validated values a snapshot is assembled from.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotParts {
    pub whitelist_range: Option<VersionRange>,
    pub whitelist: VersionSet,
    pub blacklist: VersionSet,
    pub whitelist_message: String,
    pub blacklist_message: String,
    pub bypass_message: String,
    pub recommended: Option<Recommendation>,
    pub reminder_interval_seconds: i64,
}

/// Hashed view of a snapshot. Excludes `loaded_at`.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    schema_version: &'a str,
    whitelist_range: Option<VersionRange>,
    whitelist: VersionSet,
    blacklist: VersionSet,
    whitelist_message: &'a str,
    blacklist_message: &'a str,
    bypass_message: &'a str,
    recommended: Option<&'a Recommendation>,
    reminder_interval_seconds: i64,
}

/// One published generation of admission rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySnapshot {
    whitelist_range: Option<VersionRange>,
    whitelist: VersionSet,
    blacklist: VersionSet,
    whitelist_message: String,
    blacklist_message: String,
    bypass_message: String,
    recommended: Option<Recommendation>,
    reminder_interval_seconds: i64,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

impl PolicySnapshot {
    /// Validate raw config values and build a snapshot.
    ///
    /// Nothing is published here; see [`crate::store::PolicyStore::reload`].
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        crate::config::build_parts(raw).map(Self::from_parts)
    }

    pub(crate) fn from_parts(parts: SnapshotParts) -> Self {
        let fingerprint = canonical_hash_hex(&FingerprintInput {
            schema_version: POLICY_SCHEMA_VERSION,
            whitelist_range: parts.whitelist_range,
            whitelist: parts.whitelist,
            blacklist: parts.blacklist,
            whitelist_message: &parts.whitelist_message,
            blacklist_message: &parts.blacklist_message,
            bypass_message: &parts.bypass_message,
            recommended: parts.recommended.as_ref(),
            reminder_interval_seconds: parts.reminder_interval_seconds,
        });

        Self {
            whitelist_range: parts.whitelist_range,
            whitelist: parts.whitelist,
            blacklist: parts.blacklist,
            whitelist_message: parts.whitelist_message,
            blacklist_message: parts.blacklist_message,
            bypass_message: parts.bypass_message,
            recommended: parts.recommended,
            reminder_interval_seconds: parts.reminder_interval_seconds,
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    /// Whether the version is blacklisted.
    pub fn is_blacklisted(&self, version: ProtocolVersion) -> bool {
        self.blacklist.contains(version)
    }

    /// Whether the version is whitelisted, range included.
    pub fn is_whitelisted(&self, version: ProtocolVersion) -> bool {
        self.whitelist.contains(version)
    }

    /// Whether a client on this version is only present through a bypass.
    pub fn needs_bypass(&self, version: ProtocolVersion) -> bool {
        !self.is_whitelisted(version) || self.is_blacklisted(version)
    }

    /// Evaluate a connection against this snapshot.
    pub fn decide(&self, version: ProtocolVersion, caps: CapabilitySet) -> Decision {
        decide(version, caps, self)
    }

    /// The configured range selector, if enabled.
    pub fn whitelist_range(&self) -> Option<VersionRange> {
        self.whitelist_range
    }

    /// Effective whitelist (explicit entries plus range).
    pub fn whitelist(&self) -> VersionSet {
        self.whitelist
    }

    /// Effective blacklist.
    pub fn blacklist(&self) -> VersionSet {
        self.blacklist
    }

    /// Kick message for non-whitelisted versions.
    pub fn whitelist_message(&self) -> &str {
        &self.whitelist_message
    }

    /// Kick message for blacklisted versions.
    pub fn blacklist_message(&self) -> &str {
        &self.blacklist_message
    }

    /// Reminder message for bypassing players.
    pub fn bypass_message(&self) -> &str {
        &self.bypass_message
    }

    /// Recommended version, if configured.
    pub fn recommended(&self) -> Option<&Recommendation> {
        self.recommended.as_ref()
    }

    /// Raw `repeatBypassMessage` value.
    pub fn reminder_interval_seconds(&self) -> i64 {
        self.reminder_interval_seconds
    }

    /// Interpreted reminder schedule.
    pub fn reminder(&self) -> ReminderInterval {
        ReminderInterval::from_seconds(self.reminder_interval_seconds)
    }

    /// Message a denied client is kicked with.
    pub fn deny_message(&self, decision: Decision) -> Option<&str> {
        match decision {
            Decision::DenyBlacklisted => Some(&self.blacklist_message),
            Decision::DenyNotWhitelisted => Some(&self.whitelist_message),
            Decision::Allow | Decision::AllowBypassed(_) => None,
        }
    }

    /// Content fingerprint (xxh64 hex). Identical rules give identical fingerprints.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// When this snapshot was built.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> SnapshotParts {
        SnapshotParts {
            whitelist_range: None,
            whitelist: [ProtocolVersion::V1_12_2].into_iter().collect(),
            blacklist: [ProtocolVersion::V1_7_5].into_iter().collect(),
            whitelist_message: "w".to_string(),
            blacklist_message: "b".to_string(),
            bypass_message: "p".to_string(),
            recommended: None,
            reminder_interval_seconds: 600,
        }
    }

    #[test]
    fn test_fingerprint_ignores_load_time() {
        let a = PolicySnapshot::from_parts(parts());
        let b = PolicySnapshot::from_parts(parts());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_rules() {
        let a = PolicySnapshot::from_parts(parts());

        let mut changed = parts();
        changed.blacklist.insert(ProtocolVersion::V1_8);
        let b = PolicySnapshot::from_parts(changed);

        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_needs_bypass() {
        let snapshot = PolicySnapshot::from_parts(parts());

        assert!(!snapshot.needs_bypass(ProtocolVersion::V1_12_2));
        assert!(snapshot.needs_bypass(ProtocolVersion::V1_8));
        assert!(snapshot.needs_bypass(ProtocolVersion::V1_7_5));
        assert!(snapshot.needs_bypass(ProtocolVersion::Unknown));
    }

    #[test]
    fn test_deny_message_mapping() {
        let snapshot = PolicySnapshot::from_parts(parts());

        assert_eq!(snapshot.deny_message(Decision::DenyBlacklisted), Some("b"));
        assert_eq!(snapshot.deny_message(Decision::DenyNotWhitelisted), Some("w"));
        assert_eq!(snapshot.deny_message(Decision::Allow), None);
    }

    #[test]
    fn test_range_bounds() {
        let range = VersionRange {
            start: ProtocolVersion::V1_12_2,
            end: ProtocolVersion::V1_8,
        };
        assert_eq!(range.oldest(), ProtocolVersion::V1_8);
        assert_eq!(range.newest(), ProtocolVersion::V1_12_2);
        assert_eq!(range.versions().first(), Some(&ProtocolVersion::V1_8));
    }
}
