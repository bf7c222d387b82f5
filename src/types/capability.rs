//! Bypass capabilities and the permission lookup seam.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Permission node granting access from any version.
pub const BYPASS_ALL: &str = "versiongate.bypass.all";
/// Permission node granting access from blacklisted versions.
pub const BYPASS_BLACKLIST: &str = "versiongate.bypass.blacklist";
/// Permission node suppressing bypass reminders.
pub const DISABLE_NOTIFY: &str = "versiongate.bypass.disableNotify";

/// A capability the gate checks on a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Connect using any version.
    BypassAll,
    /// Connect using a blacklisted version.
    BypassBlacklist,
    /// Do not receive bypass reminders.
    DisableNotify,
}

impl Capability {
    /// All capabilities the gate queries.
    pub const ALL: [Capability; 3] = [
        Capability::BypassAll,
        Capability::BypassBlacklist,
        Capability::DisableNotify,
    ];

    /// The permission node backing this capability.
    pub fn node(self) -> &'static str {
        match self {
            Capability::BypassAll => BYPASS_ALL,
            Capability::BypassBlacklist => BYPASS_BLACKLIST,
            Capability::DisableNotify => DISABLE_NOTIFY,
        }
    }
}

/// Anything that can answer permission-node queries.
///
/// Implemented by the host for its player type.
pub trait Subject {
    /// Whether the subject holds the given permission node.
    fn has_permission(&self, node: &str) -> bool;
}

impl Subject for HashSet<String> {
    fn has_permission(&self, node: &str) -> bool {
        self.contains(node)
    }
}

impl Subject for BTreeSet<String> {
    fn has_permission(&self, node: &str) -> bool {
        self.contains(node)
    }
}

/// Capabilities held by one connection, resolved once per check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// Holds bypass-all.
    pub bypass_all: bool,
    /// Holds bypass-blacklist.
    pub bypass_blacklist: bool,
    /// Holds disable-notify.
    pub disable_notify: bool,
}

impl CapabilitySet {
    /// No capabilities.
    pub fn none() -> Self {
        Self::default()
    }

    /// Query every capability from a subject.
    pub fn query<S: Subject + ?Sized>(subject: &S) -> Self {
        Self {
            bypass_all: subject.has_permission(BYPASS_ALL),
            bypass_blacklist: subject.has_permission(BYPASS_BLACKLIST),
            disable_notify: subject.has_permission(DISABLE_NOTIFY),
        }
    }

    /// Add a capability.
    pub fn with(mut self, capability: Capability) -> Self {
        match capability {
            Capability::BypassAll => self.bypass_all = true,
            Capability::BypassBlacklist => self.bypass_blacklist = true,
            Capability::DisableNotify => self.disable_notify = true,
        }
        self
    }

    /// Check a capability.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::BypassAll => self.bypass_all,
            Capability::BypassBlacklist => self.bypass_blacklist,
            Capability::DisableNotify => self.disable_notify,
        }
    }
}

impl Subject for CapabilitySet {
    fn has_permission(&self, node: &str) -> bool {
        Capability::ALL
            .iter()
            .any(|cap| cap.node() == node && self.has(*cap))
    }
}
