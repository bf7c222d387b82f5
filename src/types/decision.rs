//! Admission decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rule a bypass overrode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassKind {
    /// The version is blacklisted.
    Blacklist,
    /// The version is not whitelisted.
    Whitelist,
}

/// Outcome of evaluating one connection against a policy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Whitelisted and not blacklisted.
    Allow,
    /// Failed a rule but holds a matching bypass. The client should be reminded.
    AllowBypassed(BypassKind),
    /// Blacklisted without bypass.
    DenyBlacklisted,
    /// Not whitelisted without bypass.
    DenyNotWhitelisted,
}

impl Decision {
    /// Whether the connection may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow | Decision::AllowBypassed(_))
    }

    /// Whether the connection must be rejected.
    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    /// Whether the connection got in through a bypass.
    pub fn is_bypassed(&self) -> bool {
        matches!(self, Decision::AllowBypassed(_))
    }

    /// Whether the blacklist rule produced this decision.
    pub fn is_blacklist_branch(&self) -> bool {
        matches!(
            self,
            Decision::DenyBlacklisted | Decision::AllowBypassed(BypassKind::Blacklist)
        )
    }

    /// Stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::AllowBypassed(BypassKind::Blacklist) => "allow_bypassed_blacklist",
            Decision::AllowBypassed(BypassKind::Whitelist) => "allow_bypassed_whitelist",
            Decision::DenyBlacklisted => "deny_blacklisted",
            Decision::DenyNotWhitelisted => "deny_not_whitelisted",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
