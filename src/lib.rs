//! # version-gate
//!
//! Protocol-version admission control for game servers.
//!
//! The gate answers one question:
//!
//! > Given a connecting client's protocol version and its permissions, may it join?
//!
//! ## Core Contract
//!
//! 1. Resolve version names from config into a fixed, ordered version catalog
//! 2. Validate config into an immutable [`PolicySnapshot`] and publish it atomically
//! 3. Decide admission: blacklist first, then whitelist, with permission bypasses
//! 4. Periodically remind bypassing players that their version is unsupported
//!
//! ## Architecture
//!
//! ```text
//! RawConfig → pipeline → PolicySnapshot ──Arc swap──▶ PolicyStore
//!                                                         │
//!           login / join ──▶ VersionGate ──decide()───────┘
//!                                 │
//!                      ReminderScheduler ──ReminderTick──▶ host TaskQueue
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same config → identical snapshot fingerprint
//! - A decision reads exactly one snapshot, never a mix of two
//! - A failed reload leaves the published snapshot untouched

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod config;
pub mod policy;
pub mod store;
pub mod reminder;
pub mod gate;
pub mod canonical;
pub mod metrics;

// Re-exports
pub use types::{
    ProtocolVersion, UnresolvableVersion, VersionSet,
    Capability, CapabilitySet, Subject, Connection,
    BypassKind, Decision,
    BYPASS_ALL, BYPASS_BLACKLIST, DISABLE_NOTIFY,
};
pub use config::{ConfigError, RawConfig, RawWhitelist, translate_color_codes, strip_color_codes};
pub use policy::{decide, PolicySnapshot, Recommendation, VersionRange};
pub use store::PolicyStore;
pub use reminder::{
    collect_reminders, Reminder, ReminderInterval, ReminderScheduler, ReminderTick,
    SchedulerState, TaskQueue,
};
pub use gate::{DelayedMessage, JoinOutcome, LoginVerdict, VersionGate, JOIN_MESSAGE_DELAY};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

/// Schema version of the policy fingerprint input.
/// Increment when the fingerprinted fields change.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";
