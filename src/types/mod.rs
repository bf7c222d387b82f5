//! Core types for the version gate.

pub mod version;
pub mod version_set;
pub mod capability;
pub mod connection;
pub mod decision;

pub use version::{ProtocolVersion, UnresolvableVersion, TOKEN_PREFIX};
pub use version_set::VersionSet;
pub use capability::{
    Capability, CapabilitySet, Subject,
    BYPASS_ALL, BYPASS_BLACKLIST, DISABLE_NOTIFY,
};
pub use connection::Connection;
pub use decision::{BypassKind, Decision};
